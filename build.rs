//! Build script to embed Windows resource metadata into the executable
//! This sets the application name shown in Task Manager

fn main() {
    #[cfg(windows)]
    {
        let mut res = winresource::WindowsResource::new();

        res.set("ProductName", "Desktop Mascot");
        res.set("FileDescription", "Desktop Mascot");
        res.set("InternalName", "DesktopMascot");
        res.set("OriginalFilename", "desktop_mascot.exe");
        res.set("ProductVersion", env!("CARGO_PKG_VERSION"));
        res.set("FileVersion", env!("CARGO_PKG_VERSION"));

        // Icon shown in Explorer; the tray loads its own copy at runtime
        if std::path::Path::new("myicon.ico").exists() {
            res.set_icon("myicon.ico");
        }

        if let Err(e) = res.compile() {
            println!("cargo:warning=Failed to compile Windows resources: {}", e);
        }
    }
}
