//! Software rendering of the overlay frame

use anyhow::{anyhow, Result};
use softbuffer::{Context, Surface};
use std::num::NonZeroU32;
use std::rc::Rc;
use winit::window::Window;

use crate::sprite::Sprite;
use crate::wander::Pose;

pub struct Presenter {
    // Must outlive the surface
    _context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    width: u32,
    height: u32,
}

impl Presenter {
    pub fn new(window: Rc<Window>, width: u32, height: u32) -> Result<Self> {
        let context = Context::new(window.clone())
            .map_err(|e| anyhow!("Failed to create softbuffer context: {}", e))?;
        let mut surface = Surface::new(&context, window)
            .map_err(|e| anyhow!("Failed to create softbuffer surface: {}", e))?;

        let (w, h) = non_zero(width, height)?;
        surface
            .resize(w, h)
            .map_err(|e| anyhow!("Failed to resize surface: {}", e))?;

        Ok(Self {
            _context: context,
            surface,
            width,
            height,
        })
    }

    /// Clear to fully transparent and draw the mascot at `pose`
    pub fn draw(&mut self, sprite: &Sprite, pose: Pose) -> Result<()> {
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow!("Failed to get buffer: {}", e))?;

        buffer.fill(0);
        sprite.blit(&mut buffer, self.width, self.height, pose.x, pose.y, pose.facing_left);

        buffer
            .present()
            .map_err(|e| anyhow!("Failed to present buffer: {}", e))?;

        Ok(())
    }
}

fn non_zero(width: u32, height: u32) -> Result<(NonZeroU32, NonZeroU32)> {
    let w = NonZeroU32::new(width).ok_or_else(|| anyhow!("Overlay width must be non-zero"))?;
    let h = NonZeroU32::new(height).ok_or_else(|| anyhow!("Overlay height must be non-zero"))?;
    Ok((w, h))
}
