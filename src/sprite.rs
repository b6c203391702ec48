//! Mascot sprite pixels
//!
//! Pixels are kept as premultiplied `ARGB`. softbuffer presents the low
//! 24 bits; on Windows the overlay's DWM frame also picks up the alpha
//! byte, which is what makes the background see-through. The straight
//! alpha channel is stored alongside for blending and the hit mask.

use std::path::Path;

use crate::error::SpriteError;

/// Alpha at or above this counts as "the mascot is here" for hit-testing
pub const DEFAULT_HIT_THRESHOLD: u8 = 16;

#[derive(Debug, Clone)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    alpha: Vec<u8>,
}

impl Sprite {
    /// Load a PNG (or any format the image crate was built with)
    pub fn load(path: &Path) -> Result<Self, SpriteError> {
        let img = image::open(path)?;
        let rgba = img.to_rgba8();
        Self::from_rgba(rgba.width(), rgba.height(), rgba.as_raw())
    }

    /// Build from straight (non-premultiplied) RGBA bytes
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, SpriteError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SpriteError::Dimensions {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        let mut pixels = Vec::with_capacity(expected / 4);
        let mut alpha = Vec::with_capacity(expected / 4);
        for px in rgba.chunks_exact(4) {
            let a = px[3] as u32;
            // Premultiply alpha for proper blending
            let r = px[0] as u32 * a / 255;
            let g = px[1] as u32 * a / 255;
            let b = px[2] as u32 * a / 255;
            pixels.push((a << 24) | (r << 16) | (g << 8) | b);
            alpha.push(px[3]);
        }

        Ok(Self {
            width,
            height,
            pixels,
            alpha,
        })
    }

    /// Opaque green square, used when the sprite asset is missing
    pub fn placeholder(size: u32) -> Self {
        let count = size as usize * size as usize;
        Self {
            width: size,
            height: size,
            pixels: vec![0xFF00_AA00; count],
            alpha: vec![0xFF; count],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mask(&self, threshold: u8) -> AlphaMask {
        AlphaMask {
            width: self.width,
            height: self.height,
            opaque: self.alpha.iter().map(|a| *a >= threshold).collect(),
        }
    }

    /// Draw onto a premultiplied `ARGB` target with its top-left corner at (x, y),
    /// clipped to the target and blended source-over.
    pub fn blit(
        &self,
        target: &mut [u32],
        target_width: u32,
        target_height: u32,
        x: i32,
        y: i32,
        flip_x: bool,
    ) {
        let tw = target_width as i64;
        let th = target_height as i64;
        if target.len() < (tw * th) as usize {
            return;
        }

        for sy in 0..self.height as i64 {
            let ty = y as i64 + sy;
            if ty < 0 || ty >= th {
                continue;
            }
            for sx in 0..self.width as i64 {
                let tx = x as i64 + sx;
                if tx < 0 || tx >= tw {
                    continue;
                }

                let src_x = if flip_x {
                    self.width as i64 - 1 - sx
                } else {
                    sx
                };
                let src_idx = (sy * self.width as i64 + src_x) as usize;
                let a = self.alpha[src_idx] as u32;
                if a == 0 {
                    continue;
                }

                let dst = &mut target[(ty * tw + tx) as usize];
                *dst = if a == 255 {
                    self.pixels[src_idx]
                } else {
                    blend_over(self.pixels[src_idx], *dst, a)
                };
            }
        }
    }
}

/// src (premultiplied) over dst
fn blend_over(src: u32, dst: u32, alpha: u32) -> u32 {
    let inv = 255 - alpha;
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        (s + d * inv / 255).min(255) << shift
    };
    channel(24) | channel(16) | channel(8) | channel(0)
}

/// Per-pixel "is the sprite solid here" map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    opaque: Vec<bool>,
}

impl AlphaMask {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Out-of-range coordinates are never opaque
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        self.opaque[(y as u32 * self.width + x as u32) as usize]
    }
}
