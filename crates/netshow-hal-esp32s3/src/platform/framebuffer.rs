//! 1bpp frame memory for the 400x240 panel.

use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};

pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 240;
pub const LINE_BYTES: usize = WIDTH / 8;
pub const BUFFER_SIZE: usize = LINE_BYTES * HEIGHT;

/// A set bit is a dark pixel. Bit 7 of each byte is the leftmost pixel.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// All pixels light.
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; BUFFER_SIZE],
        }
    }

    pub fn fill(&mut self, dark: bool) {
        self.bytes.fill(if dark { 0xFF } else { 0x00 });
    }

    /// Returns `false` when the point is off-panel.
    pub fn set_pixel(&mut self, x: usize, y: usize, dark: bool) -> bool {
        let Some((index, mask)) = locate(x, y) else {
            return false;
        };

        if dark {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
        true
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        let (index, mask) = locate(x, y)?;
        Some(self.bytes[index] & mask != 0)
    }

    /// Row payload for a 0-based row index.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= HEIGHT {
            return None;
        }
        let start = y * LINE_BYTES;
        Some(&self.bytes[start..start + LINE_BYTES])
    }

    #[cfg(test)]
    pub(crate) fn count_dark(&self) -> usize {
        self.bytes
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }
}

fn locate(x: usize, y: usize) -> Option<(usize, u8)> {
    if x >= WIDTH || y >= HEIGHT {
        return None;
    }
    Some((y * LINE_BYTES + x / 8, 0x80 >> (x % 8)))
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as usize, point.y as usize, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
