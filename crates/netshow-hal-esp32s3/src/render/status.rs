//! Draws the status screen with a fixed mono font.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use netshow_core::screen::{Color, StatusScreen};

use super::FrameRenderer;
use crate::platform::framebuffer::FrameBuffer;

const LUMA_THRESHOLD: u8 = 128;

/// Dark colors become set pixels on the mono panel.
pub fn to_binary(color: Color) -> BinaryColor {
    if color.luma() < LUMA_THRESHOLD {
        BinaryColor::On
    } else {
        BinaryColor::Off
    }
}

pub struct StatusRenderer {
    font: &'static MonoFont<'static>,
}

impl Default for StatusRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRenderer {
    pub const fn new() -> Self {
        Self { font: &FONT_10X20 }
    }
}

impl FrameRenderer for StatusRenderer {
    fn render(&mut self, screen: &StatusScreen, frame: &mut FrameBuffer) {
        let _ = frame.clear(to_binary(screen.background()));

        for field in screen.fields() {
            let style = MonoTextStyle::new(self.font, to_binary(field.color));
            let _ = Text::with_baseline(
                field.text(),
                Point::new(field.x, field.y),
                style,
                Baseline::Top,
            )
            .draw(frame);
        }
    }
}
