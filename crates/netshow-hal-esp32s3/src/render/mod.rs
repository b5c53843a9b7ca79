pub mod status;

use netshow_core::screen::StatusScreen;

use crate::platform::framebuffer::FrameBuffer;

pub trait FrameRenderer {
    fn render(&mut self, screen: &StatusScreen, frame: &mut FrameBuffer);
}
