pub mod display;
pub mod framebuffer;
pub mod screen;
