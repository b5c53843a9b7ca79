//! `ScreenSink` backed by the memory LCD.

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use log::info;
use netshow_core::screen::{ScreenSink, StatusScreen};

use super::{
    display::{MemoryLcd, PanelError},
    framebuffer::FrameBuffer,
};
use crate::render::FrameRenderer;

/// Renders each presented screen into a frame and flushes it whole.
pub struct PanelScreen<SPI, DISP, EMD, CS, D, R> {
    lcd: MemoryLcd<SPI, DISP, EMD, CS>,
    delay: D,
    renderer: R,
    frame: FrameBuffer,
    last_revision: Option<u32>,
}

impl<SPI, DISP, EMD, CS, D, R> PanelScreen<SPI, DISP, EMD, CS, D, R>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin,
    CS: OutputPin,
    D: DelayNs,
    R: FrameRenderer,
{
    pub fn new(lcd: MemoryLcd<SPI, DISP, EMD, CS>, delay: D, renderer: R) -> Self {
        Self {
            lcd,
            delay,
            renderer,
            frame: FrameBuffer::new(),
            last_revision: None,
        }
    }

    /// Powers the panel and clears its memory.
    pub fn bring_up(
        &mut self,
    ) -> Result<(), PanelError<SPI::Error, DISP::Error, EMD::Error, CS::Error>> {
        self.lcd.initialize(&mut self.delay)?;
        self.lcd.clear_all(&mut self.delay)
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

impl<SPI, DISP, EMD, CS, D, R> ScreenSink for PanelScreen<SPI, DISP, EMD, CS, D, R>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin,
    CS: OutputPin,
    D: DelayNs,
    R: FrameRenderer,
{
    type Error = PanelError<SPI::Error, DISP::Error, EMD::Error, CS::Error>;

    fn present(&mut self, screen: &StatusScreen) -> Result<(), Self::Error> {
        if self.last_revision == Some(screen.revision()) {
            return Ok(());
        }

        self.renderer.render(screen, &mut self.frame);
        self.lcd.flush_frame(&self.frame, &mut self.delay)?;

        if self.last_revision.is_none() {
            info!("display: first frame flushed");
        }
        self.last_revision = Some(screen.revision());
        Ok(())
    }
}
