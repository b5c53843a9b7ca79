//! LS027B7DH01 memory LCD over a write-only SPI bus.

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use super::framebuffer::{FrameBuffer, HEIGHT, LINE_BYTES};

const CS_SETUP_NS: u32 = 3_000;
const CS_HOLD_NS: u32 = 1_000;
const CLEAR_HOLD_NS: u32 = 220_000;
const POWER_ON_US: u32 = 60;

const CMD_WRITE: u8 = 0x80;
const CMD_CLEAR: u8 = 0x20;
const VCOM_BIT: u8 = 0x40;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PanelError<SpiErr, DispErr, EmdErr, CsErr> {
    Spi(SpiErr),
    Disp(DispErr),
    Emd(EmdErr),
    Cs(CsErr),
    LineAddress(u16),
}

pub type PanelResult<SpiErr, DispErr, EmdErr, CsErr> =
    Result<(), PanelError<SpiErr, DispErr, EmdErr, CsErr>>;

/// Gate address byte for a 1-based line; the panel expects it LSB first.
pub fn encode_line_address(line: u16) -> Option<u8> {
    if !(1..=HEIGHT as u16).contains(&line) {
        return None;
    }
    Some((line as u8).reverse_bits())
}

/// Serial-mode driver. CS is active high on this panel.
#[derive(Debug)]
pub struct MemoryLcd<SPI, DISP, EMD, CS> {
    spi: SPI,
    disp: DISP,
    emd: EMD,
    cs: CS,
    vcom_high: bool,
}

impl<SPI, DISP, EMD, CS> MemoryLcd<SPI, DISP, EMD, CS>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin,
    CS: OutputPin,
{
    pub fn new(spi: SPI, disp: DISP, emd: EMD, cs: CS) -> Self {
        Self {
            spi,
            disp,
            emd,
            cs,
            vcom_high: false,
        }
    }

    /// Enables output with VCOM driven in software (EMD low).
    pub fn initialize<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> PanelResult<SPI::Error, DISP::Error, EMD::Error, CS::Error> {
        self.disp.set_high().map_err(PanelError::Disp)?;
        self.emd.set_low().map_err(PanelError::Emd)?;
        self.cs.set_low().map_err(PanelError::Cs)?;
        delay.delay_us(POWER_ON_US);
        Ok(())
    }

    pub fn clear_all<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> PanelResult<SPI::Error, DISP::Error, EMD::Error, CS::Error> {
        let command = CMD_CLEAR | self.next_vcom();

        self.cs.set_high().map_err(PanelError::Cs)?;
        delay.delay_ns(CS_SETUP_NS);
        self.spi
            .write(&[command, 0x00, 0x00])
            .map_err(PanelError::Spi)?;
        self.spi.flush().map_err(PanelError::Spi)?;
        delay.delay_ns(CLEAR_HOLD_NS);
        self.cs.set_low().map_err(PanelError::Cs)?;
        Ok(())
    }

    /// Sends every line inside one CS-high window.
    pub fn flush_frame<D: DelayNs>(
        &mut self,
        frame: &FrameBuffer,
        delay: &mut D,
    ) -> PanelResult<SPI::Error, DISP::Error, EMD::Error, CS::Error> {
        let command = CMD_WRITE | self.next_vcom();

        self.cs.set_high().map_err(PanelError::Cs)?;
        delay.delay_ns(CS_SETUP_NS);
        self.spi.write(&[command]).map_err(PanelError::Spi)?;

        // [address][payload][dummy]
        let mut packet = [0u8; LINE_BYTES + 2];
        for y in 0..HEIGHT {
            let line = y as u16 + 1;
            packet[0] = encode_line_address(line).ok_or(PanelError::LineAddress(line))?;
            if let Some(row) = frame.row(y) {
                packet[1..=LINE_BYTES].copy_from_slice(row);
            }
            self.spi.write(&packet).map_err(PanelError::Spi)?;
        }

        self.spi.write(&[0x00]).map_err(PanelError::Spi)?;
        self.spi.flush().map_err(PanelError::Spi)?;
        delay.delay_ns(CS_HOLD_NS);
        self.cs.set_low().map_err(PanelError::Cs)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &SPI {
        &self.spi
    }

    fn next_vcom(&mut self) -> u8 {
        self.vcom_high = !self.vcom_high;
        if self.vcom_high { VCOM_BIT } else { 0x00 }
    }
}
