use embassy_net::{HardwareAddress, Stack};
use embassy_time::{Duration, WithTimeout};
use esp_radio::wifi::{WifiController, WifiError};
use log::info;
use netshow_core::link::WifiLink;

use super::DHCP_TIMEOUT_SECS;

#[derive(Debug)]
pub(super) enum LinkError {
    Start(WifiError),
    Associate(WifiError),
    DhcpTimeout,
}

/// Station link over the on-chip radio and the embassy-net stack.
pub(super) struct EspWifiLink<'a, 'c, 's> {
    controller: &'a mut WifiController<'c>,
    stack: Stack<'s>,
}

impl<'a, 'c, 's> EspWifiLink<'a, 'c, 's> {
    pub(super) fn new(controller: &'a mut WifiController<'c>, stack: Stack<'s>) -> Self {
        Self { controller, stack }
    }

    async fn drop_association(&mut self) {
        let _ = self.controller.disconnect_async().await;
    }
}

impl WifiLink for EspWifiLink<'_, '_, '_> {
    type Error = LinkError;

    async fn connect(&mut self) -> Result<(), Self::Error> {
        if !self.controller.is_started().unwrap_or(false) {
            self.controller
                .start_async()
                .await
                .map_err(LinkError::Start)?;
        }

        if let Err(err) = self.controller.connect_async().await {
            self.drop_association().await;
            return Err(LinkError::Associate(err));
        }

        match self
            .stack
            .wait_config_up()
            .with_timeout(Duration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                info!("wifi: associated and dhcp ready");
                Ok(())
            }
            Err(_) => {
                self.drop_association().await;
                Err(LinkError::DhcpTimeout)
            }
        }
    }

    fn is_connected(&self) -> bool {
        matches!(self.controller.is_connected(), Ok(true))
            && self.stack.is_link_up()
            && self.stack.config_v4().is_some()
    }

    fn ip_address(&self) -> [u8; 4] {
        self.stack
            .config_v4()
            .map(|config| config.address.address().octets())
            .unwrap_or([0; 4])
    }

    fn mac_address(&self) -> [u8; 6] {
        #[allow(unreachable_patterns)]
        match self.stack.hardware_address() {
            HardwareAddress::Ethernet(addr) => addr.0,
            _ => [0; 6],
        }
    }
}
