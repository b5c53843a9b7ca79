//! Linear boot sequence: credentials, status screen, connect, render, idle.

use core::fmt;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use log::{info, warn};

use crate::{
    address::{format_ipv4, format_mac, labeled},
    config::{ConfigError, NetworkCredentials, RetryPolicy},
    connect::connect_with_retry,
    link::WifiLink,
    screen::{
        Color, FIELD_TEXT_BYTES, FieldRole, STATUS_LAYOUT, ScreenError, ScreenSink, StatusScreen,
        WIFI_ERROR_TEXT,
    },
};

#[cfg(test)]
mod tests;

const IDLE_TICK_MS: u32 = 1_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootPhase {
    Init,
    DisplayReady,
    WifiConfigured,
    Connecting,
    Connected,
    ConnectFailed,
    Rendered,
    ErrorDisplayed,
    Idle,
}

impl BootPhase {
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::DisplayReady)
                | (Self::DisplayReady, Self::WifiConfigured)
                | (Self::DisplayReady, Self::ConnectFailed)
                | (Self::WifiConfigured, Self::Connecting)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::ConnectFailed)
                | (Self::Connected, Self::Rendered)
                | (Self::ConnectFailed, Self::ErrorDisplayed)
                | (Self::Rendered, Self::Idle)
                | (Self::ErrorDisplayed, Self::Idle)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DisplayReady => "display-ready",
            Self::WifiConfigured => "wifi-configured",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::ConnectFailed => "connect-failed",
            Self::Rendered => "rendered",
            Self::ErrorDisplayed => "error-displayed",
            Self::Idle => "idle",
        }
    }
}

/// Outcome of the connect phase, consumed by `render`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionResult {
    Connected { ip: [u8; 4], mac: [u8; 6] },
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootError {
    InvalidTransition { from: BootPhase, to: BootPhase },
    /// `render` reached without a prepared screen.
    ScreenMissing,
    Screen(ScreenError),
}

impl From<ScreenError> for BootError {
    fn from(err: ScreenError) -> Self {
        Self::Screen(err)
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "boot phase {} cannot move to {}", from.as_str(), to.as_str())
            }
            Self::ScreenMissing => f.write_str("status screen was never prepared"),
            Self::Screen(err) => write!(f, "status screen error: {:?}", err),
        }
    }
}

/// Owns the credentials and the status screen for the whole boot.
#[derive(Debug)]
pub struct Bootstrap {
    credentials: NetworkCredentials,
    policy: RetryPolicy,
    phase: BootPhase,
    screen: Option<StatusScreen>,
    display_fault_logged: bool,
}

impl Bootstrap {
    /// Validates credentials. Nothing is drawn until this succeeds.
    pub fn init(
        ssid: Option<&'static str>,
        password: Option<&'static str>,
        policy: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let credentials = NetworkCredentials::from_options(ssid, password)?;
        info!("boot: credentials loaded for ssid '{}'", credentials.ssid);

        Ok(Self::new(credentials, policy))
    }

    pub const fn new(credentials: NetworkCredentials, policy: RetryPolicy) -> Self {
        Self {
            credentials,
            policy,
            phase: BootPhase::Init,
            screen: None,
            display_fault_logged: false,
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    pub fn credentials(&self) -> &NetworkCredentials {
        &self.credentials
    }

    pub fn screen(&self) -> Option<&StatusScreen> {
        self.screen.as_ref()
    }

    /// Builds the background and placeholder fields and shows them.
    pub fn prepare_display<S: ScreenSink>(&mut self, sink: &mut S) -> Result<(), BootError> {
        self.check(BootPhase::DisplayReady)?;

        let screen = StatusScreen::with_layout(Color::BLACK, &STATUS_LAYOUT)?;
        present(&screen, sink, &mut self.display_fault_logged);
        self.screen = Some(screen);

        self.enter(BootPhase::DisplayReady)
    }

    /// Radio and stack handles exist; no traffic yet.
    pub fn wifi_configured(&mut self) -> Result<(), BootError> {
        self.enter(BootPhase::WifiConfigured)
    }

    /// The radio never came up; skips the connect loop.
    pub fn radio_unavailable(&mut self) -> Result<ConnectionResult, BootError> {
        self.enter(BootPhase::ConnectFailed)?;
        Ok(ConnectionResult::Failed)
    }

    /// Runs the bounded connect loop and reads back the link addresses.
    pub async fn connect<L, D>(
        &mut self,
        link: &mut L,
        delay: &mut D,
    ) -> Result<ConnectionResult, BootError>
    where
        L: WifiLink,
        D: DelayNs,
    {
        self.enter(BootPhase::Connecting)?;

        let attempts = connect_with_retry(link, &self.credentials, self.policy, delay).await;
        let result = if !attempts.joined() {
            ConnectionResult::Failed
        } else if !link.is_connected() {
            warn!("wifi: join reported success but link is down");
            ConnectionResult::Failed
        } else {
            ConnectionResult::Connected {
                ip: link.ip_address(),
                mac: link.mac_address(),
            }
        };

        match result {
            ConnectionResult::Connected { .. } => self.enter(BootPhase::Connected)?,
            ConnectionResult::Failed => self.enter(BootPhase::ConnectFailed)?,
        }

        Ok(result)
    }

    /// Writes the address lines or the error line and flushes.
    pub fn render<S: ScreenSink>(
        &mut self,
        result: ConnectionResult,
        sink: &mut S,
    ) -> Result<(), BootError> {
        let next = match result {
            ConnectionResult::Connected { .. } => BootPhase::Rendered,
            ConnectionResult::Failed => BootPhase::ErrorDisplayed,
        };
        self.check(next)?;

        let Some(screen) = self.screen.as_mut() else {
            return Err(BootError::ScreenMissing);
        };

        match result {
            ConnectionResult::Connected { ip, mac } => {
                let ip_text = format_ipv4(&ip);
                info!("wifi: connected, ip address {}", ip_text);

                let ip_line: String<FIELD_TEXT_BYTES> = labeled("IP: ", &ip_text);
                let ssid_line: String<FIELD_TEXT_BYTES> = labeled("SSID: ", self.credentials.ssid);
                let mac_line: String<FIELD_TEXT_BYTES> = labeled("MAC: ", &format_mac(&mac));
                screen.set_text(FieldRole::Ip, &ip_line)?;
                screen.set_text(FieldRole::Ssid, &ssid_line)?;
                screen.set_text(FieldRole::Mac, &mac_line)?;
            }
            ConnectionResult::Failed => {
                warn!("wifi: could not confirm connection; showing error");
                screen.set_text(FieldRole::Ip, WIFI_ERROR_TEXT)?;
            }
        }

        present(screen, sink, &mut self.display_fault_logged);

        self.enter(next)
    }

    /// `connect` then `render`; returns the phase reached.
    pub async fn run<L, S, D>(
        &mut self,
        link: &mut L,
        sink: &mut S,
        delay: &mut D,
    ) -> Result<BootPhase, BootError>
    where
        L: WifiLink,
        S: ScreenSink,
        D: DelayNs,
    {
        let result = self.connect(link, delay).await?;
        self.render(result, sink)?;
        Ok(self.phase)
    }

    /// Parks the device. A power cycle is the only way out.
    pub async fn idle<D: DelayNs>(&mut self, delay: &mut D) -> ! {
        if let Err(err) = self.enter(BootPhase::Idle) {
            warn!("boot: {}", err);
        }

        loop {
            delay.delay_ms(IDLE_TICK_MS).await;
        }
    }

    fn check(&self, next: BootPhase) -> Result<(), BootError> {
        if self.phase.can_advance_to(next) {
            Ok(())
        } else {
            Err(BootError::InvalidTransition {
                from: self.phase,
                to: next,
            })
        }
    }

    fn enter(&mut self, next: BootPhase) -> Result<(), BootError> {
        self.check(next)?;
        info!("boot: {} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
        Ok(())
    }
}

/// Display faults are logged once and never stop the boot.
fn present<S: ScreenSink>(screen: &StatusScreen, sink: &mut S, fault_logged: &mut bool) {
    if let Err(err) = sink.present(screen) {
        if !*fault_logged {
            warn!("display: present failed: {:?}", err);
            *fault_logged = true;
        }
    }
}
