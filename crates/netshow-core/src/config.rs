//! Network credentials and connect timing.

use core::fmt;

/// Wi-Fi credentials baked into the image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NetworkCredentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl NetworkCredentials {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }

    /// Builds credentials from optional build-time values.
    ///
    /// An empty password is accepted for open networks; an empty SSID is not.
    pub fn from_options(
        ssid: Option<&'static str>,
        password: Option<&'static str>,
    ) -> Result<Self, ConfigError> {
        let ssid = match ssid {
            Some(ssid) if !ssid.trim().is_empty() => ssid,
            _ => return Err(ConfigError::MissingSsid),
        };
        let password = password.ok_or(ConfigError::MissingPassword)?;

        Ok(Self::new(ssid, password))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    MissingSsid,
    MissingPassword,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSsid => {
                f.write_str("Wi-Fi SSID is missing; set NETSHOW_WIFI_SSID before building")
            }
            Self::MissingPassword => f.write_str(
                "Wi-Fi password is missing; set NETSHOW_WIFI_PASSWORD (empty for open networks)",
            ),
        }
    }
}

/// Fixed-backoff connect policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay_ms: u32,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, retry_delay_ms: u32) -> Self {
        Self {
            max_attempts,
            retry_delay_ms,
        }
    }

    /// Total wait spent when every attempt fails.
    pub const fn worst_case_delay_ms(self) -> u64 {
        self.max_attempts as u64 * self.retry_delay_ms as u64
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, 2_000)
    }
}
