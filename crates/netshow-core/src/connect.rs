//! Bounded, fixed-backoff connect loop.

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::{
    config::{NetworkCredentials, RetryPolicy},
    link::WifiLink,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectAttempts {
    /// Joined on this 1-based attempt.
    Joined { attempt: u32 },
    Exhausted { attempts: u32 },
}

impl ConnectAttempts {
    pub const fn joined(self) -> bool {
        matches!(self, Self::Joined { .. })
    }
}

/// Tries `link.connect()` up to `policy.max_attempts` times.
///
/// Every failure is followed by the same delay, including the last one.
pub async fn connect_with_retry<L, D>(
    link: &mut L,
    credentials: &NetworkCredentials,
    policy: RetryPolicy,
    delay: &mut D,
) -> ConnectAttempts
where
    L: WifiLink,
    D: DelayNs,
{
    let mut attempts = 0u32;

    while attempts < policy.max_attempts {
        let attempt = attempts + 1;
        info!(
            "wifi: connecting to '{}' (attempt {}/{})",
            credentials.ssid, attempt, policy.max_attempts
        );

        match link.connect().await {
            Ok(()) => {
                info!("wifi: connected on attempt {}", attempt);
                return ConnectAttempts::Joined { attempt };
            }
            Err(err) => {
                warn!(
                    "wifi: attempt {}/{} failed: {:?}; retrying in {}ms",
                    attempt, policy.max_attempts, err, policy.retry_delay_ms
                );
                attempts = attempt;
                delay.delay_ms(policy.retry_delay_ms).await;
            }
        }
    }

    warn!("wifi: giving up after {} attempts", attempts);
    ConnectAttempts::Exhausted { attempts }
}
