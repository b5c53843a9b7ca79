//! Wi-Fi radio abstraction.

/// Station-mode link to the configured access point.
///
/// Credentials are applied when the implementation is constructed; `connect`
/// performs one association attempt including address acquisition.
#[allow(async_fn_in_trait)]
pub trait WifiLink {
    type Error: core::fmt::Debug;

    async fn connect(&mut self) -> Result<(), Self::Error>;
    fn is_connected(&self) -> bool;

    /// Only meaningful after a successful `connect`.
    fn ip_address(&self) -> [u8; 4];
    fn mac_address(&self) -> [u8; 6];
}
