use std::{
    future::{Future, pending},
    pin::pin,
    task::{Context, Waker},
    vec::Vec,
};

use embassy_futures::block_on;

use super::*;
use crate::{
    connect::tests::{RecordingDelay, ScriptedLink},
    screen::{PLACEHOLDER_MAC, PLACEHOLDER_SSID, PLACEHOLDER_STATUS},
};

#[derive(Default)]
struct RecordingSink {
    presented: Vec<Vec<(FieldRole, std::string::String)>>,
    fail: bool,
}

impl ScreenSink for RecordingSink {
    type Error = &'static str;

    fn present(&mut self, screen: &StatusScreen) -> Result<(), Self::Error> {
        if self.fail {
            return Err("spi bus stalled");
        }
        self.presented.push(
            screen
                .fields()
                .iter()
                .map(|field| (field.role, field.text().to_owned()))
                .collect(),
        );
        Ok(())
    }
}

fn booted(policy: RetryPolicy) -> (Bootstrap, RecordingSink) {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some("hunter22"), policy).unwrap();
    let mut sink = RecordingSink::default();
    boot.prepare_display(&mut sink).unwrap();
    boot.wifi_configured().unwrap();
    (boot, sink)
}

#[test]
fn display_ready_shows_placeholders() {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some("hunter22"), RetryPolicy::default())
        .unwrap();
    let mut sink = RecordingSink::default();

    boot.prepare_display(&mut sink).unwrap();

    assert_eq!(boot.phase(), BootPhase::DisplayReady);
    assert_eq!(sink.presented.len(), 1);
    assert_eq!(
        sink.presented[0],
        vec![
            (FieldRole::Ip, PLACEHOLDER_STATUS.to_owned()),
            (FieldRole::Ssid, PLACEHOLDER_SSID.to_owned()),
            (FieldRole::Mac, PLACEHOLDER_MAC.to_owned()),
        ]
    );
}

#[test]
fn first_attempt_success_renders_network_identity() {
    let (mut boot, mut sink) = booted(RetryPolicy::default());
    let mut link = ScriptedLink::new(Some(1));
    let mut delay = RecordingDelay::default();

    let phase = block_on(boot.run(&mut link, &mut sink, &mut delay)).unwrap();

    assert_eq!(phase, BootPhase::Rendered);
    assert_eq!(delay.calls, 0);

    let screen = boot.screen().unwrap();
    assert_eq!(screen.text(FieldRole::Ip), Some("IP: 10.0.0.5"));
    assert_eq!(screen.text(FieldRole::Ssid), Some("SSID: HomeNet"));
    assert_eq!(screen.text(FieldRole::Mac), Some("MAC: 00:1B:63:84:45:E6"));
    assert_eq!(sink.presented.len(), 2);
}

#[test]
fn exhausted_retries_show_error_and_keep_placeholders() {
    let (mut boot, mut sink) = booted(RetryPolicy::default());
    let mut link = ScriptedLink::new(None);
    let mut delay = RecordingDelay::default();

    let phase = block_on(boot.run(&mut link, &mut sink, &mut delay)).unwrap();

    assert_eq!(phase, BootPhase::ErrorDisplayed);
    assert_eq!(link.calls, 10);
    assert_eq!(delay.calls, 10);

    let screen = boot.screen().unwrap();
    assert_eq!(screen.text(FieldRole::Ip), Some(WIFI_ERROR_TEXT));
    assert_eq!(screen.text(FieldRole::Ssid), Some(PLACEHOLDER_SSID));
    assert_eq!(screen.text(FieldRole::Mac), Some(PLACEHOLDER_MAC));
}

#[test]
fn missing_credentials_fail_before_any_screen() {
    let result = Bootstrap::init(None, Some("hunter22"), RetryPolicy::default());

    assert_eq!(result.err(), Some(ConfigError::MissingSsid));
}

#[test]
fn joined_but_disconnected_link_counts_as_failure() {
    struct FlakyLink(ScriptedLink);

    impl WifiLink for FlakyLink {
        type Error = <ScriptedLink as WifiLink>::Error;

        async fn connect(&mut self) -> Result<(), Self::Error> {
            self.0.connect().await
        }

        fn is_connected(&self) -> bool {
            false
        }

        fn ip_address(&self) -> [u8; 4] {
            self.0.ip_address()
        }

        fn mac_address(&self) -> [u8; 6] {
            self.0.mac_address()
        }
    }

    let (mut boot, _sink) = booted(RetryPolicy::default());
    let mut link = FlakyLink(ScriptedLink::new(Some(1)));
    let mut delay = RecordingDelay::default();

    let result = block_on(boot.connect(&mut link, &mut delay)).unwrap();

    assert_eq!(result, ConnectionResult::Failed);
    assert_eq!(boot.phase(), BootPhase::ConnectFailed);
}

#[test]
fn display_faults_do_not_stop_the_sequence() {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some(""), RetryPolicy::default()).unwrap();
    let mut sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    boot.prepare_display(&mut sink).unwrap();
    boot.wifi_configured().unwrap();

    let mut link = ScriptedLink::new(Some(2));
    let mut delay = RecordingDelay::default();
    let phase = block_on(boot.run(&mut link, &mut sink, &mut delay)).unwrap();

    assert_eq!(phase, BootPhase::Rendered);
    assert!(sink.presented.is_empty());
    assert_eq!(
        boot.screen().unwrap().text(FieldRole::Ip),
        Some("IP: 10.0.0.5")
    );
}

#[test]
fn connecting_before_wifi_is_configured_is_rejected() {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some("hunter22"), RetryPolicy::default())
        .unwrap();
    let mut sink = RecordingSink::default();
    boot.prepare_display(&mut sink).unwrap();

    let mut link = ScriptedLink::new(Some(1));
    let mut delay = RecordingDelay::default();
    let result = block_on(boot.connect(&mut link, &mut delay));

    assert_eq!(
        result,
        Err(BootError::InvalidTransition {
            from: BootPhase::DisplayReady,
            to: BootPhase::Connecting,
        })
    );
    assert_eq!(link.calls, 0);
}

#[test]
fn missing_radio_shows_error_without_connecting() {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some("hunter22"), RetryPolicy::default())
        .unwrap();
    let mut sink = RecordingSink::default();
    boot.prepare_display(&mut sink).unwrap();

    let result = boot.radio_unavailable().unwrap();
    boot.render(result, &mut sink).unwrap();

    assert_eq!(boot.phase(), BootPhase::ErrorDisplayed);
    assert_eq!(sink.presented[1][0].1, WIFI_ERROR_TEXT);
    assert_eq!(sink.presented[1][1].1, PLACEHOLDER_SSID);
}

#[test]
fn rendering_twice_is_rejected() {
    let (mut boot, mut sink) = booted(RetryPolicy::new(1, 0));
    let mut link = ScriptedLink::new(Some(1));
    let mut delay = RecordingDelay::default();
    let result = block_on(boot.connect(&mut link, &mut delay)).unwrap();
    boot.render(result, &mut sink).unwrap();

    assert!(matches!(
        boot.render(ConnectionResult::Failed, &mut sink),
        Err(BootError::InvalidTransition { .. })
    ));
}

#[test]
fn phase_graph_has_no_cycles_back_to_init() {
    use BootPhase::*;

    let all = [
        Init,
        DisplayReady,
        WifiConfigured,
        Connecting,
        Connected,
        ConnectFailed,
        Rendered,
        ErrorDisplayed,
        Idle,
    ];

    for phase in all {
        assert!(!phase.can_advance_to(Init));
        assert!(!Idle.can_advance_to(phase));
    }
    assert!(Connecting.can_advance_to(Connected));
    assert!(Connecting.can_advance_to(ConnectFailed));
    assert!(!Connected.can_advance_to(ErrorDisplayed));
    assert!(!ConnectFailed.can_advance_to(Rendered));
}

/// Never completes; records each requested tick.
#[derive(Default)]
struct StalledDelay {
    ticks_ms: Vec<u32>,
}

impl DelayNs for StalledDelay {
    async fn delay_ns(&mut self, _ns: u32) {
        pending::<()>().await
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.ticks_ms.push(ms);
        pending::<()>().await
    }
}

fn poll_idle_once(boot: &mut Bootstrap, delay: &mut StalledDelay) -> bool {
    let mut idle = pin!(boot.idle(delay));
    let mut cx = Context::from_waker(Waker::noop());
    idle.as_mut().poll(&mut cx).is_pending()
}

#[test]
fn error_screen_settles_into_idle_ticks() {
    let (mut boot, mut sink) = booted(RetryPolicy::default());
    let mut link = ScriptedLink::new(None);
    let mut retry_delay = RecordingDelay::default();
    let phase = block_on(boot.run(&mut link, &mut sink, &mut retry_delay)).unwrap();
    assert_eq!(phase, BootPhase::ErrorDisplayed);

    let mut delay = StalledDelay::default();
    assert!(poll_idle_once(&mut boot, &mut delay));

    assert_eq!(boot.phase(), BootPhase::Idle);
    assert_eq!(delay.ticks_ms, vec![IDLE_TICK_MS]);
}

#[test]
fn idle_from_unfinished_boot_keeps_phase() {
    let (mut boot, _sink) = booted(RetryPolicy::default());

    let mut delay = StalledDelay::default();
    assert!(poll_idle_once(&mut boot, &mut delay));

    assert_eq!(boot.phase(), BootPhase::WifiConfigured);
    assert_eq!(delay.ticks_ms, vec![IDLE_TICK_MS]);
}

#[test]
fn render_without_prepared_screen_is_an_error() {
    let mut boot = Bootstrap::init(Some("HomeNet"), Some("hunter22"), RetryPolicy::default())
        .unwrap();
    let mut sink = RecordingSink::default();
    boot.phase = BootPhase::ConnectFailed;

    let result = boot.render(ConnectionResult::Failed, &mut sink);

    assert_eq!(result, Err(BootError::ScreenMissing));
    assert!(boot.screen().is_none());
    assert!(sink.presented.is_empty());
    assert_eq!(boot.phase(), BootPhase::ConnectFailed);
}

#[test]
fn rendering_updates_the_prepared_fields_in_place() {
    let (mut boot, mut sink) = booted(RetryPolicy::new(1, 0));
    let before = boot.screen().unwrap().revision();

    let mut link = ScriptedLink::new(Some(1));
    let mut delay = RecordingDelay::default();
    let result = block_on(boot.connect(&mut link, &mut delay)).unwrap();
    boot.render(result, &mut sink).unwrap();

    let screen = boot.screen().unwrap();
    assert_eq!(screen.fields().len(), STATUS_LAYOUT.len());
    // three text writes, no field re-creation
    assert_eq!(screen.revision(), before + 3);
}
