#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Delay as AsyncDelay, Timer};
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info};
use netshow_core::{bootstrap::Bootstrap, config::RetryPolicy, screen::ScreenSink};
use netshow_hal_esp32s3::{
    platform::{display::MemoryLcd, screen::PanelScreen},
    render::status::StatusRenderer,
};
use static_cell::StaticCell;

use wifi_link::EspWifiLink;

#[path = "main/wifi_link.rs"]
mod wifi_link;

const DISPLAY_SPI_HZ: u32 = 1_000_000;
const WIFI_MAX_ATTEMPTS: u32 = 10;
const WIFI_RETRY_DELAY_MS: u32 = 2_000;
const DHCP_TIMEOUT_SECS: u64 = 15;
const PARK_TICK_SECS: u64 = 1;

const WIFI_SSID: Option<&str> = option_env!("NETSHOW_WIFI_SSID");
const WIFI_PASSWORD: Option<&str> = option_env!("NETSHOW_WIFI_PASSWORD");

static NET_RESOURCES: StaticCell<embassy_net::StackResources<3>> = StaticCell::new();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    esp_println::println!("panic: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Display bus faults leave nothing to draw on.
async fn park() -> ! {
    loop {
        Timer::after_secs(PARK_TICK_SECS).await;
    }
}

/// Radio bring-up failed: show the error line and idle.
async fn radio_down<S: ScreenSink>(boot: &mut Bootstrap, panel: &mut S) -> ! {
    match boot.radio_unavailable() {
        Ok(result) => {
            if let Err(err) = boot.render(result, panel) {
                info!("boot: {}", err);
            }
        }
        Err(err) => info!("boot: {}", err),
    }
    boot.idle(&mut AsyncDelay).await
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: netshow starting");

    let policy = RetryPolicy::new(WIFI_MAX_ATTEMPTS, WIFI_RETRY_DELAY_MS);
    let mut boot = match Bootstrap::init(WIFI_SSID, WIFI_PASSWORD, policy) {
        Ok(boot) => boot,
        Err(err) => {
            esp_println::println!("config: {}", err);
            panic!("Wi-Fi credentials are missing");
        }
    };

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // CLK=GPIO13, DI=GPIO14, CS=GPIO15, DISP=GPIO2, EMD=GPIO9
    let disp = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let emd = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        // LS027B7DH01 uses CPOL=0, CPHA=1.
        .with_mode(esp_hal::spi::Mode::_1);

    let spi = match Spi::new(peripherals.SPI2, spi_config) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO13)
            .with_mosi(peripherals.GPIO14),
        Err(err) => {
            info!("display spi config failed: {:?}", err);
            park().await
        }
    };

    let mut panel = PanelScreen::new(
        MemoryLcd::new(spi, disp, emd, cs),
        Delay::new(),
        StatusRenderer::new(),
    );
    esp_println::println!("display: init begin (CLK=13 DI=14 CS=15 DISP=2 EMD=9)");
    match panel.bring_up() {
        Ok(()) => esp_println::println!("display: initialize ok"),
        Err(err) => info!("display bring-up failed: {:?}", err),
    }

    if let Err(err) = boot.prepare_display(&mut panel) {
        info!("boot: {}", err);
    }

    info!("wifi: initializing radio");
    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            radio_down(&mut boot, &mut panel).await
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                radio_down(&mut boot, &mut panel).await
            }
        };

    let credentials = *boot.credentials();
    let client_config = ClientConfig::default()
        .with_ssid(credentials.ssid.into())
        .with_password(credentials.password.into());
    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(client_config)) {
        info!("wifi mode config failed: {:?}", err);
        radio_down(&mut boot, &mut panel).await
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<3>::new()),
        0x5A17_2B34_D099_EE11,
    );

    if let Err(err) = boot.wifi_configured() {
        info!("boot: {}", err);
    }

    let net_future = net_runner.run();
    let boot_future = async {
        let mut link = EspWifiLink::new(&mut wifi_controller, stack);
        let mut delay = AsyncDelay;

        match boot.run(&mut link, &mut panel, &mut delay).await {
            Ok(phase) => info!("boot: finished in {}", phase.as_str()),
            Err(err) => info!("boot: {}", err),
        }

        boot.idle(&mut delay).await
    };

    let _ = embassy_futures::join::join(net_future, boot_future).await;
    unreachable!()
}
