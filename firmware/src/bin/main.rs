#![no_std]
#![no_main]

use controller_core::{
    ButtonConfig, ButtonManager, ControllerData, ReportOutcome, Transmitter, TransmitterConfig,
};
use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Async, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, UART1};
use embassy_rp::uart::{Async as UartAsync, Config as UartConfig, Uart, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use mu_proto::{FramerConfig, MuFramer};
use mu_transmitter::{ModemEvents, ModemTx, WiiClassic};
use portable_atomic::{AtomicBool, Ordering};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
});

/// Modem baud rate.
const MODEM_BAUDRATE: u32 = 19_200;

/// Registration index of the emergency stop switch.
const EMERGENCY_BUTTON: usize = 0;

/// Latest controller snapshot, input task to send task.
static SNAPSHOT_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, ControllerData>> =
    StaticCell::new();

/// Emergency stop engaged. Starts engaged until the switch has been sampled.
static EMERGENCY: AtomicBool = AtomicBool::new(true);

type WiiBus = I2c<'static, I2C0, Async>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MU transmitter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let config = TransmitterConfig::DEFAULT;

    let signal = SNAPSHOT_SIGNAL.init(Signal::new());

    // --- Modem UART ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = MODEM_BAUDRATE;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- Wii Classic ---
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, I2cConfig::default());
    let mut wii = WiiClassic::new(i2c);
    if let Err(e) = wii.init().await {
        error!("Wii Classic init failed: {:?}", e);
    }

    // --- Emergency stop ---
    let mut buttons = ButtonManager::new();
    let stop_switch = Input::new(p.PIN_15, Pull::Up);
    if let Err(e) = buttons.add_with_config(stop_switch, ButtonConfig::DEFAULT) {
        error!("button setup failed: {}", e);
    }

    // On-board LED mirrors the emergency stop
    let led = Output::new(p.PIN_25, Level::High);

    let mut transmitter = Transmitter::new(ModemTx::new(tx), config);
    transmitter.configure();
    info!("modem configured: {:?}", config.modem);

    spawner.spawn(input_task(wii, buttons, signal, config.poll_interval_ms)).unwrap();
    spawner.spawn(send_task(transmitter, signal, led)).unwrap();
    spawner.spawn(modem_task(rx, config.framer)).unwrap();

    info!("MU transmitter initialized");
}

/// Input task - debounces the emergency stop and polls the controller.
#[embassy_executor::task]
async fn input_task(
    mut wii: WiiClassic<WiiBus>,
    mut buttons: ButtonManager<Input<'static>>,
    signal: &'static Signal<CriticalSectionRawMutex, ControllerData>,
    poll_interval_ms: u32,
) {
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(poll_interval_ms)));
    loop {
        ticker.next().await;

        // Wraps after ~49 days, the debouncer uses wrapping arithmetic
        buttons.update(Instant::now().as_millis() as u32);
        if buttons.is_pressed(EMERGENCY_BUTTON) {
            info!("emergency stop released");
        }
        if buttons.is_released(EMERGENCY_BUTTON) {
            info!("emergency stop engaged");
        }
        EMERGENCY.store(!buttons.is_hold(EMERGENCY_BUTTON), Ordering::Relaxed);
        buttons.release();

        let was_connected = wii.is_connected();
        match wii.poll().await {
            ReportOutcome::Data(data) => {
                if !was_connected {
                    info!("controller connected");
                }
                signal.signal(data);
            }
            ReportOutcome::Reconnect => {
                error!("controller lost");
                // Neutral until the controller is back
                signal.signal(ControllerData::NEUTRAL);
            }
            ReportOutcome::Skip => {}
        }
    }
}

/// Send task - hands snapshots to the transmitter and sends every period.
#[embassy_executor::task]
async fn send_task(
    mut transmitter: Transmitter<ModemTx<'static>>,
    signal: &'static Signal<CriticalSectionRawMutex, ControllerData>,
    mut led: Output<'static>,
) {
    let period = Duration::from_millis(u64::from(transmitter.config().send_interval_ms));
    let mut ticker = Ticker::every(period);
    loop {
        match select(ticker.next(), signal.wait()).await {
            Either::First(()) => {
                let emergency = EMERGENCY.load(Ordering::Relaxed);
                led.set_level(if emergency { Level::High } else { Level::Low });
                if let Err(e) = transmitter.tick(emergency) {
                    error!("send failed: {:?}", e);
                }
            }
            Either::Second(data) => transmitter.offer(data),
        }
    }
}

/// Modem task - parses responses from the modem.
#[embassy_executor::task]
async fn modem_task(mut rx: UartRx<'static, UartAsync>, config: FramerConfig) {
    let mut framer = MuFramer::new(ModemEvents::default(), config);
    let mut byte_buf = [0u8; 1];
    loop {
        match rx.read(&mut byte_buf).await {
            Ok(()) => {
                let collisions = framer.sink().collisions();
                framer.push_byte(byte_buf[0]);
                if framer.sink().collisions() != collisions {
                    warn!("transmit collision ({} total)", framer.sink().collisions());
                }
            }
            Err(e) => {
                error!("modem read error: {:?}", e);
                // Resynchronise on the next frame head
                framer.reset();
            }
        }
    }
}
