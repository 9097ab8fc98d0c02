//! Wii Classic to MU radio modem transmitter for RP2040.
//!
//! Samples a Wii Classic Controller and an emergency stop button, and sends
//! the controller state over an MU series radio modem every send period.
//!
//! # Hardware Configuration
//!
//! | Function       | GPIO | Description |
//! |----------------|------|-------------|
//! | UART1 TX       | 8    | Modem RXD (19200 baud, 8N1) |
//! | UART1 RX       | 9    | Modem TXD |
//! | I2C0 SDA       | 4    | Wii Classic data |
//! | I2C0 SCL       | 5    | Wii Classic clock |
//! | Emergency stop | 15   | Normally closed switch to ground, internal pull-up |
//! | LED            | 25   | On-board LED (lit while the stop is engaged) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with three concurrent tasks:
//!
//! - **Input Task**: debounces the emergency button and polls the controller
//!   every 15 ms
//! - **Send Task**: every 20 ms sends the latest snapshot, or the emergency
//!   stop payload while the switch is open
//! - **Modem Task**: parses responses coming back from the modem
//!
//! Snapshots travel from the input task to the send task through an Embassy
//! [`Signal`](embassy_sync::signal::Signal), so a snapshot that is overwritten
//! before it was sent is dropped.
//!
//! # Modules
//!
//! - [`wii`]: async I2C driver ([`WiiClassic`])
//! - [`modem`]: UART sinks for the framer ([`ModemTx`], [`ModemEvents`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

// Re-export core types for convenience
pub use controller_core::{
    ButtonConfig, ButtonManager, ControllerData, Index, LinkError, ReportOutcome, Transmitter,
    TransmitterConfig,
};
pub use mu_proto::{FramerConfig, ModemConfig, MuFramer};

pub mod modem;
pub mod wii;

pub use modem::{ModemEvents, ModemTx};
pub use wii::{WiiClassic, WiiError};
