//! Controller state, packet codec and debouncing for the radio transmitter.
//!
//! This crate holds everything between the input hardware and the modem
//! framer that does not depend on a particular board. It runs in `no_std`
//! firmware and on the host for testing.
//!
//! # Overview
//!
//! - [`packet`]: fixed-capacity little-endian field codec ([`Packet`], [`Packetizer`])
//! - [`types`]: the bit-packed controller snapshot ([`ControllerData`], [`Index`])
//! - [`manager`]: edges and stick normalisation ([`ControllerManager`])
//! - [`debounce`]: debounced buttons with latched edges ([`ButtonManager`])
//! - [`wii_classic`]: Wii Classic Controller report decoding
//! - [`handoff`]: latest-value register used between tasks ([`Latest`])
//! - [`link`]: payload composition and the send loop ([`Transmitter`])
//! - [`config`]: transmitter tunables ([`TransmitterConfig`])
//!
//! # Data flow
//!
//! ```text
//! pins -> ButtonManager ----------------------------+
//!                                                   v
//! I2C report -> map_report -> ControllerData -> Transmitter::tick -> MuFramer -> modem
//! ```
//!
//! # Controller payload
//!
//! ```text
//! [mask lo] [mask hi] [LY|LX] [RY|RX] [TR|TL]
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: defmt formatting and logging (for embedded targets)
//! - **`log`**: Log through the `log` facade
//! - **`embedded-io`**: Forwarded to `mu-proto`

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod config;
pub mod debounce;
pub mod handoff;
pub mod link;
pub mod manager;
pub mod packet;
pub mod types;
pub mod wii_classic;

// Re-export main types at crate root
pub use config::{ButtonConfig, TransmitterConfig, EMERGENCY_DEBOUNCE_MS};
pub use debounce::{ButtonError, ButtonManager, MAX_BUTTONS};
pub use handoff::Latest;
pub use link::{
    compose_payload, decode_payload, LinkError, LinkMessage, Transmitter,
    EMERGENCY_STOP_PAYLOAD,
};
pub use manager::{ControllerManager, StickVector, DEFAULT_TRIGGER_THRESHOLD};
pub use packet::{Field, Packet, PacketError, Packetizer, PACKET_CAPACITY};
pub use types::{ControllerData, Index};
pub use wii_classic::{map_report, ReportError, ReportOutcome, ReportTracker};
