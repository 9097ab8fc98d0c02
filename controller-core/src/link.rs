//! Radio link between transmitter and receiver.
//!
//! Every send period the transmitter emits one payload through the modem:
//! either the 5-byte [`ControllerData`] wire form, or the single byte
//! [`EMERGENCY_STOP_PAYLOAD`] while the emergency stop is engaged. The link is
//! fire-and-forget; a lost payload is superseded by the next one.

use mu_proto::{EncodeError, MuFramer, MuSink};

use crate::config::TransmitterConfig;
use crate::handoff::Latest;
use crate::manager::ControllerManager;
use crate::packet::{Packet, PacketError};
use crate::types::ControllerData;

/// Payload sent instead of controller data while the emergency stop is
/// engaged.
pub const EMERGENCY_STOP_PAYLOAD: &[u8] = b"E";

/// Packet id used for controller payloads.
pub const CONTROLLER_PACKET_ID: u16 = 0;

/// Error type for the transmit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The framer refused the payload.
    Encode(EncodeError),
    /// The payload did not fit a packet.
    Packet(PacketError),
}

impl From<EncodeError> for LinkError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<PacketError> for LinkError {
    fn from(e: PacketError) -> Self {
        Self::Packet(e)
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode error: {}", e),
            Self::Packet(e) => write!(f, "packet error: {}", e),
        }
    }
}

/// A decoded link payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMessage {
    EmergencyStop,
    Controller(ControllerData),
}

/// Build the payload for one send period.
pub fn compose_payload(data: &ControllerData, emergency: bool) -> Result<Packet, PacketError> {
    if emergency {
        Packet::from_bytes(CONTROLLER_PACKET_ID, EMERGENCY_STOP_PAYLOAD)
    } else {
        data.to_packet(CONTROLLER_PACKET_ID)
    }
}

/// Interpret a payload received from the modem.
///
/// Returns `None` for payloads of any other shape.
pub fn decode_payload(payload: &[u8]) -> Option<LinkMessage> {
    if payload == EMERGENCY_STOP_PAYLOAD {
        return Some(LinkMessage::EmergencyStop);
    }
    let bytes: &[u8; ControllerData::WIRE_SIZE] = payload.try_into().ok()?;
    Some(LinkMessage::Controller(ControllerData::from_bytes(bytes)))
}

/// Transmit side of the link.
///
/// Controller snapshots are [`offer`](Self::offer)ed as they are sampled and
/// only the newest one is sent on the next [`tick`](Self::tick). Without a
/// fresh snapshot the last one is repeated. Each tick advances the
/// [`ControllerManager`], so its edges span one send period.
pub struct Transmitter<S> {
    framer: MuFramer<S>,
    pending: Latest<ControllerData>,
    manager: ControllerManager,
    config: TransmitterConfig,
}

impl<S: MuSink> Transmitter<S> {
    /// Create a transmitter writing to `sink`.
    pub fn new(sink: S, config: TransmitterConfig) -> Self {
        let mut manager = ControllerManager::new(config.trigger_threshold);
        manager.clear();
        Self {
            framer: MuFramer::new(sink, config.framer),
            pending: Latest::new(),
            manager,
            config,
        }
    }

    /// Push the modem settings.
    pub fn configure(&mut self) {
        self.framer.configure(&self.config.modem);
    }

    /// Hand over a freshly sampled snapshot, replacing any unsent one.
    pub fn offer(&mut self, data: ControllerData) {
        self.pending.publish(data);
    }

    /// Send one payload.
    ///
    /// `emergency` selects the emergency stop payload over controller data.
    pub fn tick(&mut self, emergency: bool) -> Result<(), LinkError> {
        let data = self.pending.take().unwrap_or(*self.manager.current());
        self.manager.update(data);
        let packet = compose_payload(self.manager.current(), emergency)?;
        self.framer.send(packet.as_bytes())?;
        Ok(())
    }

    /// Feed bytes received from the modem.
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.framer.push_bytes(data);
    }

    /// Snapshot sent by the last tick.
    pub fn last_sent(&self) -> &ControllerData {
        self.manager.current()
    }

    /// Edge state over the snapshots taken by successive ticks.
    pub fn manager(&self) -> &ControllerManager {
        &self.manager
    }

    /// Get the transmitter configuration.
    pub fn config(&self) -> &TransmitterConfig {
        &self.config
    }

    /// Get a reference to the framer.
    pub fn framer(&self) -> &MuFramer<S> {
        &self.framer
    }

    /// Get a mutable reference to the framer.
    pub fn framer_mut(&mut self) -> &mut MuFramer<S> {
        &mut self.framer
    }

    /// Decompose the transmitter, returning its sink.
    pub fn into_sink(self) -> S {
        self.framer.into_sink()
    }
}
