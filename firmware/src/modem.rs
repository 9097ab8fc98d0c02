//! UART plumbing between the framer and the modem.

use controller_core::link::decode_payload;
use defmt::{info, warn};
use embassy_rp::uart::{Async, UartTx};
use mu_proto::{FrameError, MuSink};

/// Outbound sink: writes every send request to the modem UART.
pub struct ModemTx<'d> {
    tx: UartTx<'d, Async>,
    write_failures: u32,
}

impl<'d> ModemTx<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self {
            tx,
            write_failures: 0,
        }
    }
}

impl MuSink for ModemTx<'_> {
    fn send_request(&mut self, bytes: &[u8]) {
        if self.tx.blocking_write(bytes).is_err() {
            self.write_failures = self.write_failures.wrapping_add(1);
            warn!("modem write failed ({} total)", self.write_failures);
        }
    }

    // The transmit framer is never fed inbound bytes
    fn payload_received(&mut self, _payload: &[u8]) {}

    fn frame_error(&mut self, _error: FrameError) {}
}

/// Inbound sink: tracks what the modem reports back.
#[derive(Default)]
pub struct ModemEvents {
    collisions: u32,
}

impl ModemEvents {
    /// Transmit collisions reported by the modem.
    pub fn collisions(&self) -> u32 {
        self.collisions
    }
}

impl MuSink for ModemEvents {
    fn send_request(&mut self, _bytes: &[u8]) {}

    fn payload_received(&mut self, payload: &[u8]) {
        match decode_payload(payload) {
            Some(message) => info!("received {:?}", message),
            None => warn!("unknown payload: {=[u8]:x}", payload),
        }
    }

    fn frame_error(&mut self, error: FrameError) {
        match error {
            FrameError::CollisionDetected => self.collisions = self.collisions.wrapping_add(1),
            _ => warn!("modem frame error {}: {:?}", error.code(), error),
        }
    }
}
