//! Wii Classic Controller extension report mapping.
//!
//! The controller answers on I2C address `0x52` with a 6-byte report once the
//! unencrypted init sequence has been written. This module only decodes the
//! report; bus access lives with the platform code.
//!
//! # Report layout
//!
//! | Byte | Bits 7-6 | Bits 5-0 |
//! |------|----------|----------|
//! | 0    | RX[4:3]  | LX (6 bit) |
//! | 1    | RX[2:1]  | LY (6 bit) |
//! | 2    | RX[0], LT[4:3] | RY (5 bit, bits 4-0) |
//! | 4    | Right, Down | L, Back, Home, Start, R, - (active low) |
//! | 5    | ZL, A    | X, B, Y, ZR, Left, Up (active low) |

use crate::types::{ControllerData, Index};

/// 7-bit I2C address of the extension controller.
pub const I2C_ADDRESS: u8 = 0x52;

/// Register writes that enable unencrypted reports.
pub const INIT_SEQUENCE: [[u8; 2]; 2] = [[0xF0, 0x55], [0xFB, 0x00]];

/// Register write that rewinds the read pointer for the next report.
pub const REQUEST_REPORT: [u8; 2] = [0x00, 0x00];

/// Report size.
pub const REPORT_LEN: usize = 6;

/// Consecutive bad reports tolerated before the controller is re-initialised.
pub const MAX_BAD_REPORTS: u8 = 20;

/// Analog value reported for a pressed digital trigger.
const TRIGGER_PRESSED: u8 = 7;

/// Error type for report decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Every button reads as pressed: the controller is not answering.
    NoController,
    /// Bus idle pattern (`0xFF` in the stick bytes).
    BusIdle,
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoController => write!(f, "no controller"),
            Self::BusIdle => write!(f, "bus idle"),
        }
    }
}

/// Decode a report into a [`ControllerData`].
pub fn map_report(report: &[u8; REPORT_LEN]) -> Result<ControllerData, ReportError> {
    if report[4] == 0 && report[5] == 0 {
        return Err(ReportError::NoController);
    }
    if report[0] == 0xFF && report[1] == 0xFF {
        return Err(ReportError::BusIdle);
    }

    // Buttons are active low
    let b4 = !report[4];
    let b5 = !report[5];
    let bit = |byte: u8, n: u8| byte & (1 << n) != 0;

    let mut data = ControllerData::new();
    data.set_button(Index::X, bit(b5, 5));
    data.set_button(Index::Y, bit(b5, 3));
    data.set_button(Index::A, bit(b5, 6));
    data.set_button(Index::B, bit(b5, 4));
    data.set_button(Index::Up, bit(b5, 0));
    data.set_button(Index::Down, bit(b4, 6));
    data.set_button(Index::Left, bit(b5, 1));
    data.set_button(Index::Right, bit(b4, 7));
    data.set_button(Index::L, bit(b4, 5));
    data.set_button(Index::R, bit(b4, 1));
    data.set_button(Index::Back, bit(b4, 4));
    data.set_button(Index::Start, bit(b4, 2));
    data.set_button(Index::Home, bit(b4, 3));

    data.set_analog(Index::TriggerL, u8::from(bit(b5, 7)) * TRIGGER_PRESSED);
    data.set_analog(Index::TriggerR, u8::from(bit(b5, 2)) * TRIGGER_PRESSED);

    // 6 and 5 bit axes reduced to 4 bits
    data.set_analog(Index::LeftStickX, (report[0] >> 2) & 0x0F);
    data.set_analog(Index::LeftStickY, (report[1] >> 2) & 0x0F);
    data.set_analog(
        Index::RightStickX,
        ((report[0] & 0xC0) >> 4) | ((report[1] & 0xC0) >> 6),
    );
    data.set_analog(Index::RightStickY, (report[2] >> 1) & 0x0F);

    // A resting stick reads 7 after truncation; report it as centred
    for axis in [
        Index::LeftStickX,
        Index::LeftStickY,
        Index::RightStickX,
        Index::RightStickY,
    ] {
        if data.analog(axis) == 7 {
            data.set_analog(axis, 8);
        }
    }

    Ok(data)
}

/// What to do after a report was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportOutcome {
    /// A valid snapshot.
    Data(ControllerData),
    /// Bad report; keep the previous snapshot.
    Skip,
    /// Too many bad reports: re-run the init sequence and publish
    /// [`ControllerData::NEUTRAL`].
    Reconnect,
}

/// Connection tracking across successive reports.
#[derive(Debug, Default)]
pub struct ReportTracker {
    bad_reports: u8,
    connected: bool,
}

impl ReportTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bad_reports: 0,
            connected: false,
        }
    }

    /// Decode `report` and decide how to proceed.
    pub fn on_report(&mut self, report: &[u8; REPORT_LEN]) -> ReportOutcome {
        match map_report(report) {
            Ok(data) => {
                self.bad_reports = 0;
                self.connected = true;
                ReportOutcome::Data(data)
            }
            Err(e) => {
                self.bad_reports += 1;
                if self.bad_reports > MAX_BAD_REPORTS {
                    warn!("controller lost ({:?}), reconnecting", e);
                    self.bad_reports = 0;
                    self.connected = false;
                    ReportOutcome::Reconnect
                } else {
                    ReportOutcome::Skip
                }
            }
        }
    }

    /// A valid report arrived since the last reconnect.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
