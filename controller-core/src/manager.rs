//! ControllerManager: edge detection and stick normalisation.
//!
//! # Numeric policy
//!
//! Both stick modes produce integers in `[-STICK_LIMIT, STICK_LIMIT]`.
//! Cartesian channels are recentred with integer arithmetic. Polar channels
//! are converted with a 16-entry fixed-point (I16F16) unit-circle table,
//! rounded toward zero and clamped to the same range, so no floating point
//! is involved in either path.

use fixed::types::I16F16;

use crate::types::{ControllerData, Index};

/// Default trigger level above which a trigger counts as pressed.
pub const DEFAULT_TRIGGER_THRESHOLD: u8 = 8;

/// Raw channel value of a centred cartesian axis.
pub const STICK_CENTER: u8 = 8;

/// Bound of a normalised stick axis.
pub const STICK_LIMIT: i8 = 14;

/// cos(k * pi / 8) for k = 0..16, as I16F16 bits.
const COS_SIXTEENTHS: [i32; 16] = [
    65536, 60547, 46341, 25080, 0, -25080, -46341, -60547, -65536, -60547, -46341, -25080, 0,
    25080, 46341, 60547,
];

/// Normalised stick position.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickVector {
    pub x: i8,
    pub y: i8,
}

impl StickVector {
    pub const NEUTRAL: Self = Self { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Recentre raw cartesian channels.
    ///
    /// Raw (0, 0) is the rest position reported by an idle or absent stick
    /// and maps to the centre rather than to the lower-left corner.
    #[must_use]
    pub fn from_cartesian(raw_x: u8, raw_y: u8) -> Self {
        if raw_x == 0 && raw_y == 0 {
            return Self::NEUTRAL;
        }
        Self {
            x: recenter(raw_x),
            y: recenter(raw_y),
        }
    }

    /// Convert a magnitude and an angle in sixteenths of a turn.
    #[must_use]
    pub fn from_polar(magnitude: u8, angle: u8) -> Self {
        let k = (angle % 16) as usize;
        let cos = I16F16::from_bits(COS_SIXTEENTHS[k]);
        let sin = I16F16::from_bits(COS_SIXTEENTHS[(k + 12) % 16]);
        let magnitude = I16F16::from_num(magnitude);
        Self {
            x: clamp_axis((magnitude * cos).round_to_zero().to_num::<i32>()),
            y: clamp_axis((magnitude * sin).round_to_zero().to_num::<i32>()),
        }
    }
}

#[inline]
fn recenter(raw: u8) -> i8 {
    clamp_axis(i32::from(raw) - i32::from(STICK_CENTER))
}

#[inline]
fn clamp_axis(value: i32) -> i8 {
    value.clamp(-i32::from(STICK_LIMIT), i32::from(STICK_LIMIT)) as i8
}

/// Tracks the current and previous controller snapshot.
///
/// Exactly one generation of history is kept, so edge queries describe the
/// change made by the most recent [`update`](Self::update).
///
/// # Example
///
/// ```
/// use controller_core::{ControllerData, ControllerManager, Index};
///
/// let mut manager = ControllerManager::default();
/// let mut data = ControllerData::new();
/// data.set_button(Index::A, true);
/// data.set_analog(Index::LeftStickX, 15);
/// data.set_analog(Index::LeftStickY, 8);
/// manager.update(data);
///
/// assert!(manager.is_pressed(Index::A));
/// assert_eq!(manager.get_value(Index::LeftStickX), 7);
/// ```
#[derive(Clone, Debug)]
pub struct ControllerManager {
    current: ControllerData,
    previous: ControllerData,
    left: StickVector,
    right: StickVector,
    threshold: u8,
}

impl ControllerManager {
    /// Create a manager treating trigger values above `threshold` as pressed.
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self {
            current: ControllerData::NEUTRAL,
            previous: ControllerData::NEUTRAL,
            left: StickVector::NEUTRAL,
            right: StickVector::NEUTRAL,
            threshold,
        }
    }

    /// Accept a new snapshot; the old one becomes the previous snapshot.
    pub fn update(&mut self, data: ControllerData) {
        self.previous = self.current;
        self.current = data;
        self.refresh_sticks();
    }

    /// Forget all history: everything released, sticks centred.
    pub fn clear(&mut self) {
        self.current = ControllerData::NEUTRAL;
        self.previous = ControllerData::NEUTRAL;
        self.update(ControllerData::NEUTRAL);
    }

    /// Normalised value: stick axes in `[-14, 14]`, anything else raw.
    #[must_use]
    pub fn get_value(&self, index: Index) -> i16 {
        match index {
            Index::LeftStickX => i16::from(self.left.x),
            Index::LeftStickY => i16::from(self.left.y),
            Index::RightStickX => i16::from(self.right.x),
            Index::RightStickY => i16::from(self.right.y),
            _ => i16::from(self.get_raw(index)),
        }
    }

    /// Stored value: 0 or 1 for buttons, 0-15 for analog channels.
    #[must_use]
    pub fn get_raw(&self, index: Index) -> u8 {
        if index.is_button() {
            u8::from(self.current.button(index))
        } else {
            self.current.analog(index)
        }
    }

    /// Became pressed on the latest update.
    ///
    /// Triggers count as pressed when they rise above the threshold.
    #[must_use]
    pub fn is_pressed(&self, index: Index) -> bool {
        if is_trigger(index) {
            return self.current.analog(index) > self.threshold
                && self.previous.analog(index) <= self.threshold;
        }
        index.is_button() && self.current.button(index) && !self.previous.button(index)
    }

    /// Became released on the latest update.
    #[must_use]
    pub fn is_released(&self, index: Index) -> bool {
        if is_trigger(index) {
            return self.current.analog(index) <= self.threshold
                && self.previous.analog(index) > self.threshold;
        }
        index.is_button() && !self.current.button(index) && self.previous.button(index)
    }

    /// Currently held.
    #[must_use]
    pub fn is_hold(&self, index: Index) -> bool {
        if is_trigger(index) {
            return self.current.analog(index) > self.threshold;
        }
        self.current.button(index)
    }

    /// Value differs from the previous snapshot.
    #[must_use]
    pub fn is_changed(&self, index: Index) -> bool {
        if index.is_button() {
            self.current.button(index) != self.previous.button(index)
        } else {
            self.current.analog(index) != self.previous.analog(index)
        }
    }

    pub fn current(&self) -> &ControllerData {
        &self.current
    }

    pub fn previous(&self) -> &ControllerData {
        &self.previous
    }

    pub fn left_stick(&self) -> StickVector {
        self.left
    }

    pub fn right_stick(&self) -> StickVector {
        self.right
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    fn refresh_sticks(&mut self) {
        let c = &self.current;
        if c.button(Index::FlagStickPolar) {
            self.left = StickVector::from_polar(
                c.analog(Index::LeftStickX),
                c.analog(Index::LeftStickY),
            );
            self.right = StickVector::from_polar(
                c.analog(Index::RightStickX),
                c.analog(Index::RightStickY),
            );
        } else {
            self.left = StickVector::from_cartesian(
                c.analog(Index::LeftStickX),
                c.analog(Index::LeftStickY),
            );
            self.right = StickVector::from_cartesian(
                c.analog(Index::RightStickX),
                c.analog(Index::RightStickY),
            );
        }
    }
}

impl Default for ControllerManager {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_THRESHOLD)
    }
}

#[inline]
fn is_trigger(index: Index) -> bool {
    matches!(index, Index::TriggerL | Index::TriggerR)
}
