//! Transmitter tunables.

use mu_proto::{FramerConfig, ModemConfig};

use crate::manager::DEFAULT_TRIGGER_THRESHOLD;

/// Debounce interval of the emergency stop button.
pub const EMERGENCY_DEBOUNCE_MS: u32 = 15;

/// Timing and link settings of the transmitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitterConfig {
    /// Trigger value above which a trigger counts as pressed.
    pub trigger_threshold: u8,
    /// Input sampling period.
    pub poll_interval_ms: u32,
    /// Radio send period.
    pub send_interval_ms: u32,
    pub framer: FramerConfig,
    pub modem: ModemConfig,
}

impl TransmitterConfig {
    pub const DEFAULT: Self = Self {
        trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
        poll_interval_ms: 15,
        send_interval_ms: 20,
        framer: FramerConfig::DEFAULT,
        modem: ModemConfig::DEFAULT,
    };
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-line debouncer settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub debounce_ms: u32,
}

impl ButtonConfig {
    pub const DEFAULT: Self = Self {
        debounce_ms: EMERGENCY_DEBOUNCE_MS,
    };
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
