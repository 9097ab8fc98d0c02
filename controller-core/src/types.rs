//! Controller input ids and the packed ControllerData value.

use crate::packet::{Packet, PacketError, Packetizer};

/// Number of button bits.
pub const BUTTON_COUNT: u8 = 16;

/// Id of the first analog channel.
pub const ANALOG_FIRST: u8 = 64;

/// Number of analog channels.
pub const ANALOG_COUNT: u8 = 6;

/// Largest value an analog channel holds.
pub const ANALOG_MAX: u8 = 0x0F;

/// Input ids.
///
/// Buttons occupy ids 0-15 and map directly to bits of the button mask.
/// Analog channels start at [`ANALOG_FIRST`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Index {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    L = 8,
    R = 9,
    Back = 10,
    Start = 11,
    /// Left stick press.
    StickLeft = 12,
    /// Right stick press.
    StickRight = 13,
    Home = 14,
    /// Set when the stick channels carry (magnitude, angle) instead of (x, y).
    FlagStickPolar = 15,

    LeftStickX = ANALOG_FIRST,
    LeftStickY = ANALOG_FIRST + 1,
    RightStickX = ANALOG_FIRST + 2,
    RightStickY = ANALOG_FIRST + 3,
    TriggerL = ANALOG_FIRST + 4,
    TriggerR = ANALOG_FIRST + 5,
}

impl Index {
    /// All button ids in bit order.
    pub const BUTTONS: [Self; BUTTON_COUNT as usize] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::L,
        Self::R,
        Self::Back,
        Self::Start,
        Self::StickLeft,
        Self::StickRight,
        Self::Home,
        Self::FlagStickPolar,
    ];

    /// All analog ids in channel order.
    pub const ANALOGS: [Self; ANALOG_COUNT as usize] = [
        Self::LeftStickX,
        Self::LeftStickY,
        Self::RightStickX,
        Self::RightStickY,
        Self::TriggerL,
        Self::TriggerR,
    ];

    /// Look up an id by its numeric value.
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        if raw < BUTTON_COUNT {
            Some(Self::BUTTONS[raw as usize])
        } else {
            raw.checked_sub(ANALOG_FIRST)
                .and_then(|channel| Self::ANALOGS.get(channel as usize).copied())
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn is_button(self) -> bool {
        self.raw() < BUTTON_COUNT
    }

    /// Analog channel number (0-5), `None` for buttons.
    #[inline]
    #[must_use]
    pub const fn analog_channel(self) -> Option<u8> {
        let raw = self.raw();
        if raw >= ANALOG_FIRST && raw < ANALOG_FIRST + ANALOG_COUNT {
            Some(raw - ANALOG_FIRST)
        } else {
            None
        }
    }
}

/// Packed controller snapshot, the payload carried over the radio.
///
/// 16 button bits plus 6 analog channels of 4 bits each, two per byte: the
/// even channel in the low nibble, the odd channel in the high nibble.
///
/// # Wire layout
///
/// ```text
/// byte 0-1  button mask, little-endian
/// byte 2    LeftStickY  << 4 | LeftStickX
/// byte 3    RightStickY << 4 | RightStickX
/// byte 4    TriggerR    << 4 | TriggerL
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerData {
    buttons: u16,
    analog: [u8; 3],
}

impl ControllerData {
    /// Size of the encoded value.
    pub const WIRE_SIZE: usize = 5;

    /// All buttons released, all channels zero.
    pub const NEUTRAL: Self = Self {
        buttons: 0,
        analog: [0; 3],
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::NEUTRAL
    }

    /// Whether button `index` is set. `false` for analog ids.
    #[inline]
    #[must_use]
    pub fn button(&self, index: Index) -> bool {
        index.is_button() && self.buttons & (1 << index.raw()) != 0
    }

    /// Set or clear button `index`. Analog ids are ignored.
    #[inline]
    pub fn set_button(&mut self, index: Index, pressed: bool) {
        if !index.is_button() {
            return;
        }
        if pressed {
            self.buttons |= 1 << index.raw();
        } else {
            self.buttons &= !(1 << index.raw());
        }
    }

    /// Raw 4-bit value of analog channel `index`. `0` for button ids.
    #[inline]
    #[must_use]
    pub fn analog(&self, index: Index) -> u8 {
        match index.analog_channel() {
            Some(channel) => {
                let byte = self.analog[(channel / 2) as usize];
                if channel % 2 == 0 {
                    byte & 0x0F
                } else {
                    byte >> 4
                }
            }
            None => 0,
        }
    }

    /// Store `value` (clamped to 15) in analog channel `index`. Button ids
    /// are ignored.
    #[inline]
    pub fn set_analog(&mut self, index: Index, value: u8) {
        let Some(channel) = index.analog_channel() else {
            return;
        };
        let value = value.min(ANALOG_MAX);
        let byte = &mut self.analog[(channel / 2) as usize];
        if channel % 2 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    /// The button mask.
    #[inline]
    #[must_use]
    pub const fn buttons(&self) -> u16 {
        self.buttons
    }

    /// Append this value to a packet: mask first, then the analog bytes.
    pub fn pack_into(&self, packetizer: &mut Packetizer<'_>) {
        packetizer.pack(self.buttons).pack_bytes(&self.analog);
    }

    /// Read a value in the order written by [`pack_into`](Self::pack_into).
    pub fn unpack_from(packetizer: &mut Packetizer<'_>) -> Result<Self, PacketError> {
        let mut data = Self::NEUTRAL;
        packetizer
            .unpack(&mut data.buttons)
            .unpack_bytes(&mut data.analog)
            .finish()?;
        Ok(data)
    }

    /// Encode into a fresh packet.
    pub fn to_packet(&self, id: u16) -> Result<Packet, PacketError> {
        let mut packet = Packet::new(id);
        let mut packetizer = Packetizer::init(&mut packet, false);
        self.pack_into(&mut packetizer);
        packetizer.finish()?;
        Ok(packet)
    }

    /// Decode from a packet produced by [`to_packet`](Self::to_packet).
    pub fn from_packet(packet: &mut Packet) -> Result<Self, PacketError> {
        if packet.len() < Self::WIRE_SIZE {
            return Err(PacketError::InvalidLength);
        }
        Self::unpack_from(&mut Packetizer::resume(packet))
    }

    /// Encode to the 5-byte wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_SIZE] {
        let mask = self.buttons.to_le_bytes();
        [mask[0], mask[1], self.analog[0], self.analog[1], self.analog[2]]
    }

    /// Decode the 5-byte wire form.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::WIRE_SIZE]) -> Self {
        Self {
            buttons: u16::from_le_bytes([bytes[0], bytes[1]]),
            analog: [bytes[2], bytes[3], bytes[4]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_buttons_set_clear() {
        let mut data = ControllerData::new();
        data.set_button(Index::A, true);
        data.set_button(Index::FlagStickPolar, true);
        assert!(data.button(Index::A));
        assert!(data.button(Index::FlagStickPolar));
        assert_eq!(data.buttons(), 0x8001);

        data.set_button(Index::A, false);
        assert!(!data.button(Index::A));
        assert_eq!(data.buttons(), 0x8000);
    }

    #[test]
    fn test_button_accessors_ignore_analog_ids() {
        let mut data = ControllerData::new();
        data.set_button(Index::LeftStickX, true);
        assert_eq!(data, ControllerData::NEUTRAL);
        assert!(!data.button(Index::TriggerR));
    }

    #[test]
    fn test_analog_nibbles() {
        let mut data = ControllerData::new();
        data.set_analog(Index::LeftStickX, 0x3);
        data.set_analog(Index::LeftStickY, 0xA);
        data.set_analog(Index::TriggerL, 0x1);
        data.set_analog(Index::TriggerR, 0xF);
        assert_eq!(data.to_bytes(), [0, 0, 0xA3, 0x00, 0xF1]);
        assert_eq!(data.analog(Index::LeftStickX), 0x3);
        assert_eq!(data.analog(Index::LeftStickY), 0xA);
        assert_eq!(data.analog(Index::RightStickX), 0);

        // Overwriting one nibble keeps its neighbour
        data.set_analog(Index::LeftStickX, 0x0);
        assert_eq!(data.analog(Index::LeftStickY), 0xA);
    }

    #[test]
    fn test_analog_clamped() {
        let mut data = ControllerData::new();
        data.set_analog(Index::RightStickY, 200);
        assert_eq!(data.analog(Index::RightStickY), 15);
        assert_eq!(data.analog(Index::RightStickX), 0);
    }

    #[test]
    fn test_analog_accessors_ignore_button_ids() {
        let mut data = ControllerData::new();
        data.set_analog(Index::B, 7);
        assert_eq!(data, ControllerData::NEUTRAL);
        assert_eq!(data.analog(Index::B), 0);
    }

    #[test]
    fn test_index_from_raw() {
        assert_eq!(Index::from_raw(0), Some(Index::A));
        assert_eq!(Index::from_raw(15), Some(Index::FlagStickPolar));
        assert_eq!(Index::from_raw(16), None);
        assert_eq!(Index::from_raw(63), None);
        assert_eq!(Index::from_raw(64), Some(Index::LeftStickX));
        assert_eq!(Index::from_raw(69), Some(Index::TriggerR));
        assert_eq!(Index::from_raw(70), None);
        for index in Index::BUTTONS.iter().chain(Index::ANALOGS.iter()) {
            assert_eq!(Index::from_raw(index.raw()), Some(*index));
        }
    }

    #[test]
    fn test_wire_layout() {
        let mut data = ControllerData::new();
        data.set_button(Index::A, true);
        data.set_button(Index::L, true);
        data.set_analog(Index::RightStickX, 8);
        data.set_analog(Index::RightStickY, 8);
        let packet = data.to_packet(0).unwrap();
        assert_eq!(packet.as_bytes(), &[0x01, 0x01, 0x00, 0x88, 0x00]);
        assert_eq!(packet.as_bytes(), &data.to_bytes());
    }

    #[test]
    fn test_from_packet_too_short() {
        let mut packet = Packet::from_bytes(0, &[1, 2, 3]).unwrap();
        assert_eq!(
            ControllerData::from_packet(&mut packet),
            Err(PacketError::InvalidLength)
        );
    }

    proptest! {
        #[test]
        fn test_packet_round_trip(buttons: u16, analog: [u8; 3]) {
            let data = ControllerData { buttons, analog };
            let mut packet = data.to_packet(7).unwrap();
            prop_assert_eq!(packet.len(), ControllerData::WIRE_SIZE);
            prop_assert_eq!(ControllerData::from_packet(&mut packet), Ok(data));
            prop_assert_eq!(ControllerData::from_bytes(&data.to_bytes()), data);
        }

        #[test]
        fn test_setters_round_trip(values in proptest::array::uniform6(0u8..=15)) {
            let mut data = ControllerData::new();
            for (index, value) in Index::ANALOGS.iter().zip(values) {
                data.set_analog(*index, value);
            }
            for (index, value) in Index::ANALOGS.iter().zip(values) {
                prop_assert_eq!(data.analog(*index), value);
            }
        }
    }
}
