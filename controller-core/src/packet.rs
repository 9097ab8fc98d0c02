//! Fixed-capacity packet codec.
//!
//! [`Packetizer`] appends and extracts fixed-width fields in little-endian
//! order regardless of host endianness. It knows nothing about what the
//! fields mean: the wire layout is whatever order the caller packs them in.
//!
//! Failures are sticky. Once a pack or unpack is rejected every later call on
//! the same packetizer does nothing, so a chain of operations is checked once
//! with [`Packetizer::success`] or [`Packetizer::finish`].
//!
//! # Example
//!
//! ```
//! use controller_core::{Packet, Packetizer};
//!
//! let mut packet = Packet::new(1);
//! let ok = Packetizer::init(&mut packet, false)
//!     .pack(0x1234u16)
//!     .pack_bytes(&[0xAA, 0xBB])
//!     .success();
//! assert!(ok);
//! assert_eq!(packet.as_bytes(), &[0x34, 0x12, 0xAA, 0xBB]);
//! ```

/// Bytes a packet can hold.
pub const PACKET_CAPACITY: usize = 8;

/// Error type for packet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// A write would exceed the packet capacity.
    BufferOverflow,
    /// A read would run past the end of the packet buffer.
    InvalidLength,
}

impl core::fmt::Display for PacketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferOverflow => write!(f, "packet buffer overflow"),
            Self::InvalidLength => write!(f, "invalid packet length"),
        }
    }
}

/// A numbered packet of at most [`PACKET_CAPACITY`] bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub id: u16,
    data: [u8; PACKET_CAPACITY],
    len: u8,
}

impl Packet {
    /// Create an empty, zeroed packet.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            data: [0; PACKET_CAPACITY],
            len: 0,
        }
    }

    /// Create a packet holding a copy of `bytes`.
    pub fn from_bytes(id: u16, bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() > PACKET_CAPACITY {
            return Err(PacketError::BufferOverflow);
        }
        let mut packet = Self::new(id);
        packet.data[..bytes.len()].copy_from_slice(bytes);
        packet.len = bytes.len() as u8;
        Ok(packet)
    }

    /// Number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The written bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }
}

/// A value with a fixed-width little-endian encoding.
pub trait Field: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write the value into `out`, which is exactly `SIZE` bytes long.
    fn put_le(self, out: &mut [u8]);

    /// Read a value from `bytes`, which is exactly `SIZE` bytes long.
    fn get_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_field {
    ($($t:ty),* $(,)?) => {
        $(
            impl Field for $t {
                const SIZE: usize = core::mem::size_of::<$t>();

                #[inline]
                fn put_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn get_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Sequential writer and reader over a [`Packet`].
pub struct Packetizer<'a> {
    packet: &'a mut Packet,
    cursor: usize,
    error: Option<PacketError>,
}

impl<'a> Packetizer<'a> {
    /// Start over on `packet`: length, read cursor and error state are reset.
    ///
    /// With `clear` set the storage is zeroed as well. Reads are bounded by
    /// the capacity, not by the length, so a packet that was just filled can
    /// be re-initialised and read back.
    pub fn init(packet: &'a mut Packet, clear: bool) -> Self {
        if clear {
            packet.data = [0; PACKET_CAPACITY];
        }
        packet.len = 0;
        Self {
            packet,
            cursor: 0,
            error: None,
        }
    }

    /// Read (or keep appending to) `packet` without resetting its length.
    pub fn resume(packet: &'a mut Packet) -> Self {
        Self {
            packet,
            cursor: 0,
            error: None,
        }
    }

    /// Append a fixed-width field.
    pub fn pack<T: Field>(&mut self, value: T) -> &mut Self {
        if let Some(range) = self.reserve(T::SIZE) {
            value.put_le(&mut self.packet.data[range]);
        }
        self
    }

    /// Append a raw byte run.
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if let Some(range) = self.reserve(bytes.len()) {
            self.packet.data[range].copy_from_slice(bytes);
        }
        self
    }

    /// Read the next fixed-width field into `value`.
    ///
    /// `value` is left untouched on failure.
    pub fn unpack<T: Field>(&mut self, value: &mut T) -> &mut Self {
        if let Some(range) = self.advance(T::SIZE) {
            *value = T::get_le(&self.packet.data[range]);
        }
        self
    }

    /// Fill `out` with the next raw bytes.
    pub fn unpack_bytes(&mut self, out: &mut [u8]) -> &mut Self {
        if let Some(range) = self.advance(out.len()) {
            out.copy_from_slice(&self.packet.data[range]);
        }
        self
    }

    /// `true` while no operation has failed.
    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// The sticky error, if any.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<PacketError> {
        self.error
    }

    /// Result of the whole chain of operations.
    pub fn finish(&self) -> Result<(), PacketError> {
        self.error.map_or(Ok(()), Err)
    }

    /// Read position.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get a reference to the packet being processed.
    pub fn packet(&self) -> &Packet {
        self.packet
    }

    fn reserve(&mut self, size: usize) -> Option<core::ops::Range<usize>> {
        if self.error.is_some() {
            return None;
        }
        let start = self.packet.len();
        if start + size > PACKET_CAPACITY {
            self.fail(PacketError::BufferOverflow);
            return None;
        }
        self.packet.len = (start + size) as u8;
        Some(start..start + size)
    }

    fn advance(&mut self, size: usize) -> Option<core::ops::Range<usize>> {
        if self.error.is_some() {
            return None;
        }
        let start = self.cursor;
        if start + size > PACKET_CAPACITY {
            self.fail(PacketError::InvalidLength);
            return None;
        }
        self.cursor = start + size;
        Some(start..start + size)
    }

    fn fail(&mut self, error: PacketError) {
        debug!("packet {} failed: {:?}", self.packet.id, error);
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_little_endian() {
        let mut packet = Packet::new(0);
        let ok = Packetizer::init(&mut packet, false)
            .pack(0xBEEFu16)
            .pack(-2i16)
            .pack(0x01020304u32)
            .success();
        assert!(ok);
        assert_eq!(
            packet.as_bytes(),
            &[0xEF, 0xBE, 0xFE, 0xFF, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_pack_overflow_is_sticky() {
        let mut packet = Packet::new(0);
        let mut p = Packetizer::init(&mut packet, false);
        p.pack(0u32).pack(0u32);
        assert!(p.success());

        p.pack(1u8);
        assert_eq!(p.error(), Some(PacketError::BufferOverflow));

        // Later calls are no-ops, even ones that would fit
        let mut value = 0xAAu8;
        p.unpack(&mut value);
        assert_eq!(value, 0xAA);
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.finish(), Err(PacketError::BufferOverflow));
        assert_eq!(packet.len(), PACKET_CAPACITY);
    }

    #[test]
    fn test_pack_bytes_overflow() {
        let mut packet = Packet::new(0);
        let mut p = Packetizer::init(&mut packet, false);
        p.pack_bytes(&[1, 2, 3, 4, 5]).pack_bytes(&[6, 7, 8, 9]);
        assert_eq!(p.error(), Some(PacketError::BufferOverflow));
        assert_eq!(packet.as_bytes(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unpack_in_order() {
        let mut packet = Packet::from_bytes(3, &[0x34, 0x12, 0x7F, 0x01, 0x02]).unwrap();
        let mut word = 0u16;
        let mut byte = 0i8;
        let mut rest = [0u8; 2];
        let ok = Packetizer::resume(&mut packet)
            .unpack(&mut word)
            .unpack(&mut byte)
            .unpack_bytes(&mut rest)
            .success();
        assert!(ok);
        assert_eq!(word, 0x1234);
        assert_eq!(byte, 0x7F);
        assert_eq!(rest, [0x01, 0x02]);
        assert_eq!(packet.len(), 5);
    }

    #[test]
    fn test_unpack_past_capacity() {
        let mut packet = Packet::new(0);
        let mut p = Packetizer::init(&mut packet, false);
        let mut wide = 0u64;
        let mut extra = 0u8;
        p.unpack(&mut wide).unpack(&mut extra);
        assert_eq!(p.error(), Some(PacketError::InvalidLength));
    }

    #[test]
    fn test_init_resets_for_reuse() {
        let mut packet = Packet::new(9);
        Packetizer::init(&mut packet, false).pack(0xFFFF_FFFFu32);

        let p = Packetizer::init(&mut packet, false);
        assert!(p.success());
        assert_eq!(p.packet().len(), 0);
        // Storage is kept unless cleared
        assert_eq!(packet.data[0], 0xFF);

        Packetizer::init(&mut packet, true);
        assert_eq!(packet.data, [0; PACKET_CAPACITY]);
        assert_eq!(packet.id, 9);
    }

    #[test]
    fn test_float_fields() {
        let mut packet = Packet::new(0);
        Packetizer::init(&mut packet, false).pack(1.5f32);
        assert_eq!(packet.as_bytes(), &1.5f32.to_le_bytes());

        let mut value = 0.0f32;
        Packetizer::resume(&mut packet).unpack(&mut value);
        assert_eq!(value, 1.5);
    }

    #[test]
    fn test_from_bytes_too_long() {
        assert_eq!(
            Packet::from_bytes(0, &[0; 9]),
            Err(PacketError::BufferOverflow)
        );
    }
}
