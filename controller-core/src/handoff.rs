//! Single-slot "latest value wins" register.
//!
//! Models the one-element overwrite queues that hand values between tasks:
//! a publish replaces whatever is waiting, and an overwritten value that was
//! never taken is dropped. Readers only ever see the freshest value.

/// Single-slot overwrite register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latest<T> {
    slot: Option<T>,
    dropped: u32,
}

impl<T: Copy> Latest<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: None,
            dropped: 0,
        }
    }

    /// Store `value`, replacing any unread value.
    pub fn publish(&mut self, value: T) {
        if self.slot.replace(value).is_some() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Remove and return the waiting value.
    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    /// Waiting value, left in place.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.slot
    }

    /// Number of values overwritten before anyone took them.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<T: Copy> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let mut reg = Latest::new();
        reg.publish(1u8);
        reg.publish(2);
        reg.publish(3);
        assert_eq!(reg.peek(), Some(3));
        assert_eq!(reg.take(), Some(3));
        assert_eq!(reg.take(), None);
        assert_eq!(reg.dropped(), 2);
    }

    #[test]
    fn test_take_then_publish_drops_nothing() {
        let mut reg = Latest::new();
        for v in 0..4u8 {
            reg.publish(v);
            assert_eq!(reg.take(), Some(v));
        }
        assert_eq!(reg.dropped(), 0);
    }
}
