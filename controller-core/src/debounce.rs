//! Debounced push buttons with latched edges.
//!
//! Buttons are wired to ground with a pull-up, so a low line means pressed.
//! Hand [`ButtonManager::add`] a pin already configured as a pulled-up input
//! (for example `Input::new(pin, Pull::Up)` on embassy targets).
//!
//! # Poll cycle
//!
//! ```text
//! update(now) -> read is_pressed / is_released / is_hold -> release()
//! ```
//!
//! Edges stay latched until [`ButtonManager::release`], which must run once
//! per cycle after every consumer has looked at them.

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::config::ButtonConfig;

/// Number of button slots.
pub const MAX_BUTTONS: usize = 6;

/// Error type for button registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonError {
    /// All [`MAX_BUTTONS`] slots are in use.
    TableFull,
}

impl core::fmt::Display for ButtonError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TableFull => write!(f, "button table full"),
        }
    }
}

/// One registered button.
struct ButtonSlot<P> {
    pin: P,
    debounce_ms: u32,
    last_transition_ms: u32,
    /// Debounced level, `true` = pressed.
    level: bool,
    rising: bool,
    falling: bool,
}

/// Fixed table of debounced buttons.
///
/// Buttons are addressed by registration order, not by pin number.
pub struct ButtonManager<P> {
    slots: Vec<ButtonSlot<P>, MAX_BUTTONS>,
}

impl<P: InputPin> ButtonManager<P> {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a button and return its index.
    pub fn add(&mut self, pin: P, debounce_ms: u32) -> Result<usize, ButtonError> {
        let index = self.slots.len();
        self.slots
            .push(ButtonSlot {
                pin,
                debounce_ms,
                last_transition_ms: 0,
                level: false,
                rising: false,
                falling: false,
            })
            .map_err(|_| ButtonError::TableFull)?;
        Ok(index)
    }

    /// Register a button with its [`ButtonConfig`].
    pub fn add_with_config(
        &mut self,
        pin: P,
        config: ButtonConfig,
    ) -> Result<usize, ButtonError> {
        self.add(pin, config.debounce_ms)
    }

    /// Sample every button whose debounce interval has elapsed.
    ///
    /// `now_ms` is a free-running millisecond counter; wrap-around is fine.
    pub fn update(&mut self, now_ms: u32) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if now_ms.wrapping_sub(slot.last_transition_ms) <= slot.debounce_ms {
                continue;
            }

            let pressed = match slot.pin.is_low() {
                Ok(low) => low,
                Err(_) => {
                    warn!("button {} read failed", index);
                    continue;
                }
            };

            if pressed && !slot.level {
                slot.rising = true;
                slot.falling = false;
                slot.last_transition_ms = now_ms;
                trace!("button {} pressed", index);
            } else if !pressed && slot.level {
                slot.falling = true;
                slot.rising = false;
                slot.last_transition_ms = now_ms;
                trace!("button {} released", index);
            }
            slot.level = pressed;
        }
    }

    /// Pressed since the last [`release`](Self::release).
    #[must_use]
    pub fn is_pressed(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.rising)
    }

    /// Released since the last [`release`](Self::release).
    #[must_use]
    pub fn is_released(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.falling)
    }

    /// Currently held down (debounced).
    #[must_use]
    pub fn is_hold(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.level)
    }

    /// Clear the latched edges of every button.
    pub fn release(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.rising = false;
            slot.falling = false;
        }
    }

    /// Number of registered buttons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<P: InputPin> Default for ButtonManager<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::EMERGENCY_DEBOUNCE_MS;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    /// Pin whose level is driven from the test.
    #[derive(Clone, Default)]
    struct MockPin {
        low: Rc<Cell<bool>>,
    }

    impl MockPin {
        fn press(&self) {
            self.low.set(true);
        }

        fn lift(&self) {
            self.low.set(false);
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low.get())
        }
    }

    /// Run one poll cycle and report the edges seen by consumers.
    fn poll(buttons: &mut ButtonManager<MockPin>, now_ms: u32) -> (bool, bool) {
        buttons.update(now_ms);
        let edges = (buttons.is_pressed(0), buttons.is_released(0));
        buttons.release();
        edges
    }

    #[test]
    fn test_registration_order() {
        let mut buttons = ButtonManager::new();
        for expected in 0..MAX_BUTTONS {
            assert_eq!(buttons.add(MockPin::default(), 20), Ok(expected));
        }
        assert_eq!(
            buttons.add(MockPin::default(), 20),
            Err(ButtonError::TableFull)
        );
        assert_eq!(buttons.len(), MAX_BUTTONS);
    }

    #[test]
    fn test_add_with_config_uses_its_interval() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        let config = ButtonConfig { debounce_ms: 40 };
        assert_eq!(buttons.add_with_config(pin.clone(), config), Ok(0));

        pin.press();
        assert_eq!(poll(&mut buttons, 100), (true, false));
        pin.lift();
        // Still inside the 40 ms window
        assert_eq!(poll(&mut buttons, 130), (false, false));
        assert!(buttons.is_hold(0));
        assert_eq!(poll(&mut buttons, 141), (false, true));
    }

    #[test]
    fn test_default_config_interval() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add_with_config(pin.clone(), ButtonConfig::DEFAULT).unwrap();

        pin.press();
        assert_eq!(poll(&mut buttons, 100), (true, false));
        pin.lift();
        assert_eq!(poll(&mut buttons, 100 + EMERGENCY_DEBOUNCE_MS), (false, false));
        assert_eq!(poll(&mut buttons, 101 + EMERGENCY_DEBOUNCE_MS), (false, true));
    }

    #[test]
    fn test_single_edge_each_way() {
        for period in [1u32, 5, 7, 19] {
            let pin = MockPin::default();
            let mut buttons = ButtonManager::new();
            buttons.add(pin.clone(), 20).unwrap();

            let mut rising = 0;
            let mut falling = 0;
            let mut now = 0;
            while now < 400 {
                if (150..250).contains(&now) {
                    pin.press();
                } else {
                    pin.lift();
                }
                let (r, f) = poll(&mut buttons, now);
                rising += u32::from(r);
                falling += u32::from(f);
                now += period;
            }
            assert_eq!((rising, falling), (1, 1), "period {period}");
        }
    }

    #[test]
    fn test_bounce_inside_window_is_ignored() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add(pin.clone(), 20).unwrap();

        pin.press();
        assert_eq!(poll(&mut buttons, 100), (true, false));

        // Contact bounce right after the press
        pin.lift();
        assert_eq!(poll(&mut buttons, 105), (false, false));
        pin.press();
        assert_eq!(poll(&mut buttons, 110), (false, false));
        assert!(buttons.is_hold(0));

        assert_eq!(poll(&mut buttons, 130), (false, false));
        assert!(buttons.is_hold(0));
    }

    #[test]
    fn test_edges_latch_until_release() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add(pin.clone(), 10).unwrap();

        pin.press();
        buttons.update(50);
        buttons.update(51);
        buttons.update(70);
        assert!(buttons.is_pressed(0));
        assert!(buttons.is_hold(0));

        buttons.release();
        assert!(!buttons.is_pressed(0));
        assert!(!buttons.is_released(0));
        buttons.release();
        assert!(!buttons.is_pressed(0));
        assert!(!buttons.is_released(0));
        assert!(buttons.is_hold(0));
    }

    #[test]
    fn test_falling_clears_rising() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add(pin.clone(), 10).unwrap();

        pin.press();
        buttons.update(20);
        pin.lift();
        buttons.update(40);
        assert!(!buttons.is_pressed(0));
        assert!(buttons.is_released(0));
    }

    #[test]
    fn test_buttons_are_independent() {
        let a = MockPin::default();
        let b = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add(a.clone(), 10).unwrap();
        buttons.add(b.clone(), 50).unwrap();

        b.press();
        buttons.update(100);
        assert!(!buttons.is_pressed(0));
        assert!(buttons.is_pressed(1));
        assert!(!buttons.is_hold(0));
    }

    #[test]
    fn test_unknown_index() {
        let buttons: ButtonManager<MockPin> = ButtonManager::new();
        assert!(!buttons.is_pressed(3));
        assert!(!buttons.is_released(3));
        assert!(!buttons.is_hold(3));
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_counter_wrap() {
        let pin = MockPin::default();
        let mut buttons = ButtonManager::new();
        buttons.add(pin.clone(), 10).unwrap();

        pin.press();
        buttons.update(u32::MAX - 5);
        assert!(buttons.is_pressed(0));
        buttons.release();

        pin.lift();
        buttons.update(2);
        assert!(!buttons.is_released(0));
        buttons.update(6);
        assert!(buttons.is_released(0));
    }
}
