//! Display power control
//!
//! Tracks the backlight and display-enable state so that repeated requests
//! for the state the panel is already in do not reach the hardware.

use log::{debug, info};
use piprint_hal::{CharLcd, HalError};

/// Power state of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerState {
    /// Display circuit on
    pub enabled: bool,
    /// Backlight on
    pub backlit: bool,
}

/// Conditional-write power controller
///
/// Without `force`, a request matching the tracked state is dropped. With
/// `force`, the hardware call is always issued. The tracked state is only
/// updated once the hardware call succeeded.
#[derive(Debug, Clone)]
pub struct PowerController {
    state: PowerState,
}

impl PowerController {
    /// Create a controller tracking `initial`
    pub const fn new(initial: PowerState) -> Self {
        Self { state: initial }
    }

    /// Current tracked state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Switch the display circuit on or off
    ///
    /// Returns whether the hardware was touched.
    pub fn enable<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        on: bool,
        force: bool,
    ) -> Result<bool, HalError> {
        if !force && self.state.enabled == on {
            return Ok(false);
        }
        info!(
            "{}abling lcd; forced: {}",
            if on { "En" } else { "Dis" },
            if force { "yes" } else { "no" }
        );
        lcd.enable_display(on)?;
        self.state.enabled = on;
        Ok(true)
    }

    /// Switch the backlight on or off
    ///
    /// Returns whether the hardware was touched.
    pub fn set_backlight<L: CharLcd>(
        &mut self,
        lcd: &mut L,
        on: bool,
        force: bool,
    ) -> Result<bool, HalError> {
        if !force && self.state.backlit == on {
            return Ok(false);
        }
        debug!(
            "turning {} lcd light; forced: {}",
            if on { "on" } else { "off" },
            if force { "yes" } else { "no" }
        );
        lcd.set_backlight(if on { 1.0 } else { 0.0 })?;
        self.state.backlit = on;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piprint_hal::SimLcd;

    const OFF: PowerState = PowerState {
        enabled: false,
        backlit: false,
    };

    #[test]
    fn test_backlight_unforced_only_once() {
        let mut lcd = SimLcd::new();
        let mut power = PowerController::new(OFF);

        assert_eq!(power.set_backlight(&mut lcd, true, false), Ok(true));
        assert_eq!(power.set_backlight(&mut lcd, true, false), Ok(false));
        assert_eq!(lcd.counts().backlight_calls, 1);
        assert!(power.state().backlit);
        assert!(lcd.is_backlit());
    }

    #[test]
    fn test_backlight_forced_every_time() {
        let mut lcd = SimLcd::new();
        let mut power = PowerController::new(OFF);

        assert_eq!(power.set_backlight(&mut lcd, true, true), Ok(true));
        assert_eq!(power.set_backlight(&mut lcd, true, true), Ok(true));
        assert_eq!(lcd.counts().backlight_calls, 2);
        assert!(power.state().backlit);
    }

    #[test]
    fn test_enable_unforced_and_forced() {
        let mut lcd = SimLcd::new();
        let mut power = PowerController::new(OFF);

        assert_eq!(power.enable(&mut lcd, false, false), Ok(false));
        assert_eq!(lcd.counts().enable_calls, 0);

        assert_eq!(power.enable(&mut lcd, false, true), Ok(true));
        assert_eq!(lcd.counts().enable_calls, 1);
        assert!(!power.state().enabled);

        assert_eq!(power.enable(&mut lcd, true, false), Ok(true));
        assert!(power.state().enabled);
        assert!(lcd.is_enabled());
    }

    #[test]
    fn test_failed_call_keeps_state() {
        let mut lcd = SimLcd::new();
        let mut power = PowerController::new(OFF);
        lcd.fail_after(0);

        assert_eq!(power.enable(&mut lcd, true, false), Err(HalError::Io));
        assert_eq!(power.state(), OFF);
    }
}
