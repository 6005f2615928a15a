//! Logical button roles and the axis-to-button state machine
//!
//! A [`Button`] names a semantic control independent of the physical pad.
//! Roles without a digital source are driven from an analogue axis through
//! [`AxisButtonState`], which turns a continuous sample stream into
//! one-tick edge pulses (`Down`, `Up`) around a sustained `Held`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analogue amount that has to be exceeded for an axis to count as pressed
pub const AXIS_PRESS_THRESHOLD: f32 = 0.1;

// Button role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Button {
    Select,
    Start,
    System,
    L1,
    L2,
    L3,
    R1,
    R2,
    R3,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    ActionA,
    ActionB,
    ActionC,
    ActionD,
}

impl Button {
    /// Every role in declaration order
    pub const ALL: [Button; 17] = [
        Button::Select,
        Button::Start,
        Button::System,
        Button::L1,
        Button::L2,
        Button::L3,
        Button::R1,
        Button::R2,
        Button::R3,
        Button::DPadUp,
        Button::DPadDown,
        Button::DPadLeft,
        Button::DPadRight,
        Button::ActionA,
        Button::ActionB,
        Button::ActionC,
        Button::ActionD,
    ];
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Discrete state of an axis-mapped button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisButtonState {
    #[default]
    Idle,
    Down,
    Held,
    Up,
}

impl AxisButtonState {
    /// Advances the state by one tick given the (already reflected) axis amount.
    ///
    /// `Down` always becomes `Held` on the following tick, so a press is
    /// reported as a single-tick edge even if the axis is released at once.
    pub fn next(self, amount: f32) -> Self {
        let pressed = amount > AXIS_PRESS_THRESHOLD;
        match (self, pressed) {
            (AxisButtonState::Idle, true) => AxisButtonState::Down,
            (AxisButtonState::Idle, false) => AxisButtonState::Idle,
            (AxisButtonState::Down, _) => AxisButtonState::Held,
            (AxisButtonState::Held, true) => AxisButtonState::Held,
            (AxisButtonState::Held, false) => AxisButtonState::Up,
            (AxisButtonState::Up, true) => AxisButtonState::Down,
            (AxisButtonState::Up, false) => AxisButtonState::Idle,
        }
    }

    pub fn is_held(self) -> bool {
        matches!(self, AxisButtonState::Down | AxisButtonState::Held)
    }

    pub fn is_down(self) -> bool {
        self == AxisButtonState::Down
    }

    pub fn is_up(self) -> bool {
        self == AxisButtonState::Up
    }
}
