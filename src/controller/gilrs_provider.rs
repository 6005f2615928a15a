//! gilrs-backed input provider
//!
//! gilrs already normalises every pad to a standard layout. Profiles,
//! however, speak in raw button and axis numbers as the platform driver
//! enumerates them, so each profile gets a [`RawLayout`] that translates
//! those numbers back onto gilrs' standard buttons and axes.

use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

use super::profile::{parse_button_keycode, AxisDefinition, AxisType, DeviceProfile};
use super::provider::InputSampleProvider;

// Provider errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Failed to initialize input provider: {0}")]
    InitializationError(String),
}

/// Where a raw axis number reads its value from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawAxis {
    Stick(Axis),
    /// Analogue button value, positive minus negative
    Split(Button, Option<Button>),
}

/// Raw button/axis numbering of one driver
#[derive(Debug, Clone, Default)]
pub struct RawLayout {
    buttons: HashMap<u32, Button>,
    axes: HashMap<u8, RawAxis>,
}

impl RawLayout {
    fn new(buttons: &[(u32, Button)], axes: &[(u8, RawAxis)]) -> Self {
        let mut layout = Self {
            buttons: buttons.iter().copied().collect(),
            axes: axes.iter().copied().collect(),
        };
        // Left stick is always the first two axes
        layout.axes.insert(0, RawAxis::Stick(Axis::LeftStickX));
        layout.axes.insert(1, RawAxis::Stick(Axis::LeftStickY));
        layout
    }

    /// Xbox 360 numbering, also used for unknown profiles
    pub fn xbox() -> Self {
        Self::new(
            &[
                (0, Button::South),
                (1, Button::East),
                (2, Button::West),
                (3, Button::North),
                (4, Button::LeftTrigger),
                (5, Button::RightTrigger),
                (6, Button::Select),
                (7, Button::Start),
                (8, Button::LeftThumb),
                (9, Button::RightThumb),
            ],
            &[
                (
                    2,
                    RawAxis::Split(Button::LeftTrigger2, Some(Button::RightTrigger2)),
                ),
                (3, RawAxis::Stick(Axis::RightStickX)),
                (4, RawAxis::Stick(Axis::RightStickY)),
                (5, RawAxis::Split(Button::DPadRight, Some(Button::DPadLeft))),
                (6, RawAxis::Split(Button::DPadUp, Some(Button::DPadDown))),
            ],
        )
    }

    pub fn dualshock3() -> Self {
        Self::new(
            &[
                (0, Button::Select),
                (1, Button::LeftThumb),
                (2, Button::RightThumb),
                (3, Button::Start),
                (4, Button::DPadUp),
                (5, Button::DPadRight),
                (6, Button::DPadDown),
                (7, Button::DPadLeft),
                (8, Button::LeftTrigger2),
                (9, Button::RightTrigger2),
                (10, Button::LeftTrigger),
                (11, Button::RightTrigger),
                (12, Button::North),
                (13, Button::East),
                (14, Button::South),
                (15, Button::West),
                (16, Button::Mode),
            ],
            &[
                (2, RawAxis::Stick(Axis::RightStickX)),
                (3, RawAxis::Stick(Axis::RightStickY)),
            ],
        )
    }

    pub fn tattiebogle() -> Self {
        Self::new(
            &[
                (5, Button::DPadUp),
                (6, Button::DPadDown),
                (7, Button::DPadLeft),
                (8, Button::DPadRight),
                (9, Button::Start),
                (10, Button::Select),
                (11, Button::LeftThumb),
                (12, Button::RightThumb),
                (13, Button::LeftTrigger),
                (14, Button::RightTrigger),
                (15, Button::Mode),
                (16, Button::South),
                (17, Button::East),
                (18, Button::West),
                (19, Button::North),
            ],
            &[
                (2, RawAxis::Stick(Axis::RightStickX)),
                (3, RawAxis::Stick(Axis::RightStickY)),
                (4, RawAxis::Split(Button::LeftTrigger2, None)),
                (5, RawAxis::Split(Button::RightTrigger2, None)),
            ],
        )
    }

    pub fn for_profile(profile: &DeviceProfile) -> Self {
        match profile.key.as_str() {
            "dualshock3" => Self::dualshock3(),
            "xbox360_tattiebogle" => Self::tattiebogle(),
            _ => Self::xbox(),
        }
    }

    pub fn button(&self, id: u32) -> Option<Button> {
        self.buttons.get(&id).copied()
    }

    pub fn axis(&self, number: u8) -> Option<RawAxis> {
        self.axes.get(&number).copied()
    }
}

/// Provider reading the first connected gamepad through gilrs
pub struct GilrsInput {
    gilrs: Gilrs,

    // Gamepad all queries are answered from
    active_gamepad: Option<GamepadId>,

    layout: RawLayout,
    axes: HashMap<String, AxisDefinition>,

    // Raw button ids pressed in the current and previous frame
    held: HashSet<u32>,
    previous_held: HashSet<u32>,
}

impl GilrsInput {
    pub fn create() -> Result<Self, ProviderError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(ProviderError::InitializationError(e.to_string()));
            }
        };

        let mut input = Self {
            gilrs,
            active_gamepad: None,
            layout: RawLayout::xbox(),
            axes: HashMap::new(),
            held: HashSet::new(),
            previous_held: HashSet::new(),
        };
        input.select_gamepad();
        Ok(input)
    }

    // TODO: follow the configured joystick number instead of the first pad
    fn select_gamepad(&mut self) {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, continuing in idle mode");
            self.active_gamepad = None;
            return;
        }

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
        }
        let (id, gamepad) = &gamepads[0];
        self.active_gamepad = Some(*id);
        info!("Selected gamepad: {} ({})", gamepad.name(), id);
    }

    fn gamepad(&self) -> Option<Gamepad<'_>> {
        self.active_gamepad
            .and_then(|id| self.gilrs.connected_gamepad(id))
    }

    fn raw_axis_value(&self, gamepad: &Gamepad<'_>, number: u8) -> f32 {
        match self.layout.axis(number) {
            Some(RawAxis::Stick(axis)) => gamepad.value(axis),
            Some(RawAxis::Split(positive, negative)) => {
                let value = |button: Button| {
                    gamepad
                        .button_data(button)
                        .map(|data| data.value())
                        .unwrap_or(0.0)
                };
                value(positive) - negative.map(value).unwrap_or(0.0)
            }
            None => 0.0,
        }
    }

    fn key_id(source: &str) -> Option<u32> {
        parse_button_keycode(source).map(|(_, id)| id)
    }

    fn keycode_value(&self, keycode: &str) -> f32 {
        match Self::key_id(keycode) {
            Some(id) if self.held.contains(&id) => 1.0,
            _ => 0.0,
        }
    }
}

impl InputSampleProvider for GilrsInput {
    fn use_profile(&mut self, profile: &DeviceProfile) {
        info!("Configuring gilrs input for profile '{}'", profile.key);
        self.layout = RawLayout::for_profile(profile);
        self.axes = profile
            .axis_definitions()
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        debug!("Registered {} axis definitions", self.axes.len());
    }

    fn pump(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    info!("Controller connected event detected: {}", id);
                    if self.active_gamepad.is_none() {
                        self.active_gamepad = Some(id);
                    }
                }
                EventType::Disconnected => {
                    warn!("Controller disconnected event detected: {}", id);
                    if self.active_gamepad == Some(id) {
                        self.select_gamepad();
                    }
                }
                _ => {}
            }
        }

        let held: HashSet<u32> = match self.gamepad() {
            Some(gamepad) => self
                .layout
                .buttons
                .iter()
                .filter(|(_, button)| gamepad.is_pressed(**button))
                .map(|(id, _)| *id)
                .collect(),
            None => HashSet::new(),
        };
        self.previous_held = std::mem::replace(&mut self.held, held);
    }

    fn axis_sample(&self, source: &str) -> f32 {
        let Some(definition) = self.axes.get(source) else {
            return 0.0;
        };

        let raw = match definition.axis_type {
            AxisType::JoystickAxis => match self.gamepad() {
                Some(gamepad) => self.raw_axis_value(&gamepad, definition.axis),
                None => 0.0,
            },
            AxisType::KeyOrMouseButton => {
                self.keycode_value(&definition.positive_button)
                    - self.keycode_value(&definition.negative_button)
            }
            AxisType::MouseMovement => 0.0,
        };

        let raw = if definition.invert { -raw } else { raw };
        (apply_deadzone(raw, definition.dead_zone) * definition.sensitivity).clamp(-1.0, 1.0)
    }

    fn key_down(&self, source: &str) -> bool {
        Self::key_id(source)
            .map(|id| self.held.contains(&id) && !self.previous_held.contains(&id))
            .unwrap_or(false)
    }

    fn key_up(&self, source: &str) -> bool {
        Self::key_id(source)
            .map(|id| !self.held.contains(&id) && self.previous_held.contains(&id))
            .unwrap_or(false)
    }

    fn key_held(&self, source: &str) -> bool {
        Self::key_id(source)
            .map(|id| self.held.contains(&id))
            .unwrap_or(false)
    }

    fn connected_devices(&self) -> Vec<String> {
        self.gilrs
            .gamepads()
            .map(|(_, gamepad)| gamepad.name().to_string())
            .collect()
    }
}

// Helper function to apply deadzone to analog values
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if deadzone >= 1.0 || value.abs() < deadzone {
        0.0
    } else {
        // Rescale the value to the range outside the deadzone
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}
