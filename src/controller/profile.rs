//! Device profiles
//!
//! A [`DeviceProfile`] describes one physical pad as plain data: the device
//! name the driver reports, the axes it needs (in the shape of an input
//! manager axis entry) and a table mapping each [`Button`] role either to a
//! raw button number or to one of the profile's axes.
//!
//! Profiles are values. The built-in set mirrors the pads this crate has
//! been tested with; further profiles can be supplied through the
//! configuration file and are merged into a [`ProfileCatalog`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::button::Button;

/// Source name of the left stick horizontal axis, shared by all profiles
pub const LEFT_STICK_HORIZONTAL: &str = "Horizontal";
/// Source name of the left stick vertical axis, shared by all profiles
pub const LEFT_STICK_VERTICAL: &str = "Vertical";

/// Key of the profile used when no connected device is recognised
pub const STANDARD_PROFILE_KEY: &str = "standard";

// Axis type, numbered like the input manager does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisType {
    KeyOrMouseButton,
    MouseMovement,
    #[default]
    JoystickAxis,
}

/// Definition of a named axis
///
/// `axis` is the zero-based raw axis number on the device. For
/// [`AxisType::KeyOrMouseButton`] the value is synthesised from
/// `positive_button` / `negative_button` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisDefinition {
    pub name: String,
    pub descriptive_name: String,
    pub descriptive_negative_name: String,
    pub negative_button: String,
    pub positive_button: String,
    pub dead_zone: f32,
    pub sensitivity: f32,
    pub invert: bool,
    pub axis_type: AxisType,
    pub axis: u8,
    pub joystick_number: u8,
}

impl Default for AxisDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            descriptive_name: String::new(),
            descriptive_negative_name: String::new(),
            negative_button: String::new(),
            positive_button: String::new(),
            dead_zone: 0.0,
            sensitivity: 1.0,
            invert: false,
            axis_type: AxisType::JoystickAxis,
            axis: 0,
            joystick_number: 0,
        }
    }
}

impl AxisDefinition {
    /// Joystick axis reading raw axis `axis`
    pub fn joystick(name: impl Into<String>, descriptive_name: impl Into<String>, axis: u8) -> Self {
        Self {
            name: name.into(),
            descriptive_name: descriptive_name.into(),
            axis,
            ..Default::default()
        }
    }

    /// Axis synthesised from a positive (and optional negative) button
    pub fn buttons(
        name: impl Into<String>,
        positive_button: impl Into<String>,
        negative_button: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            positive_button: positive_button.into(),
            negative_button: negative_button.into(),
            axis_type: AxisType::KeyOrMouseButton,
            ..Default::default()
        }
    }

    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// The two left stick axes every profile reads from
    pub fn left_stick() -> [AxisDefinition; 2] {
        [
            AxisDefinition::joystick(LEFT_STICK_HORIZONTAL, "Left stick horizontal", 0),
            AxisDefinition::joystick(LEFT_STICK_VERTICAL, "Left stick vertical", 1),
        ]
    }
}

/// How a role is driven on a particular device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonMapping {
    /// Raw device button number
    Digital { id: u32 },
    /// Index into [`DeviceProfile::supported_axes`]; `reflected` uses the negative half
    Axis {
        axis_index: usize,
        #[serde(default)]
        reflected: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: Button,
    pub mapping: ButtonMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Short identifier used in configuration
    pub key: String,
    /// Name reported by the driver; an empty name is never matched
    pub device_name: String,
    /// Indices of the right stick x/y axes in `supported_axes`
    #[serde(default)]
    pub right_stick: Option<(usize, usize)>,
    #[serde(default)]
    pub supported_axes: Vec<AxisDefinition>,
    #[serde(default)]
    pub buttons: Vec<ButtonBinding>,
}

impl DeviceProfile {
    fn new(key: &str, device_name: &str) -> Self {
        Self {
            key: key.to_string(),
            device_name: device_name.to_string(),
            right_stick: None,
            supported_axes: Vec::new(),
            buttons: Vec::new(),
        }
    }

    fn axes(mut self, axes: Vec<AxisDefinition>, right_stick: Option<(usize, usize)>) -> Self {
        self.supported_axes = axes;
        self.right_stick = right_stick;
        self
    }

    fn digital(mut self, button: Button, id: u32) -> Self {
        self.buttons.push(ButtonBinding {
            button,
            mapping: ButtonMapping::Digital { id },
        });
        self
    }

    fn axis(mut self, button: Button, axis_index: usize, reflected: bool) -> Self {
        self.buttons.push(ButtonBinding {
            button,
            mapping: ButtonMapping::Axis {
                axis_index,
                reflected,
            },
        });
        self
    }

    /// Looks up the mapping of `button`; the last binding for a role wins
    pub fn mapping(&self, button: Button) -> Option<&ButtonMapping> {
        self.buttons
            .iter()
            .rev()
            .find(|binding| binding.button == button)
            .map(|binding| &binding.mapping)
    }

    /// Whether the device this profile claims is in `connected`; an empty name never is
    pub fn is_present(&self, connected: &[String]) -> bool {
        !self.device_name.is_empty() && is_connected(&self.device_name, connected)
    }

    /// Axis definitions a provider needs to serve this profile, left stick included
    pub fn axis_definitions(&self) -> Vec<AxisDefinition> {
        let mut axes: Vec<AxisDefinition> = AxisDefinition::left_stick().into();
        axes.extend(self.supported_axes.iter().cloned());
        axes
    }

    /// Sony DualShock 3; every role is a real button
    pub fn dualshock3() -> Self {
        const NAME: &str = "Sony PLAYSTATION(R)3 Controller";
        DeviceProfile::new("dualshock3", NAME)
            .axes(
                vec![
                    AxisDefinition::joystick(format!("{NAME}_RightX"), "PS3 right horizontal input", 2)
                        .with_dead_zone(0.19),
                    AxisDefinition::joystick(format!("{NAME}_RightY"), "PS3 right vertical input", 3)
                        .with_dead_zone(0.19)
                        .inverted(),
                ],
                Some((0, 1)),
            )
            .digital(Button::Select, 0)
            .digital(Button::Start, 3)
            .digital(Button::System, 16)
            .digital(Button::L1, 10)
            .digital(Button::L2, 8)
            .digital(Button::L3, 1)
            .digital(Button::R1, 11)
            .digital(Button::R2, 9)
            .digital(Button::R3, 2)
            .digital(Button::DPadUp, 4)
            .digital(Button::DPadDown, 6)
            .digital(Button::DPadLeft, 7)
            .digital(Button::DPadRight, 5)
            .digital(Button::ActionA, 14) // Cross
            .digital(Button::ActionB, 13) // Circle
            .digital(Button::ActionC, 15) // Square
            .digital(Button::ActionD, 12) // Triangle
    }

    /// Xbox 360 pad on Windows; triggers share one axis and the dpad is two axes
    pub fn xbox360_windows() -> Self {
        const NAME: &str = "Controller (XBOX 360 For Windows)";
        DeviceProfile::new("xbox360_windows", NAME)
            .axes(
                vec![
                    AxisDefinition::joystick(format!("{NAME}_Trigger"), "Xbox triggers", 2),
                    AxisDefinition::joystick(format!("{NAME}_RightX"), "Xbox right horizontal input", 3),
                    AxisDefinition::joystick(format!("{NAME}_RightY"), "Xbox right vertical input", 4),
                    AxisDefinition::joystick(format!("{NAME}_DpadX"), "Xbox dpad horizontal", 5),
                    AxisDefinition::joystick(format!("{NAME}_DpadY"), "Xbox dpad vertical", 6),
                ],
                Some((1, 2)),
            )
            .digital(Button::Select, 6) // Back
            .digital(Button::Start, 7)
            // System is reserved by the OS
            .digital(Button::L1, 4)
            .axis(Button::L2, 0, false)
            .digital(Button::L3, 8)
            .digital(Button::R1, 5)
            .axis(Button::R2, 0, true)
            .digital(Button::R3, 9)
            .axis(Button::DPadUp, 4, false)
            .axis(Button::DPadDown, 4, true)
            .axis(Button::DPadLeft, 3, true)
            .axis(Button::DPadRight, 3, false)
            .digital(Button::ActionA, 0)
            .digital(Button::ActionB, 1)
            .digital(Button::ActionC, 2)
            .digital(Button::ActionD, 3)
    }

    /// Xbox 360 pad on macOS through the TattieBogle driver.
    ///
    /// That driver reports no device name, so this profile is only reachable
    /// through `preferred_profile` in the configuration.
    pub fn xbox360_tattiebogle() -> Self {
        DeviceProfile::new("xbox360_tattiebogle", "")
            .axes(
                vec![
                    AxisDefinition::joystick("TattieBogle_RightX", "Xbox right horizontal input", 2),
                    AxisDefinition::joystick("TattieBogle_RightY", "Xbox right vertical input", 3),
                    AxisDefinition::joystick("TattieBogle_LeftTrigger", "Xbox left trigger", 4),
                    AxisDefinition::joystick("TattieBogle_RightTrigger", "Xbox right trigger", 5),
                ],
                Some((0, 1)),
            )
            .digital(Button::Select, 10)
            .digital(Button::Start, 9)
            .digital(Button::System, 15)
            .digital(Button::L1, 13)
            .axis(Button::L2, 2, false)
            .digital(Button::L3, 11)
            .digital(Button::R1, 14)
            .axis(Button::R2, 3, false)
            .digital(Button::R3, 12)
            .digital(Button::DPadUp, 5)
            .digital(Button::DPadDown, 6)
            .digital(Button::DPadLeft, 7)
            .digital(Button::DPadRight, 8)
            .digital(Button::ActionA, 16)
            .digital(Button::ActionB, 17)
            .digital(Button::ActionC, 18)
            .digital(Button::ActionD, 19)
    }

    /// Fallback profile with only the four action buttons, read as axes
    pub fn standard() -> Self {
        DeviceProfile::new(STANDARD_PROFILE_KEY, "")
            .axes(
                vec![
                    AxisDefinition::joystick("Mouse X", "Right horizontal input", 3),
                    AxisDefinition::joystick("Mouse Y", "Right vertical input", 4),
                    AxisDefinition::buttons("Fire1", button_keycode(0, 0), ""),
                    AxisDefinition::buttons("Fire2", button_keycode(0, 1), ""),
                    AxisDefinition::buttons("Fire3", button_keycode(0, 2), ""),
                    AxisDefinition::buttons("Jump", button_keycode(0, 3), ""),
                ],
                Some((0, 1)),
            )
            .axis(Button::ActionA, 2, false)
            .axis(Button::ActionB, 3, false)
            .axis(Button::ActionC, 4, false)
            .axis(Button::ActionD, 5, false)
    }
}

/// Source identifier of raw button `id` on joystick `joystick`.
///
/// Joystick 0 stands for "any joystick".
pub fn button_keycode(joystick: u8, id: u32) -> String {
    if joystick > 0 {
        format!("joystick {joystick} button {id}")
    } else {
        format!("joystick button {id}")
    }
}

/// Parses a keycode produced by [`button_keycode`] back into (joystick, id)
pub fn parse_button_keycode(keycode: &str) -> Option<(u8, u32)> {
    let rest = keycode.strip_prefix("joystick ")?;
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["button", id] => Some((0, id.parse().ok()?)),
        [joystick, "button", id] => Some((joystick.parse().ok()?, id.parse().ok()?)),
        _ => None,
    }
}

/// Exact device name match against the connected device list
pub fn is_connected(device_name: &str, connected: &[String]) -> bool {
    connected.iter().any(|name| name == device_name)
}

/// Ordered set of known profiles plus the fallback
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<DeviceProfile>,
    fallback: DeviceProfile,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                DeviceProfile::dualshock3(),
                DeviceProfile::xbox360_windows(),
                DeviceProfile::xbox360_tattiebogle(),
            ],
            fallback: DeviceProfile::standard(),
        }
    }

    /// Adds user profiles ahead of the built-in ones so they take precedence
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = DeviceProfile>) -> Self {
        let mut profiles: Vec<DeviceProfile> = extra.into_iter().collect();
        debug!("Adding {} extra device profiles", profiles.len());
        profiles.append(&mut self.profiles);
        self.profiles = profiles;
        self
    }

    pub fn get(&self, key: &str) -> Option<&DeviceProfile> {
        self.profiles
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|profile| profile.key == key)
    }

    pub fn fallback(&self) -> &DeviceProfile {
        &self.fallback
    }

    /// Profiles whose device is connected, in catalog order, fallback last
    pub fn connected(&self, connected: &[String]) -> Vec<&DeviceProfile> {
        let mut found: Vec<&DeviceProfile> = self
            .profiles
            .iter()
            .filter(|profile| profile.is_present(connected))
            .collect();
        found.push(&self.fallback);
        found
    }

    /// Picks the profile to drive: the preferred key if known, else the first connected match
    pub fn select(&self, connected: &[String], preferred: Option<&str>) -> &DeviceProfile {
        if let Some(key) = preferred {
            if let Some(profile) = self.get(key) {
                info!("Using preferred device profile '{}'", profile.key);
                return profile;
            }
            info!("Preferred profile '{}' is unknown, detecting instead", key);
        }

        let candidates = self.connected(connected);
        let profile = candidates[0];
        info!(
            "Selected device profile '{}' from {} connected devices",
            profile.key,
            connected.len()
        );
        profile
    }
}
