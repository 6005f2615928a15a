//! Button state tracking for one pad
//!
//! [`ButtonStateTracker`] answers held/down/up queries per [`Button`] role.
//! Digital roles are answered live by the provider. Axis roles keep an
//! [`AxisButtonState`] that [`poll_tick`](ButtonStateTracker::poll_tick)
//! advances once per frame.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use super::button::{AxisButtonState, Button};
use super::profile::{
    button_keycode, ButtonMapping, DeviceProfile, LEFT_STICK_HORIZONTAL, LEFT_STICK_VERTICAL,
};
use super::provider::InputSampleProvider;

/// Resolved source of one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMapping {
    Digital { source: String },
    Axis { source: String, reflected: bool },
}

#[derive(Debug, Clone)]
struct AxisEntry {
    source: String,
    reflected: bool,
    state: AxisButtonState,
}

#[derive(Debug, Clone, Default)]
pub struct ButtonStateTracker {
    digital: HashMap<Button, String>,
    axes: BTreeMap<Button, AxisEntry>,
    right_stick: Option<(String, String)>,
}

impl ButtonStateTracker {
    /// Builds a tracker from explicit role mappings. A later mapping of the same role wins.
    pub fn initialize(mappings: impl IntoIterator<Item = (Button, SourceMapping)>) -> Self {
        let mut tracker = Self::default();
        for (button, mapping) in mappings {
            tracker.register(button, mapping);
        }
        debug!(
            "Tracker initialized with {} digital and {} axis roles",
            tracker.digital.len(),
            tracker.axes.len()
        );
        tracker
    }

    /// Resolves a profile's button table into source identifiers for `joystick`
    pub fn from_profile(profile: &DeviceProfile, joystick: u8) -> Self {
        let mut mappings = Vec::with_capacity(profile.buttons.len());
        for button in Button::ALL {
            let Some(mapping) = profile.mapping(button) else {
                continue;
            };
            match mapping {
                ButtonMapping::Digital { id } => mappings.push((
                    button,
                    SourceMapping::Digital {
                        source: button_keycode(joystick, *id),
                    },
                )),
                ButtonMapping::Axis {
                    axis_index,
                    reflected,
                } => match profile.supported_axes.get(*axis_index) {
                    Some(axis) => mappings.push((
                        button,
                        SourceMapping::Axis {
                            source: axis.name.clone(),
                            reflected: *reflected,
                        },
                    )),
                    None => warn!(
                        "Profile '{}' maps {} to missing axis {}, leaving it unsupported",
                        profile.key, button, axis_index
                    ),
                },
            }
        }

        let mut tracker = Self::initialize(mappings);
        tracker.right_stick = profile.right_stick.and_then(|(x, y)| {
            let x = profile.supported_axes.get(x)?;
            let y = profile.supported_axes.get(y)?;
            Some((x.name.clone(), y.name.clone()))
        });

        info!(
            "Tracker built from profile '{}': {} of {} roles supported",
            profile.key,
            tracker.supported_buttons().count(),
            Button::ALL.len()
        );
        tracker
    }

    /// Registers or replaces the mapping of a single role
    pub fn register(&mut self, button: Button, mapping: SourceMapping) {
        match mapping {
            SourceMapping::Digital { source } => {
                self.axes.remove(&button);
                self.digital.insert(button, source);
            }
            SourceMapping::Axis { source, reflected } => {
                self.digital.remove(&button);
                self.axes.insert(
                    button,
                    AxisEntry {
                        source,
                        reflected,
                        state: AxisButtonState::Idle,
                    },
                );
            }
        }
    }

    /// Advances every axis-mapped role by one frame
    pub fn poll_tick<P: InputSampleProvider + ?Sized>(&mut self, provider: &P) {
        for (button, entry) in self.axes.iter_mut() {
            let mut amount = provider.axis_sample(&entry.source);
            if entry.reflected {
                amount = -amount;
            }
            let next = entry.state.next(amount);
            if next != entry.state {
                debug!("{}: {:?} -> {:?} ({:.3})", button, entry.state, next, amount);
            }
            entry.state = next;
        }
    }

    /// Returns all axis-mapped roles to `Idle`
    pub fn reset(&mut self) {
        for entry in self.axes.values_mut() {
            entry.state = AxisButtonState::Idle;
        }
    }

    pub fn is_supported(&self, button: Button) -> bool {
        self.digital.contains_key(&button) || self.axes.contains_key(&button)
    }

    pub fn supported_buttons(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(move |button| self.is_supported(*button))
    }

    /// State of an axis-mapped role; `None` for digital or unsupported roles
    pub fn axis_state(&self, button: Button) -> Option<AxisButtonState> {
        self.axes.get(&button).map(|entry| entry.state)
    }

    pub fn mapping(&self, button: Button) -> Option<SourceMapping> {
        if let Some(source) = self.digital.get(&button) {
            return Some(SourceMapping::Digital {
                source: source.clone(),
            });
        }
        self.axes.get(&button).map(|entry| SourceMapping::Axis {
            source: entry.source.clone(),
            reflected: entry.reflected,
        })
    }

    pub fn is_held<P: InputSampleProvider + ?Sized>(&self, provider: &P, button: Button) -> bool {
        match self.digital.get(&button) {
            Some(source) => provider.key_held(source),
            None => self
                .axis_state(button)
                .map(AxisButtonState::is_held)
                .unwrap_or(false),
        }
    }

    pub fn is_down<P: InputSampleProvider + ?Sized>(&self, provider: &P, button: Button) -> bool {
        match self.digital.get(&button) {
            Some(source) => provider.key_down(source),
            None => self
                .axis_state(button)
                .map(AxisButtonState::is_down)
                .unwrap_or(false),
        }
    }

    pub fn is_up<P: InputSampleProvider + ?Sized>(&self, provider: &P, button: Button) -> bool {
        match self.digital.get(&button) {
            Some(source) => provider.key_up(source),
            None => self
                .axis_state(button)
                .map(AxisButtonState::is_up)
                .unwrap_or(false),
        }
    }

    pub fn left_stick<P: InputSampleProvider + ?Sized>(&self, provider: &P) -> (f32, f32) {
        (
            provider.axis_sample(LEFT_STICK_HORIZONTAL),
            provider.axis_sample(LEFT_STICK_VERTICAL),
        )
    }

    /// Right stick position, `(0.0, 0.0)` if the profile has none
    pub fn right_stick<P: InputSampleProvider + ?Sized>(&self, provider: &P) -> (f32, f32) {
        match &self.right_stick {
            Some((x, y)) => (provider.axis_sample(x), provider.axis_sample(y)),
            None => (0.0, 0.0),
        }
    }
}
