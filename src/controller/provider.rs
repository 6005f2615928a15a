//! Input sample providers
//!
//! The tracker never talks to a driver directly. Everything it needs per
//! frame goes through [`InputSampleProvider`], keyed by the source
//! identifiers a [`DeviceProfile`](super::profile::DeviceProfile) resolves to.

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use super::profile::DeviceProfile;

/// Per-frame input source consumed by the tracker
///
/// Unknown sources are not an error: they read as `0.0` / `false`.
pub trait InputSampleProvider {
    /// Prepares the provider to serve the sources of `profile`
    fn use_profile(&mut self, _profile: &DeviceProfile) {}

    /// Advances the provider by one frame. Edge queries refer to the last pump.
    fn pump(&mut self) {}

    fn axis_sample(&self, source: &str) -> f32;

    fn key_down(&self, source: &str) -> bool;

    fn key_up(&self, source: &str) -> bool;

    fn key_held(&self, source: &str) -> bool;

    /// Names of all devices currently connected
    fn connected_devices(&self) -> Vec<String>;
}

/// In-memory provider driven by the caller
///
/// Key presses and axis values take effect on the next [`pump`](InputSampleProvider::pump),
/// so a press is visible as `key_down` for exactly one frame.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    devices: Vec<String>,
    axes: HashMap<String, f32>,
    queued_axes: HashMap<String, VecDeque<f32>>,
    held: HashSet<String>,
    next_held: HashSet<String>,
    down: HashSet<String>,
    up: HashSet<String>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.devices.push(name.into());
        self
    }

    /// Sets an axis value that persists until changed
    pub fn set_axis(&mut self, source: &str, value: f32) {
        self.axes.insert(source.to_string(), value);
    }

    /// Queues one axis value per upcoming frame
    pub fn queue_axis(&mut self, source: &str, values: impl IntoIterator<Item = f32>) {
        self.queued_axes
            .entry(source.to_string())
            .or_default()
            .extend(values);
    }

    pub fn press(&mut self, source: &str) {
        self.next_held.insert(source.to_string());
    }

    pub fn release(&mut self, source: &str) {
        self.next_held.remove(source);
    }
}

impl InputSampleProvider for ScriptedInput {
    fn pump(&mut self) {
        for (source, queue) in self.queued_axes.iter_mut() {
            if let Some(value) = queue.pop_front() {
                self.axes.insert(source.clone(), value);
            }
        }

        self.down = self.next_held.difference(&self.held).cloned().collect();
        self.up = self.held.difference(&self.next_held).cloned().collect();
        self.held = self.next_held.clone();

        if !self.down.is_empty() || !self.up.is_empty() {
            debug!("Scripted input edges: down={:?} up={:?}", self.down, self.up);
        }
    }

    fn axis_sample(&self, source: &str) -> f32 {
        self.axes.get(source).copied().unwrap_or(0.0)
    }

    fn key_down(&self, source: &str) -> bool {
        self.down.contains(source)
    }

    fn key_up(&self, source: &str) -> bool {
        self.up.contains(source)
    }

    fn key_held(&self, source: &str) -> bool {
        self.held.contains(source)
    }

    fn connected_devices(&self) -> Vec<String> {
        self.devices.clone()
    }
}
