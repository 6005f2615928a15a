//! Pad Handle - frame driver for the button tracker and role demo
//!
//! Owns the input provider, the [`ButtonStateTracker`] and the
//! [`RoleDemo`] inside a single task and advances them once per frame.
//! Everything outside that task only sees [`PadSnapshot`]s published on a
//! watch channel.
//!
//! # Architecture
//!
//! ```text
//! Provider ──pump──► Tracker ──► RoleDemo / ButtonReport ──► PadSnapshot
//!                  (poll_tick)                               (watch channel)
//! ```
//!
//! The session is a two-state machine: `Detecting` lists the connected
//! devices and picks a profile, `Polling` runs the per-frame update.

use chrono::{DateTime, Local};
use statum::{machine, state};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::button::Button;
use super::gilrs_provider::{GilrsInput, ProviderError};
use super::profile::ProfileCatalog;
use super::provider::InputSampleProvider;
use super::report::ButtonReport;
use super::tracker::ButtonStateTracker;
use crate::config::AppConfig;
use crate::demo::{EntityId, RoleDemo};
use crate::monitor::Role;

/// Provider type the driver task can own
pub type BoxedProvider = Box<dyn InputSampleProvider + Send>;

/// Frame driver settings, split out of [`AppConfig`]
///
/// # Examples
///
/// ```rust
/// use rolepad::config::AppConfig;
/// use rolepad::controller::PadSettings;
///
/// let settings = PadSettings::from(&AppConfig::default());
/// assert_eq!(settings.tick_interval_ms, 16);
/// assert_eq!(settings.max_ticks, None);
/// ```
#[derive(Clone, Debug)]
pub struct PadSettings {
    /// Frame length in milliseconds; also the `dt` handed to the monitor
    pub tick_interval_ms: u64,

    /// Joystick number baked into button keycodes
    pub joystick_number: u8,

    /// Profile key that overrides device detection
    pub preferred_profile: Option<String>,

    /// Frames between report dumps, 0 to disable
    pub report_interval_ticks: u64,

    /// Stop after this many frames
    pub max_ticks: Option<u64>,
}

impl Default for PadSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PadSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            tick_interval_ms: config.tick_interval_ms,
            joystick_number: config.joystick_number,
            preferred_profile: config.preferred_profile.clone(),
            report_interval_ticks: config.report_interval_ticks,
            max_ticks: None,
        }
    }
}

/// Errors that can occur while starting or running the pad driver
#[derive(Debug, thiserror::Error)]
pub enum PadError {
    /// Input provider could not be created
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    /// Snapshot channel has no receivers left
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Driver task panicked or was aborted
    #[error("Task error: {0}")]
    TaskError(String),
}

/// State of the pad published once per frame
#[derive(Clone, Debug)]
pub struct PadSnapshot {
    pub profile: String,
    pub tick: u64,

    pub left_stick: (f32, f32),
    pub right_stick: (f32, f32),

    pub held: Vec<Button>,
    pub down: Vec<Button>,
    pub up: Vec<Button>,

    /// Active monitor roles in activation order with their age in seconds
    pub active_roles: Vec<(Role, EntityId, f32)>,

    pub timestamp: DateTime<Local>,
}

impl Default for PadSnapshot {
    fn default() -> Self {
        Self {
            profile: String::new(),
            tick: 0,
            left_stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
            held: Vec::new(),
            down: Vec::new(),
            up: Vec::new(),
            active_roles: Vec::new(),
            timestamp: Local::now(),
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Detecting,
    Polling,
}

#[machine]
pub struct PadSession<S: SessionState> {
    // Source of all input samples
    provider: BoxedProvider,

    settings: PadSettings,

    // Built-in plus configured profiles
    catalog: ProfileCatalog,

    // Key of the profile in use, empty while detecting
    profile_key: String,

    // Device names seen at detection or on the last device change
    devices: Vec<String>,

    tracker: ButtonStateTracker,
    demo: RoleDemo,
    report: ButtonReport,

    snapshot_sender: watch::Sender<PadSnapshot>,

    // Frames run so far
    ticks: u64,
}

impl<S: SessionState> PadSession<S> {
    pub fn subscribe(&self) -> watch::Receiver<PadSnapshot> {
        self.snapshot_sender.subscribe()
    }

    pub fn settings(&self) -> &PadSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &ButtonStateTracker {
        &self.tracker
    }

    pub fn demo(&self) -> &RoleDemo {
        &self.demo
    }
}

impl PadSession<Detecting> {
    pub fn create(
        provider: BoxedProvider,
        settings: Option<PadSettings>,
        catalog: ProfileCatalog,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        info!("Creating pad session with settings: {:?}", settings);

        let (snapshot_sender, _) = watch::channel(PadSnapshot::default());
        debug!("Created watch channel for pad snapshots");

        Self::new(
            provider,
            settings,
            catalog,
            String::new(),
            Vec::new(),
            ButtonStateTracker::default(),
            RoleDemo::new(),
            ButtonReport::new(),
            snapshot_sender,
            0,
        )
    }

    /// Picks a profile for the connected devices and transitions to `Polling`
    pub fn detect(mut self) -> PadSession<Polling> {
        let connected = self.provider.connected_devices();
        if connected.is_empty() {
            warn!("No devices connected, falling back to the standard profile");
        } else {
            info!("{} connected devices:", connected.len());
            for (idx, name) in connected.iter().enumerate() {
                info!("  [{}] {}", idx, name);
            }
        }

        let profile = self
            .catalog
            .select(&connected, self.settings.preferred_profile.as_deref())
            .clone();

        self.provider.use_profile(&profile);
        self.tracker = ButtonStateTracker::from_profile(&profile, self.settings.joystick_number);
        self.profile_key = profile.key;
        self.devices = connected;

        for button in Button::ALL {
            if !self.tracker.is_supported(button) {
                debug!("{} unsupported by profile '{}'", button, self.profile_key);
            }
        }

        info!("Pad session detected, transitioning to Polling state");
        self.transition()
    }
}

impl PadSession<Polling> {
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one frame and publishes the resulting snapshot
    pub fn tick(&mut self) -> Result<(), PadError> {
        let dt = self.settings.tick_interval_ms as f32 / 1000.0;
        let now = Local::now();

        self.provider.pump();

        let devices = self.provider.connected_devices();
        if devices != self.devices {
            warn!(
                "Connected devices changed from {:?} to {:?}, resetting button states",
                self.devices, devices
            );
            self.tracker.reset();
            self.devices = devices;
        }

        let provider = self.provider.as_ref();

        self.tracker.poll_tick(provider);
        self.demo.step(&self.tracker, provider, dt);
        self.report.collect(&self.tracker, provider, now);
        self.ticks += 1;

        let interval = self.settings.report_interval_ticks;
        if interval > 0 && self.ticks % interval == 0 {
            info!("Button report after {} frames:", self.ticks);
            for line in self.report.lines() {
                info!("  {}", line);
            }
        }

        let snapshot = self.snapshot(now);
        if !snapshot.down.is_empty() || !snapshot.up.is_empty() {
            debug!(
                "Frame {}: down={:?} up={:?}",
                snapshot.tick, snapshot.down, snapshot.up
            );
        }

        match self.snapshot_sender.send(snapshot) {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to publish pad snapshot: {}", e);
                Err(PadError::ChannelError(format!(
                    "Failed to send pad snapshot: {}",
                    e
                )))
            }
        }
    }

    fn snapshot(&self, now: DateTime<Local>) -> PadSnapshot {
        let provider = self.provider.as_ref();

        let mut held = Vec::new();
        let mut down = Vec::new();
        let mut up = Vec::new();
        for button in self.tracker.supported_buttons() {
            if self.tracker.is_held(provider, button) {
                held.push(button);
            }
            if self.tracker.is_down(provider, button) {
                down.push(button);
            }
            if self.tracker.is_up(provider, button) {
                up.push(button);
            }
        }

        PadSnapshot {
            profile: self.profile_key.clone(),
            tick: self.ticks,
            left_stick: self.tracker.left_stick(provider),
            right_stick: self.tracker.right_stick(provider),
            held,
            down,
            up,
            active_roles: self
                .demo
                .monitor()
                .active_slots()
                .map(|(role, entity, age)| (role, *entity, age))
                .collect(),
            timestamp: now,
        }
    }
}

/// Handle for the spawned pad driver task
pub struct PadHandle {
    snapshot_receiver: watch::Receiver<PadSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), PadError>>,
}

impl PadHandle {
    /// Detects the pad and spawns the frame loop as a tokio task
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use rolepad::controller::{PadHandle, PadSettings, ProfileCatalog, ScriptedInput};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let settings = PadSettings { max_ticks: Some(60), ..Default::default() };
    /// let handle = PadHandle::spawn(
    ///     Box::new(ScriptedInput::new()),
    ///     Some(settings),
    ///     ProfileCatalog::builtin(),
    /// );
    /// let mut snapshots = handle.subscribe();
    /// snapshots.changed().await?;
    /// handle.join().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(
        provider: BoxedProvider,
        settings: Option<PadSettings>,
        catalog: ProfileCatalog,
    ) -> Self {
        info!("Spawning pad driver");
        let session = PadSession::create(provider, settings, catalog).detect();
        let snapshot_receiver = session.subscribe();

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let result = run_session_loop(session, task_cancel).await;
            match &result {
                Ok(()) => info!("Pad driver task finished"),
                Err(e) => error!("Pad driver task terminated with error: {}", e),
            }
            result
        });

        info!("Pad driver successfully started");
        Self {
            snapshot_receiver,
            cancel,
            task,
        }
    }

    /// Opens the first gamepad through gilrs and spawns the frame loop on it
    pub fn spawn_gilrs(
        settings: Option<PadSettings>,
        catalog: ProfileCatalog,
    ) -> Result<Self, PadError> {
        let input = GilrsInput::create()?;
        Ok(Self::spawn(Box::new(input), settings, catalog))
    }

    pub fn subscribe(&self) -> watch::Receiver<PadSnapshot> {
        self.snapshot_receiver.clone()
    }

    /// Latest published snapshot
    pub fn latest(&self) -> PadSnapshot {
        self.snapshot_receiver.borrow().clone()
    }

    /// Signals the loop to stop without waiting for it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that stops the loop when cancelled, for use from other tasks
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the loop to finish
    pub async fn join(self) -> Result<(), PadError> {
        self.task
            .await
            .map_err(|e| PadError::TaskError(format!("Pad driver task failed: {}", e)))?
    }

    /// Stops the loop and waits for it
    pub async fn shutdown(self) -> Result<(), PadError> {
        info!("Shutting down pad driver");
        self.cancel();
        self.join().await
    }
}

async fn run_session_loop(
    mut session: PadSession<Polling>,
    cancel: CancellationToken,
) -> Result<(), PadError> {
    let settings = session.settings().clone();
    let period = settings.tick_interval_ms.max(1);
    info!("Starting pad loop with {}ms frames", period);

    let mut interval_timer = tokio::time::interval(tokio::time::Duration::from_millis(period));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Pad loop cancelled after {} frames", session.ticks());
                return Ok(());
            }
            _ = interval_timer.tick() => {}
        }

        session.tick()?;

        if let Some(max_ticks) = settings.max_ticks {
            if session.ticks() >= max_ticks {
                info!("Reached {} frames, stopping pad loop", max_ticks);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AxisButtonState;

    // Holds Fire1 down and swaps the connected pad after two frames
    #[derive(Default)]
    struct SwappingInput {
        frames: u32,
    }

    impl InputSampleProvider for SwappingInput {
        fn pump(&mut self) {
            self.frames += 1;
        }

        fn axis_sample(&self, source: &str) -> f32 {
            if source == "Fire1" {
                1.0
            } else {
                0.0
            }
        }

        fn key_down(&self, _source: &str) -> bool {
            false
        }

        fn key_up(&self, _source: &str) -> bool {
            false
        }

        fn key_held(&self, _source: &str) -> bool {
            false
        }

        fn connected_devices(&self) -> Vec<String> {
            if self.frames < 3 {
                Vec::new()
            } else {
                vec!["Replacement pad".to_string()]
            }
        }
    }

    fn settings() -> PadSettings {
        PadSettings {
            report_interval_ticks: 0,
            ..Default::default()
        }
    }

    #[test]
    fn device_change_resets_axis_buttons() {
        let mut session = PadSession::create(
            Box::new(SwappingInput::default()),
            Some(settings()),
            ProfileCatalog::builtin(),
        )
        .detect();
        let receiver = session.subscribe();

        session.tick().unwrap();
        session.tick().unwrap();
        assert_eq!(
            session.tracker().axis_state(Button::ActionA),
            Some(AxisButtonState::Held)
        );

        session.tick().unwrap();
        assert_eq!(
            session.tracker().axis_state(Button::ActionA),
            Some(AxisButtonState::Down)
        );
        assert_eq!(receiver.borrow().down, vec![Button::ActionA]);
    }

    #[test]
    fn steady_devices_keep_axis_state() {
        let mut session = PadSession::create(
            Box::new(crate::controller::ScriptedInput::new()),
            Some(settings()),
            ProfileCatalog::builtin(),
        )
        .detect();
        let _receiver = session.subscribe();

        for _ in 0..3 {
            session.tick().unwrap();
        }
        assert_eq!(session.ticks(), 3);
        assert_eq!(
            session.tracker().axis_state(Button::ActionA),
            Some(AxisButtonState::Idle)
        );
    }

    #[test]
    fn provider_failures_convert_into_pad_errors() {
        let error: PadError = ProviderError::InitializationError("no backend".to_string()).into();
        assert!(matches!(error, PadError::ProviderError(_)));
        assert_eq!(
            error.to_string(),
            "Provider error: Failed to initialize input provider: no backend"
        );
    }
}
