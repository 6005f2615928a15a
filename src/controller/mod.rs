//! Controller subsystem for gamepad button tracking
//!
//! Implements a per-frame pipeline:
//!
//! 1. [`provider`] - Raw input samples ([`gilrs_provider`] for real pads)
//! 2. [`profile`] - Device profiles mapping button roles to raw sources
//! 3. [`tracker`] - Held/down/up state per [`Button`] role
//! 4. [`pad_handle`] - Frame loop and snapshot publishing
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► Provider ──► Tracker ──► PadSnapshot
//!             (samples)    (Idle/Down/Held/Up)
//! ```

pub mod button;
pub mod gilrs_provider;
pub mod pad_handle;
pub mod profile;
pub mod provider;
pub mod report;
pub mod tracker;

pub use button::{AxisButtonState, Button, AXIS_PRESS_THRESHOLD};
pub use gilrs_provider::{GilrsInput, ProviderError};
pub use pad_handle::{BoxedProvider, PadError, PadHandle, PadSettings, PadSnapshot};
pub use profile::{AxisDefinition, ButtonMapping, DeviceProfile, ProfileCatalog};
pub use provider::{InputSampleProvider, ScriptedInput};
pub use report::ButtonReport;
pub use tracker::{ButtonStateTracker, SourceMapping};
