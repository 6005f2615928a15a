//! Per-button activity report
//!
//! Collects, for every role, when it last went down and up. Useful for
//! checking a new pad profile by hand: a role stays "untouched" until it is
//! held for the first time.

use chrono::{DateTime, Local};
use std::collections::BTreeMap;

use super::button::Button;
use super::provider::InputSampleProvider;
use super::tracker::ButtonStateTracker;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonRecord {
    pub unsupported: bool,
    pub held: bool,
    pub last_down: Option<DateTime<Local>>,
    pub last_up: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Default)]
pub struct ButtonReport {
    records: BTreeMap<Button, ButtonRecord>,
}

impl ButtonReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples every role once; call after the tracker's `poll_tick`
    pub fn collect<P: InputSampleProvider + ?Sized>(
        &mut self,
        tracker: &ButtonStateTracker,
        provider: &P,
        now: DateTime<Local>,
    ) {
        for button in Button::ALL {
            self.collect_button(tracker, provider, button, now);
        }
    }

    fn collect_button<P: InputSampleProvider + ?Sized>(
        &mut self,
        tracker: &ButtonStateTracker,
        provider: &P,
        button: Button,
        now: DateTime<Local>,
    ) {
        let known = self.records.contains_key(&button);
        let mut record = self.records.get(&button).cloned().unwrap_or_default();

        let supported = tracker.is_supported(button);
        if supported {
            if tracker.is_down(provider, button) {
                record.last_down = Some(now);
            }
            if tracker.is_up(provider, button) {
                record.last_up = Some(now);
            }
            record.held = tracker.is_held(provider, button);
            record.unsupported = false;
        } else {
            record.unsupported = true;
        }

        // Supported roles only show up once they have been pressed
        if known || record.held || !supported {
            self.records.insert(button, record);
        }
    }

    pub fn record(&self, button: Button) -> Option<&ButtonRecord> {
        self.records.get(&button)
    }

    pub fn status_line(&self, button: Button) -> String {
        match self.records.get(&button) {
            Some(record) if record.unsupported => format!("{}: unsupported", button),
            Some(record) => format!(
                "{}: {} (last down = {}), (last up = {})",
                button,
                record.held,
                format_time(record.last_down),
                format_time(record.last_up)
            ),
            None => format!("{}: untouched", button),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        Button::ALL
            .iter()
            .map(|button| self.status_line(*button))
            .collect()
    }
}

fn format_time(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%H:%M:%S.%3f").to_string())
        .unwrap_or_else(|| "never".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::profile::DeviceProfile;
    use crate::controller::provider::ScriptedInput;

    #[test]
    fn report_tracks_edges_and_untouched_roles() {
        let tracker = ButtonStateTracker::from_profile(&DeviceProfile::xbox360_windows(), 0);
        let mut input = ScriptedInput::new();
        let mut report = ButtonReport::new();
        let now = Local::now();

        input.pump();
        report.collect(&tracker, &input, now);
        assert_eq!(report.status_line(Button::ActionA), "ActionA: untouched");
        assert_eq!(report.status_line(Button::System), "System: unsupported");

        input.press("joystick button 0");
        input.pump();
        report.collect(&tracker, &input, now);
        let record = report.record(Button::ActionA).cloned().unwrap_or_default();
        assert!(record.held);
        assert_eq!(record.last_down, Some(now));
        assert_eq!(record.last_up, None);

        input.release("joystick button 0");
        input.pump();
        report.collect(&tracker, &input, now);
        let record = report.record(Button::ActionA).cloned().unwrap_or_default();
        assert!(!record.held);
        assert_eq!(record.last_up, Some(now));
        assert!(report.status_line(Button::ActionA).starts_with("ActionA: false"));
    }

    #[test]
    fn lines_cover_every_role() {
        let report = ButtonReport::new();
        assert_eq!(report.lines().len(), Button::ALL.len());
    }
}
