use rolepad::controller::{
    AxisButtonState, Button, ButtonStateTracker, DeviceProfile, InputSampleProvider,
    ScriptedInput, SourceMapping,
};

fn axis_tracker(button: Button, source: &str, reflected: bool) -> ButtonStateTracker {
    ButtonStateTracker::initialize([(
        button,
        SourceMapping::Axis {
            source: source.to_string(),
            reflected,
        },
    )])
}

fn drive(tracker: &mut ButtonStateTracker, source: &str, samples: &[f32]) -> Vec<AxisButtonState> {
    let mut input = ScriptedInput::new();
    input.queue_axis(source, samples.iter().copied());

    let mut states = Vec::new();
    for _ in samples {
        input.pump();
        tracker.poll_tick(&input);
        states.push(tracker.axis_state(Button::L2).unwrap_or_default());
    }
    states
}

#[test]
fn sustained_axis_press_yields_edge_then_hold() {
    use AxisButtonState::*;
    let mut tracker = axis_tracker(Button::L2, "Trigger", false);
    let states = drive(&mut tracker, "Trigger", &[0.0, 0.0, 0.5, 0.5, 0.5, 0.0, 0.0]);
    assert_eq!(states, vec![Idle, Idle, Down, Held, Held, Up, Idle]);
}

#[test]
fn reflected_axis_mirrors_the_sample() {
    let samples = [0.0, -0.5, -0.5, 0.0, 0.0];
    let mirrored: Vec<f32> = samples.iter().map(|s| -s).collect();

    let mut reflected = axis_tracker(Button::L2, "Trigger", true);
    let mut plain = axis_tracker(Button::L2, "Trigger", false);

    assert_eq!(
        drive(&mut reflected, "Trigger", &samples),
        drive(&mut plain, "Trigger", &mirrored)
    );
}

#[test]
fn queries_follow_axis_state() {
    let mut tracker = axis_tracker(Button::L2, "Trigger", false);
    let mut input = ScriptedInput::new();
    input.queue_axis("Trigger", [0.8, 0.8, 0.0]);

    input.pump();
    tracker.poll_tick(&input);
    assert!(tracker.is_down(&input, Button::L2));
    assert!(tracker.is_held(&input, Button::L2));
    assert!(!tracker.is_up(&input, Button::L2));

    input.pump();
    tracker.poll_tick(&input);
    assert!(!tracker.is_down(&input, Button::L2));
    assert!(tracker.is_held(&input, Button::L2));

    input.pump();
    tracker.poll_tick(&input);
    assert!(tracker.is_up(&input, Button::L2));
    assert!(!tracker.is_held(&input, Button::L2));
}

#[test]
fn support_is_fixed_at_registration() {
    let empty = ButtonStateTracker::default();
    for button in Button::ALL {
        assert!(!empty.is_supported(button));
    }

    let mut tracker = axis_tracker(Button::R2, "Trigger", true);
    assert!(tracker.is_supported(Button::R2));

    let mut input = ScriptedInput::new();
    for sample in [1.0, -1.0, 0.0, 5.0] {
        input.set_axis("Trigger", sample);
        input.pump();
        tracker.poll_tick(&input);
        assert!(tracker.is_supported(Button::R2));
    }
}

#[test]
fn unsupported_roles_read_false() {
    let tracker = ButtonStateTracker::from_profile(&DeviceProfile::xbox360_windows(), 0);
    let mut input = ScriptedInput::new();
    input.press("joystick button 16");
    input.pump();

    assert!(!tracker.is_supported(Button::System));
    assert!(!tracker.is_held(&input, Button::System));
    assert!(!tracker.is_down(&input, Button::System));
    assert!(!tracker.is_up(&input, Button::System));
}

#[test]
fn xbox_dpad_axes_split_into_four_buttons() {
    let profile = DeviceProfile::xbox360_windows();
    let mut tracker = ButtonStateTracker::from_profile(&profile, 0);
    let mut input = ScriptedInput::new();

    input.set_axis("Controller (XBOX 360 For Windows)_DpadY", -1.0);
    input.pump();
    tracker.poll_tick(&input);

    assert!(tracker.is_down(&input, Button::DPadDown));
    assert!(!tracker.is_held(&input, Button::DPadUp));
    assert_eq!(input.connected_devices(), Vec::<String>::new());
}
