use dmx_control::dmx::{Action, BaseChannel, DmxChannel, ListenerType, MAX_VALUE, MIN_VALUE};
use std::sync::{Arc, Mutex};

const START: u64 = 1_700_000_000_000;

#[test]
fn test_single_fade() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.add_channel_action(Action::fade(1000, 243, 0).unwrap());

    assert_eq!(channel.get_new_value(START), 0);
    assert!(channel.has_running_actions());

    assert_eq!(channel.get_new_value(START + 1000), 243);
    assert!(!channel.has_running_actions());
}

#[test]
fn test_infinite_alternating_fades() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.add_channel_action(Action::fade(1000, 243, -1).unwrap());
    channel.add_channel_action(Action::fade(1000, 127, -1).unwrap());

    channel.get_new_value(START);
    for cycle in 0..5u64 {
        let base = START + cycle * 2000;
        assert_eq!(channel.get_new_value(base + 1000), 243);
        assert_eq!(channel.get_new_value(base + 2000), 127);
        assert!(channel.has_running_actions());
    }
}

#[test]
fn test_alternating_fades_interpolate_between_targets() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.add_channel_action(Action::fade(1000, 243, -1).unwrap());
    channel.add_channel_action(Action::fade(1000, 127, -1).unwrap());

    channel.get_new_value(START);
    channel.get_new_value(START + 1000);
    // halfway from 243 down to 127
    assert_eq!(channel.get_new_value(START + 1500), 185);
}

#[test]
fn test_suspend_with_queued_fade_and_resume() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.set_value(127);
    channel.suspend_action();
    assert!(channel.is_suspended());

    channel.add_channel_action(Action::fade(1000, 243, 0).unwrap());
    channel.add_channel_action(Action::resume());

    assert_eq!(channel.get_new_value(START), 127);
    assert_eq!(channel.get_new_value(START + 1000), 243);
    assert!(channel.has_running_actions());

    assert_eq!(channel.get_new_value(START + 1001), 127);
    assert!(!channel.has_running_actions());
    assert!(!channel.is_suspended());
}

#[test]
fn test_direct_write_while_suspended_and_cleared() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.suspend_action();
    channel.clear_action();
    channel.set_value(200);
    assert_eq!(channel.value(), 200);

    channel.resume_action();
    assert_eq!(channel.value(), 200);
    assert!(!channel.is_suspended());
}

#[test]
fn test_direct_write_survives_resume_after_running_fade_cleared() {
    let mut channel = DmxChannel::new(0, 1, 50);
    channel.add_channel_action(Action::fade(1000, 243, 0).unwrap());
    channel.add_channel_action(Action::fade(1000, 0, 0).unwrap());
    channel.get_new_value(START);
    assert!(channel.has_running_actions());

    channel.suspend_action();
    channel.clear_action();
    assert!(channel.is_suspended());
    channel.set_value(200);

    channel.resume_action();
    assert_eq!(channel.value(), 200);
    assert!(!channel.has_running_actions());
    assert!(!channel.is_suspended());
    assert_eq!(channel.get_new_value(START + 2000), 200);
}

#[test]
fn test_queue_continues_after_resume_marker() {
    let mut channel = DmxChannel::new(0, 1, 50);
    channel.suspend_action();
    channel.add_channel_action(Action::fade(0, 255, 0).unwrap());
    channel.add_channel_action(Action::resume());
    channel.add_channel_action(Action::fade(1000, 0, 0).unwrap());

    assert_eq!(channel.get_new_value(START), 255);
    assert_eq!(channel.get_new_value(START + 10), 50);
    // the last fade starts from the restored value
    assert_eq!(channel.get_new_value(START + 510), 25);
    assert_eq!(channel.get_new_value(START + 1010), 0);
    assert!(!channel.has_running_actions());
}

#[test]
fn test_value_clamping_at_bounds() {
    let mut channel = DmxChannel::new(0, 1, 1000);
    assert_eq!(channel.value(), MAX_VALUE);
    channel.set_value(-1);
    assert_eq!(channel.value(), MIN_VALUE);
}

#[test]
fn test_listeners_receive_key_and_value() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut channel = DmxChannel::with_address(BaseChannel::new(3, 7), 0);

    for key in ["thing:dimmer:brightness", "thing:dimmer:switch"] {
        let sink = Arc::clone(&seen);
        channel.add_listener(
            key,
            move |key: &str, value: i32| sink.lock().unwrap().push((key.to_string(), value)),
            ListenerType::Value,
        );
    }

    channel.set_channel_action(Action::fade(100, 100, 0).unwrap());
    channel.get_new_value(START);
    channel.get_new_value(START + 50);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert!(seen.contains(&("thing:dimmer:brightness".to_string(), 50)));
    assert!(seen.contains(&("thing:dimmer:switch".to_string(), 50)));
}

#[test]
fn test_set_channel_action_discards_queue() {
    let mut channel = DmxChannel::new(0, 1, 0);
    channel.add_channel_action(Action::fade(1000, 100, -1).unwrap());
    channel.add_channel_action(Action::fade(1000, 200, -1).unwrap());
    channel.get_new_value(START);

    channel.set_channel_action(Action::fade(0, 10, 0).unwrap());
    assert_eq!(channel.get_new_value(START + 100), 10);
    assert!(!channel.has_running_actions());
    assert_eq!(channel.get_new_value(START + 5000), 10);
}
