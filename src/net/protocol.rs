//! Text wire protocol
//!
//! One message per datagram:
//! - `SUB:<name>`      subject change (also switches to external control)
//! - `HAND_L:<x>,<y>`  / `HAND_L:NONE` left pointer
//! - `HAND_R:<x>,<y>`  / `HAND_R:NONE` right pointer
//! - anything else     external behavior, verbatim

use glam::Vec2;

use crate::control::{Behavior, Channel, Command, Subject};

const SUBJECT_PREFIX: &str = "SUB:";
const LEFT_PREFIX: &str = "HAND_L:";
const RIGHT_PREFIX: &str = "HAND_R:";
const NO_POINTER: &str = "NONE";

/// Decode a raw datagram. `None` means the packet is dropped.
pub fn decode(bytes: &[u8]) -> Option<Command> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text),
        Err(err) => {
            log::debug!("dropping non-UTF-8 datagram ({} bytes): {}", bytes.len(), err);
            None
        }
    }
}

/// Parse one message. Returns `None` when a pointer payload is malformed,
/// leaving the previous pointer state untouched.
pub fn parse(message: &str) -> Option<Command> {
    let message = message.trim_end_matches(['\r', '\n']);

    if let Some(name) = message.strip_prefix(SUBJECT_PREFIX) {
        return Some(Command::SetSubject(Subject::from_wire(name)));
    }
    if let Some(payload) = message.strip_prefix(LEFT_PREFIX) {
        return parse_pointer(Channel::Left, payload);
    }
    if let Some(payload) = message.strip_prefix(RIGHT_PREFIX) {
        return parse_pointer(Channel::Right, payload);
    }
    Some(Command::SetExternalBehavior(Behavior::from_wire(message)))
}

fn parse_pointer(channel: Channel, payload: &str) -> Option<Command> {
    if payload == NO_POINTER {
        return Some(Command::SetPointer(channel, None));
    }
    match parse_coords(payload) {
        Some(pos) => Some(Command::SetPointer(channel, Some(pos))),
        None => {
            log::debug!("ignoring malformed {:?} pointer payload {:?}", channel, payload);
            None
        }
    }
}

/// Exactly two finite comma-separated floats
fn parse_coords(payload: &str) -> Option<Vec2> {
    let mut parts = payload.split(',');
    let x = parts.next()?.trim().parse::<f32>().ok()?;
    let y = parts.next()?.trim().parse::<f32>().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlStore;

    #[test]
    fn test_subject_messages() {
        assert_eq!(parse("SUB:Math"), Some(Command::SetSubject(Some(Subject::Math))));
        assert_eq!(
            parse("SUB:Geography\n"),
            Some(Command::SetSubject(Some(Subject::Geography)))
        );
        assert_eq!(parse("SUB:Chemistry"), Some(Command::SetSubject(None)));
    }

    #[test]
    fn test_pointer_messages() {
        assert_eq!(
            parse("HAND_L:0.3,0.7"),
            Some(Command::SetPointer(Channel::Left, Some(Vec2::new(0.3, 0.7))))
        );
        assert_eq!(
            parse("HAND_R:NONE"),
            Some(Command::SetPointer(Channel::Right, None))
        );
    }

    #[test]
    fn test_malformed_pointer_is_dropped() {
        assert_eq!(parse("HAND_L:bad,data"), None);
        assert_eq!(parse("HAND_L:0.1"), None);
        assert_eq!(parse("HAND_L:0.1,0.2,0.3"), None);
        assert_eq!(parse("HAND_R:NaN,0.5"), None);
        assert_eq!(parse("HAND_R:"), None);
    }

    #[test]
    fn test_unprefixed_is_behavior() {
        assert_eq!(
            parse("CONFUSED"),
            Some(Command::SetExternalBehavior(Behavior::Confused))
        );
        assert_eq!(
            parse("Wait for Calib..."),
            Some(Command::SetExternalBehavior(Behavior::Other(
                "Wait for Calib...".to_owned()
            )))
        );
    }

    #[test]
    fn test_non_utf8_dropped() {
        assert_eq!(decode(&[0xff, 0xfe, 0x00]), None);
        assert_eq!(
            decode(b"SLEEPY"),
            Some(Command::SetExternalBehavior(Behavior::Sleepy))
        );
    }

    fn feed(store: &ControlStore, message: &str) {
        if let Some(command) = parse(message) {
            store.apply(command);
        }
    }

    #[test]
    fn test_clear_twice_stays_inactive() {
        let store = ControlStore::new();
        feed(&store, "HAND_L:NONE");
        assert!(store.snapshot().left.is_none());
        feed(&store, "HAND_L:NONE");
        assert!(store.snapshot().left.is_none());
    }

    #[test]
    fn test_malformed_update_keeps_previous_pointer() {
        let store = ControlStore::new();
        feed(&store, "HAND_L:0.3,0.7");
        feed(&store, "HAND_L:bad,data");
        assert_eq!(store.snapshot().left, Some(Vec2::new(0.3, 0.7)));
    }
}
