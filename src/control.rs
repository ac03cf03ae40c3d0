//! Shared control state
//!
//! Written by the network listener (and by manual toggles from the host UI),
//! read once per tick by the simulation as a consistent snapshot.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lesson subject selecting the procedural shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Subject {
    Geography,
    Math,
    #[default]
    Physics,
    History,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Geography,
        Subject::Math,
        Subject::Physics,
        Subject::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Geography => "Geography",
            Subject::Math => "Math",
            Subject::Physics => "Physics",
            Subject::History => "History",
        }
    }

    /// Exact, case-sensitive match on the wire name
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subject| subject.as_str() == s)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse behavioral state driving overlays and shape generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Behavior {
    #[default]
    Normal,
    /// Sparse random ripples
    Happy,
    /// Puzzled/exploring: the subject shape is raised around the safe zone
    Confused,
    /// Slow swell across the surface
    Sleepy,
    /// Anything else received from the network, kept for display
    Other(String),
}

impl Behavior {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "NORMAL" => Behavior::Normal,
            "HAPPY" => Behavior::Happy,
            "CONFUSED" => Behavior::Confused,
            "SLEEPY" => Behavior::Sleepy,
            other => Behavior::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Behavior::Normal => "NORMAL",
            Behavior::Happy => "HAPPY",
            Behavior::Confused => "CONFUSED",
            Behavior::Sleepy => "SLEEPY",
            Behavior::Other(s) => s,
        }
    }

    /// Whether this state raises the subject shape
    pub fn wants_shape(&self) -> bool {
        matches!(self, Behavior::Confused)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gesture input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Raises the surface
    Left,
    /// Sinks the surface
    Right,
}

impl Channel {
    /// Sign applied to this channel's ripple strength
    pub fn polarity(&self) -> f32 {
        match self {
            Channel::Left => 1.0,
            Channel::Right => -1.0,
        }
    }
}

/// Snapshot of everything the tick reads from the outside world.
///
/// Pointers are `Option<Vec2>` in normalized [0, 1] coordinates, so a
/// pointer's active flag and position always change together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub subject: Subject,
    /// Manual (UI) control overrides the external behavior
    pub manual_override: bool,
    pub manual_behavior: Behavior,
    pub external_behavior: Behavior,
    pub left: Option<Vec2>,
    pub right: Option<Vec2>,
    pub gestures_enabled: bool,
    /// Bumped on every write
    pub revision: u64,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            subject: Subject::default(),
            manual_override: true,
            manual_behavior: Behavior::Normal,
            external_behavior: Behavior::Normal,
            left: None,
            right: None,
            gestures_enabled: true,
            revision: 0,
        }
    }
}

impl ControlState {
    /// Behavior currently in charge
    pub fn active_behavior(&self) -> &Behavior {
        if self.manual_override {
            &self.manual_behavior
        } else {
            &self.external_behavior
        }
    }

    pub fn pointer(&self, channel: Channel) -> Option<Vec2> {
        match channel {
            Channel::Left => self.left,
            Channel::Right => self.right,
        }
    }

    /// Apply one command in place
    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::SetSubject(subject) => {
                if let Some(subject) = subject {
                    self.subject = *subject;
                }
                self.manual_override = false;
            }
            Command::SetPointer(channel, pos) => match channel {
                Channel::Left => self.left = *pos,
                Channel::Right => self.right = *pos,
            },
            Command::SetExternalBehavior(behavior) => self.external_behavior = behavior.clone(),
            Command::SetManualOverride(on) => self.manual_override = *on,
            Command::SetManualBehavior(behavior) => self.manual_behavior = behavior.clone(),
            Command::SetManualSubject(subject) => self.subject = *subject,
            Command::SetGestures(on) => self.gestures_enabled = *on,
        }
        self.revision = self.revision.wrapping_add(1);
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.manual_override { "manual" } else { "external" };
        let hands = match (self.left.is_some(), self.right.is_some()) {
            (false, false) => "none",
            (true, false) => "L",
            (false, true) => "R",
            (true, true) => "L+R",
        };
        write!(
            f,
            "{} | {} ({}) | hands: {}",
            self.subject,
            self.active_behavior(),
            mode,
            hands
        )
    }
}

/// A single state mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// From the network: optional subject, always switches to external control
    SetSubject(Option<Subject>),
    /// From the network: set (`Some`) or clear (`None`) a pointer
    SetPointer(Channel, Option<Vec2>),
    /// From the network: free-form behavior
    SetExternalBehavior(Behavior),
    /// Manual UI toggles
    SetManualOverride(bool),
    SetManualBehavior(Behavior),
    SetManualSubject(Subject),
    SetGestures(bool),
}

/// Cloneable handle to the shared control state.
///
/// One mutex guards the whole struct; writers hold it only for a field
/// assignment and the tick holds it only to clone a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ControlStore {
    inner: Arc<Mutex<ControlState>>,
}

impl ControlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ControlState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        // A panic while holding the lock cannot leave a half-written field
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of the latest state
    pub fn snapshot(&self) -> ControlState {
        self.lock().clone()
    }

    pub fn apply(&self, command: Command) {
        let mut state = self.lock();
        state.apply(&command);
        log::debug!("control r{}: {:?}", state.revision, command);
    }

    pub fn set_manual_override(&self, on: bool) {
        self.apply(Command::SetManualOverride(on));
    }

    pub fn set_manual_behavior(&self, behavior: Behavior) {
        self.apply(Command::SetManualBehavior(behavior));
    }

    pub fn set_subject(&self, subject: Subject) {
        self.apply(Command::SetManualSubject(subject));
    }

    pub fn set_gestures_enabled(&self, on: bool) {
        self.apply(Command::SetGestures(on));
    }
}
