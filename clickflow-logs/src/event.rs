use serde::Serialize;
use std::fmt;

/// Synthetic screen prepended to every session.
pub const START_SCREEN: &str = "start";
/// Synthetic screen appended to every session.
pub const END_SCREEN: &str = "end";

/// Returns true for the `start`/`end` session markers.
pub fn is_marker(screen_name: &str) -> bool {
    screen_name == START_SCREEN || screen_name == END_SCREEN
}

/// A single screen visit read from the clickstream log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitEvent {
    pub timestamp: i64,
    pub session_id: String,
    pub screen_name: String,
}

impl VisitEvent {
    pub fn new(timestamp: i64, session_id: impl Into<String>, screen_name: impl Into<String>) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            screen_name: screen_name.into(),
        }
    }

    /// Marker placed one time unit before `first`, saturating at `i64::MIN`.
    pub fn start_of(first: &VisitEvent) -> Self {
        Self::new(first.timestamp.saturating_sub(1), first.session_id.clone(), START_SCREEN)
    }

    /// Marker placed one time unit after `last`, saturating at `i64::MAX`.
    pub fn end_of(last: &VisitEvent) -> Self {
        Self::new(last.timestamp.saturating_add(1), last.session_id.clone(), END_SCREEN)
    }

    pub fn is_marker(&self) -> bool {
        is_marker(&self.screen_name)
    }
}

impl fmt::Display for VisitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {},{}", self.timestamp, self.session_id, self.screen_name)
    }
}
