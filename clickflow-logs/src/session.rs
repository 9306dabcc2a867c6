use crate::event::VisitEvent;
use std::collections::BTreeMap;
use tracing::debug;

/// Sessions keyed by session id, each ordered by timestamp and bracketed
/// with `start`/`end` markers.
pub type SessionMap = BTreeMap<String, Vec<VisitEvent>>;

/// Groups visits by session, orders each session on time and brackets it
/// with a `start` marker one unit before the first visit and an `end`
/// marker one unit after the last.
///
/// Visits sharing a timestamp keep their input order.
pub fn to_sessions(events: impl IntoIterator<Item = VisitEvent>) -> SessionMap {
    let mut grouped: BTreeMap<String, Vec<VisitEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.session_id.clone()).or_default().push(event);
    }

    for session in grouped.values_mut() {
        session.sort_by_key(|event| event.timestamp);
        bracket(session);
    }

    debug!("Grouped visits into {} sessions", grouped.len());
    grouped
}

fn bracket(session: &mut Vec<VisitEvent>) {
    let (Some(first), Some(last)) = (session.first(), session.last()) else {
        return;
    };
    let start = VisitEvent::start_of(first);
    let end = VisitEvent::end_of(last);

    session.insert(0, start);
    session.push(end);
}

/// Number of real (non-marker) visits across all sessions.
pub fn visit_count(sessions: &SessionMap) -> usize {
    sessions
        .values()
        .flatten()
        .filter(|event| !event.is_marker())
        .count()
}
