//! Completed focus session history.

use serde::{Deserialize, Serialize};

use super::timer::TimerSetting;

/// Durable storage key for the session list.
pub const SESSIONS_KEY: &str = "cozydesk.sessions.v1";
/// Number of most recent sessions kept.
pub const MAX_SESSIONS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    pub title: String,
    pub setting: TimerSetting,
    pub duration_seconds: u32,
    pub completed_at_unix_ms: u64,
}

/// Appends one completed session, keeping only the newest [`MAX_SESSIONS`].
pub fn record_session(
    sessions: &[FocusSession],
    title: &str,
    setting: TimerSetting,
    duration_seconds: u32,
    completed_at_unix_ms: u64,
) -> Vec<FocusSession> {
    let skip = (sessions.len() + 1).saturating_sub(MAX_SESSIONS);
    let mut next: Vec<FocusSession> = sessions.iter().skip(skip).cloned().collect();
    let same_ms = sessions
        .iter()
        .filter(|s| s.completed_at_unix_ms == completed_at_unix_ms)
        .count();
    next.push(FocusSession {
        id: if same_ms == 0 {
            format!("session-{completed_at_unix_ms}")
        } else {
            format!("session-{completed_at_unix_ms}-{same_ms}")
        },
        title: title.to_string(),
        setting,
        duration_seconds,
        completed_at_unix_ms,
    });
    next
}

/// Total focused seconds across `sessions`.
pub fn total_focus_seconds(sessions: &[FocusSession]) -> u64 {
    sessions
        .iter()
        .map(|session| u64::from(session.duration_seconds))
        .sum()
}
