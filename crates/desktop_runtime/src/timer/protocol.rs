//! JSON message protocol between the timer manager and its worker.
//!
//! Host to worker: `{"command":"start","timeRemaining":1500}`, `{"command":"pause"}`,
//! `{"command":"reset"}`, `{"command":"check"}`.
//! Worker to host: `{"type":"tick","timeRemaining":n}`, `{"type":"complete"}`,
//! `{"type":"paused","timeRemaining":n}`, `{"type":"reset"}`,
//! `{"type":"status","timeRemaining":n,"isRunning":b}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum WorkerCommand {
    #[serde(rename_all = "camelCase")]
    Start { time_remaining: u32 },
    Pause,
    Reset,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerEvent {
    #[serde(rename_all = "camelCase")]
    Tick { time_remaining: u32 },
    Complete,
    #[serde(rename_all = "camelCase")]
    Paused { time_remaining: u32 },
    Reset,
    #[serde(rename_all = "camelCase")]
    Status {
        time_remaining: u32,
        is_running: bool,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed timer worker message `{raw}`: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode timer worker message: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn encode_command(command: &WorkerCommand) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(command)?)
}

pub fn decode_command(raw: &str) -> Result<WorkerCommand, ProtocolError> {
    serde_json::from_str(raw).map_err(|source| ProtocolError::Malformed {
        raw: raw.to_string(),
        source,
    })
}

pub fn encode_event(event: &WorkerEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

pub fn decode_event(raw: &str) -> Result<WorkerEvent, ProtocolError> {
    serde_json::from_str(raw).map_err(|source| ProtocolError::Malformed {
        raw: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn wire_shapes_match_worker_contract() {
        assert_eq!(
            encode_command(&WorkerCommand::Start {
                time_remaining: 1500
            })
            .expect("encode"),
            r#"{"command":"start","timeRemaining":1500}"#
        );
        assert_eq!(
            encode_command(&WorkerCommand::Check).expect("encode"),
            r#"{"command":"check"}"#
        );
        assert_eq!(
            encode_event(&WorkerEvent::Status {
                time_remaining: 12,
                is_running: true
            })
            .expect("encode"),
            r#"{"type":"status","timeRemaining":12,"isRunning":true}"#
        );
        assert_eq!(
            decode_event(r#"{"type":"paused","timeRemaining":1490}"#).expect("decode"),
            WorkerEvent::Paused {
                time_remaining: 1490
            }
        );
    }

    #[test]
    fn unknown_messages_are_rejected() {
        assert!(matches!(
            decode_command(r#"{"command":"explode"}"#),
            Err(ProtocolError::Malformed { .. })
        ));
        assert!(decode_event("not json").is_err());
    }
}
