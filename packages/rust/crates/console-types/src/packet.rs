//! Inbound packets and notifications delivered by the transport layer.
//!
//! Packets are validated here, at the ingestion boundary. Anything that does
//! not satisfy the message shape is refused with a [`PacketError`] so the store
//! only ever sees well-formed [`MessageDraft`]s.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PacketError;
use crate::filter::FilterPatch;
use crate::message::{
    ConsoleCall, EvalId, Frame, Level, LogGroupId, MessageDraft, MessageKind, MessageSource,
    NetworkRequest, Note, ObjectPreview, Value,
};
use crate::point::{ExecutionPoint, PausePoint};

/// Raw message packet as delivered by the protocol layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawPacket {
    /// Packet type (`log`, `trace`, `command`, `result`, `null-message`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Severity; defaults to `log`.
    #[serde(default)]
    pub level: Option<String>,
    /// Origin; defaults by packet type.
    #[serde(default)]
    pub source: Option<String>,
    /// Plain text.
    #[serde(default)]
    pub text: String,
    /// Real recording position.
    #[serde(default)]
    pub execution_point: Option<String>,
    /// Wall-clock estimate in milliseconds; required with `executionPoint`.
    #[serde(default)]
    pub execution_point_time: Option<f64>,
    /// Logpoint group.
    #[serde(default)]
    pub logpoint_id: Option<String>,
    /// Evaluation id.
    #[serde(default)]
    pub eval_id: Option<u64>,
    /// Emitting location.
    #[serde(default)]
    pub frame: Option<Frame>,
    /// Stack at emission.
    #[serde(default)]
    pub stacktrace: Vec<Frame>,
    /// Structured parameters.
    #[serde(default)]
    pub parameters: Vec<Value>,
    /// Previews for objects referenced by the parameters.
    #[serde(default)]
    pub previews: Vec<ObjectPreview>,
    /// Network request.
    #[serde(default)]
    pub request: Option<NetworkRequest>,
    /// Structured notes.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Prefix label.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Pause the values belong to.
    #[serde(default)]
    pub pause_id: Option<String>,
}

impl RawPacket {
    /// Minimal packet of the given type and text.
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            level: None,
            source: None,
            text: text.into(),
            execution_point: None,
            execution_point_time: None,
            logpoint_id: None,
            eval_id: None,
            frame: None,
            stacktrace: Vec::new(),
            parameters: Vec::new(),
            previews: Vec::new(),
            request: None,
            notes: Vec::new(),
            prefix: None,
            pause_id: None,
        }
    }

    /// Parse a packet from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Malformed`] when the JSON does not match the
    /// packet shape.
    pub fn from_json(raw: &str) -> Result<Self, PacketError> {
        serde_json::from_str(raw).map_err(|error| PacketError::Malformed(error.to_string()))
    }

    fn classify(&self, level: Level, source: MessageSource) -> Result<MessageKind, PacketError> {
        let kind = match self.kind.as_str() {
            "null-message" => return Err(PacketError::NullMessage),
            "command" => MessageKind::Command {
                eval_id: self.require_eval_id("command")?,
            },
            "result" => MessageKind::Result {
                eval_id: self.require_eval_id("result")?,
                paired_command: None,
            },
            "navigation-marker" => MessageKind::Navigation,
            "logpoint-loading" => MessageKind::LogpointLoading {
                group: self
                    .logpoint_id
                    .clone()
                    .map(LogGroupId)
                    .ok_or(PacketError::MissingField {
                        kind: "logpoint-loading",
                        field: "logpointId",
                    })?,
            },
            other => {
                let call = ConsoleCall::from_packet(other)
                    .ok_or_else(|| PacketError::UnknownType(other.to_string()))?;
                if let Some(group) = &self.logpoint_id {
                    MessageKind::LogpointResult {
                        group: LogGroupId(group.clone()),
                    }
                } else if source == MessageSource::Javascript && level == Level::Error {
                    MessageKind::PageError
                } else {
                    MessageKind::ConsoleLog { call }
                }
            }
        };
        Ok(kind)
    }

    fn require_eval_id(&self, kind: &'static str) -> Result<EvalId, PacketError> {
        self.eval_id.map(EvalId).ok_or(PacketError::MissingField {
            kind,
            field: "evalId",
        })
    }

    fn default_source(&self) -> MessageSource {
        match self.kind.as_str() {
            "command" | "result" | "navigation-marker" => MessageSource::ConsoleFrontend,
            _ => MessageSource::ConsoleApi,
        }
    }
}

impl TryFrom<RawPacket> for MessageDraft {
    type Error = PacketError;

    fn try_from(packet: RawPacket) -> Result<Self, Self::Error> {
        let level = match packet.level.as_deref() {
            None => Level::Log,
            Some(raw) => {
                Level::from_packet(raw).ok_or_else(|| PacketError::UnknownLevel(raw.to_string()))?
            }
        };
        let source = match packet.source.as_deref() {
            None => packet.default_source(),
            Some(raw) => MessageSource::from_packet(raw)
                .ok_or_else(|| PacketError::UnknownSource(raw.to_string()))?,
        };
        let kind = packet.classify(level, source)?;
        let execution_point = packet
            .execution_point
            .as_deref()
            .map(ExecutionPoint::parse)
            .transpose()?;
        let execution_point_time = match (&execution_point, packet.execution_point_time) {
            (_, Some(time)) => time,
            (None, None) => 0.0,
            (Some(_), None) => {
                return Err(PacketError::MissingField {
                    kind: "positioned",
                    field: "executionPointTime",
                });
            }
        };

        Ok(Self {
            kind,
            level,
            source,
            message_text: packet.text,
            execution_point,
            execution_point_time,
            frame: packet.frame,
            stacktrace: packet.stacktrace,
            parameters: packet.parameters,
            previews: packet
                .previews
                .into_iter()
                .map(|preview| (preview.id.clone(), preview))
                .collect(),
            request: packet.request,
            notes: packet.notes,
            prefix: packet.prefix,
            pause_id: packet.pause_id,
        })
    }
}

/// Notification delivered to a console session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InboundEvent {
    /// A raw message packet.
    Packet(RawPacket),
    /// The replay paused at a point.
    Paused(PausePoint),
    /// The backend could not deliver every message.
    Overflow,
    /// The initial backlog is fully delivered.
    MessagesLoaded,
    /// Partial filter update.
    Filters(FilterPatch),
}

impl InboundEvent {
    /// Parse one JSON-encoded notification.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Malformed`] when the JSON is not a notification.
    pub fn from_json(raw: &str) -> Result<Self, PacketError> {
        serde_json::from_str(raw).map_err(|error| PacketError::Malformed(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_level_and_source() {
        let draft = MessageDraft::try_from(RawPacket::new("log", "hello")).unwrap();
        assert_eq!(draft.level, Level::Log);
        assert_eq!(draft.source, MessageSource::ConsoleApi);
        assert_eq!(
            draft.kind,
            MessageKind::ConsoleLog {
                call: ConsoleCall::Log
            }
        );
    }

    #[test]
    fn positioned_packet_requires_time() {
        let mut packet = RawPacket::new("log", "hello");
        packet.execution_point = Some("12".to_string());
        assert_eq!(
            MessageDraft::try_from(packet),
            Err(PacketError::MissingField {
                kind: "positioned",
                field: "executionPointTime",
            })
        );
    }

    #[test]
    fn javascript_error_becomes_page_error() {
        let mut packet = RawPacket::new("log", "TypeError: x is undefined");
        packet.level = Some("error".to_string());
        packet.source = Some("javascript".to_string());
        let draft = MessageDraft::try_from(packet).unwrap();
        assert_eq!(draft.kind, MessageKind::PageError);
    }
}
