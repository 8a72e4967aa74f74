//! Console message model.
//!
//! A [`Message`] is frozen once stored: the store hands out shared references
//! and never changes a message in place. The variant in [`MessageKind`] carries
//! the data that only some message families have (evaluation ids, logpoint
//! groups) so consumers match exhaustively instead of inspecting strings.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::point::{ExecutionPoint, LastExecutionPoint};

/// Store-assigned message identifier. Strictly increasing at creation time and
/// used only for removal bookkeeping, never for ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// The id immediately after this one.
    #[must_use]
    pub const fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Console evaluation identifier shared by a command and its result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct EvalId(pub u64);

/// Logpoint group identifier; every hit of one logpoint shares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LogGroupId(pub String);

impl LogGroupId {
    /// Build a group id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LogGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a previewed object inside a message's pause data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObjectId(pub String);

/// Severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// `console.error`, uncaught exceptions, failed assertions.
    Error,
    /// `console.warn`.
    Warning,
    /// `console.info`.
    Info,
    /// `console.debug`.
    Debug,
    /// `console.log` and most other console calls.
    Log,
    /// `console.trace`.
    Trace,
}

impl Level {
    /// Parse the packet vocabulary (`warn` is accepted for `warning`).
    #[must_use]
    pub fn from_packet(raw: &str) -> Option<Self> {
        match raw {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "log" => Some(Self::Log),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// String form used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Log => "log",
            Self::Trace => "trace",
        }
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MessageSource {
    /// Console API call in the recorded program.
    ConsoleApi,
    /// JavaScript engine (uncaught errors).
    Javascript,
    /// Network activity.
    Network,
    /// Produced by the console itself (evaluations, markers).
    ConsoleFrontend,
    /// Anything else the backend reports.
    Other,
}

impl MessageSource {
    /// Parse the packet vocabulary.
    #[must_use]
    pub fn from_packet(raw: &str) -> Option<Self> {
        match raw {
            "console-api" | "consoleAPI" => Some(Self::ConsoleApi),
            "javascript" => Some(Self::Javascript),
            "network" => Some(Self::Network),
            "console-frontend" => Some(Self::ConsoleFrontend),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Whether the level filters apply to messages from this source.
    #[must_use]
    pub const fn is_level_filtered(self) -> bool {
        matches!(self, Self::ConsoleApi | Self::Javascript)
    }
}

/// Flavour of console call for plain console messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleCall {
    /// `console.log` family.
    Log,
    /// `console.trace`.
    Trace,
    /// `console.assert`.
    Assert,
    /// `console.table`.
    Table,
    /// `console.dir`.
    Dir,
}

impl ConsoleCall {
    /// Parse the packet `type` of a console call.
    #[must_use]
    pub fn from_packet(raw: &str) -> Option<Self> {
        match raw {
            "log" => Some(Self::Log),
            "trace" => Some(Self::Trace),
            "assert" => Some(Self::Assert),
            "table" => Some(Self::Table),
            "dir" => Some(Self::Dir),
            _ => None,
        }
    }
}

/// Message family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageKind {
    /// Console API call emitted by the program.
    ConsoleLog {
        /// Which console call produced it.
        call: ConsoleCall,
    },
    /// Uncaught error reported by the engine.
    PageError,
    /// Expression typed into the console.
    Command {
        /// Evaluation id shared with the result.
        eval_id: EvalId,
    },
    /// Output of a console evaluation.
    Result {
        /// Evaluation id shared with the command.
        eval_id: EvalId,
        /// Command this result answers, resolved by the store.
        paired_command: Option<MessageId>,
    },
    /// Provisional placeholder shown while a logpoint hit is evaluated.
    LogpointLoading {
        /// Logpoint group.
        group: LogGroupId,
    },
    /// Final output of a logpoint hit.
    LogpointResult {
        /// Logpoint group.
        group: LogGroupId,
    },
    /// Page navigation marker.
    Navigation,
}

impl MessageKind {
    /// Evaluation id for commands and results.
    #[must_use]
    pub fn eval_id(&self) -> Option<EvalId> {
        match self {
            Self::Command { eval_id } | Self::Result { eval_id, .. } => Some(*eval_id),
            _ => None,
        }
    }

    /// Logpoint group for logpoint messages.
    #[must_use]
    pub fn log_group(&self) -> Option<&LogGroupId> {
        match self {
            Self::LogpointLoading { group } | Self::LogpointResult { group } => Some(group),
            _ => None,
        }
    }

    /// Commands, results and navigation markers bypass every filter.
    #[must_use]
    pub fn is_unfilterable(&self) -> bool {
        matches!(
            self,
            Self::Command { .. } | Self::Result { .. } | Self::Navigation
        )
    }

    /// Whether this is one half of a console evaluation.
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Command { .. } | Self::Result { .. })
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ConsoleLog { .. } => "console_log",
            Self::PageError => "page_error",
            Self::Command { .. } => "command",
            Self::Result { .. } => "result",
            Self::LogpointLoading { .. } => "logpoint_loading",
            Self::LogpointResult { .. } => "logpoint_result",
            Self::Navigation => "navigation",
        }
    }
}

/// Source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Enclosing function, if known.
    #[serde(default)]
    pub function_name: Option<String>,
    /// Source path or URL.
    pub source: String,
    /// 1-based line.
    #[serde(default)]
    pub line: u32,
    /// 1-based column.
    #[serde(default)]
    pub column: u32,
}

impl Frame {
    /// Whether the frame points into a third-party package directory.
    #[must_use]
    pub fn is_third_party(&self) -> bool {
        self.source.contains("node_modules")
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("");
        write!(f, "{name} {}:{}:{}", self.source, self.line, self.column)
    }
}

/// Network request attached to a network message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkRequest {
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
}

/// Structured note (for example an error cause) attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    /// Location the note refers to.
    #[serde(default)]
    pub frame: Option<Frame>,
    /// Note text.
    pub body: String,
}

/// Structured parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// `undefined`.
    Undefined,
    /// `null`.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Number primitive.
    Number(f64),
    /// String primitive.
    String(String),
    /// Big integer, kept in decimal form.
    BigInt(String),
    /// Symbol description.
    Symbol(String),
    /// Reference into the message's object previews.
    Object(ObjectId),
}

/// Named property of a previewed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    /// Property key.
    pub name: String,
    /// Property value.
    pub value: Value,
}

/// Preview of one object referenced by a message parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPreview {
    /// Object id referenced by [`Value::Object`].
    pub id: ObjectId,
    /// Constructor name, e.g. `Object` or `Array`.
    #[serde(default)]
    pub class_name: String,
    /// Previewed properties; values may reference other previews, including
    /// this object itself.
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Object preview table keyed by object id.
pub type ObjectPreviews = BTreeMap<ObjectId, ObjectPreview>;

/// A validated message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MessageDraft {
    /// Message family.
    pub kind: MessageKind,
    /// Severity.
    pub level: Level,
    /// Origin.
    pub source: MessageSource,
    /// Plain text.
    pub message_text: String,
    /// Real recording position, when the backend supplied one.
    pub execution_point: Option<ExecutionPoint>,
    /// Wall-clock estimate in milliseconds.
    pub execution_point_time: f64,
    /// Emitting location.
    pub frame: Option<Frame>,
    /// Stack at emission.
    pub stacktrace: Vec<Frame>,
    /// Structured parameters.
    pub parameters: Vec<Value>,
    /// Previews for objects referenced by `parameters`.
    pub previews: ObjectPreviews,
    /// Network request, for network messages.
    pub request: Option<NetworkRequest>,
    /// Structured notes.
    pub notes: Vec<Note>,
    /// Label shown before the message (logpoint prefix badges).
    pub prefix: Option<String>,
    /// Pause the message's values belong to.
    pub pause_id: Option<String>,
}

impl MessageDraft {
    /// Minimal draft with empty optional data.
    pub fn new(
        kind: MessageKind,
        level: Level,
        source: MessageSource,
        message_text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            level,
            source,
            message_text: message_text.into(),
            execution_point: None,
            execution_point_time: 0.0,
            frame: None,
            stacktrace: Vec::new(),
            parameters: Vec::new(),
            previews: ObjectPreviews::new(),
            request: None,
            notes: Vec::new(),
            prefix: None,
            pause_id: None,
        }
    }

    /// Attach a real execution point and its time.
    #[must_use]
    pub fn at_point(mut self, point: ExecutionPoint, time: f64) -> Self {
        self.execution_point = Some(point);
        self.execution_point_time = time;
        self
    }

    /// Attach an emitting frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Attach structured parameters and their previews.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Value>, previews: ObjectPreviews) -> Self {
        self.parameters = parameters;
        self.previews = previews;
        self
    }
}

/// A stored, frozen console message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    /// Store-assigned id.
    pub id: MessageId,
    /// Message family.
    pub kind: MessageKind,
    /// Severity.
    pub level: Level,
    /// Origin.
    pub source: MessageSource,
    /// Plain text.
    pub message_text: String,
    /// Real recording position.
    pub execution_point: Option<ExecutionPoint>,
    /// Wall-clock estimate in milliseconds.
    pub execution_point_time: f64,
    /// Synthetic anchor, present exactly when `execution_point` is absent.
    pub last_execution_point: Option<LastExecutionPoint>,
    /// Emitting location.
    pub frame: Option<Frame>,
    /// Stack at emission.
    pub stacktrace: Vec<Frame>,
    /// Structured parameters.
    pub parameters: Vec<Value>,
    /// Previews for objects referenced by `parameters`.
    pub previews: ObjectPreviews,
    /// Network request.
    pub request: Option<NetworkRequest>,
    /// Structured notes.
    pub notes: Vec<Note>,
    /// Prefix label.
    pub prefix: Option<String>,
    /// Pause the message's values belong to.
    pub pause_id: Option<String>,
}

impl Message {
    /// Freeze a draft under an id.
    #[must_use]
    pub fn from_draft(
        id: MessageId,
        draft: MessageDraft,
        last_execution_point: Option<LastExecutionPoint>,
    ) -> Self {
        let MessageDraft {
            kind,
            level,
            source,
            message_text,
            execution_point,
            execution_point_time,
            frame,
            stacktrace,
            parameters,
            previews,
            request,
            notes,
            prefix,
            pause_id,
        } = draft;
        Self {
            id,
            kind,
            level,
            source,
            message_text,
            execution_point,
            execution_point_time,
            last_execution_point,
            frame,
            stacktrace,
            parameters,
            previews,
            request,
            notes,
            prefix,
            pause_id,
        }
    }

    /// The point used for ordering: the real point, else the synthetic anchor.
    #[must_use]
    pub fn ordering_point(&self) -> Option<&ExecutionPoint> {
        self.execution_point
            .as_ref()
            .or_else(|| self.last_execution_point.as_ref().map(|last| &last.point))
    }

    /// Cohort counter; zero for messages with a real point.
    #[must_use]
    pub fn cohort(&self) -> u32 {
        self.last_execution_point
            .as_ref()
            .map_or(0, |last| last.message_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_display_matches_search_format() {
        let frame = Frame {
            function_name: Some("render".to_string()),
            source: "src/app.js".to_string(),
            line: 12,
            column: 4,
        };
        assert_eq!(frame.to_string(), "render src/app.js:12:4");
        assert!(!frame.is_third_party());
    }

    #[test]
    fn unfilterable_kinds() {
        assert!(MessageKind::Command { eval_id: EvalId(1) }.is_unfilterable());
        assert!(MessageKind::Navigation.is_unfilterable());
        assert!(!MessageKind::PageError.is_unfilterable());
        assert!(
            !MessageKind::LogpointResult {
                group: LogGroupId::new("g")
            }
            .is_unfilterable()
        );
    }

    #[test]
    fn ordering_point_prefers_real_point() {
        let draft = MessageDraft::new(
            MessageKind::ConsoleLog {
                call: ConsoleCall::Log,
            },
            Level::Log,
            MessageSource::ConsoleApi,
            "hi",
        )
        .at_point(ExecutionPoint::from(7), 1.0);
        let message = Message::from_draft(MessageId(1), draft, None);
        assert_eq!(message.ordering_point(), Some(&ExecutionPoint::from(7)));
        assert_eq!(message.cohort(), 0);
    }
}
