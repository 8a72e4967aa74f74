//! console-types - Data model for the replay console engine.
//!
//! Shared by the store and the session layer:
//! - Execution points and their numeric-magnitude order
//! - The [`Message`] sum type and its drafts
//! - Raw packets and inbound notifications from the transport layer
//! - Filter configuration and hide causes
//!
//! Types derive `schemars::JsonSchema` so collaborators can fetch an
//! authoritative schema for the packet and message shapes.

mod error;
mod filter;
mod message;
mod packet;
mod point;

pub use error::{ExecutionPointError, PacketError};
pub use filter::{FilterCause, FilterLevel, FilterPatch, FilterState};
pub use message::{
    ConsoleCall, EvalId, Frame, Level, LogGroupId, Message, MessageDraft, MessageId, MessageKind,
    MessageSource, NetworkRequest, Note, ObjectId, ObjectPreview, ObjectPreviews, Property, Value,
};
pub use packet::{InboundEvent, RawPacket};
pub use point::{ExecutionPoint, LastExecutionPoint, PausePoint, compare_points};
