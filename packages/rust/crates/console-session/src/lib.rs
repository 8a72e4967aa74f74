//! console-session: runtime wiring for the replay console.
//!
//! - [`IngestionBatcher`]: coalesces packet bursts into fixed-window batches
//! - [`SearchController`]: immediate query echo, background result recompute
//! - [`ConsoleSession`]: owns one store per recording session, with reset
//! - [`ConsoleSettings`]: layered YAML settings

mod batcher;
mod error;
mod observability;
mod search;
mod session;
mod settings;

pub use batcher::{BatchHandle, BatchReport, BatchSink, IngestionBatcher};
pub use error::SessionError;
pub use observability::SessionEvent;
pub use search::{SearchController, SearchSnapshot};
pub use session::ConsoleSession;
pub use settings::{
    ConsoleSettings, EvaluationSettings, IngestSettings, OrderingSettings, SearchSettings,
    console_settings_paths, load_console_settings, load_console_settings_from_paths,
    set_config_home_override,
};
