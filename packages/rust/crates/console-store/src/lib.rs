//! console-store: ordered, filtered and searchable console message store.
//!
//! Messages arrive out of recording order; the store keeps a visible id list
//! sorted by execution point, attributes every hidden message to one filter
//! cause, and replaces provisional logpoint output with its final result.
//! All transitions are pure functions over [`ConsoleState`] snapshots.

mod ids;
mod logpoint;
mod observability;
mod order;
mod search;
mod state;
mod store;
mod text_match;
mod visibility;

pub use ids::{IdGenerator, SequentialIds};
pub use logpoint::{LogpointLifecycle, SupersessionKey};
pub use observability::StoreEvent;
pub use order::{OrderingMode, compare_messages, insertion_index, sort_visible};
pub use search::{SearchState, SearchView};
pub use state::{Command, ConsoleState, EvaluationPairing, PausePosition, StoreConfig, Transition};
pub use store::MessageStore;
pub use text_match::TextQuery;
pub use visibility::{CompiledFilters, FilteredCounts, Visibility, classify};
