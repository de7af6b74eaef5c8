//! Keeps the conversation small enough to send.
//!
//! Three layers, cheapest first:
//! - [`trim_history`] caps the stored history at a fixed message count.
//! - [`prepare_outbound`] shortens aged messages in the copy sent to the
//!   model; the stored history keeps the full text.
//! - [`Compactor`] replaces the whole history with a model-written summary,
//!   on request or when the context window is nearly full.

mod summarizer;
mod trim;
mod truncate;

pub use summarizer::{CompactionError, Compactor, condense_history, summarize_history};
pub use trim::{is_trim_marker, trim_history};
pub use truncate::{AgeBucket, prepare_outbound, truncate_message};
