//! Event log pipeline: bounded buffer, filtering, analytics, export
//!
//! This module holds the read-side of a task subscription:
//! - [`EventBuffer`]: capacity-bounded live window with update-in-place
//! - [`filter`]: pure predicate evaluation over buffer snapshots
//! - [`analytics`]: windowed statistics recomputed on every change
//! - [`export`]: serialization of a filtered view into an artifact
//!
//! Data flow:
//!
//! ```text
//! Subscription Channel ──► EventBuffer ──► filter::apply ──► analytics::compute
//!                                                       └──► export::export
//! ```

mod buffer;
pub mod analytics;
pub mod export;
pub mod filter;

pub use analytics::{compute, compute_at, TIMELINE_BUCKETS};
pub use buffer::EventBuffer;
pub use export::{ExportArtifact, ExportDocument, ExportError, ExportResult};
