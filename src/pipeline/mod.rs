//! Pipeline orchestration: discovery, per-document sequencing, and result
//! aggregation.

mod runner;
pub mod types;

pub use runner::PipelineRunner;
pub use types::{DocumentChunk, PipelineError, ProcessingResult};
