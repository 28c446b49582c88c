//! Run manager, evidence model, and append-only JSONL writer/reader.
//!
//! A run is an immutable, timestamped directory on local disk:
//!
//! ```text
//! <runs_root>/<run_id>/
//!   manifest.json
//!   evidence/{quality,coverage,churn,risks,recommendations}.jsonl
//!   artifacts/<raw tool outputs>
//! ```
//!
//! This crate owns that layout end to end: allocating and loading runs
//! ([`run::RunHandle`]), the typed record shapes ([`model`]), id allocation
//! ([`id::IdGenerator`]), and the writer/reader pair that keeps
//! `manifest.json`'s counts in lockstep with the JSONL bytes on disk.

pub mod id;
pub mod model;
pub mod reader;
pub mod run;
pub mod runs_root;
pub mod writer;

pub use id::{IdGenerator, SharedIdGenerator};
pub use reader::Reader;
pub use run::RunHandle;
pub use writer::Writer;
