//! Store contracts for the `MeetBrief` coordination engine
//!
//! Three seams live here:
//!
//! - [`CoordinationStore`]: the TTL-bounded key-value store workers and the
//!   coordinator communicate through. Producers write a [`WorkerResult`]
//!   once; the coordinator reads and then clears it. The trait is the
//!   process boundary; [`MemoryCoordinationStore`] is the in-process
//!   implementation for single-node deployments and tests.
//! - [`MeetingStore`]: the persisted meeting record, written by the
//!   coordinator during transcript/analysis transitions. Implemented over
//!   Postgres in `meetbrief-database`.
//! - [`ArtifactStore`]: durable JSON/text artifacts in the results
//!   directory, retained after the ephemeral coordination keys are cleared.
//!
//! [`WorkerResult`]: meetbrief_core::WorkerResult

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod artifacts;
pub mod coordination;
pub mod error;
pub mod meetings;

pub use artifacts::ArtifactStore;
pub use coordination::{CoordinationStore, JobStatus, MemoryCoordinationStore, RESULT_TTL};
pub use error::{StoreError, StoreResult};
pub use meetings::MeetingStore;
