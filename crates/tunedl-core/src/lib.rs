//! Asynchronous job lifecycle for URL-to-audio downloads.
//!
//! A [`Dispatcher`] registers a job and spawns its worker; the worker drives
//! the job through the [`extractor::Extractor`] and records every transition
//! in the shared [`JobRegistry`]. [`StatusReporter`] and
//! [`maintenance::clear_jobs`] read and prune that registry.

pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod job;
pub mod maintenance;
pub mod reporter;
pub mod worker;


pub use dispatcher::{Dispatcher, Submission};
pub use error::JobError;
pub use job::{JobPhase, JobRecord, JobRegistry, JobStatus, Quality};
pub use maintenance::{ClearOutcome, clear_jobs};
pub use reporter::{DownloadList, JobDetail, StatusReporter};
