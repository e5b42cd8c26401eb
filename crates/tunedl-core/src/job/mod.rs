pub mod record;
pub mod registry;

pub use record::{JobPhase, JobRecord, JobSnapshot, JobStatus, MediaMetadata, Quality};
pub use registry::{JobRegistry, RegistryError};
