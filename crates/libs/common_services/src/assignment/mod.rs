mod dispatcher;
mod error;
pub mod memory;
pub mod postgres;
pub mod ranking;
mod scheduler;
mod traits;

pub use dispatcher::AssignmentDispatcher;
pub use error::{AssignmentError, StorageError};
pub use scheduler::{AssignmentOutcome, AssignmentRequest, AssignmentScheduler};
pub use traits::{CrewDirectory, JobAssignmentStore};
