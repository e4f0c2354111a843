pub mod envelope;
pub mod job;
pub mod log;
pub mod schedule;
pub mod status;
pub mod transaction;

pub use job::{InternalData, Job, JobFilters, JobType, JobUpdate, NewJob};
pub use log::Log;
pub use schedule::Schedule;
pub use status::JobStatus;
pub use transaction::{EthTransaction, TransactionType};
