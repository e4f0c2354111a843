//! Job orchestration use-cases
//!
//! Every mutating use-case locks the job row inside a `DatabaseTransaction`
//! before reading its status, so concurrent callers serialize on the store.

pub mod create_job;
pub mod get_job;
pub mod resend_job_tx;
pub mod retry_job_tx;
pub mod start_job;
pub mod start_next_job;
pub mod update_children;
pub mod update_job;

pub use create_job::create_job;
pub use get_job::{get_job, search_jobs};
pub use resend_job_tx::resend_job_tx;
pub use retry_job_tx::retry_job_tx;
pub use start_job::start_job;
pub use start_next_job::start_next_job;
pub use update_children::update_children;
pub use update_job::update_job;
