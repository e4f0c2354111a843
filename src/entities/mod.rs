pub mod prelude;

pub mod jobs;
pub mod logs;
pub mod schedules;
pub mod transactions;
