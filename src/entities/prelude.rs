pub use super::jobs::Entity as Jobs;
pub use super::logs::Entity as Logs;
pub use super::schedules::Entity as Schedules;
pub use super::transactions::Entity as Transactions;
