// src/lib.rs

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use config::TopicConfig;
use services::dispatcher::MessageDispatcher;
use services::metrics::JobMetrics;
use services::registry::{AccountRegistry, ChainRegistry};

/// Collaborators shared by every use-case
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub dispatcher: Arc<dyn MessageDispatcher>,
    pub chains: Arc<dyn ChainRegistry>,
    pub accounts: Arc<dyn AccountRegistry>,
    pub metrics: JobMetrics,
    pub topics: TopicConfig,
    pub dispatch_timeout: Duration,
}

pub mod entities;

pub mod services {
    pub mod dispatcher;
    pub mod jobs;
    pub mod metrics;
    pub mod registry;
    pub mod schedules;
}

pub mod jobs {
    pub mod tx_sentry;
}

pub mod config;
pub mod error;
pub mod models;
pub mod store;
