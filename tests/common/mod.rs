use async_trait::async_trait;
use orchestrate_scheduler::config::TopicConfig;
use orchestrate_scheduler::error::{OrchestrateError, Result};
use orchestrate_scheduler::models::{EthTransaction, Job, JobStatus, JobType, JobUpdate, NewJob, Schedule};
use orchestrate_scheduler::services::dispatcher::InMemoryDispatcher;
use orchestrate_scheduler::services::jobs::{create_job, start_job, update_job};
use orchestrate_scheduler::services::metrics::JobMetrics;
use orchestrate_scheduler::services::registry::{AccountRegistry, ChainRegistry};
use orchestrate_scheduler::services::schedules::create_schedule;
use orchestrate_scheduler::AppState;
use prometheus::Registry;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const TENANT: &str = "tenantOne";
pub const CHAIN_ID: &str = "888";
pub const SENDER: &str = "0x905B88EFf8Bda1543d4d6f4aA05afef143D27E18";

/// Set up an in-memory database with the schema applied.
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_test_db() -> std::result::Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Chain and account lookups answered from fixed tables
#[derive(Default)]
pub struct StaticRegistry {
    chains: HashMap<Uuid, String>,
    accounts: HashSet<String>,
}

#[async_trait]
impl ChainRegistry for StaticRegistry {
    async fn get_chain_id(&self, chain_uuid: Uuid, _tenants: &[String]) -> Result<String> {
        self.chains
            .get(&chain_uuid)
            .cloned()
            .ok_or_else(|| OrchestrateError::not_found(format!("chain {} not found", chain_uuid)))
    }
}

#[async_trait]
impl AccountRegistry for StaticRegistry {
    async fn account_exists(&self, address: &str, _tenants: &[String]) -> Result<bool> {
        Ok(self.accounts.contains(&address.to_lowercase()))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub dispatcher: Arc<InMemoryDispatcher>,
    pub chain_uuid: Uuid,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = setup_test_db().await.unwrap();
        let chain_uuid = Uuid::new_v4();

        let registry = Arc::new(StaticRegistry {
            chains: HashMap::from([(chain_uuid, CHAIN_ID.to_string())]),
            accounts: HashSet::from([SENDER.to_lowercase()]),
        });
        let dispatcher = Arc::new(InMemoryDispatcher::new());

        let state = AppState {
            db,
            dispatcher: dispatcher.clone(),
            chains: registry.clone(),
            accounts: registry,
            metrics: JobMetrics::register(&Registry::new()).unwrap(),
            topics: TopicConfig::default(),
            dispatch_timeout: Duration::from_secs(1),
        };

        Self {
            state,
            dispatcher,
            chain_uuid,
        }
    }

    pub fn tenants(&self) -> Vec<String> {
        vec![TENANT.to_string()]
    }

    pub async fn schedule(&self) -> Schedule {
        create_schedule(&self.state, TENANT).await.unwrap()
    }

    pub fn draft(&self, schedule_uuid: Uuid, job_type: JobType) -> NewJob {
        NewJob::new(schedule_uuid, self.chain_uuid, job_type, transaction())
    }

    pub async fn create(&self, draft: NewJob) -> Job {
        create_job(&self.state, draft, &self.tenants()).await.unwrap()
    }

    /// Create, start and report the job as PENDING
    pub async fn pending(&self, draft: NewJob) -> Job {
        let job = self.create(draft).await;
        start_job(&self.state, job.uuid, &self.tenants()).await.unwrap();
        self.set_status(job.uuid, JobStatus::Pending).await
    }

    pub async fn set_status(&self, job_uuid: Uuid, status: JobStatus) -> Job {
        update_job(&self.state, JobUpdate::status(job_uuid, status, ""), &self.tenants())
            .await
            .unwrap()
    }
}

pub fn transaction() -> EthTransaction {
    EthTransaction {
        from: Some(SENDER.to_string()),
        to: Some("0x7E654d251Da770A068413677967F6d3Ea2FeA9E4".to_string()),
        nonce: Some("1".to_string()),
        value: Some("0".to_string()),
        gas: Some("21000".to_string()),
        gas_price: Some("1000000000".to_string()),
        data: Some("0x".to_string()),
        ..Default::default()
    }
}
