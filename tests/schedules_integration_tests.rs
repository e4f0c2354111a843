mod common;

use common::{TestContext, TENANT};
use orchestrate_scheduler::error::ErrorKind;
use orchestrate_scheduler::models::JobType;
use orchestrate_scheduler::services::schedules::{create_schedule, get_schedule, search_schedules};
use uuid::Uuid;

#[tokio::test]
async fn test_schedule_with_jobs() {
    let ctx = TestContext::new().await;
    let schedule = ctx.schedule().await;
    assert_eq!(schedule.tenant_id, TENANT);
    assert!(schedule.jobs.is_empty());

    let first = ctx.create(ctx.draft(schedule.uuid, JobType::EthereumTransaction)).await;
    let second = ctx.create(ctx.draft(schedule.uuid, JobType::EthereumTransaction)).await;

    let loaded = get_schedule(&ctx.state, schedule.uuid, &ctx.tenants()).await.unwrap();
    let uuids: Vec<Uuid> = loaded.jobs.iter().map(|j| j.uuid).collect();
    assert_eq!(uuids, vec![first.uuid, second.uuid]);
}

#[tokio::test]
async fn test_schedules_are_tenant_scoped() {
    let ctx = TestContext::new().await;
    let own = ctx.schedule().await;
    let other = create_schedule(&ctx.state, "tenantTwo").await.unwrap();
    ctx.create(ctx.draft(own.uuid, JobType::EthereumTransaction)).await;

    let err = get_schedule(&ctx.state, other.uuid, &ctx.tenants()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.component.starts_with("use-cases.get-schedule"));

    let visible = search_schedules(&ctx.state, &ctx.tenants()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].uuid, own.uuid);
    assert_eq!(visible[0].jobs.len(), 1);

    let all = search_schedules(&ctx.state, &["_".to_string()]).await.unwrap();
    assert_eq!(all.len(), 2);
}
