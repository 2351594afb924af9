use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::auth::{authorize, Caller, IdentityProvider, RequestContext};
use crate::board::ordering::{sort_for_display, ReorderEntry};
use crate::entity::issue::{self, ActiveModel as IssueActiveModel, Entity as IssueEntity};
use crate::entity::project::{self, Entity as ProjectEntity};
use crate::entity::sea_orm_active_enums::IssueStatus;
use crate::entity::sprint::Entity as SprintEntity;
use crate::entity::user::Entity as UserEntity;
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::issue::{IssueCreateRequest, IssueResponse, IssueUpdateRequest, UserSummary};
use crate::service::scope;

/// Attaches assignee and reporter summaries, keeping the input order.
pub async fn with_people<C: ConnectionTrait>(db: &C, issues: Vec<issue::Model>) -> Result<Vec<IssueResponse>, AppError> {
    let user_ids: HashSet<i32> = issues
        .iter()
        .flat_map(|i| [Some(i.reporter_id), i.assignee_id])
        .flatten()
        .collect();

    let users: HashMap<i32, UserSummary> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        UserEntity::find()
            .filter(crate::entity::user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect()
    };

    Ok(issues
        .into_iter()
        .map(|i| {
            let assignee = i.assignee_id.and_then(|id| users.get(&id).cloned());
            let reporter = users.get(&i.reporter_id).cloned();
            IssueResponse::new(i, assignee, reporter)
        })
        .collect())
}

/// A sprint's issues sorted by column, then by order.
pub async fn load_sprint_issues<C: ConnectionTrait>(db: &C, sprint_id: i32) -> Result<Vec<issue::Model>, AppError> {
    let mut issues = IssueEntity::find()
        .filter(issue::Column::SprintId.eq(sprint_id))
        .order_by_asc(issue::Column::Order)
        .order_by_asc(issue::Column::Id)
        .all(db)
        .await?;

    sort_for_display(&mut issues);
    Ok(issues)
}

/// Next free order at the end of a (project, status) column.
async fn next_order<C: ConnectionTrait>(db: &C, project_id: i32, status: IssueStatus) -> Result<i32, AppError> {
    let last_issue = IssueEntity::find()
        .filter(
            Condition::all()
                .add(issue::Column::ProjectId.eq(project_id))
                .add(issue::Column::Status.eq(status))
        )
        .order_by_desc(issue::Column::Order)
        .one(db)
        .await?;

    Ok(last_issue.map_or(0, |i| i.order + 1))
}

#[instrument(skip(db, identity))]
pub async fn get_issues_for_sprint(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    sprint_id: i32,
) -> Result<Vec<IssueResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;
    let (sprint, _) = scope::find_sprint(db, &caller, sprint_id).await?;

    let issues = load_sprint_issues(db, sprint.id).await?;
    info!(sprint_id, count = issues.len(), "스프린트 이슈 조회 완료");

    with_people(db, issues).await
}

fn validate_create_request(request: &IssueCreateRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if request.title.trim().is_empty() {
        errors.push(ValidationFieldError::new("title", "제목은 필수입니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

#[instrument(skip(db, identity, request))]
pub async fn create_issue(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    project_id: i32,
    request: IssueCreateRequest,
) -> Result<IssueResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    validate_create_request(&request)?;

    let project = scope::find_project(db, &caller, project_id).await?;

    if let Some(sprint_id) = request.sprint_id {
        let sprint = SprintEntity::find_by_id(sprint_id).one(db).await?;
        if !sprint.is_some_and(|s| s.project_id == project.id) {
            return Err(AppError::field("sprintId", "같은 프로젝트의 스프린트가 아닙니다."));
        }
    }

    if let Some(assignee_id) = request.assignee_id {
        if identity.member_role(assignee_id, caller.organization_id).await?.is_none() {
            return Err(AppError::field("assigneeId", "담당자는 조직 멤버여야 합니다."));
        }
    }

    let order = next_order(db, project.id, request.status).await?;
    let now = Utc::now();

    let new_issue = IssueActiveModel {
        title: Set(request.title.trim().to_string()),
        description: Set(request.description),
        status: Set(request.status),
        priority: Set(request.priority),
        order: Set(order),
        project_id: Set(project.id),
        sprint_id: Set(request.sprint_id),
        assignee_id: Set(request.assignee_id),
        reporter_id: Set(caller.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = new_issue.insert(db).await?;
    info!(issue_id = inserted.id, order, "이슈 생성 완료");

    let mut responses = with_people(db, vec![inserted]).await?;
    responses
        .pop()
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))
}

fn persistence_failure(err: DbErr) -> AppError {
    warn!(error = %err, "이슈 순서 저장 실패");
    AppError::with_detail(ErrorCode::PersistenceFailure, err.to_string())
}

/// Writes a reorder batch in one transaction. Either every row is updated or none is.
pub(crate) async fn persist_order(
    db: &DatabaseConnection,
    caller: &Caller,
    entries: &[ReorderEntry],
) -> Result<(), AppError> {
    if entries.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = entries.iter().find(|e| !seen.insert(e.id)) {
        return Err(AppError::field("issues", &format!("이슈 {}가 중복되었습니다.", duplicate.id)));
    }

    let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
    let txn = db.begin().await.map_err(persistence_failure)?;

    let rows = IssueEntity::find()
        .filter(issue::Column::Id.is_in(ids.clone()))
        .find_also_related(ProjectEntity)
        .all(&txn)
        .await
        .map_err(persistence_failure)?;

    if rows.len() != entries.len() {
        txn.rollback().await.ok();
        let found: HashSet<i32> = rows.iter().map(|(i, _)| i.id).collect();
        let missing: Vec<i32> = ids.into_iter().filter(|id| !found.contains(id)).collect();
        warn!(?missing, "삭제된 이슈가 포함된 순서 변경 요청");
        return Err(AppError::with_detail(
            ErrorCode::PersistenceFailure,
            format!("존재하지 않는 이슈: {:?}", missing),
        ));
    }

    let mut current = HashMap::new();
    for (issue, project) in rows {
        let organization_id = project.map(|p| p.organization_id);
        if organization_id != Some(caller.organization_id) {
            txn.rollback().await.ok();
            return Err(AppError::not_found(ErrorCode::CrossOrganizationAccess));
        }
        current.insert(issue.id, issue);
    }

    let now = Utc::now();
    for entry in entries {
        let Some(model) = current.remove(&entry.id) else {
            txn.rollback().await.ok();
            return Err(AppError::new(ErrorCode::PersistenceFailure));
        };

        let mut active: IssueActiveModel = model.into();
        active.status = Set(entry.status);
        active.order = Set(entry.order);
        active.updated_at = Set(now);

        if let Err(err) = active.update(&txn).await {
            txn.rollback().await.ok();
            return Err(persistence_failure(err));
        }
    }

    txn.commit().await.map_err(persistence_failure)?;
    info!(count = entries.len(), "이슈 순서 저장 완료");

    Ok(())
}

#[instrument(skip(db, identity, entries), fields(count = entries.len()))]
pub async fn update_issue_order(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    entries: &[ReorderEntry],
) -> Result<(), AppError> {
    let caller = authorize(identity, ctx).await?;
    persist_order(db, &caller, entries).await
}

#[instrument(skip(db, identity, request))]
pub async fn update_issue(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    issue_id: i32,
    request: IssueUpdateRequest,
) -> Result<IssueResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    let (issue, project) = scope::find_issue(db, &caller, issue_id).await?;
    caller.require_reporter_or_admin(issue.reporter_id)?;

    let mut active: IssueActiveModel = issue.clone().into();

    if let Some(status) = request.status {
        if status != issue.status {
            // 새 컬럼의 맨 끝으로 보낸다
            let order = next_order(db, project.id, status).await?;
            active.status = Set(status);
            active.order = Set(order);
        }
    }
    if let Some(priority) = request.priority {
        active.priority = Set(priority);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!(issue_id, "이슈 수정 완료");

    let mut responses = with_people(db, vec![updated]).await?;
    responses
        .pop()
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))
}

#[instrument(skip(db, identity))]
pub async fn delete_issue(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    issue_id: i32,
) -> Result<(), AppError> {
    let caller = authorize(identity, ctx).await?;
    let (issue, _) = scope::find_issue(db, &caller, issue_id).await?;
    caller.require_reporter_or_admin(issue.reporter_id)?;

    IssueEntity::delete_by_id(issue.id).exec(db).await?;
    info!(issue_id, "이슈 삭제 완료");

    Ok(())
}

/// Issues assigned to or reported by the caller, most recently updated first.
#[instrument(skip(db, identity))]
pub async fn get_user_issues(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
) -> Result<Vec<IssueResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;

    let issues = IssueEntity::find()
        .join(JoinType::InnerJoin, issue::Relation::Project.def())
        .filter(project::Column::OrganizationId.eq(caller.organization_id))
        .filter(
            Condition::any()
                .add(issue::Column::AssigneeId.eq(caller.user_id))
                .add(issue::Column::ReporterId.eq(caller.user_id))
        )
        .order_by_desc(issue::Column::UpdatedAt)
        .order_by_desc(issue::Column::Id)
        .all(db)
        .await?;

    with_people(db, issues).await
}
