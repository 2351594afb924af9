use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::auth::{authorize, IdentityProvider, RequestContext};
use crate::entity::issue::{self, Entity as IssueEntity};
use crate::entity::project::{self, ActiveModel as ProjectActiveModel, Entity as ProjectEntity};
use crate::entity::sprint::{self, Entity as SprintEntity};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::project::{ProjectCreateRequest, ProjectDetailResponse, ProjectResponse};
use crate::model::sprint::SprintResponse;
use crate::service::scope;

fn validate_project_request(request: &ProjectCreateRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push(ValidationFieldError::new("name", "프로젝트 이름은 필수입니다."));
    }

    let key = request.key.trim();
    if key.is_empty() {
        errors.push(ValidationFieldError::new("key", "프로젝트 키는 필수입니다."));
    } else if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationFieldError::new("key", "프로젝트 키는 영문자와 숫자만 사용할 수 있습니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

#[instrument(skip(db, identity, request))]
pub async fn create_project(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    request: ProjectCreateRequest,
) -> Result<ProjectResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    caller.require_admin()?;
    validate_project_request(&request)?;

    let new_project = ProjectActiveModel::from_request(&request, caller.organization_id);
    let key = request.key.trim().to_uppercase();

    let existing = ProjectEntity::find()
        .filter(
            Condition::all()
                .add(project::Column::OrganizationId.eq(caller.organization_id))
                .add(project::Column::Key.eq(key.as_str()))
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::with_detail(ErrorCode::DuplicateProjectKey, key));
    }

    let inserted = new_project.insert(db).await?;
    info!(project_id = inserted.id, key = %inserted.key, "프로젝트 생성 완료");

    Ok(ProjectResponse::from(inserted))
}

#[instrument(skip(db, identity))]
pub async fn get_project(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    project_id: i32,
) -> Result<ProjectDetailResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    let project = scope::find_project(db, &caller, project_id).await?;

    let sprints = SprintEntity::find()
        .filter(sprint::Column::ProjectId.eq(project.id))
        .order_by_desc(sprint::Column::CreatedAt)
        .order_by_desc(sprint::Column::Id)
        .all(db)
        .await?;

    Ok(ProjectDetailResponse {
        project: ProjectResponse::from(project),
        sprints: sprints.into_iter().map(SprintResponse::from).collect(),
    })
}

#[instrument(skip(db, identity))]
pub async fn list_projects(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
) -> Result<Vec<ProjectResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;

    let projects = ProjectEntity::find()
        .filter(project::Column::OrganizationId.eq(caller.organization_id))
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(db)
        .await?;

    Ok(projects.into_iter().map(ProjectResponse::from).collect())
}

/// Removes a project together with its sprints and issues.
#[instrument(skip(db, identity))]
pub async fn delete_project(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    project_id: i32,
) -> Result<(), AppError> {
    let caller = authorize(identity, ctx).await?;
    caller.require_admin()?;
    let project = scope::find_project(db, &caller, project_id).await?;

    let txn = db.begin().await?;

    IssueEntity::delete_many()
        .filter(issue::Column::ProjectId.eq(project.id))
        .exec(&txn)
        .await?;
    SprintEntity::delete_many()
        .filter(sprint::Column::ProjectId.eq(project.id))
        .exec(&txn)
        .await?;
    ProjectEntity::delete_by_id(project.id).exec(&txn).await?;

    txn.commit().await?;
    info!(project_id, "프로젝트 삭제 완료");

    Ok(())
}
