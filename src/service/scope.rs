//! Loads a resource and checks that it lives in the caller's organization.
//!
//! A resource of another organization is reported as `CrossOrganizationAccess`, which renders
//! the same way as "not found".

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::auth::Caller;
use crate::entity::issue::{self, Entity as IssueEntity};
use crate::entity::project::{self, Entity as ProjectEntity};
use crate::entity::sprint::{self, Entity as SprintEntity};
use crate::model::global_error::{AppError, ErrorCode};

pub async fn find_project<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    project_id: i32,
) -> Result<project::Model, AppError> {
    let project = ProjectEntity::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::ProjectNotFound))?;

    caller.require_same_organization(project.organization_id)?;
    Ok(project)
}

pub async fn find_sprint<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    sprint_id: i32,
) -> Result<(sprint::Model, project::Model), AppError> {
    let (sprint, project) = SprintEntity::find_by_id(sprint_id)
        .find_also_related(ProjectEntity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SprintNotFound))?;

    let project = project.ok_or_else(|| AppError::not_found(ErrorCode::SprintNotFound))?;
    caller.require_same_organization(project.organization_id)?;
    Ok((sprint, project))
}

pub async fn find_issue<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    issue_id: i32,
) -> Result<(issue::Model, project::Model), AppError> {
    let (issue, project) = IssueEntity::find_by_id(issue_id)
        .find_also_related(ProjectEntity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::IssueNotFound))?;

    let project = project.ok_or_else(|| AppError::not_found(ErrorCode::IssueNotFound))?;
    caller.require_same_organization(project.organization_id)?;
    Ok((issue, project))
}
