use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::auth::{authorize, IdentityProvider, RequestContext};
use crate::entity::sea_orm_active_enums::SprintStatus;
use crate::entity::sprint::{self, ActiveModel as SprintActiveModel, Entity as SprintEntity};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::sprint::{SprintCreateRequest, SprintResponse};
use crate::service::scope;

/// Forward-only lifecycle: PLANNED -> ACTIVE -> COMPLETED.
pub fn check_transition(sprint: &sprint::Model, target: SprintStatus, now: DateTime<Utc>) -> Result<(), AppError> {
    match (sprint.status, target) {
        (SprintStatus::Planned, SprintStatus::Active) => {
            if sprint.contains(now) {
                Ok(())
            } else {
                Err(AppError::with_detail(
                    ErrorCode::InvalidSprintTransition,
                    "스프린트 기간 밖에서는 시작할 수 없습니다",
                ))
            }
        }
        (SprintStatus::Active, SprintStatus::Completed) => Ok(()),
        (current, target) => Err(AppError::with_detail(
            ErrorCode::InvalidSprintTransition,
            format!("{:?} 상태에서 {:?} 상태로 변경할 수 없습니다", current, target),
        )),
    }
}

fn validate_dates(request: &SprintCreateRequest) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let mut errors = Vec::new();

    if request.start_date.is_none() {
        errors.push(ValidationFieldError::new("startDate", "시작일은 필수입니다."));
    }
    if request.end_date.is_none() {
        errors.push(ValidationFieldError::new("endDate", "종료일은 필수입니다."));
    }

    match (request.start_date, request.end_date) {
        (Some(start), Some(end)) if start <= end => Ok((start, end)),
        (Some(_), Some(_)) => Err(AppError::field("endDate", "종료일은 시작일 이후여야 합니다.")),
        _ => Err(AppError::ValidationError(errors)),
    }
}

#[instrument(skip(db, identity, request))]
pub async fn create_sprint(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    project_id: i32,
    request: SprintCreateRequest,
) -> Result<SprintResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    let project = scope::find_project(db, &caller, project_id).await?;
    let (start_date, end_date) = validate_dates(&request)?;

    let name = match request.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let count = SprintEntity::find()
                .filter(sprint::Column::ProjectId.eq(project.id))
                .count(db)
                .await?;
            format!("{}-{}", project.key, count + 1)
        }
    };

    let now = Utc::now();
    let new_sprint = SprintActiveModel {
        name: Set(name),
        start_date: Set(start_date),
        end_date: Set(end_date),
        status: Set(SprintStatus::Planned),
        project_id: Set(project.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = new_sprint.insert(db).await?;
    info!(sprint_id = inserted.id, "스프린트 생성 완료");

    Ok(SprintResponse::from(inserted))
}

#[instrument(skip(db, identity))]
pub async fn list_sprints(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    project_id: i32,
) -> Result<Vec<SprintResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;
    let project = scope::find_project(db, &caller, project_id).await?;

    let sprints = SprintEntity::find()
        .filter(sprint::Column::ProjectId.eq(project.id))
        .order_by_desc(sprint::Column::CreatedAt)
        .order_by_desc(sprint::Column::Id)
        .all(db)
        .await?;

    Ok(sprints.into_iter().map(SprintResponse::from).collect())
}

#[instrument(skip(db, identity))]
pub async fn update_sprint_status(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    sprint_id: i32,
    status: SprintStatus,
) -> Result<SprintResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    let (sprint, _) = scope::find_sprint(db, &caller, sprint_id).await?;
    caller.require_admin()?;

    check_transition(&sprint, status, Utc::now())?;

    let mut active: SprintActiveModel = sprint.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    info!(sprint_id, status = ?updated.status, "스프린트 상태 변경 완료");
    Ok(SprintResponse::from(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn sprint(status: SprintStatus, start_offset_days: i64, end_offset_days: i64) -> sprint::Model {
        let now = Utc::now();
        sprint::Model {
            id: 1,
            name: "APP-1".to_string(),
            start_date: now + Duration::days(start_offset_days),
            end_date: now + Duration::days(end_offset_days),
            status,
            project_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case::start_within_window(sprint(SprintStatus::Planned, -1, 13), SprintStatus::Active)]
    #[case::complete_active(sprint(SprintStatus::Active, -14, -1), SprintStatus::Completed)]
    fn allowed_transitions(#[case] sprint: sprint::Model, #[case] target: SprintStatus) {
        assert!(check_transition(&sprint, target, Utc::now()).is_ok());
    }

    #[rstest]
    #[case::start_before_window(sprint(SprintStatus::Planned, 1, 14), SprintStatus::Active)]
    #[case::start_after_window(sprint(SprintStatus::Planned, -14, -1), SprintStatus::Active)]
    #[case::skip_active(sprint(SprintStatus::Planned, -1, 13), SprintStatus::Completed)]
    #[case::revert_to_planned(sprint(SprintStatus::Active, -1, 13), SprintStatus::Planned)]
    #[case::reopen_completed(sprint(SprintStatus::Completed, -1, 13), SprintStatus::Active)]
    #[case::same_state(sprint(SprintStatus::Active, -1, 13), SprintStatus::Active)]
    fn rejected_transitions(#[case] sprint: sprint::Model, #[case] target: SprintStatus) {
        let err = check_transition(&sprint, target, Utc::now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSprintTransition);
    }

    #[test]
    fn missing_dates_are_reported_per_field() {
        let request = SprintCreateRequest { name: None, start_date: None, end_date: None };

        match validate_dates(&request).unwrap_err() {
            AppError::ValidationError(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let now = Utc::now();
        let request = SprintCreateRequest {
            name: None,
            start_date: Some(now),
            end_date: Some(now - Duration::days(1)),
        };

        assert!(validate_dates(&request).is_err());
    }
}
