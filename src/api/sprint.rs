use actix_web::{get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::{IdentityProvider, RequestContext};
use crate::board::{IssueFilter, MoveInstruction};
use crate::model::global_error::AppError;
use crate::model::issue::{IssueBoardQuery, IssueResponse};
use crate::model::sprint::{SprintResponse, SprintStatusRequest};
use crate::service::{board as board_service, issue as issue_service, sprint as sprint_service};

#[utoipa::path(
    patch,
    path = "/api/sprints/{sprint_id}/status",
    summary = "스프린트 상태 변경",
    params(("sprint_id" = i32, Path, description = "스프린트 ID")),
    request_body = SprintStatusRequest,
    responses(
        (status = 200, description = "상태 변경 성공", body = SprintResponse),
        (status = 400, description = "허용되지 않는 상태 변경"),
        (status = 403, description = "관리자만 가능"),
    ),
    tag = "sprint",
)]
#[patch("/sprints/{sprint_id}/status")]
pub async fn update_sprint_status(
    path: web::Path<i32>,
    body: web::Json<SprintStatusRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let sprint = sprint_service::update_sprint_status(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        path.into_inner(),
        body.status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(sprint))
}

#[utoipa::path(
    get,
    path = "/api/sprints/{sprint_id}/issues",
    summary = "스프린트 보드 조회",
    params(
        ("sprint_id" = i32, Path, description = "스프린트 ID"),
        IssueBoardQuery,
    ),
    responses(
        (status = 200, description = "보드 조회 성공", body = Vec<IssueResponse>),
        (status = 404, description = "스프린트를 찾을 수 없음"),
    ),
    tag = "board",
)]
#[get("/sprints/{sprint_id}/issues")]
pub async fn get_sprint_issues(
    path: web::Path<i32>,
    query: web::Query<IssueBoardQuery>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let filter = IssueFilter::from_query(&query)?;
    let issues = issue_service::get_issues_for_sprint(db.get_ref(), identity.get_ref(), &ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(filter.apply(issues)))
}

#[utoipa::path(
    post,
    path = "/api/sprints/{sprint_id}/moves",
    summary = "보드에서 이슈 이동",
    params(("sprint_id" = i32, Path, description = "스프린트 ID")),
    request_body = MoveInstruction,
    responses(
        (status = 200, description = "이동 후 보드", body = Vec<IssueResponse>),
        (status = 400, description = "진행 중이 아닌 스프린트 또는 잘못된 위치"),
        (status = 409, description = "저장 실패"),
    ),
    tag = "board",
)]
#[post("/sprints/{sprint_id}/moves")]
pub async fn move_issue(
    path: web::Path<i32>,
    body: web::Json<MoveInstruction>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let issues = board_service::move_issue(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(issues))
}
