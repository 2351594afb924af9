use actix_web::{delete, get, patch, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::{IdentityProvider, RequestContext};
use crate::model::global_error::AppError;
use crate::model::issue::{IssueOrderRequest, IssueResponse, IssueUpdateRequest, SuccessResponse};
use crate::service::issue as issue_service;

#[utoipa::path(
    put,
    path = "/api/issues/order",
    summary = "이슈 순서 일괄 저장",
    request_body = IssueOrderRequest,
    responses(
        (status = 200, description = "저장 성공", body = SuccessResponse),
        (status = 404, description = "다른 조직의 이슈 포함"),
        (status = 409, description = "저장 실패, 보드를 다시 불러와야 함"),
    ),
    tag = "board",
)]
#[put("/issues/order")]
pub async fn update_issue_order(
    body: web::Json<IssueOrderRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    issue_service::update_issue_order(db.get_ref(), identity.get_ref(), &ctx, &body.issues).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/issues/mine",
    summary = "내 이슈 목록",
    responses(
        (status = 200, description = "담당하거나 보고한 이슈", body = Vec<IssueResponse>),
    ),
    tag = "issue",
)]
#[get("/issues/mine")]
pub async fn get_user_issues(
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let issues = issue_service::get_user_issues(db.get_ref(), identity.get_ref(), &ctx).await?;
    Ok(HttpResponse::Ok().json(issues))
}

#[utoipa::path(
    patch,
    path = "/api/issues/{issue_id}",
    summary = "이슈 상태/우선순위 변경",
    params(("issue_id" = i32, Path, description = "이슈 ID")),
    request_body = IssueUpdateRequest,
    responses(
        (status = 200, description = "변경 성공", body = IssueResponse),
        (status = 403, description = "보고자 또는 관리자만 가능"),
    ),
    tag = "issue",
)]
#[patch("/issues/{issue_id}")]
pub async fn update_issue(
    path: web::Path<i32>,
    body: web::Json<IssueUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let issue = issue_service::update_issue(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(issue))
}

#[utoipa::path(
    delete,
    path = "/api/issues/{issue_id}",
    summary = "이슈 삭제",
    params(("issue_id" = i32, Path, description = "이슈 ID")),
    responses(
        (status = 200, description = "삭제 성공", body = SuccessResponse),
        (status = 403, description = "보고자 또는 관리자만 가능"),
    ),
    tag = "issue",
)]
#[delete("/issues/{issue_id}")]
pub async fn delete_issue(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    issue_service::delete_issue(db.get_ref(), identity.get_ref(), &ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}
