use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::{IdentityProvider, RequestContext};
use crate::model::global_error::AppError;
use crate::model::issue::{IssueCreateRequest, IssueResponse, SuccessResponse};
use crate::model::project::{ProjectCreateRequest, ProjectDetailResponse, ProjectResponse};
use crate::model::sprint::{SprintCreateRequest, SprintResponse};
use crate::service::{issue as issue_service, project as project_service, sprint as sprint_service};

#[utoipa::path(
    post,
    path = "/api/projects",
    summary = "프로젝트 생성",
    request_body = ProjectCreateRequest,
    responses(
        (status = 201, description = "프로젝트 생성 성공", body = ProjectResponse),
        (status = 400, description = "중복된 키 또는 유효성 오류"),
        (status = 403, description = "관리자만 가능"),
    ),
    tag = "project",
)]
#[post("/projects")]
pub async fn create_project(
    body: web::Json<ProjectCreateRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let project = project_service::create_project(db.get_ref(), identity.get_ref(), &ctx, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    summary = "프로젝트 목록 조회",
    responses(
        (status = 200, description = "프로젝트 목록 조회 성공", body = Vec<ProjectResponse>),
    ),
    tag = "project",
)]
#[get("/projects")]
pub async fn list_projects(
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let projects = project_service::list_projects(db.get_ref(), identity.get_ref(), &ctx).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    summary = "프로젝트 상세 조회",
    params(("project_id" = i32, Path, description = "프로젝트 ID")),
    responses(
        (status = 200, description = "프로젝트 조회 성공", body = ProjectDetailResponse),
        (status = 404, description = "프로젝트를 찾을 수 없음"),
    ),
    tag = "project",
)]
#[get("/projects/{project_id}")]
pub async fn get_project(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let project = project_service::get_project(db.get_ref(), identity.get_ref(), &ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    summary = "프로젝트 삭제",
    params(("project_id" = i32, Path, description = "프로젝트 ID")),
    responses(
        (status = 200, description = "프로젝트 삭제 성공", body = SuccessResponse),
        (status = 403, description = "관리자만 가능"),
    ),
    tag = "project",
)]
#[delete("/projects/{project_id}")]
pub async fn delete_project(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    project_service::delete_project(db.get_ref(), identity.get_ref(), &ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/sprints",
    summary = "스프린트 목록 조회",
    params(("project_id" = i32, Path, description = "프로젝트 ID")),
    responses(
        (status = 200, description = "조회 성공", body = Vec<SprintResponse>),
    ),
    tag = "sprint",
)]
#[get("/projects/{project_id}/sprints")]
pub async fn list_sprints(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let sprints = sprint_service::list_sprints(db.get_ref(), identity.get_ref(), &ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sprints))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/sprints",
    summary = "스프린트 생성",
    params(("project_id" = i32, Path, description = "프로젝트 ID")),
    request_body = SprintCreateRequest,
    responses(
        (status = 201, description = "스프린트 생성 성공", body = SprintResponse),
        (status = 400, description = "유효성 오류"),
    ),
    tag = "sprint",
)]
#[post("/projects/{project_id}/sprints")]
pub async fn create_sprint(
    path: web::Path<i32>,
    body: web::Json<SprintCreateRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let sprint = sprint_service::create_sprint(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(sprint))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/issues",
    summary = "이슈 생성",
    params(("project_id" = i32, Path, description = "프로젝트 ID")),
    request_body = IssueCreateRequest,
    responses(
        (status = 201, description = "이슈 생성 성공", body = IssueResponse),
        (status = 400, description = "유효성 오류"),
    ),
    tag = "issue",
)]
#[post("/projects/{project_id}/issues")]
pub async fn create_issue(
    path: web::Path<i32>,
    body: web::Json<IssueCreateRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let issue = issue_service::create_issue(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(issue))
}
