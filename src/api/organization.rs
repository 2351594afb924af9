use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::{IdentityProvider, RequestContext};
use crate::model::global_error::AppError;
use crate::model::organization::{
    OrganizationCreateRequest, OrganizationMemberRequest, OrganizationResponse, OrganizationUserResponse,
};
use crate::service::organization as organization_service;

#[utoipa::path(
    post,
    path = "/api/organizations",
    summary = "조직 생성",
    request_body = OrganizationCreateRequest,
    responses(
        (status = 201, description = "조직 생성 성공", body = OrganizationResponse),
        (status = 400, description = "중복된 슬러그 또는 유효성 오류"),
    ),
    tag = "organization",
)]
#[post("/organizations")]
pub async fn create_organization(
    body: web::Json<OrganizationCreateRequest>,
    db: web::Data<DatabaseConnection>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let organization = organization_service::create_organization(db.get_ref(), &ctx, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(organization))
}

#[utoipa::path(
    get,
    path = "/api/organizations/current/users",
    summary = "현재 조직의 사용자 목록",
    params(("X-Organization-Id" = i32, Header, description = "현재 조직 ID")),
    responses(
        (status = 200, description = "조회 성공", body = Vec<OrganizationUserResponse>),
        (status = 403, description = "조직 미선택 또는 멤버 아님"),
    ),
    tag = "organization",
)]
#[get("/organizations/current/users")]
pub async fn get_organization_users(
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let users = organization_service::get_organization_users(db.get_ref(), identity.get_ref(), &ctx).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/api/organizations/current/members",
    summary = "조직 멤버 추가 또는 역할 변경",
    params(("X-Organization-Id" = i32, Header, description = "현재 조직 ID")),
    request_body = OrganizationMemberRequest,
    responses(
        (status = 200, description = "등록 성공", body = OrganizationUserResponse),
        (status = 403, description = "관리자만 가능"),
    ),
    tag = "organization",
)]
#[post("/organizations/current/members")]
pub async fn add_organization_member(
    body: web::Json<OrganizationMemberRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let member = organization_service::add_organization_member(
        db.get_ref(),
        identity.get_ref(),
        &ctx,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(member))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{slug}",
    summary = "슬러그로 조직 조회",
    params(("slug" = String, Path, description = "조직 슬러그")),
    responses(
        (status = 200, description = "조회 성공", body = OrganizationResponse),
        (status = 404, description = "없거나 멤버가 아닌 조직"),
    ),
    tag = "organization",
)]
#[get("/organizations/{slug}")]
pub async fn get_organization(
    path: web::Path<String>,
    identity: web::Data<dyn IdentityProvider>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let organization = organization_service::get_organization(identity.get_ref(), &ctx, &path).await?;
    Ok(HttpResponse::Ok().json(organization))
}
