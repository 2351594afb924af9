mod auth;
mod health_check;
mod issue;
mod organization;
mod project;
mod sprint;

use actix_web::web::{self, scope};
use utoipa::OpenApi;

use crate::auth::AuthMiddleware;
use crate::board::{MoveInstruction, ReorderEntry};
use crate::entity::sea_orm_active_enums::{IssuePriority, IssueStatus, OrganizationRole, SprintStatus};
use crate::model::auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserResponse};
use crate::model::global_error::{ErrorCode, ErrorResponse, ValidationFieldError};
use crate::model::issue::{
    IssueCreateRequest, IssueOrderRequest, IssueResponse, IssueUpdateRequest, SuccessResponse, UserSummary,
};
use crate::model::organization::{
    OrganizationCreateRequest, OrganizationMemberRequest, OrganizationResponse, OrganizationUserResponse,
};
use crate::model::project::{ProjectCreateRequest, ProjectDetailResponse, ProjectResponse};
use crate::model::sprint::{SprintCreateRequest, SprintResponse, SprintStatusRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check::health_check,
        auth::register,
        auth::login,
        auth::refresh_token,
        auth::get_me,
        organization::create_organization,
        organization::get_organization,
        organization::get_organization_users,
        organization::add_organization_member,
        project::create_project,
        project::list_projects,
        project::get_project,
        project::delete_project,
        project::list_sprints,
        project::create_sprint,
        project::create_issue,
        sprint::update_sprint_status,
        sprint::get_sprint_issues,
        sprint::move_issue,
        issue::update_issue_order,
        issue::get_user_issues,
        issue::update_issue,
        issue::delete_issue,
    ),
    components(schemas(
        ErrorCode, ErrorResponse, ValidationFieldError,
        RegisterRequest, LoginRequest, RefreshRequest, AuthResponse, UserResponse,
        OrganizationCreateRequest, OrganizationMemberRequest, OrganizationResponse, OrganizationUserResponse,
        ProjectCreateRequest, ProjectResponse, ProjectDetailResponse,
        SprintCreateRequest, SprintStatusRequest, SprintResponse,
        IssueCreateRequest, IssueUpdateRequest, IssueOrderRequest, IssueResponse, UserSummary, SuccessResponse,
        MoveInstruction, ReorderEntry,
        IssueStatus, IssuePriority, SprintStatus, OrganizationRole,
    )),
    tags(
        (name = "auth", description = "회원가입/로그인"),
        (name = "organization", description = "조직과 멤버"),
        (name = "project", description = "프로젝트"),
        (name = "sprint", description = "스프린트"),
        (name = "issue", description = "이슈"),
        (name = "board", description = "스프린트 보드와 순서 변경"),
    ),
)]
pub struct ApiDoc;

/// Registers every route. Everything under `/api` requires a valid access token.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check::health_check)
        .service(auth::register)
        .service(auth::login)
        .service(auth::refresh_token)
        .service(
            scope("/api")
                .wrap(AuthMiddleware)
                .service(auth::get_me)
                .service(organization::create_organization)
                .service(organization::get_organization_users)
                .service(organization::add_organization_member)
                .service(organization::get_organization)
                .service(project::create_project)
                .service(project::list_projects)
                .service(project::get_project)
                .service(project::delete_project)
                .service(project::list_sprints)
                .service(project::create_sprint)
                .service(project::create_issue)
                .service(sprint::update_sprint_status)
                .service(sprint::get_sprint_issues)
                .service(sprint::move_issue)
                .service(issue::update_issue_order)
                .service(issue::get_user_issues)
                .service(issue::update_issue)
                .service(issue::delete_issue),
        );
}
