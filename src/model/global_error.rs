use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidSprintTransition,
    SprintNotActive,
    DuplicateAccountEmail,
    DuplicateProjectKey,
    DuplicateOrganizationSlug,
    InvalidEmailPwd,
    NotRefreshToken,
    InvalidRefreshToken,

    // 401 UNAUTHORIZED
    Unauthorized,
    ExpiredAuthToken,
    InvalidAuthToken,

    // 403 FORBIDDEN
    NoOrganizationSelected,
    AccessDenied,

    // 404 NOT FOUND
    CrossOrganizationAccess,
    MemberNotFound,
    OrganizationNotFound,
    ProjectNotFound,
    SprintNotFound,
    IssueNotFound,

    // 409 CONFLICT
    PersistenceFailure,
    ReorderInFlight,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    TokenGenerationFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "유효성 검증에 실패했습니다",
            ErrorCode::InvalidSprintTransition => "허용되지 않는 스프린트 상태 변경입니다",
            ErrorCode::SprintNotActive => "진행 중인 스프린트에서만 보드를 수정할 수 있습니다",
            ErrorCode::DuplicateAccountEmail => "이미 등록된 이메일입니다. 로그인해주세요",
            ErrorCode::DuplicateProjectKey => "조직 내에 같은 키를 가진 프로젝트가 이미 있습니다",
            ErrorCode::DuplicateOrganizationSlug => "이미 사용 중인 조직 슬러그입니다",
            ErrorCode::InvalidEmailPwd => "잘못된 자격 증명입니다",
            ErrorCode::NotRefreshToken => "잘못된 리프레시 토큰입니다",
            ErrorCode::InvalidRefreshToken => "리프레시 토큰이 유효하지 않습니다",

            ErrorCode::Unauthorized => "인증이 필요합니다",
            ErrorCode::ExpiredAuthToken => "로그인 토큰이 만료되었습니다",
            ErrorCode::InvalidAuthToken => "유효하지 않은 로그인 토큰입니다",

            ErrorCode::NoOrganizationSelected => "선택된 조직이 없습니다",
            ErrorCode::AccessDenied => "권한이 부족합니다",

            // 다른 조직의 리소스는 존재 여부를 드러내지 않는다
            ErrorCode::CrossOrganizationAccess => "리소스를 찾을 수 없거나 접근할 수 없습니다",
            ErrorCode::MemberNotFound => "사용자를 찾을 수 없습니다",
            ErrorCode::OrganizationNotFound => "조직을 찾을 수 없습니다",
            ErrorCode::ProjectNotFound => "유효하지 않은 프로젝트 ID입니다",
            ErrorCode::SprintNotFound => "유효하지 않은 스프린트 ID입니다",
            ErrorCode::IssueNotFound => "유효하지 않은 이슈 ID입니다",

            ErrorCode::PersistenceFailure => "저장에 실패했습니다. 최신 상태를 다시 불러와주세요",
            ErrorCode::ReorderInFlight => "이전 순서 변경이 아직 처리 중입니다",

            ErrorCode::DatabaseError => "데이터베이스 오류가 발생했습니다",
            ErrorCode::InternalError => "내부 서버 오류가 발생했습니다",
            ErrorCode::TokenGenerationFailed => "토큰 생성에 실패했습니다",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError |
            ErrorCode::InvalidSprintTransition |
            ErrorCode::SprintNotActive |
            ErrorCode::DuplicateAccountEmail |
            ErrorCode::DuplicateProjectKey |
            ErrorCode::DuplicateOrganizationSlug |
            ErrorCode::InvalidEmailPwd |
            ErrorCode::NotRefreshToken |
            ErrorCode::InvalidRefreshToken => StatusCode::BAD_REQUEST,

            ErrorCode::Unauthorized |
            ErrorCode::ExpiredAuthToken |
            ErrorCode::InvalidAuthToken => StatusCode::UNAUTHORIZED,

            ErrorCode::NoOrganizationSelected |
            ErrorCode::AccessDenied => StatusCode::FORBIDDEN,

            ErrorCode::CrossOrganizationAccess |
            ErrorCode::MemberNotFound |
            ErrorCode::OrganizationNotFound |
            ErrorCode::ProjectNotFound |
            ErrorCode::SprintNotFound |
            ErrorCode::IssueNotFound => StatusCode::NOT_FOUND,

            ErrorCode::PersistenceFailure |
            ErrorCode::ReorderInFlight => StatusCode::CONFLICT,

            ErrorCode::DatabaseError |
            ErrorCode::InternalError |
            ErrorCode::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

impl ValidationFieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),

    #[error("유효성 검증에 실패했습니다")]
    ValidationError(Vec<ValidationFieldError>),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        AppError::ApiError(code, Some(detail.into()))
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn internal_error(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn field(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![ValidationFieldError::new(field, message)])
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ApiError(code, _) => *code,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        tracing::error!(error = %err, "데이터베이스 오류 발생");
        AppError::new(ErrorCode::DatabaseError)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(error = %err, "토큰 생성 중 오류 발생");
        AppError::new(ErrorCode::TokenGenerationFailed)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationFieldError>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let response = match self {
            AppError::ApiError(code, detail) => ErrorResponse {
                code: *code,
                message: code.message().to_string(),
                detail: detail.clone(),
                errors: Vec::new(),
            },
            AppError::ValidationError(errors) => ErrorResponse {
                code: ErrorCode::ValidationError,
                message: ErrorCode::ValidationError.message().to_string(),
                detail: None,
                errors: errors.clone(),
            },
        };

        HttpResponse::build(self.status_code()).json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn cross_organization_access_is_reported_as_not_found() {
        let err = AppError::new(ErrorCode::CrossOrganizationAccess);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::IssueNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn validation_error_lists_fields() {
        let err = AppError::field("title", "제목은 필수입니다.");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "ValidationError");
        assert_eq!(json["errors"][0]["field"], "title");
    }
}
