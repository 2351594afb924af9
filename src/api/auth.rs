use actix_web::{get, post, web, HttpRequest, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use sea_query::Condition;
use tracing::{info, instrument};

use crate::auth::gate::require_authenticated;
use crate::auth::jwt::{
    build_access_token_cookie, build_refresh_token_cookie, JwtUtils, TokenVerifyResult, REFRESH_TOKEN_COOKIE,
};
use crate::auth::RequestContext;
use crate::entity::user::{self, Entity as UserEntity};
use crate::model::auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenType, UserResponse};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};

fn issue_tokens(jwt: &JwtUtils, user: user::Model, status: actix_web::http::StatusCode) -> Result<HttpResponse, AppError> {
    let access_token = jwt.generate_token(user.id)?;
    let refresh = jwt.generate_refresh_token(user.id)?;

    Ok(HttpResponse::build(status)
        .cookie(build_access_token_cookie(&access_token))
        .cookie(build_refresh_token_cookie(&refresh))
        .json(AuthResponse {
            token: access_token,
            refresh_token: refresh,
            user: UserResponse::from(user),
        }))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    summary = "회원가입",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "회원가입 성공", body = AuthResponse),
        (status = 400, description = "중복된 이메일 또는 유효성 오류"),
    ),
    tag = "auth",
)]
#[post("/auth/register")]
#[instrument(skip(body, db, jwt), fields(email = %body.email))]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    validate_register_request(&body.username, &body.email, &body.password)?;

    let txn = db.begin().await?;

    let existing_user = UserEntity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(body.username.trim()))
                .add(user::Column::Email.eq(body.email.trim()))
        )
        .one(&txn)
        .await?;

    if existing_user.is_some() {
        txn.rollback().await.ok();
        return Err(AppError::bad_request(ErrorCode::DuplicateAccountEmail));
    }

    let hashed_password = hash(&body.password, DEFAULT_COST)
        .map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(body.username.trim().to_string()),
        email: Set(body.email.trim().to_string()),
        password: Set(hashed_password),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&txn).await?;
    txn.commit().await?;

    info!(user_id = user.id, "회원가입 완료");
    issue_tokens(&jwt, user, actix_web::http::StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "로그인",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = AuthResponse),
        (status = 400, description = "잘못된 자격 증명"),
    ),
    tag = "auth",
)]
#[post("/auth/login")]
#[instrument(skip(body, db, jwt), fields(email = %body.email))]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    validate_login_request(&body.email, &body.password)?;

    let user = UserEntity::find()
        .filter(user::Column::Email.eq(body.email.trim()))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidEmailPwd))?;

    let is_valid = verify(&body.password, &user.password)
        .map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    if !is_valid {
        return Err(AppError::bad_request(ErrorCode::InvalidEmailPwd));
    }

    issue_tokens(&jwt, user, actix_web::http::StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    summary = "액세스 토큰 재발급",
    request_body(content = RefreshRequest, description = "생략하면 refreshToken 쿠키를 사용"),
    responses(
        (status = 200, description = "재발급 성공", body = AuthResponse),
        (status = 400, description = "유효하지 않은 리프레시 토큰"),
    ),
    tag = "auth",
)]
#[post("/auth/refresh")]
pub async fn refresh_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    let token = body
        .and_then(|b| b.into_inner().refresh_token)
        .or_else(|| req.cookie(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidRefreshToken))?;

    match jwt.verify_token(&token) {
        TokenVerifyResult::Valid(claims) => {
            if claims.typ != TokenType::Refresh {
                return Err(AppError::bad_request(ErrorCode::NotRefreshToken));
            }

            let user_id = claims
                .user_id()
                .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidRefreshToken))?;

            let user = UserEntity::find_by_id(user_id)
                .one(db.get_ref())
                .await?
                .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

            let new_access_token = jwt.generate_token(user.id)?;

            Ok(HttpResponse::Ok()
                .cookie(build_access_token_cookie(&new_access_token))
                .json(AuthResponse {
                    token: new_access_token,
                    refresh_token: token,
                    user: UserResponse::from(user),
                }))
        }
        TokenVerifyResult::Expired | TokenVerifyResult::Invalid => {
            Err(AppError::bad_request(ErrorCode::InvalidRefreshToken))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "내 정보 조회",
    responses(
        (status = 200, description = "조회 성공", body = UserResponse),
        (status = 401, description = "인증 필요"),
    ),
    tag = "auth",
)]
#[get("/auth/me")]
pub async fn get_me(
    db: web::Data<DatabaseConnection>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let user_id = require_authenticated(&ctx)?;

    let user = UserEntity::find_by_id(user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

fn validate_login_request(email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if email.trim().is_empty() {
        errors.push(ValidationFieldError::new("email", "이메일은 필수입니다."));
    }

    if password.len() < 8 {
        errors.push(ValidationFieldError::new("password", "비밀번호는 최소 8자 이상이어야 합니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

fn validate_register_request(username: &str, email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push(ValidationFieldError::new("username", "사용자명은 필수입니다."));
    }

    if email.trim().is_empty() {
        errors.push(ValidationFieldError::new("email", "이메일은 필수입니다."));
    } else if !email.contains('@') {
        errors.push(ValidationFieldError::new("email", "유효한 이메일 형식이 아닙니다."));
    }

    if password.len() < 8 {
        errors.push(ValidationFieldError::new("password", "비밀번호는 최소 8자 이상이어야 합니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "a@b.com", "password1", "username")]
    #[case("kim", "", "password1", "email")]
    #[case("kim", "not-an-email", "password1", "email")]
    #[case("kim", "a@b.com", "short", "password")]
    fn register_request_rejects(#[case] username: &str, #[case] email: &str, #[case] password: &str, #[case] field: &str) {
        match validate_register_request(username, email, password) {
            Err(AppError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, field);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn valid_register_request_passes() {
        assert!(validate_register_request("kim", "kim@example.com", "password1").is_ok());
    }

    #[actix_web::test]
    async fn issued_tokens_are_in_body_and_cookies() {
        use actix_web::body::to_bytes;

        let jwt = JwtUtils::new("test-secret");
        let now = Utc::now();
        let account = user::Model {
            id: 7,
            username: "kim".to_string(),
            email: "kim@example.com".to_string(),
            password: "hash".to_string(),
            created_at: now,
            updated_at: now,
        };

        let response = issue_tokens(&jwt, account, actix_web::http::StatusCode::OK).unwrap();
        let cookies: Vec<String> = response.cookies().map(|c| c.name().to_string()).collect();
        assert!(cookies.contains(&"accessToken".to_string()));
        assert!(cookies.contains(&REFRESH_TOKEN_COOKIE.to_string()));

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let refresh = json["refreshToken"].as_str().unwrap();
        match jwt.verify_token(refresh) {
            TokenVerifyResult::Valid(claims) => {
                assert_eq!(claims.typ, TokenType::Refresh);
                assert_eq!(claims.user_id(), Some(7));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(json["user"]["id"], 7);
    }
}
