use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use std::future::{ready, Future, Ready};
use std::pin::Pin;

use super::jwt::{JwtUtils, TokenVerifyResult, ACCESS_TOKEN_COOKIE};
use crate::model::auth::TokenType;
use crate::model::global_error::{AppError, ErrorCode};

pub struct AuthMiddleware;

// 미들웨어 팩토리
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    from_header.or_else(|| req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
}

fn authenticate(req: &ServiceRequest) -> Result<(), AppError> {
    let jwt = req
        .app_data::<web::Data<JwtUtils>>()
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))?;

    let token = bearer_token(req).ok_or_else(|| AppError::unauthorized(ErrorCode::Unauthorized))?;

    match jwt.verify_token(&token) {
        TokenVerifyResult::Valid(claims) if claims.typ == TokenType::Access => {
            req.extensions_mut().insert(claims);
            Ok(())
        }
        TokenVerifyResult::Valid(_) | TokenVerifyResult::Invalid => {
            Err(AppError::unauthorized(ErrorCode::InvalidAuthToken))
        }
        TokenVerifyResult::Expired => Err(AppError::unauthorized(ErrorCode::ExpiredAuthToken)),
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(err) = authenticate(&req) {
            tracing::debug!(path = %req.path(), error = %err, "인증 실패");
            return Box::pin(async move { Err(err.into()) });
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}
