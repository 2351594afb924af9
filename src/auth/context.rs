use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::model::auth::Claims;
use crate::model::global_error::AppError;

pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// Who is calling and on behalf of which organization.
///
/// Every service operation takes this explicitly; nothing reads the caller from ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<i32>,
    pub organization_id: Option<i32>,
}

impl RequestContext {
    pub fn new(user_id: i32, organization_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            organization_id: Some(organization_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            organization_id: None,
        }
    }

    pub fn with_organization(mut self, organization_id: i32) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}

fn extract(req: &HttpRequest) -> Result<RequestContext, AppError> {
    let user_id = req
        .extensions()
        .get::<Claims>()
        .and_then(Claims::user_id);

    let organization_id = match req.headers().get(ORGANIZATION_HEADER) {
        None => None,
        Some(value) => {
            let raw = value.to_str().unwrap_or("").trim();
            if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<i32>().map_err(|_| {
                    AppError::field("organizationId", "조직 ID 형식이 올바르지 않습니다.")
                })?)
            }
        }
    };

    Ok(RequestContext { user_id, organization_id })
}

impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::auth::TokenType;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_claims_and_organization_header() {
        let req = TestRequest::default()
            .insert_header((ORGANIZATION_HEADER, "7"))
            .to_http_request();
        req.extensions_mut().insert(Claims {
            sub: "3".to_string(),
            typ: TokenType::Access,
            exp: 0,
            iat: 0,
        });

        assert_eq!(extract(&req).unwrap(), RequestContext::new(3, 7));
    }

    #[test]
    fn missing_pieces_stay_empty() {
        let req = TestRequest::default().to_http_request();

        assert_eq!(extract(&req).unwrap(), RequestContext::anonymous());
    }

    #[test]
    fn malformed_organization_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((ORGANIZATION_HEADER, "acme"))
            .to_http_request();

        assert!(extract(&req).is_err());
    }
}
