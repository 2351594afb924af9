use actix_web::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::model::auth::{Claims, TokenType};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Clone)]
pub struct JwtUtils {
    secret: String,
}

#[derive(Debug)]
pub enum TokenVerifyResult {
    Valid(Claims),
    Expired,
    Invalid,
}

impl JwtUtils {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn generate_token(&self, user_id: i32) -> Result<String, JwtError> {
        self.encode_claims(user_id, TokenType::Access, Duration::hours(1))
    }

    pub fn generate_refresh_token(&self, user_id: i32) -> Result<String, JwtError> {
        self.encode_claims(user_id, TokenType::Refresh, Duration::days(30))
    }

    fn encode_claims(&self, user_id: i32, typ: TokenType, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            typ,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_token(&self, token: &str) -> TokenVerifyResult {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => TokenVerifyResult::Valid(data.claims),
            Err(err) => match *err.kind() {
                ErrorKind::ExpiredSignature => TokenVerifyResult::Expired,
                _ => TokenVerifyResult::Invalid,
            },
        }
    }
}

pub fn build_access_token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(1))
        .finish()
}

pub fn build_refresh_token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips_user_id() {
        let jwt = JwtUtils::new("test-secret");
        let token = jwt.generate_token(42).unwrap();

        match jwt.verify_token(&token) {
            TokenVerifyResult::Valid(claims) => {
                assert_eq!(claims.user_id(), Some(42));
                assert_eq!(claims.typ, TokenType::Access);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = JwtUtils::new("secret-a").generate_refresh_token(1).unwrap();

        assert!(matches!(JwtUtils::new("secret-b").verify_token(&token), TokenVerifyResult::Invalid));
    }
}
