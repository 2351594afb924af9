use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use tracing::warn;

#[utoipa::path(
    get,
    path = "/health-check",
    responses(
        (status = 200, description = "서버와 데이터베이스가 정상 동작 중", body = String),
        (status = 503, description = "데이터베이스 연결 불가"),
    ),
    tag = "health check",
)]
#[get("/health-check")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().body("OK"),
        Err(err) => {
            warn!(error = %err, "헬스 체크 중 데이터베이스 연결 실패");
            HttpResponse::ServiceUnavailable().body("DB UNAVAILABLE")
        }
    }
}
