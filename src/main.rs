use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rusty_board::api::{self, ApiDoc};
use rusty_board::auth::{DbIdentityProvider, IdentityProvider, JwtUtils};
use rusty_board::configuration::Settings;
use rusty_board::db::init_db;
use rusty_board::migration::Migrator;
use rusty_board::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "rusty_board".into(),
        "info,sqlx=warn".into(),
        std::io::stdout
    );
    init_subscriber(subscriber)?;

    info!("애플리케이션 시작 중...");

    let settings = Settings::from_env()?;
    info!("환경 변수 로드 완료");

    let db = init_db(&settings).await?;
    info!("데이터베이스 마이그레이션 실행 중...");
    Migrator::up(&db, None).await?;
    info!("마이그레이션 완료");

    let identity: Arc<dyn IdentityProvider> = Arc::new(DbIdentityProvider::new(db.clone()));
    let identity_data: Data<dyn IdentityProvider> = Data::from(identity);
    let jwt_data = Data::new(JwtUtils::new(settings.jwt_secret.clone()));
    let db_data = Data::new(db);
    let openapi = ApiDoc::openapi();

    let (host, port) = settings.address();
    info!("서버 시작 중: http://{}:{}", host, port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::HeaderName::from_static("x-organization-id"),
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(jwt_data.clone())
            .app_data(identity_data.clone())
            .configure(api::routes)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
        .bind((host, port))?
        .run()
        .await?;

    Ok(())
}
