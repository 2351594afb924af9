#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use rusty_board::auth::{DbIdentityProvider, RequestContext};
use rusty_board::entity::sea_orm_active_enums::{IssuePriority, IssueStatus, OrganizationRole, SprintStatus};
use rusty_board::entity::{issue, organization, organization_member, project, sprint, user};
use rusty_board::migration::Migrator;

/// 인메모리 SQLite는 연결마다 별도 DB이므로 커넥션을 하나로 고정한다.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite 연결 실패");
    Migrator::up(&db, None).await.expect("마이그레이션 실패");
    db
}

pub fn identity(db: &DatabaseConnection) -> DbIdentityProvider {
    DbIdentityProvider::new(db.clone())
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password: Set("not-a-real-hash".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("사용자 생성 실패")
}

pub async fn create_organization(db: &DatabaseConnection, slug: &str) -> organization::Model {
    organization::ActiveModel {
        name: Set(slug.to_uppercase()),
        slug: Set(slug.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("조직 생성 실패")
}

pub async fn add_member(db: &DatabaseConnection, organization_id: i32, user_id: i32, role: OrganizationRole) {
    organization_member::Entity::insert(organization_member::ActiveModel {
        organization_id: Set(organization_id),
        user_id: Set(user_id),
        role: Set(role),
        joined_at: Set(Utc::now()),
    })
    .exec_without_returning(db)
    .await
    .expect("멤버 등록 실패");
}

pub async fn create_project(db: &DatabaseConnection, organization_id: i32, key: &str) -> project::Model {
    let now = Utc::now();
    project::ActiveModel {
        name: Set(format!("{} project", key)),
        key: Set(key.to_string()),
        description: Set(None),
        organization_id: Set(organization_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("프로젝트 생성 실패")
}

pub async fn create_sprint(
    db: &DatabaseConnection,
    project_id: i32,
    status: SprintStatus,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> sprint::Model {
    let now = Utc::now();
    sprint::ActiveModel {
        name: Set("sprint".to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        status: Set(status),
        project_id: Set(project_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("스프린트 생성 실패")
}

pub async fn create_issue(
    db: &DatabaseConnection,
    project_id: i32,
    sprint_id: i32,
    reporter_id: i32,
    status: IssueStatus,
    order: i32,
) -> issue::Model {
    let now = Utc::now();
    issue::ActiveModel {
        title: Set(format!("{:?} #{}", status, order)),
        description: Set(None),
        status: Set(status),
        priority: Set(IssuePriority::Medium),
        order: Set(order),
        project_id: Set(project_id),
        sprint_id: Set(Some(sprint_id)),
        assignee_id: Set(None),
        reporter_id: Set(reporter_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("이슈 생성 실패")
}

pub async fn find_issue(db: &DatabaseConnection, id: i32) -> Option<issue::Model> {
    issue::Entity::find_by_id(id).one(db).await.expect("이슈 조회 실패")
}

/// 관리자 한 명, 일반 멤버 한 명, 진행 중인 스프린트 하나를 가진 조직.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub organization: organization::Model,
    pub admin: user::Model,
    pub member: user::Model,
    pub project: project::Model,
    pub sprint: sprint::Model,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let organization = create_organization(&db, "acme").await;
        let admin = create_user(&db, "admin").await;
        let member = create_user(&db, "member").await;
        add_member(&db, organization.id, admin.id, OrganizationRole::Admin).await;
        add_member(&db, organization.id, member.id, OrganizationRole::Member).await;

        let project = create_project(&db, organization.id, "APP").await;
        let now = Utc::now();
        let sprint = create_sprint(
            &db,
            project.id,
            SprintStatus::Active,
            now - Duration::days(1),
            now + Duration::days(13),
        )
        .await;

        Self { db, organization, admin, member, project, sprint }
    }

    pub fn admin_ctx(&self) -> RequestContext {
        RequestContext::new(self.admin.id, self.organization.id)
    }

    pub fn member_ctx(&self) -> RequestContext {
        RequestContext::new(self.member.id, self.organization.id)
    }

    pub async fn issue(&self, status: IssueStatus, order: i32) -> issue::Model {
        create_issue(&self.db, self.project.id, self.sprint.id, self.admin.id, status, order).await
    }
}
