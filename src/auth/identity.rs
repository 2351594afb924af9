use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::context::RequestContext;
use crate::entity::organization::{self, Entity as OrganizationEntity};
use crate::entity::organization_member::{self, Entity as OrganizationMemberEntity};
use crate::entity::sea_orm_active_enums::OrganizationRole;
use crate::entity::user::Entity as UserEntity;
use crate::model::global_error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i32,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationMembership {
    pub user_id: i32,
    pub role: OrganizationRole,
}

/// Source of truth for users, organizations and their membership roles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_current_user(&self, ctx: &RequestContext) -> Result<Option<UserIdentity>, AppError>;

    async fn list_organization_members(&self, organization_id: i32) -> Result<Vec<OrganizationMembership>, AppError>;

    async fn get_organization(&self, slug: &str) -> Result<Option<organization::Model>, AppError>;

    async fn member_role(&self, user_id: i32, organization_id: i32) -> Result<Option<OrganizationRole>, AppError> {
        let members = self.list_organization_members(organization_id).await?;
        Ok(members
            .into_iter()
            .find(|member| member.user_id == user_id)
            .map(|member| member.role))
    }
}

/// Identity provider backed by the service's own `users` and `organization_members` tables.
#[derive(Clone)]
pub struct DbIdentityProvider {
    db: DatabaseConnection,
}

impl DbIdentityProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for DbIdentityProvider {
    async fn get_current_user(&self, ctx: &RequestContext) -> Result<Option<UserIdentity>, AppError> {
        let Some(user_id) = ctx.user_id else {
            return Ok(None);
        };

        let user = UserEntity::find_by_id(user_id).one(&self.db).await?;

        Ok(user.map(|u| UserIdentity {
            id: u.id,
            username: u.username,
            email: u.email,
        }))
    }

    async fn list_organization_members(&self, organization_id: i32) -> Result<Vec<OrganizationMembership>, AppError> {
        let members = OrganizationMemberEntity::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .all(&self.db)
            .await?;

        Ok(members
            .into_iter()
            .map(|m| OrganizationMembership {
                user_id: m.user_id,
                role: m.role,
            })
            .collect())
    }

    async fn get_organization(&self, slug: &str) -> Result<Option<organization::Model>, AppError> {
        let organization = OrganizationEntity::find()
            .filter(organization::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        Ok(organization)
    }

    async fn member_role(&self, user_id: i32, organization_id: i32) -> Result<Option<OrganizationRole>, AppError> {
        let member = OrganizationMemberEntity::find_by_id((organization_id, user_id))
            .one(&self.db)
            .await?;

        Ok(member.map(|m| m.role))
    }
}
