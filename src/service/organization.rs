use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::auth::gate::{self, require_authenticated};
use crate::auth::{authorize, IdentityProvider, RequestContext};
use crate::entity::organization::{self, ActiveModel as OrganizationActiveModel, Entity as OrganizationEntity};
use crate::entity::organization_member::{self, ActiveModel as OrganizationMemberActiveModel, Entity as OrganizationMemberEntity};
use crate::entity::sea_orm_active_enums::OrganizationRole;
use crate::entity::user::{self, Entity as UserEntity};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::organization::{
    OrganizationCreateRequest, OrganizationMemberRequest, OrganizationResponse, OrganizationUserResponse,
};

/// Looks an organization up by slug. Organizations the caller does not belong to are not found.
#[instrument(skip(identity))]
pub async fn get_organization(
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    slug: &str,
) -> Result<OrganizationResponse, AppError> {
    let user_id = require_authenticated(ctx)?;

    let organization = identity
        .get_organization(slug)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::OrganizationNotFound))?;

    if identity.member_role(user_id, organization.id).await?.is_none() {
        info!(user_id, slug, "조직 멤버가 아님");
        return Err(AppError::not_found(ErrorCode::OrganizationNotFound));
    }

    Ok(OrganizationResponse::from(organization))
}

#[instrument(skip(db, identity))]
pub async fn get_organization_users(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
) -> Result<Vec<OrganizationUserResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;

    let memberships = OrganizationMemberEntity::find()
        .filter(organization_member::Column::OrganizationId.eq(caller.organization_id))
        .order_by_asc(organization_member::Column::JoinedAt)
        .all(db)
        .await?;

    let users: HashMap<i32, user::Model> = UserEntity::find()
        .filter(user::Column::Id.is_in(memberships.iter().map(|m| m.user_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(memberships
        .into_iter()
        .filter_map(|m| {
            users.get(&m.user_id).map(|u| OrganizationUserResponse {
                user_id: u.id,
                username: u.username.clone(),
                email: u.email.clone(),
                role: m.role,
                joined_at: m.joined_at,
            })
        })
        .collect())
}

fn validate_organization_request(request: &OrganizationCreateRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push(ValidationFieldError::new("name", "조직 이름은 필수입니다."));
    }

    let slug = request.slug.trim();
    if slug.is_empty() {
        errors.push(ValidationFieldError::new("slug", "슬러그는 필수입니다."));
    } else if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        errors.push(ValidationFieldError::new("slug", "슬러그는 영문자, 숫자, '-'만 사용할 수 있습니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

/// Creates an organization; the creator becomes its first admin.
#[instrument(skip(db, request))]
pub async fn create_organization(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    request: OrganizationCreateRequest,
) -> Result<OrganizationResponse, AppError> {
    let user_id = require_authenticated(ctx)?;
    validate_organization_request(&request)?;

    let slug = request.slug.trim().to_lowercase();
    let txn = db.begin().await?;

    let existing = OrganizationEntity::find()
        .filter(organization::Column::Slug.eq(slug.as_str()))
        .one(&txn)
        .await?;

    if existing.is_some() {
        txn.rollback().await.ok();
        return Err(AppError::with_detail(ErrorCode::DuplicateOrganizationSlug, slug));
    }

    let now = Utc::now();
    let organization = OrganizationActiveModel {
        name: Set(request.name.trim().to_string()),
        slug: Set(slug),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    OrganizationMemberEntity::insert(OrganizationMemberActiveModel {
        organization_id: Set(organization.id),
        user_id: Set(user_id),
        role: Set(OrganizationRole::Admin),
        joined_at: Set(now),
    })
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;
    info!(organization_id = organization.id, user_id, "조직 생성 완료");

    Ok(OrganizationResponse::from(organization))
}

/// Adds a user to the caller's organization or changes an existing member's role.
#[instrument(skip(db, identity))]
pub async fn add_organization_member(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    request: OrganizationMemberRequest,
) -> Result<OrganizationUserResponse, AppError> {
    let caller = authorize(identity, ctx).await?;
    gate::require_elevated_role(identity, caller.user_id, caller.organization_id).await?;

    let user = UserEntity::find_by_id(request.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    let now = Utc::now();
    OrganizationMemberEntity::insert(OrganizationMemberActiveModel {
        organization_id: Set(caller.organization_id),
        user_id: Set(user.id),
        role: Set(request.role),
        joined_at: Set(now),
    })
    .on_conflict(
        OnConflict::columns([
            organization_member::Column::OrganizationId,
            organization_member::Column::UserId,
        ])
        .update_column(organization_member::Column::Role)
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    let member = OrganizationMemberEntity::find_by_id((caller.organization_id, user.id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))?;

    info!(organization_id = caller.organization_id, user_id = user.id, role = ?member.role, "조직 멤버 등록 완료");

    Ok(OrganizationUserResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
        role: member.role,
        joined_at: member.joined_at,
    })
}
