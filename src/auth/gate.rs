//! Admission checks run in front of every mutating operation.

use tracing::debug;

use super::context::RequestContext;
use super::identity::IdentityProvider;
use crate::entity::sea_orm_active_enums::OrganizationRole;
use crate::model::global_error::{AppError, ErrorCode};

/// A caller that passed authentication, organization selection and membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub organization_id: i32,
    pub role: OrganizationRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == OrganizationRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(ErrorCode::AccessDenied))
        }
    }

    /// Reporter or admin.
    pub fn require_reporter_or_admin(&self, reporter_id: i32) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == reporter_id {
            Ok(())
        } else {
            Err(AppError::forbidden(ErrorCode::AccessDenied))
        }
    }

    /// The resource's organization must be the one the caller acts for.
    pub fn require_same_organization(&self, resource_organization_id: i32) -> Result<(), AppError> {
        require_same_organization(resource_organization_id, self.organization_id)
    }
}

pub fn require_authenticated(ctx: &RequestContext) -> Result<i32, AppError> {
    ctx.user_id
        .ok_or_else(|| AppError::unauthorized(ErrorCode::Unauthorized))
}

pub fn require_organization_context(ctx: &RequestContext) -> Result<i32, AppError> {
    ctx.organization_id
        .ok_or_else(|| AppError::forbidden(ErrorCode::NoOrganizationSelected))
}

pub async fn require_membership(
    identity: &dyn IdentityProvider,
    user_id: i32,
    organization_id: i32,
) -> Result<OrganizationRole, AppError> {
    identity
        .member_role(user_id, organization_id)
        .await?
        .ok_or_else(|| {
            debug!(user_id, organization_id, "조직 멤버가 아님");
            AppError::forbidden(ErrorCode::AccessDenied)
        })
}

pub async fn require_elevated_role(
    identity: &dyn IdentityProvider,
    user_id: i32,
    organization_id: i32,
) -> Result<(), AppError> {
    match require_membership(identity, user_id, organization_id).await? {
        OrganizationRole::Admin => Ok(()),
        OrganizationRole::Member => Err(AppError::forbidden(ErrorCode::AccessDenied)),
    }
}

pub fn require_same_organization(resource_organization_id: i32, organization_id: i32) -> Result<(), AppError> {
    if resource_organization_id == organization_id {
        Ok(())
    } else {
        Err(AppError::not_found(ErrorCode::CrossOrganizationAccess))
    }
}

/// Runs authentication, organization selection and membership in that order.
pub async fn authorize(identity: &dyn IdentityProvider, ctx: &RequestContext) -> Result<Caller, AppError> {
    let user_id = require_authenticated(ctx)?;
    let organization_id = require_organization_context(ctx)?;

    // 토큰은 유효하지만 계정이 삭제된 경우
    if identity.get_current_user(ctx).await?.is_none() {
        return Err(AppError::unauthorized(ErrorCode::Unauthorized));
    }

    let role = require_membership(identity, user_id, organization_id).await?;

    Ok(Caller {
        user_id,
        organization_id,
        role,
    })
}
