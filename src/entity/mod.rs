pub mod issue;
pub mod organization;
pub mod organization_member;
pub mod project;
pub mod sea_orm_active_enums;
pub mod sprint;
pub mod user;
