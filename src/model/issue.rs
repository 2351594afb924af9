use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::board::ordering::ReorderEntry;
use crate::entity::issue::Model as IssueModel;
use crate::entity::sea_orm_active_enums::{IssuePriority, IssueStatus};
use crate::entity::user::Model as UserModel;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub sprint_id: Option<i32>,
    pub assignee_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IssueUpdateRequest {
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueOrderRequest {
    pub issues: Vec<ReorderEntry>,
}

/// 보드 필터 쿼리. `priority`와 `assignee`는 콤마로 구분된 목록이다.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IssueBoardQuery {
    pub search: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<&UserModel> for UserSummary {
    fn from(model: &UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            email: model.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub order: i32,
    pub project_id: i32,
    pub sprint_id: Option<i32>,
    pub assignee: Option<UserSummary>,
    pub reporter: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssueResponse {
    pub fn new(model: IssueModel, assignee: Option<UserSummary>, reporter: Option<UserSummary>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            order: model.order,
            project_id: model.project_id,
            sprint_id: model.sprint_id,
            assignee,
            reporter,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
