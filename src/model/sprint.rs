use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::SprintStatus;
use crate::entity::sprint::Model as SprintModel;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintCreateRequest {
    pub name: Option<String>,    // 비어 있으면 "<프로젝트 키>-<번호>"
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SprintStatusRequest {
    pub status: SprintStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintResponse {
    pub id: i32,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SprintStatus,
    pub project_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SprintModel> for SprintResponse {
    fn from(model: SprintModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            project_id: model.project_id,
            created_at: model.created_at,
        }
    }
}
