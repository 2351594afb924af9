use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use crate::auth::{authorize, IdentityProvider, RequestContext};
use crate::board::ordering::{apply_move, MoveInstruction};
use crate::entity::sea_orm_active_enums::SprintStatus;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::issue::IssueResponse;
use crate::service::issue::{load_sprint_issues, persist_order, with_people};
use crate::service::scope;

/// Applies a move against the stored board of an active sprint and returns the new board.
#[instrument(skip(db, identity))]
pub async fn move_issue(
    db: &DatabaseConnection,
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
    sprint_id: i32,
    instruction: MoveInstruction,
) -> Result<Vec<IssueResponse>, AppError> {
    let caller = authorize(identity, ctx).await?;
    let (sprint, _) = scope::find_sprint(db, &caller, sprint_id).await?;

    if sprint.status != SprintStatus::Active {
        return Err(AppError::bad_request(ErrorCode::SprintNotActive));
    }

    let issues = load_sprint_issues(db, sprint.id).await?;
    let reordered = apply_move(issues, &instruction)?;

    if !reordered.is_unchanged() {
        persist_order(db, &caller, &reordered.changes).await?;
        info!(sprint_id, changed = reordered.changes.len(), "보드 이동 반영 완료");
    }

    with_people(db, reordered.issues).await
}
