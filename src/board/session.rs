//! Client-observed board state of one sprint.
//!
//! Moves are shown optimistically before the batch is stored. A failed batch is never retried
//! or undone step by step: the board is replaced by a fresh copy from the store.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};

use super::ordering::{apply_move, column, MoveInstruction, ReorderEntry};
use crate::auth::{IdentityProvider, RequestContext};
use crate::entity::sea_orm_active_enums::{IssueStatus, SprintStatus};
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::issue::IssueResponse;
use crate::model::sprint::SprintResponse;
use crate::service;

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn fetch_issues(&self, sprint_id: i32) -> Result<Vec<IssueResponse>, AppError>;

    async fn persist_order(&self, entries: &[ReorderEntry]) -> Result<(), AppError>;
}

/// Board store that calls the issue services in-process on behalf of one caller.
pub struct ServiceBoardStore<'a> {
    db: &'a DatabaseConnection,
    identity: &'a dyn IdentityProvider,
    ctx: RequestContext,
}

impl<'a> ServiceBoardStore<'a> {
    pub fn new(db: &'a DatabaseConnection, identity: &'a dyn IdentityProvider, ctx: RequestContext) -> Self {
        Self { db, identity, ctx }
    }
}

#[async_trait]
impl BoardStore for ServiceBoardStore<'_> {
    async fn fetch_issues(&self, sprint_id: i32) -> Result<Vec<IssueResponse>, AppError> {
        service::issue::get_issues_for_sprint(self.db, self.identity, &self.ctx, sprint_id).await
    }

    async fn persist_order(&self, entries: &[ReorderEntry]) -> Result<(), AppError> {
        service::issue::update_issue_order(self.db, self.identity, &self.ctx, entries).await
    }
}

/// Batch produced by an optimistic move, waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReorder {
    pub changes: Vec<ReorderEntry>,
}

#[derive(Debug)]
pub struct BoardSession {
    sprint: SprintResponse,
    issues: Vec<IssueResponse>,
    confirmed: Vec<IssueResponse>,
    in_flight: bool,
}

impl BoardSession {
    pub async fn open<S: BoardStore + ?Sized>(store: &S, sprint: SprintResponse) -> Result<Self, AppError> {
        let issues = store.fetch_issues(sprint.id).await?;
        Ok(Self {
            sprint,
            confirmed: issues.clone(),
            issues,
            in_flight: false,
        })
    }

    pub fn sprint(&self) -> &SprintResponse {
        &self.sprint
    }

    /// Replaces the sprint after a status change made elsewhere.
    pub fn set_sprint(&mut self, sprint: SprintResponse) {
        self.sprint = sprint;
    }

    pub fn issues(&self) -> &[IssueResponse] {
        &self.issues
    }

    pub fn column(&self, status: IssueStatus) -> Vec<&IssueResponse> {
        column(&self.issues, status)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Applies a move to the local view. Returns `None` for a no-op.
    pub fn begin_move(&mut self, instruction: &MoveInstruction) -> Result<Option<PendingReorder>, AppError> {
        if self.in_flight {
            return Err(AppError::new(ErrorCode::ReorderInFlight));
        }

        match self.sprint.status {
            SprintStatus::Active => {}
            SprintStatus::Planned | SprintStatus::Completed => {
                return Err(AppError::bad_request(ErrorCode::SprintNotActive));
            }
        }

        let reordered = apply_move(self.issues.clone(), instruction)?;
        if reordered.is_unchanged() {
            return Ok(None);
        }

        self.issues = reordered.issues;
        self.in_flight = true;
        debug!(sprint_id = self.sprint.id, changes = reordered.changes.len(), "낙관적 보드 갱신");

        Ok(Some(PendingReorder { changes: reordered.changes }))
    }

    /// Settles the in-flight batch. On failure the board is reloaded and the persistence error returned.
    pub async fn complete_move<S: BoardStore + ?Sized>(
        &mut self,
        store: &S,
        outcome: Result<(), AppError>,
    ) -> Result<(), AppError> {
        self.in_flight = false;

        match outcome {
            Ok(()) => {
                self.confirmed = self.issues.clone();
                Ok(())
            }
            Err(err) => {
                warn!(sprint_id = self.sprint.id, error = %err, "순서 저장 실패, 보드를 다시 불러옵니다");
                if let Err(reload_err) = self.refresh(store).await {
                    warn!(error = %reload_err, "보드 재조회 실패, 마지막 확인 상태로 되돌립니다");
                    self.issues = self.confirmed.clone();
                }
                Err(err)
            }
        }
    }

    /// Moves an issue and stores the batch. Returns whether anything changed.
    pub async fn move_issue<S: BoardStore + ?Sized>(
        &mut self,
        store: &S,
        instruction: &MoveInstruction,
    ) -> Result<bool, AppError> {
        let Some(pending) = self.begin_move(instruction)? else {
            return Ok(false);
        };

        let outcome = store.persist_order(&pending.changes).await;
        self.complete_move(store, outcome).await?;
        Ok(true)
    }

    /// Full replace from the store.
    pub async fn refresh<S: BoardStore + ?Sized>(&mut self, store: &S) -> Result<(), AppError> {
        let issues = store.fetch_issues(self.sprint.id).await?;
        self.confirmed = issues.clone();
        self.issues = issues;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::sea_orm_active_enums::IssuePriority;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use IssueStatus::{InProgress, Todo};

    fn fixed_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn issue(id: i32, status: IssueStatus, order: i32) -> IssueResponse {
        IssueResponse {
            id,
            title: format!("issue {}", id),
            description: None,
            status,
            priority: IssuePriority::Medium,
            order,
            project_id: 1,
            sprint_id: Some(1),
            assignee: None,
            reporter: None,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        }
    }

    fn sprint(status: SprintStatus) -> SprintResponse {
        SprintResponse {
            id: 1,
            name: "APP-1".to_string(),
            start_date: fixed_time(),
            end_date: fixed_time(),
            status,
            project_id: 1,
            created_at: fixed_time(),
        }
    }

    /// In-memory store that can be told to reject the next batch.
    struct FakeStore {
        server: Mutex<Vec<IssueResponse>>,
        fail_persist: bool,
        persisted: Mutex<Vec<Vec<ReorderEntry>>>,
    }

    impl FakeStore {
        fn new(issues: Vec<IssueResponse>, fail_persist: bool) -> Self {
            Self {
                server: Mutex::new(issues),
                fail_persist,
                persisted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BoardStore for FakeStore {
        async fn fetch_issues(&self, _sprint_id: i32) -> Result<Vec<IssueResponse>, AppError> {
            Ok(self.server.lock().unwrap().clone())
        }

        async fn persist_order(&self, entries: &[ReorderEntry]) -> Result<(), AppError> {
            if self.fail_persist {
                return Err(AppError::new(ErrorCode::PersistenceFailure));
            }
            let mut server = self.server.lock().unwrap();
            for entry in entries {
                if let Some(issue) = server.iter_mut().find(|i| i.id == entry.id) {
                    issue.status = entry.status;
                    issue.order = entry.order;
                }
            }
            self.persisted.lock().unwrap().push(entries.to_vec());
            Ok(())
        }
    }

    fn board() -> Vec<IssueResponse> {
        vec![issue(1, Todo, 0), issue(2, Todo, 1), issue(3, InProgress, 0)]
    }

    fn to_progress() -> MoveInstruction {
        MoveInstruction {
            source_status: Todo,
            source_index: 0,
            destination_status: InProgress,
            destination_index: 0,
        }
    }

    #[tokio::test]
    async fn successful_move_updates_view_and_store() {
        let store = FakeStore::new(board(), false);
        let mut session = BoardSession::open(&store, sprint(SprintStatus::Active)).await.unwrap();

        assert!(session.move_issue(&store, &to_progress()).await.unwrap());

        let progress: Vec<i32> = session.column(InProgress).iter().map(|i| i.id).collect();
        assert_eq!(progress, vec![1, 3]);
        assert!(!session.is_in_flight());
        assert_eq!(store.persisted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_persist_reloads_from_store() {
        let store = FakeStore::new(board(), true);
        let mut session = BoardSession::open(&store, sprint(SprintStatus::Active)).await.unwrap();

        let err = session.move_issue(&store, &to_progress()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::PersistenceFailure);
        assert_eq!(session.issues(), board().as_slice());
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn second_move_is_refused_while_in_flight() {
        let store = FakeStore::new(board(), false);
        let mut session = BoardSession::open(&store, sprint(SprintStatus::Active)).await.unwrap();

        let pending = session.begin_move(&to_progress()).unwrap().unwrap();
        let err = session.begin_move(&to_progress()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReorderInFlight);

        let outcome = store.persist_order(&pending.changes).await;
        session.complete_move(&store, outcome).await.unwrap();
        assert!(session.begin_move(&to_progress()).is_ok());
    }

    #[tokio::test]
    async fn noop_move_writes_nothing() {
        let store = FakeStore::new(board(), false);
        let mut session = BoardSession::open(&store, sprint(SprintStatus::Active)).await.unwrap();
        let same_place = MoveInstruction {
            source_status: Todo,
            source_index: 1,
            destination_status: Todo,
            destination_index: 1,
        };

        assert!(!session.move_issue(&store, &same_place).await.unwrap());
        assert!(store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn board_is_read_only_outside_active_sprint() {
        let store = FakeStore::new(board(), false);

        for status in [SprintStatus::Planned, SprintStatus::Completed] {
            let mut session = BoardSession::open(&store, sprint(status)).await.unwrap();
            let err = session.move_issue(&store, &to_progress()).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::SprintNotActive);
            assert_eq!(session.issues(), board().as_slice());
        }
    }

    #[tokio::test]
    async fn completed_sprint_makes_board_read_only() {
        let store = FakeStore::new(board(), false);
        let mut session = BoardSession::open(&store, sprint(SprintStatus::Active)).await.unwrap();

        session.set_sprint(sprint(SprintStatus::Completed));

        let err = session.move_issue(&store, &to_progress()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SprintNotActive);
        assert_eq!(session.issues(), board().as_slice());
        assert!(store.persisted.lock().unwrap().is_empty());
    }
}
