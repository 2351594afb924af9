//! Sprint board ordering.
//!
//! A board column is the set of a sprint's issues sharing one status. `order` only has
//! meaning inside a column; after every move the touched columns are renumbered densely
//! from zero.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::issue;
use crate::entity::sea_orm_active_enums::IssueStatus;
use crate::model::global_error::AppError;
use crate::model::issue::IssueResponse;

/// Anything that can sit on the board.
pub trait BoardCard {
    fn card_id(&self) -> i32;
    fn status(&self) -> IssueStatus;
    fn order(&self) -> i32;
    fn set_status(&mut self, status: IssueStatus);
    fn set_order(&mut self, order: i32);
}

impl BoardCard for issue::Model {
    fn card_id(&self) -> i32 {
        self.id
    }

    fn status(&self) -> IssueStatus {
        self.status
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_status(&mut self, status: IssueStatus) {
        self.status = status;
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

impl BoardCard for IssueResponse {
    fn card_id(&self) -> i32 {
        self.id
    }

    fn status(&self) -> IssueStatus {
        self.status
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_status(&mut self, status: IssueStatus) {
        self.status = status;
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Drag result normalized to column/index coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveInstruction {
    pub source_status: IssueStatus,
    pub source_index: usize,
    pub destination_status: IssueStatus,
    pub destination_index: usize,
}

impl MoveInstruction {
    pub fn is_noop(&self) -> bool {
        self.source_status == self.destination_status && self.source_index == self.destination_index
    }
}

/// One row of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReorderEntry {
    pub id: i32,
    pub status: IssueStatus,
    pub order: i32,
}

impl ReorderEntry {
    pub fn of<T: BoardCard>(card: &T) -> Self {
        Self {
            id: card.card_id(),
            status: card.status(),
            order: card.order(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reordered<T> {
    /// Every issue of the board, sorted for display.
    pub issues: Vec<T>,
    /// Rows of the touched columns. Empty for a no-op move.
    pub changes: Vec<ReorderEntry>,
}

impl<T> Reordered<T> {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Sorts by column, then by order within the column.
pub fn sort_for_display<T: BoardCard>(issues: &mut [T]) {
    issues.sort_by_key(|card| (card.status().rank(), card.order()));
}

/// Cards of one column in board order.
pub fn column<T: BoardCard>(issues: &[T], status: IssueStatus) -> Vec<&T> {
    let mut cards: Vec<&T> = issues.iter().filter(|card| card.status() == status).collect();
    cards.sort_by_key(|card| card.order());
    cards
}

fn take_column<T: BoardCard>(issues: Vec<T>, status: IssueStatus) -> (Vec<T>, Vec<T>) {
    let (mut taken, rest): (Vec<T>, Vec<T>) = issues
        .into_iter()
        .partition(|card| card.status() == status);
    taken.sort_by_key(|card| card.order());
    (taken, rest)
}

fn renumber<T: BoardCard>(cards: &mut [T]) {
    for (position, card) in cards.iter_mut().enumerate() {
        card.set_order(position as i32);
    }
}

fn index_error(field: &str, index: usize, len: usize) -> AppError {
    AppError::field(field, &format!("인덱스 {}가 컬럼 범위(0..{})를 벗어났습니다.", index, len))
}

/// Applies one drag-and-drop move to the full issue list of a sprint.
pub fn apply_move<T: BoardCard>(issues: Vec<T>, instruction: &MoveInstruction) -> Result<Reordered<T>, AppError> {
    if instruction.is_noop() {
        let len = issues.iter().filter(|card| card.status() == instruction.source_status).count();
        if instruction.source_index >= len {
            return Err(index_error("sourceIndex", instruction.source_index, len));
        }
        return Ok(Reordered { issues, changes: Vec::new() });
    }

    let (mut source, rest) = take_column(issues, instruction.source_status);
    if instruction.source_index >= source.len() {
        return Err(index_error("sourceIndex", instruction.source_index, source.len()));
    }

    let mut changes = Vec::new();
    let mut board = rest;

    if instruction.source_status == instruction.destination_status {
        if instruction.destination_index >= source.len() {
            return Err(index_error("destinationIndex", instruction.destination_index, source.len()));
        }

        let card = source.remove(instruction.source_index);
        source.insert(instruction.destination_index, card);
        renumber(&mut source);

        changes.extend(source.iter().map(ReorderEntry::of));
        board.extend(source);
    } else {
        let (mut destination, rest) = take_column(board, instruction.destination_status);
        if instruction.destination_index > destination.len() {
            return Err(index_error("destinationIndex", instruction.destination_index, destination.len()));
        }
        board = rest;

        let mut card = source.remove(instruction.source_index);
        renumber(&mut source);

        card.set_status(instruction.destination_status);
        destination.insert(instruction.destination_index, card);
        renumber(&mut destination);

        changes.extend(source.iter().map(ReorderEntry::of));
        changes.extend(destination.iter().map(ReorderEntry::of));
        board.extend(source);
        board.extend(destination);
    }

    sort_for_display(&mut board);
    Ok(Reordered { issues: board, changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::global_error::ErrorCode;
    use rstest::rstest;
    use IssueStatus::{Done, InProgress, InReview, Todo};

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: i32,
        status: IssueStatus,
        order: i32,
    }

    impl BoardCard for Card {
        fn card_id(&self) -> i32 {
            self.id
        }
        fn status(&self) -> IssueStatus {
            self.status
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn set_status(&mut self, status: IssueStatus) {
            self.status = status;
        }
        fn set_order(&mut self, order: i32) {
            self.order = order;
        }
    }

    fn card(id: i32, status: IssueStatus, order: i32) -> Card {
        Card { id, status, order }
    }

    fn mv(source_status: IssueStatus, source_index: usize, destination_status: IssueStatus, destination_index: usize) -> MoveInstruction {
        MoveInstruction { source_status, source_index, destination_status, destination_index }
    }

    fn ids_in(issues: &[Card], status: IssueStatus) -> Vec<i32> {
        column(issues, status).iter().map(|c| c.id).collect()
    }

    fn assert_dense(issues: &[Card], status: IssueStatus) {
        let orders: Vec<i32> = column(issues, status).iter().map(|c| c.order).collect();
        let expected: Vec<i32> = (0..orders.len() as i32).collect();
        assert_eq!(orders, expected, "{:?} 컬럼이 0..N-1 이 아님", status);
    }

    #[test]
    fn moving_b_to_top_of_todo() {
        // A=1, B=2, C=3
        let board = vec![card(1, Todo, 0), card(2, Todo, 1), card(3, Todo, 2)];

        let result = apply_move(board, &mv(Todo, 1, Todo, 0)).unwrap();

        assert_eq!(result.issues, vec![card(2, Todo, 0), card(1, Todo, 1), card(3, Todo, 2)]);
        assert_eq!(result.changes.len(), 3);
    }

    #[test]
    fn moving_a_into_in_progress() {
        let board = vec![card(1, Todo, 0), card(2, Todo, 1), card(3, InProgress, 0)];

        let result = apply_move(board, &mv(Todo, 0, InProgress, 0)).unwrap();

        assert_eq!(
            result.issues,
            vec![card(2, Todo, 0), card(1, InProgress, 0), card(3, InProgress, 1)]
        );
        assert!(result.changes.contains(&ReorderEntry { id: 1, status: InProgress, order: 0 }));
    }

    #[test]
    fn noop_returns_input_and_no_changes() {
        let board = vec![card(1, Todo, 0), card(2, Todo, 5), card(3, Done, 0)];

        let result = apply_move(board.clone(), &mv(Todo, 1, Todo, 1)).unwrap();

        assert!(result.is_unchanged());
        assert_eq!(result.issues, board);
    }

    #[test]
    fn untouched_columns_keep_their_orders() {
        let board = vec![
            card(1, Todo, 0),
            card(2, Todo, 1),
            card(3, InReview, 4),
            card(4, InReview, 9),
            card(5, Done, 0),
        ];

        let result = apply_move(board, &mv(Todo, 0, Done, 1)).unwrap();

        assert_eq!(column(&result.issues, InReview).iter().map(|c| c.order).collect::<Vec<_>>(), vec![4, 9]);
        assert!(result.changes.iter().all(|entry| entry.status != InReview));
        assert_eq!(ids_in(&result.issues, Done), vec![5, 1]);
    }

    #[test]
    fn gaps_in_input_are_closed_after_move() {
        let board = vec![card(1, Todo, 3), card(2, Todo, 10), card(3, Todo, 42)];

        let result = apply_move(board, &mv(Todo, 2, Todo, 1)).unwrap();

        assert_eq!(ids_in(&result.issues, Todo), vec![1, 3, 2]);
        assert_dense(&result.issues, Todo);
    }

    #[test]
    fn output_is_sorted_by_column_then_order() {
        let board = vec![card(1, Done, 0), card(2, InProgress, 0), card(3, Todo, 0), card(4, Todo, 1)];

        let result = apply_move(board, &mv(Todo, 1, InProgress, 1)).unwrap();

        let layout: Vec<(IssueStatus, i32)> = result.issues.iter().map(|c| (c.status, c.order)).collect();
        assert_eq!(layout, vec![(Todo, 0), (InProgress, 0), (InProgress, 1), (Done, 0)]);
    }

    #[test]
    fn moving_into_an_empty_column() {
        let board = vec![card(1, Todo, 0)];

        let result = apply_move(board, &mv(Todo, 0, InReview, 0)).unwrap();

        assert_eq!(result.issues, vec![card(1, InReview, 0)]);
        assert!(column(&result.issues, Todo).is_empty());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 3)]
    #[case(3, 0)]
    #[case(1, 2)]
    #[case(2, 1)]
    #[case(3, 3)]
    fn same_column_moves_stay_dense(#[case] from: usize, #[case] to: usize) {
        let board: Vec<Card> = (0..4).map(|i| card(i + 1, InProgress, i)).collect();
        let moved_id = board[from].id;

        let result = apply_move(board, &mv(InProgress, from, InProgress, to)).unwrap();

        assert_dense(&result.issues, InProgress);
        assert_eq!(ids_in(&result.issues, InProgress)[to], moved_id);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 2)]
    #[case(2, 1)]
    #[case(1, 2)]
    fn cross_column_moves_keep_both_columns_dense(#[case] from: usize, #[case] to: usize) {
        let mut board: Vec<Card> = (0..3).map(|i| card(i + 1, Todo, i)).collect();
        board.extend((0..2).map(|i| card(i + 10, InReview, i)));
        let moved_id = board[from].id;

        let result = apply_move(board, &mv(Todo, from, InReview, to)).unwrap();

        assert_dense(&result.issues, Todo);
        assert_dense(&result.issues, InReview);
        let moved = result.issues.iter().find(|c| c.id == moved_id).unwrap();
        assert_eq!(moved.status, InReview);
        assert_eq!(ids_in(&result.issues, InReview)[to], moved_id);
        assert_eq!(result.issues.len(), 5);
    }

    #[rstest]
    #[case::source_past_end(mv(Todo, 2, Todo, 0))]
    #[case::same_column_destination_past_end(mv(Todo, 0, Todo, 2))]
    #[case::cross_column_destination_past_end(mv(Todo, 0, Done, 2))]
    #[case::empty_source_column(mv(InReview, 0, Todo, 0))]
    #[case::noop_out_of_range(mv(Todo, 99, Todo, 99))]
    #[case::noop_in_empty_column(mv(InProgress, 0, InProgress, 0))]
    fn invalid_indices_are_rejected(#[case] instruction: MoveInstruction) {
        let board = vec![card(1, Todo, 0), card(2, Todo, 1), card(3, Done, 0)];

        let err = apply_move(board, &instruction).unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
