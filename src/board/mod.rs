pub mod filter;
pub mod ordering;
pub mod session;

pub use filter::IssueFilter;
pub use ordering::{apply_move, BoardCard, MoveInstruction, ReorderEntry, Reordered};
pub use session::{BoardSession, BoardStore, ServiceBoardStore};
