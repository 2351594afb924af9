pub mod board;
pub mod issue;
pub mod organization;
pub mod project;
pub mod scope;
pub mod sprint;
