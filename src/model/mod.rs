pub mod auth;
pub mod global_error;
pub mod issue;
pub mod organization;
pub mod project;
pub mod sprint;

pub use auth::{AuthResponse, Claims, LoginRequest, RefreshRequest, RegisterRequest, UserResponse};
pub use global_error::{AppError, ErrorCode};
