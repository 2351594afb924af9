pub mod context;
pub mod gate;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use context::RequestContext;
pub use gate::{authorize, Caller};
pub use identity::{DbIdentityProvider, IdentityProvider};
pub use jwt::JwtUtils;
pub use middleware::AuthMiddleware;
