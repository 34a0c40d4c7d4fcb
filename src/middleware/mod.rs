pub mod auth;
pub mod gate;
pub mod response;

pub use auth::{jwt_auth_middleware, require_admin_middleware, AuthUser};
pub use gate::route_gate_middleware;
pub use response::{ApiResponse, ApiResult};
