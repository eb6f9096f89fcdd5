pub mod auth;
pub mod response;

pub use auth::{authenticate, require_admin, require_user};
pub use response::{error_path, ApiResponse, ApiResult};
