pub mod auth;
pub mod csrf;
pub mod permissions;
pub mod response;

pub use auth::{jwt_auth_middleware, resolve_principal_middleware, AuthUser, Principal};
pub use csrf::{csrf_guard, CsrfTokenValidator, CSRF_HEADER};
pub use permissions::{capability_guard, RequiredCapabilities};
pub use response::{ApiResponse, ApiResult};
