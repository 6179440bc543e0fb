pub mod auth;

pub use auth::{jwt_auth_middleware, optional_auth_user, AuthUser};
