pub mod middleware;
pub mod provision;
pub mod roles;
pub mod token;

pub use middleware::AuthUser;
pub use provision::{NewIdentity, provision_user};
