pub mod auth;
pub mod error_handling;
pub mod ip_rate_limiter;
pub mod request_id;

pub use auth::*;
pub use error_handling::*;
pub use ip_rate_limiter::*;
pub use request_id::*;
