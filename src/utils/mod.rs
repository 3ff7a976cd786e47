pub mod client_ip;
pub mod log_sanitizer;

pub use client_ip::RequestMetadata;
pub use log_sanitizer::*;
