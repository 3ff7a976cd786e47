pub mod health;
pub mod inquiries;
pub mod reference;
pub mod user;
