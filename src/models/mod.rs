pub mod contact;
pub mod parts_inquiry;
pub mod reference;
pub mod user;
pub mod validation;
