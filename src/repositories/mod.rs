pub mod inquiry_repo;
pub mod reference_repo;
pub mod user_profile_repo;
pub mod memory_store;

pub use inquiry_repo::*;
pub use reference_repo::*;
pub use user_profile_repo::*;
pub use memory_store::InMemoryStore;
