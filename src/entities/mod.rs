//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the catalog tables. Each entity has a Model struct
//! for data and an Entity struct for operations.

pub mod purchase;
pub mod sweet;

// Re-export specific types to avoid conflicts
pub use purchase::Entity as Purchase;
pub use sweet::Entity as Sweet;
