pub mod registry;
pub mod traits;

// Rate service implementations
pub mod exchangerate_api;
pub mod frankfurter;
