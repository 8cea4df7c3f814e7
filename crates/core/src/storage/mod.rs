pub mod manager;
pub mod records;
pub mod store;
