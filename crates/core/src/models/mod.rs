pub mod account;
pub mod category;
pub mod ledger;
pub mod preferences;
pub mod rates;
pub mod transaction;
pub mod views;
