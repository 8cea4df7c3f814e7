pub mod currency_service;
pub mod ledger_service;
pub mod rate_service;
pub mod sample_data;
pub mod view_service;
