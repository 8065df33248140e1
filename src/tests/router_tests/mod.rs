pub mod auth_flow_tests;
pub mod dashboard_tests;
pub mod files_tests;
pub mod listing_tests;
