pub mod analytics;
pub mod api;
pub mod date_utils;
pub mod logging;
