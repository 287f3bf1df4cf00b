pub mod api;
pub mod config;
pub mod main_module;
pub mod router;
pub mod sheet;
pub mod shared;
pub mod table;
pub mod tests;
