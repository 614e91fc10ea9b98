pub mod app;
pub mod utils;
