pub mod config;
pub mod error;
pub mod prelude;
pub mod render;
