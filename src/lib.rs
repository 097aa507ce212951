pub mod config;
pub mod di;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod intake;
pub mod routing;
