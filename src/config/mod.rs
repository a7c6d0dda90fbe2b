//! Asset monitoring configuration loading and validation.

pub mod loader;
pub mod model;

pub use model::AppConfig;
