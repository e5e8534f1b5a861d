

pub mod config;
pub mod error;

pub use self::config::AdvisorConfig;
pub use self::error::{RecommendError, Result};
