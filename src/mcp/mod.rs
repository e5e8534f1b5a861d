//! MCP (stdio) surface over the recommendation pipeline.

pub mod server;

pub use server::{run_server, FaqAdvisorMcpServer};
