//! Configuration for the governator deploy agent.
//!
//! This crate handles:
//! - Agent configuration files (governator.kdl)
//! - Overlaying flag/environment values and validating the result
//! - Docker host URI parsing

pub mod agent;
pub mod docker;
pub mod error;

pub use agent::{AgentConfig, ValidatedConfig, parse_agent_config};
pub use docker::DockerHost;
pub use error::{ConfigError, ConfigResult};
