//! Device operation tools and the agent plumbing around them.
//!
//! This module is organized into the following submodules:
//!
//! - `types`: serializable tool argument types and tool metadata
//! - `config`: device credentials and process settings
//! - `error`: error taxonomy for tool invocations
//! - `session`: scoped session acquisition over an abstract transport
//! - `client`: russh-backed transport implementation
//! - `commands`: the device operation tools
//! - `dates`: calendar date helper
//! - `registry`: named tool dispatch exposed to the reasoning agent
//! - `agent`: adapter driving the language-model tool-calling loop

pub mod agent;
pub mod client;
pub mod commands;
pub mod config;
pub mod dates;
pub mod error;
pub mod registry;
pub mod session;
pub mod types;

pub use agent::NetworkAgent;
pub use client::SshConnector;
pub use config::Settings;
pub use error::AgentError;
pub use registry::ToolRegistry;
