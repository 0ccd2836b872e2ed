//! Hivex - Hive Blog Terminal Reader
//!
//! This library provides the core functionality for hivex, a terminal UI for
//! reading a Hive account's blog posts over the condenser JSON-RPC API.
//!
//! The flow is deliberately small: a fetch task turns user requests into
//! single condenser calls, the assemblers shape raw records into view
//! models, and the TUI renders whatever state the app holds. Nothing polls
//! in the background and nothing is cached between runs.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod posts;
pub mod rpc;
pub mod source;
pub mod types;
pub mod ui;
pub mod util_text;

// Re-export commonly used types
pub use app::{App, View};
pub use config::Config;
pub use rpc::{HiveClient, RpcError};
pub use types::{AppEvent, FetchRequest, PostDetail, PostSummary};
