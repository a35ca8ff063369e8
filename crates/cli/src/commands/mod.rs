//! Command handlers for the Knowledge Base Assistant CLI.

pub mod ask;
pub mod init_db;
pub mod prompts;
pub mod search;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use init_db::InitDbCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;
