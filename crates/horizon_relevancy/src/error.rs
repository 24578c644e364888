//! Error types for the relevancy router.
//!
//! Routing operations themselves never fail: unknown ids, policy misses and
//! unresolved owners degrade relevancy instead. Errors only surface at setup
//! boundaries (registering the class hierarchy) and on the admin console.

/// Errors raised while setting up or administering the router.
#[derive(Debug, thiserror::Error)]
pub enum RelevancyError {
    /// A class with the same name was already registered
    #[error("Class already registered: {name}")]
    DuplicateClass { name: String },

    /// A class names a parent that is not (yet) registered
    #[error("Unknown parent class {parent} for {name}")]
    UnknownParent { name: String, parent: String },

    /// Console input that names no known command
    #[error("Unknown console command: {0}")]
    UnknownCommand(String),

    /// Console input with an argument that does not parse
    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument { command: String, value: String },
}
