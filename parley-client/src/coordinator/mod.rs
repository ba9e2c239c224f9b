mod client_event;
mod coordinator;
mod coordinator_command;
mod role_policy;
mod session;

pub use client_event::*;
pub use coordinator::*;
pub use coordinator_command::*;
pub use role_policy::*;
