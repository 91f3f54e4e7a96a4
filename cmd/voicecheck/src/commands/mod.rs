//! CLI commands module.

mod encode;
mod serve;

pub use encode::EncodeCommand;
pub use serve::ServeCommand;
