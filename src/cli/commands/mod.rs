pub mod analyze;
pub mod chain;
mod command_result;
pub mod cycles;
pub mod helper;
pub mod init;

pub use command_result::*;
