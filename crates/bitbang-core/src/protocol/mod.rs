//! Protocol module containing the remote-bitbang command decoder.

pub mod command;

pub use command::{decode_command, Command, NoOp};
