pub mod app_command;

pub use app_command::{AppCommand, TableKind, TableOp, HELP_TEXT};
