pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;

pub use crate::core::{Hash, Repository, Type};
pub use cli::{CommandTree, ShorthandTable};
