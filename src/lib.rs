pub use crate::{config::Config, editor::Editor, error::Error};

mod ansi_escape;
mod config;
mod editor;
mod error;
mod row;
mod syntax;
pub mod terminal;
mod xdg;

#[path = "unix.rs"]
mod sys;
