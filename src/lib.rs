pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ipc;
pub mod utils;

pub use error::{LunoError, Result};
