pub mod clock;
pub mod config;
pub mod detach;
pub mod env;
pub mod profiling;
