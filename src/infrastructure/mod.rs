pub mod config;
pub mod external;
pub mod popup;
pub mod storage;
