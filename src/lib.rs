pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod reading_list;
pub mod render;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use reading_list::{Link, ReadingList, Timestamp, View};
