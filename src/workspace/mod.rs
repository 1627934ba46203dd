//! File system access for an analysis run.
//!
//! - [`discover`] enumerates the project's candidate files
//! - [`ContentCache`] memoizes file text for the lifetime of one run
//! - [`FileStat`] carries size and modification time

pub mod cache;
pub mod discovery;

pub use cache::{ContentCache, FileStat};
pub use discovery::{config_file_matcher, discover, Discovery, CONFIG_FILE_PATTERNS};
