//! The two end-to-end operations behind the binaries.

pub mod clean;
pub mod download;

pub use clean::{CleanOptions, CleanRun};
pub use download::{DownloadOptions, DownloadRun};
