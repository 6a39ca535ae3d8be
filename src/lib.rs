// src/lib.rs

pub mod calendar;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod holidays;
pub mod logging;
pub mod pipeline;
pub mod police;
pub mod store;
pub mod weather;

pub use downloader::Downloader;
pub use error::DownloadError;
