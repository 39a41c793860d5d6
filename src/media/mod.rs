//! Image naming and download for Shelf-Scout

mod downloader;
mod id_generator;

pub use downloader::{file_name_for, ImageDownloader};
pub use id_generator::{IdGenerator, DEFAULT_CAPACITY};
