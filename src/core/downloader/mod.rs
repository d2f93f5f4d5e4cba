mod client;

pub use client::{Checksum, Downloader};
