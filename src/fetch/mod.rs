// src/fetch/mod.rs

pub mod download;
pub mod link;
pub mod retry;

pub use download::download_to;
pub use link::{find_download_href, resolve_download_url};
