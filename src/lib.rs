pub mod catalog;
pub mod command;
pub mod config;
pub mod core;
pub mod error;
pub mod library;
pub mod model;
pub mod session;
pub mod shuffle;
pub mod storage;

pub use crate::core::{DiskPlaylistCore, PlaylistCore};
pub use crate::error::{PlaylistError, Result};
