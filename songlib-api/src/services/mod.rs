//! Clients for external collaborators

pub mod song_info_client;

pub use song_info_client::{SongInfoClient, SongInfoError};
