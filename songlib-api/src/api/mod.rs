//! HTTP API handlers for songlib-api

pub mod health;
pub mod info;
pub mod music;
pub mod songs;

pub use health::health_routes;
pub use info::get_song_info;
pub use music::{create_music, delete_music, get_song_text, update_music};
pub use songs::list_songs;
