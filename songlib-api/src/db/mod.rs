//! Song store: database access for songs and groups

pub mod groups;
pub mod songs;

pub use groups::{find_group_id, find_or_create_group};
pub use songs::{create_song, delete_song, get_song, list_songs, update_song, SongFilter};
