//! Mixtape Core
//!
//! Platform-agnostic domain types, traits, and error handling for the Mixtape
//! playlist store.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `PlaylistEntry`, `Provider`, etc.
//! - **Identifiers**: UUID-backed ids and per-kind short `Code`s
//! - **Typed one-ofs**: `EntryContent` and `ProviderSource`, with their
//!   persisted record layouts
//! - **Storage Trait**: `StorageContext`, the sanctioned access path
//! - **Error Handling**: Unified `MixtapeError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use mixtape_core::types::{EntryContent, ProviderKind, ProviderSource, TrackId};
//!
//! let track = TrackId::generate();
//! let content = EntryContent::from_parts(Some(track), None).unwrap();
//! assert_eq!(content.track(), Some(track));
//!
//! let source = ProviderSource::parse(ProviderKind::Youtube, "dQw4w9WgXcQ").unwrap();
//! assert_eq!(source.kind(), ProviderKind::Youtube);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{MixtapeError, Result};
pub use storage::StorageContext;

pub use types::{
    Album, AlbumId, AlbumTrack, Artist, ArtistId, Code, CodeKind, CreateAlbum, CreateArtist,
    CreateGenre, CreatePlaylist, CreateTrack, EntryContent, EntryId, EntryRecord, ExternalKind,
    ExternalRef, Genre, GenreId, Playlist, PlaylistEntry, PlaylistId, Provider, ProviderColumns,
    ProviderId, ProviderKind, ProviderRecord, ProviderSource, Track, TrackId, UpdatePlaylist,
    UpdateTrack,
};
