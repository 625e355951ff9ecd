//! Storage trait for the playlist store

use crate::error::Result;
use crate::types::{
    Album, AlbumId, AlbumTrack, Artist, ArtistId, Code, CreateAlbum, CreateArtist, CreateGenre,
    CreatePlaylist, CreateTrack, EntryContent, EntryId, Genre, GenreId, Playlist, PlaylistEntry,
    PlaylistId, Provider, ProviderId, ProviderSource, Track, TrackId, UpdatePlaylist, UpdateTrack,
};
use async_trait::async_trait;

/// Storage context providing access to database operations
///
/// This is the only sanctioned access path to the store: the position and
/// code invariants hold only for writes that go through these operations.
#[async_trait]
pub trait StorageContext: Send + Sync {
    // ========================================================================
    // Tracks
    // ========================================================================

    /// Create a new track, allocating its code
    async fn create_track(&self, track: CreateTrack) -> Result<Track>;

    /// Get track by ID
    async fn get_track(&self, id: TrackId) -> Result<Option<Track>>;

    /// Get track by short code
    async fn find_track_by_code(&self, code: &Code) -> Result<Option<Track>>;

    /// Get all tracks
    async fn list_tracks(&self) -> Result<Vec<Track>>;

    /// Update a track
    async fn update_track(&self, id: TrackId, changes: UpdateTrack) -> Result<Track>;

    /// Delete a track together with its providers and the entries pointing at it
    async fn delete_track(&self, id: TrackId) -> Result<()>;

    // ========================================================================
    // Artists, genres, albums
    // ========================================================================

    /// Create a new artist
    async fn create_artist(&self, artist: CreateArtist) -> Result<Artist>;

    /// Get artist by ID
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>>;

    /// Credit an artist on a track
    async fn add_artist_to_track(&self, track_id: TrackId, artist_id: ArtistId) -> Result<()>;

    /// Artists credited on a track
    async fn artists_for_track(&self, track_id: TrackId) -> Result<Vec<Artist>>;

    /// Create a new genre
    async fn create_genre(&self, genre: CreateGenre) -> Result<Genre>;

    /// Get genre by ID
    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>>;

    /// Create a new album
    async fn create_album(&self, album: CreateAlbum) -> Result<Album>;

    /// Get album by ID
    async fn get_album(&self, id: AlbumId) -> Result<Option<Album>>;

    /// Put a track on an album
    async fn add_track_to_album(
        &self,
        album_id: AlbumId,
        track_id: TrackId,
        track_number: Option<u32>,
    ) -> Result<()>;

    /// Tracks of an album ordered by track number
    async fn album_tracks(&self, album_id: AlbumId) -> Result<Vec<AlbumTrack>>;

    // ========================================================================
    // Providers
    // ========================================================================

    /// Attach an acquisition source to a track
    async fn add_provider(&self, track_id: TrackId, source: ProviderSource) -> Result<Provider>;

    /// All providers of a track
    async fn list_providers(&self, track_id: TrackId) -> Result<Vec<Provider>>;

    /// Detach a provider
    async fn remove_provider(&self, id: ProviderId) -> Result<()>;

    // ========================================================================
    // Playlists
    // ========================================================================

    /// Create a new playlist, allocating its code
    async fn create_playlist(&self, playlist: CreatePlaylist) -> Result<Playlist>;

    /// Get playlist by ID
    async fn get_playlist(&self, id: PlaylistId) -> Result<Option<Playlist>>;

    /// Get playlist by short code
    async fn find_playlist_by_code(&self, code: &Code) -> Result<Option<Playlist>>;

    /// Get all playlists
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// Update title / external reference with optimistic concurrency
    async fn update_playlist(&self, id: PlaylistId, changes: UpdatePlaylist) -> Result<Playlist>;

    /// Delete playlist and its entries
    async fn delete_playlist(&self, id: PlaylistId) -> Result<()>;

    /// Copy a playlist and its entries under a new id and code
    async fn duplicate_playlist(&self, id: PlaylistId, title: String) -> Result<Playlist>;

    // ========================================================================
    // Playlist entries
    // ========================================================================

    /// Insert an entry at `position`, shifting the occupied run behind it
    async fn insert_entry(
        &self,
        playlist_id: PlaylistId,
        position: u32,
        content: EntryContent,
    ) -> Result<PlaylistEntry>;

    /// Insert an entry after the last one
    async fn append_entry(
        &self,
        playlist_id: PlaylistId,
        content: EntryContent,
    ) -> Result<PlaylistEntry>;

    /// Reposition an existing entry
    async fn move_entry(&self, id: EntryId, new_position: u32) -> Result<PlaylistEntry>;

    /// Remove an entry, leaving a gap
    async fn remove_entry(&self, id: EntryId) -> Result<()>;

    /// Entries of a playlist by ascending position
    async fn list_entries(&self, playlist_id: PlaylistId) -> Result<Vec<PlaylistEntry>>;

    /// Tracks a playlist plays, with sub-playlists expanded in place
    async fn flatten_playlist(&self, playlist_id: PlaylistId) -> Result<Vec<TrackId>>;
}
