use crate::{albums, artists, entries, genres, playlists, providers, resolve, tracks};
use async_trait::async_trait;
use mixtape_core::{error::Result, storage::StorageContext, types::*};
use sqlx::SqlitePool;

/// Local storage context using `SQLite`
#[derive(Debug, Clone)]
pub struct LocalStorageContext {
    pool: SqlitePool,
    reject_cycles: bool,
}

impl LocalStorageContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            reject_cycles: false,
        }
    }

    /// Refuse entry inserts and moves that would let a playlist contain itself
    #[must_use]
    pub fn with_cycle_rejection(mut self, reject: bool) -> Self {
        self.reject_cycles = reject;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StorageContext for LocalStorageContext {
    // Tracks
    async fn create_track(&self, track: CreateTrack) -> Result<Track> {
        tracks::create(&self.pool, track).await
    }

    async fn get_track(&self, id: TrackId) -> Result<Option<Track>> {
        tracks::get_by_id(&self.pool, id).await
    }

    async fn find_track_by_code(&self, code: &Code) -> Result<Option<Track>> {
        tracks::find_by_code(&self.pool, code).await
    }

    async fn list_tracks(&self) -> Result<Vec<Track>> {
        tracks::get_all(&self.pool).await
    }

    async fn update_track(&self, id: TrackId, changes: UpdateTrack) -> Result<Track> {
        tracks::update(&self.pool, id, changes).await
    }

    async fn delete_track(&self, id: TrackId) -> Result<()> {
        tracks::delete(&self.pool, id).await
    }

    // Artists, genres, albums
    async fn create_artist(&self, artist: CreateArtist) -> Result<Artist> {
        artists::create(&self.pool, artist).await
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>> {
        artists::get_by_id(&self.pool, id).await
    }

    async fn add_artist_to_track(&self, track_id: TrackId, artist_id: ArtistId) -> Result<()> {
        artists::add_to_track(&self.pool, track_id, artist_id).await
    }

    async fn artists_for_track(&self, track_id: TrackId) -> Result<Vec<Artist>> {
        artists::get_by_track(&self.pool, track_id).await
    }

    async fn create_genre(&self, genre: CreateGenre) -> Result<Genre> {
        genres::create(&self.pool, genre).await
    }

    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>> {
        genres::get_by_id(&self.pool, id).await
    }

    async fn create_album(&self, album: CreateAlbum) -> Result<Album> {
        albums::create(&self.pool, album).await
    }

    async fn get_album(&self, id: AlbumId) -> Result<Option<Album>> {
        albums::get_by_id(&self.pool, id).await
    }

    async fn add_track_to_album(
        &self,
        album_id: AlbumId,
        track_id: TrackId,
        track_number: Option<u32>,
    ) -> Result<()> {
        albums::add_track(&self.pool, album_id, track_id, track_number).await
    }

    async fn album_tracks(&self, album_id: AlbumId) -> Result<Vec<AlbumTrack>> {
        albums::tracks(&self.pool, album_id).await
    }

    // Providers
    async fn add_provider(&self, track_id: TrackId, source: ProviderSource) -> Result<Provider> {
        providers::add(&self.pool, track_id, source).await
    }

    async fn list_providers(&self, track_id: TrackId) -> Result<Vec<Provider>> {
        providers::get_by_track(&self.pool, track_id).await
    }

    async fn remove_provider(&self, id: ProviderId) -> Result<()> {
        providers::remove(&self.pool, id).await
    }

    // Playlists
    async fn create_playlist(&self, playlist: CreatePlaylist) -> Result<Playlist> {
        playlists::create(&self.pool, playlist).await
    }

    async fn get_playlist(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        playlists::get_by_id(&self.pool, id).await
    }

    async fn find_playlist_by_code(&self, code: &Code) -> Result<Option<Playlist>> {
        playlists::find_by_code(&self.pool, code).await
    }

    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        playlists::get_all(&self.pool).await
    }

    async fn update_playlist(&self, id: PlaylistId, changes: UpdatePlaylist) -> Result<Playlist> {
        playlists::update(&self.pool, id, changes).await
    }

    async fn delete_playlist(&self, id: PlaylistId) -> Result<()> {
        playlists::delete(&self.pool, id).await
    }

    async fn duplicate_playlist(&self, id: PlaylistId, title: String) -> Result<Playlist> {
        playlists::duplicate(&self.pool, id, title).await
    }

    // Playlist entries
    async fn insert_entry(
        &self,
        playlist_id: PlaylistId,
        position: u32,
        content: EntryContent,
    ) -> Result<PlaylistEntry> {
        entries::insert(&self.pool, playlist_id, position, content, self.reject_cycles).await
    }

    async fn append_entry(
        &self,
        playlist_id: PlaylistId,
        content: EntryContent,
    ) -> Result<PlaylistEntry> {
        entries::append(&self.pool, playlist_id, content, self.reject_cycles).await
    }

    async fn move_entry(&self, id: EntryId, new_position: u32) -> Result<PlaylistEntry> {
        entries::move_to(&self.pool, id, new_position, self.reject_cycles).await
    }

    async fn remove_entry(&self, id: EntryId) -> Result<()> {
        entries::remove(&self.pool, id).await
    }

    async fn list_entries(&self, playlist_id: PlaylistId) -> Result<Vec<PlaylistEntry>> {
        entries::get_by_playlist(&self.pool, playlist_id).await
    }

    async fn flatten_playlist(&self, playlist_id: PlaylistId) -> Result<Vec<TrackId>> {
        resolve::flatten(&self.pool, playlist_id).await
    }
}
