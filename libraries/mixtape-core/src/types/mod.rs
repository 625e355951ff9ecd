mod album;
mod artist;
mod code;
mod genre;
mod ids;
mod playlist;
mod provider;
mod track;

pub use album::{Album, AlbumTrack, CreateAlbum};
pub use artist::{Artist, CreateArtist};
pub use code::{Code, CodeKind};
pub use genre::{CreateGenre, Genre};
pub use ids::{AlbumId, ArtistId, EntryId, GenreId, PlaylistId, ProviderId, TrackId};
pub use playlist::{
    CreatePlaylist, EntryContent, EntryRecord, ExternalKind, ExternalRef, Playlist,
    PlaylistEntry, UpdatePlaylist,
};
pub use provider::{
    Provider, ProviderColumns, ProviderKind, ProviderRecord, ProviderSource,
};
pub use track::{CreateTrack, Track, UpdateTrack};
