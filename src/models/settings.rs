use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::models::validation::{clean_optional, validate_required_text, validate_url};

/// Site-wide settings, stored as a single row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppSettings {
    pub playlists: Json<Vec<Playlist>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub platform: PlaylistPlatform,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistPlatform {
    Spotify,
    AppleMusic,
    Youtube,
    Soundcloud,
    #[default]
    Other,
}

impl PlaylistPlatform {
    /// Guess the platform from a playlist URL
    pub fn detect(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("spotify.com") {
            Self::Spotify
        } else if url.contains("music.apple.com") {
            Self::AppleMusic
        } else if url.contains("youtube.com") || url.contains("youtu.be") {
            Self::Youtube
        } else if url.contains("soundcloud.com") {
            Self::Soundcloud
        } else {
            Self::Other
        }
    }
}

/// Playlist as submitted by the settings form. `id` is kept when present so
/// a full replace does not reshuffle ids.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub platform: Option<PlaylistPlatform>,
    pub description: Option<String>,
}

impl PlaylistInput {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.name, "Playlist name", 120)?;
        validate_url(&self.url, "Playlist URL")
    }

    pub fn into_playlist(self) -> Playlist {
        let url = self.url.trim().to_string();
        Playlist {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.trim().to_string(),
            platform: self.platform.unwrap_or_else(|| PlaylistPlatform::detect(&url)),
            url,
            description: clean_optional(self.description),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingsRequest {
    pub playlists: Vec<PlaylistInput>,
}

impl UpdateSettingsRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        for playlist in &self.playlists {
            playlist.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        assert_eq!(
            PlaylistPlatform::detect("https://open.spotify.com/playlist/37i9dQZF1DX76Wlfdnj7AP"),
            PlaylistPlatform::Spotify
        );
        assert_eq!(
            PlaylistPlatform::detect("https://music.apple.com/us/playlist/pl.123"),
            PlaylistPlatform::AppleMusic
        );
        assert_eq!(PlaylistPlatform::detect("https://youtu.be/abc"), PlaylistPlatform::Youtube);
        assert_eq!(PlaylistPlatform::detect("https://example.com/mix"), PlaylistPlatform::Other);
    }

    #[test]
    fn test_playlist_input() {
        let input = PlaylistInput {
            id: None,
            name: "  Race Day  ".into(),
            url: "https://open.spotify.com/playlist/abc".into(),
            platform: None,
            description: Some("   ".into()),
        };
        assert!(input.validate().is_ok());

        let playlist = input.into_playlist();
        assert_eq!(playlist.name, "Race Day");
        assert_eq!(playlist.platform, PlaylistPlatform::Spotify);
        assert_eq!(playlist.description, None);
    }

    #[test]
    fn test_playlist_validation() {
        let input = PlaylistInput {
            id: None,
            name: "Warmup".into(),
            url: "spotify:playlist:abc".into(),
            platform: Some(PlaylistPlatform::Spotify),
            description: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_platform_serialization() {
        assert_eq!(
            serde_json::to_string(&PlaylistPlatform::AppleMusic).unwrap(),
            "\"apple_music\""
        );
    }
}
