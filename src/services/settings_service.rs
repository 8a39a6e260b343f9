use anyhow::Result;
use sqlx::{types::Json, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{AppSettings, Playlist};
use crate::services::change_feed::{ChangeAction, ChangeBus, EntityKind};

/// Single-row site settings (id = 1)
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
    changes: ChangeBus,
}

impl SettingsService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn get_settings(&self) -> Result<AppSettings> {
        // The row is seeded by the migration; recreate it if someone removed it
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            INSERT INTO app_settings (id) VALUES (1)
            ON CONFLICT (id) DO UPDATE SET id = app_settings.id
            RETURNING playlists, updated_at
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(settings)
    }

    pub async fn replace_playlists(&self, playlists: Vec<Playlist>) -> Result<AppSettings> {
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            INSERT INTO app_settings (id, playlists, updated_at) VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET playlists = EXCLUDED.playlists, updated_at = NOW()
            RETURNING playlists, updated_at
            "#,
        )
        .bind(Json(&playlists))
        .fetch_one(&self.db)
        .await?;

        info!("Saved {} playlists", settings.playlists.0.len());
        self.changes.publish(EntityKind::Settings, ChangeAction::Updated, None);
        Ok(settings)
    }

    /// Append one playlist in a single statement
    pub async fn add_playlist(&self, playlist: Playlist) -> Result<AppSettings> {
        let playlist_id = playlist.id;
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            UPDATE app_settings
            SET playlists = playlists || jsonb_build_array($1::jsonb), updated_at = NOW()
            WHERE id = 1
            RETURNING playlists, updated_at
            "#,
        )
        .bind(Json(&playlist))
        .fetch_one(&self.db)
        .await?;

        self.changes
            .publish(EntityKind::Settings, ChangeAction::Created, Some(playlist_id));
        Ok(settings)
    }

    /// Remove a playlist by id. Returns `None` when no playlist had that id.
    pub async fn remove_playlist(&self, playlist_id: Uuid) -> Result<Option<AppSettings>> {
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            UPDATE app_settings
            SET
                playlists = COALESCE(
                    (SELECT jsonb_agg(p) FROM jsonb_array_elements(playlists) p
                     WHERE p->>'id' <> $1::text),
                    '[]'::jsonb
                ),
                updated_at = NOW()
            WHERE id = 1
              AND EXISTS (SELECT 1 FROM jsonb_array_elements(playlists) p WHERE p->>'id' = $1::text)
            RETURNING playlists, updated_at
            "#,
        )
        .bind(playlist_id.to_string())
        .fetch_optional(&self.db)
        .await?;

        if settings.is_some() {
            self.changes
                .publish(EntityKind::Settings, ChangeAction::Deleted, Some(playlist_id));
        }
        Ok(settings)
    }
}
