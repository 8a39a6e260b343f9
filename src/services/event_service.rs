use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    clean_optional, trim_text, CreateEventRequest, Event, EventCategory, EventStatus,
    RegistrationRefusal, UpdateEventRequest,
};
use crate::services::change_feed::{ChangeBus, EntityKind};

const EVENT_COLUMNS: &str = "id, title, description, event_date, start_time, duration_minutes, \
    location, category, capacity, current_participants, price, sponsor_id, status, \
    registration_required, registration_deadline, registration_url, image_url, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Matched against the effective status, so `completed` includes past published events
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    /// Restrict to what the public site may show
    pub public_only: bool,
}

#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(Event),
    NotFound,
    Refused(RegistrationRefusal),
}

#[derive(Clone)]
pub struct EventService {
    db: PgPool,
    changes: ChangeBus,
}

impl EventService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn list_events(&self, filter: EventFilter, today: NaiveDate) -> Result<Vec<Event>> {
        let mut query = format!("SELECT {} FROM events WHERE 1 = 1", EVENT_COLUMNS);
        let mut param_count = 1;

        if filter.public_only {
            query.push_str(" AND status IN ('published', 'completed')");
        }

        let mut binds_today = false;
        let mut status_bind = None;
        match filter.status {
            Some(EventStatus::Completed) => {
                query.push_str(&format!(
                    " AND (status = 'completed' OR (status = 'published' AND event_date < ${}))",
                    param_count
                ));
                param_count += 1;
                binds_today = true;
            }
            Some(EventStatus::Published) => {
                query.push_str(&format!(
                    " AND status = 'published' AND event_date >= ${}",
                    param_count
                ));
                param_count += 1;
                binds_today = true;
            }
            Some(status) => {
                query.push_str(&format!(" AND status = ${}", param_count));
                param_count += 1;
                status_bind = Some(status);
            }
            None => {}
        }

        if filter.category.is_some() {
            query.push_str(&format!(" AND category = ${}", param_count));
        }
        query.push_str(" ORDER BY event_date ASC, start_time ASC NULLS LAST");

        let mut query_builder = sqlx::query_as::<_, Event>(&query);
        if binds_today {
            query_builder = query_builder.bind(today);
        }
        if let Some(status) = status_bind {
            query_builder = query_builder.bind(status);
        }
        if let Some(category) = filter.category {
            query_builder = query_builder.bind(category);
        }

        let events = query_builder.fetch_all(&self.db).await?;
        Ok(events)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(event)
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                title, description, event_date, start_time, duration_minutes, location,
                category, capacity, price, sponsor_id, status, registration_required,
                registration_deadline, registration_url, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(request.title.trim())
        .bind(clean_optional(request.description))
        .bind(request.event_date)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(clean_optional(request.location))
        .bind(request.category.unwrap_or(EventCategory::Other))
        .bind(request.capacity)
        .bind(request.price)
        .bind(request.sponsor_id)
        .bind(request.status.unwrap_or(EventStatus::Draft))
        .bind(request.registration_required)
        .bind(request.registration_deadline)
        .bind(clean_optional(request.registration_url))
        .bind(clean_optional(request.image_url))
        .fetch_one(&self.db)
        .await?;

        info!("Created event {} on {}", event.id, event.event_date);
        self.changes.created(EntityKind::Event, event.id);
        Ok(event)
    }

    pub async fn update_event(
        &self,
        event_id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET
                title = COALESCE($2, title),
                description = CASE WHEN $3::text IS NULL THEN description ELSE NULLIF($3, '') END,
                event_date = COALESCE($4, event_date),
                start_time = COALESCE($5, start_time),
                duration_minutes = COALESCE($6, duration_minutes),
                location = CASE WHEN $7::text IS NULL THEN location ELSE NULLIF($7, '') END,
                category = COALESCE($8, category),
                capacity = COALESCE($9, capacity),
                current_participants = COALESCE($10, current_participants),
                price = COALESCE($11, price),
                sponsor_id = COALESCE($12, sponsor_id),
                status = COALESCE($13, status),
                registration_required = COALESCE($14, registration_required),
                registration_deadline = COALESCE($15, registration_deadline),
                registration_url = CASE WHEN $16::text IS NULL THEN registration_url ELSE NULLIF($16, '') END,
                image_url = CASE WHEN $17::text IS NULL THEN image_url ELSE NULLIF($17, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .bind(request.title.map(|t| t.trim().to_string()))
        .bind(trim_text(request.description))
        .bind(request.event_date)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(trim_text(request.location))
        .bind(request.category)
        .bind(request.capacity)
        .bind(request.current_participants)
        .bind(request.price)
        .bind(request.sponsor_id)
        .bind(request.status)
        .bind(request.registration_required)
        .bind(request.registration_deadline)
        .bind(trim_text(request.registration_url))
        .bind(trim_text(request.image_url))
        .fetch_optional(&self.db)
        .await?;

        if let Some(event) = &event {
            self.changes.updated(EntityKind::Event, event.id);
        }
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::Event, event_id);
        }
        Ok(deleted)
    }

    /// Take one spot. The conditional UPDATE is the only write, so two
    /// registrations racing for the last spot cannot both succeed.
    pub async fn register(&self, event_id: Uuid, today: NaiveDate) -> Result<RegistrationOutcome> {
        let registered = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET current_participants = current_participants + 1, updated_at = NOW()
            WHERE id = $1
              AND status = 'published'
              AND registration_required = TRUE
              AND event_date >= $2
              AND (registration_deadline IS NULL OR registration_deadline >= $2)
              AND (capacity IS NULL OR current_participants < capacity)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .bind(today)
        .fetch_optional(&self.db)
        .await?;

        if let Some(event) = registered {
            info!(
                "Registration for event {} ({} participants)",
                event.id, event.current_participants
            );
            self.changes.updated(EntityKind::Event, event.id);
            return Ok(RegistrationOutcome::Registered(event));
        }

        let outcome = match self.get_event(event_id).await? {
            None => RegistrationOutcome::NotFound,
            Some(event) => {
                let refusal = event.registration_refusal(today);
                warn!("Registration for event {} refused: {:?}", event_id, refusal);
                RegistrationOutcome::Refused(refusal)
            }
        };
        Ok(outcome)
    }

    /// Persist `completed` for published events dated before today
    pub async fn complete_past_events(&self, today: NaiveDate) -> Result<u64> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE events
            SET status = 'completed', updated_at = NOW()
            WHERE status = 'published' AND event_date < $1
            RETURNING id
            "#,
        )
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        if !ids.is_empty() {
            info!("Marked {} past events as completed", ids.len());
        }
        for id in &ids {
            self.changes.updated(EntityKind::Event, *id);
        }
        Ok(ids.len() as u64)
    }
}
