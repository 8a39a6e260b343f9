use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::validation::{validate_price, validate_range, validate_required_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub category: EventCategory,
    pub capacity: Option<i32>, // None = unlimited
    pub current_participants: i32,
    pub price: Option<f64>,
    pub sponsor_id: Option<Uuid>,
    pub status: EventStatus,
    pub registration_required: bool,
    pub registration_deadline: Option<NaiveDate>,
    pub registration_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "event_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Competition,
    Workshop,
    Social,
    Community,
    Seminar,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl Event {
    /// Published events dated before today read as completed
    pub fn effective_status(&self, today: NaiveDate) -> EventStatus {
        match self.status {
            EventStatus::Published if self.event_date < today => EventStatus::Completed,
            status => status,
        }
    }

    pub fn spots_remaining(&self) -> Option<i32> {
        self.capacity
            .map(|capacity| (capacity - self.current_participants).max(0))
    }

    pub fn registration_open(&self, today: NaiveDate) -> bool {
        self.effective_status(today) == EventStatus::Published
            && self.registration_required
            && self.event_date >= today
            && self.registration_deadline.map_or(true, |deadline| deadline >= today)
            && self.spots_remaining().map_or(true, |spots| spots > 0)
    }
}

/// Why a registration attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRefusal {
    NotPublished,
    Closed,
    Full,
}

impl Event {
    /// Classify a refused registration from the event as it stands now
    pub fn registration_refusal(&self, today: NaiveDate) -> RegistrationRefusal {
        if self.effective_status(today) != EventStatus::Published {
            if self.status == EventStatus::Published {
                // published but already in the past
                return RegistrationRefusal::Closed;
            }
            return RegistrationRefusal::NotPublished;
        }
        if self.spots_remaining() == Some(0) {
            return RegistrationRefusal::Full;
        }
        RegistrationRefusal::Closed
    }
}

/// Event as returned by the API, with status recomputed against today
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub spots_remaining: Option<i32>,
    pub registration_open: bool,
}

impl EventView {
    pub fn new(mut event: Event, today: NaiveDate) -> Self {
        let spots_remaining = event.spots_remaining();
        let registration_open = event.registration_open(today);
        event.status = event.effective_status(today);
        Self {
            event,
            spots_remaining,
            registration_open,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    pub capacity: Option<i32>,
    pub price: Option<f64>,
    pub sponsor_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub registration_required: bool,
    pub registration_deadline: Option<NaiveDate>,
    pub registration_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    pub capacity: Option<i32>,
    pub current_participants: Option<i32>,
    pub price: Option<f64>,
    pub sponsor_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    pub registration_required: Option<bool>,
    pub registration_deadline: Option<NaiveDate>,
    pub registration_url: Option<String>,
    pub image_url: Option<String>,
}

/// Field rules shared by create and update. Update callers pass the merged
/// values so cross-field checks see the final row.
pub struct EventFields<'a> {
    pub title: &'a str,
    pub event_date: NaiveDate,
    pub duration_minutes: Option<i32>,
    pub capacity: Option<i32>,
    pub current_participants: i32,
    pub price: Option<f64>,
    pub registration_deadline: Option<NaiveDate>,
}

impl EventFields<'_> {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(self.title, "Title", 200)?;
        if let Some(duration) = self.duration_minutes {
            validate_range(duration, 1, 24 * 60 * 7, "Duration (minutes)")?;
        }
        if self.current_participants < 0 {
            anyhow::bail!("Current participants cannot be negative");
        }
        if let Some(capacity) = self.capacity {
            if capacity < 1 {
                anyhow::bail!("Capacity must be at least 1");
            }
            if capacity < self.current_participants {
                anyhow::bail!(
                    "Capacity ({}) cannot be lower than current participants ({})",
                    capacity,
                    self.current_participants
                );
            }
        }
        if let Some(price) = self.price {
            validate_price(price, "Price")?;
        }
        if let Some(deadline) = self.registration_deadline {
            if deadline > self.event_date {
                anyhow::bail!("Registration deadline cannot be after the event date");
            }
        }
        Ok(())
    }
}

impl CreateEventRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        EventFields {
            title: &self.title,
            event_date: self.event_date,
            duration_minutes: self.duration_minutes,
            capacity: self.capacity,
            current_participants: 0,
            price: self.price,
            registration_deadline: self.registration_deadline,
        }
        .validate()
    }
}

impl UpdateEventRequest {
    /// Validate the update as applied on top of `existing`
    pub fn validate_against(&self, existing: &Event) -> anyhow::Result<()> {
        EventFields {
            title: self.title.as_deref().unwrap_or(&existing.title),
            event_date: self.event_date.unwrap_or(existing.event_date),
            duration_minutes: self.duration_minutes.or(existing.duration_minutes),
            capacity: self.capacity.or(existing.capacity),
            current_participants: self
                .current_participants
                .unwrap_or(existing.current_participants),
            price: self.price.or(existing.price),
            registration_deadline: self.registration_deadline.or(existing.registration_deadline),
        }
        .validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
}

#[derive(Debug, Serialize)]
pub struct CompletePastResponse {
    pub completed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(event_date: NaiveDate, status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Summer Throwdown".into(),
            description: None,
            event_date,
            start_time: None,
            duration_minutes: Some(240),
            location: Some("Main floor".into()),
            category: EventCategory::Competition,
            capacity: Some(40),
            current_participants: 12,
            price: Some(25.0),
            sponsor_id: None,
            status,
            registration_required: true,
            registration_deadline: None,
            registration_url: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_status() {
        let today = date(2024, 7, 1);
        assert_eq!(
            event(date(2024, 6, 30), EventStatus::Published).effective_status(today),
            EventStatus::Completed
        );
        assert_eq!(
            event(today, EventStatus::Published).effective_status(today),
            EventStatus::Published
        );
        assert_eq!(
            event(date(2024, 6, 1), EventStatus::Draft).effective_status(today),
            EventStatus::Draft
        );
        assert_eq!(
            event(date(2024, 6, 1), EventStatus::Cancelled).effective_status(today),
            EventStatus::Cancelled
        );
    }

    #[test]
    fn test_spots_remaining() {
        let today = date(2024, 7, 1);
        let mut e = event(today, EventStatus::Published);
        assert_eq!(e.spots_remaining(), Some(28));

        e.current_participants = 45;
        assert_eq!(e.spots_remaining(), Some(0));

        e.capacity = None;
        assert_eq!(e.spots_remaining(), None);
    }

    #[test]
    fn test_registration_open() {
        let today = date(2024, 7, 1);
        let open = event(date(2024, 7, 20), EventStatus::Published);
        assert!(open.registration_open(today));

        let mut past_deadline = open.clone();
        past_deadline.registration_deadline = Some(date(2024, 6, 30));
        assert!(!past_deadline.registration_open(today));

        let mut full = open.clone();
        full.current_participants = 40;
        assert!(!full.registration_open(today));
        assert_eq!(full.registration_refusal(today), RegistrationRefusal::Full);

        let mut no_signup = open.clone();
        no_signup.registration_required = false;
        assert!(!no_signup.registration_open(today));

        let draft = event(date(2024, 7, 20), EventStatus::Draft);
        assert!(!draft.registration_open(today));
        assert_eq!(draft.registration_refusal(today), RegistrationRefusal::NotPublished);

        let past = event(date(2024, 6, 20), EventStatus::Published);
        assert_eq!(past.registration_refusal(today), RegistrationRefusal::Closed);
    }

    #[test]
    fn test_view_reports_effective_status() {
        let today = date(2024, 7, 1);
        let view = EventView::new(event(date(2024, 6, 1), EventStatus::Published), today);
        assert_eq!(view.event.status, EventStatus::Completed);
        assert!(!view.registration_open);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["spots_remaining"], 28);
    }

    #[test]
    fn test_create_validation() {
        let request: CreateEventRequest = serde_json::from_value(serde_json::json!({
            "title": "Sled Workshop",
            "event_date": "2024-08-10",
            "capacity": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            capacity: Some(10),
            registration_deadline: Some(date(2024, 8, 11)),
            ..request
        };
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            registration_deadline: Some(date(2024, 8, 9)),
            price: Some(-1.0),
            ..request
        };
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            price: Some(0.0),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_validation_uses_existing_row() {
        let existing = event(date(2024, 8, 10), EventStatus::Published);
        let shrink = UpdateEventRequest {
            capacity: Some(5),
            ..Default::default()
        };
        assert!(shrink.validate_against(&existing).is_err());

        let move_date = UpdateEventRequest {
            event_date: Some(date(2024, 8, 1)),
            registration_deadline: Some(date(2024, 8, 5)),
            ..Default::default()
        };
        assert!(move_date.validate_against(&existing).is_err());
        assert!(UpdateEventRequest::default().validate_against(&existing).is_ok());
    }
}
