use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered events per subscriber before it starts lagging
const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Coach,
    Program,
    Event,
    Sponsor,
    SponsorshipPackage,
    SponsorshipInquiry,
    Settings,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Coach => "coach",
            EntityKind::Program => "program",
            EntityKind::Event => "event",
            EntityKind::Sponsor => "sponsor",
            EntityKind::SponsorshipPackage => "sponsorship_package",
            EntityKind::SponsorshipInquiry => "sponsorship_inquiry",
            EntityKind::Settings => "settings",
            EntityKind::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Notification that a record changed, so open back-office views can refetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Process-wide broadcast of record changes
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(CHANGE_FEED_CAPACITY)
    }
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change. Returns how many subscribers received it.
    pub fn publish(&self, entity: EntityKind, action: ChangeAction, id: Option<Uuid>) -> usize {
        let event = ChangeEvent {
            entity,
            action,
            id,
            at: Utc::now(),
        };
        tracing::debug!(entity = entity.as_str(), ?action, ?id, "record changed");

        // no subscribers is fine
        self.sender.send(event).unwrap_or(0)
    }

    pub fn created(&self, entity: EntityKind, id: Uuid) {
        self.publish(entity, ChangeAction::Created, Some(id));
    }

    pub fn updated(&self, entity: EntityKind, id: Uuid) {
        self.publish(entity, ChangeAction::Updated, Some(id));
    }

    pub fn deleted(&self, entity: EntityKind, id: Uuid) {
        self.publish(entity, ChangeAction::Deleted, Some(id));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = ChangeBus::default();
        assert_eq!(bus.publish(EntityKind::Class, ChangeAction::Created, None), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = ChangeBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let id = Uuid::new_v4();

        bus.updated(EntityKind::Coach, id);

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.entity, EntityKind::Coach);
        assert_eq!(a.action, ChangeAction::Updated);
        assert_eq!(a.id, Some(id));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let bus = ChangeBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.created(EntityKind::Event, Uuid::new_v4());
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_event_serialization() {
        let event = ChangeEvent {
            entity: EntityKind::SponsorshipPackage,
            action: ChangeAction::Deleted,
            id: None,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["entity"], "sponsorship_package");
        assert_eq!(json["action"], "deleted");
    }
}
