use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::auth::StaffSession;
use crate::services::ChangeEvent;
use crate::state::AppState;

pub fn change_routes() -> Router<AppState> {
    Router::new().route("/changes", get(change_stream))
}

/// Server-sent stream of record changes for the back office. Each event is
/// named after the entity kind and carries the change as JSON.
async fn change_stream(
    State(state): State<AppState>,
    StaffSession(session): StaffSession,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.changes.subscribe();
    tracing::debug!(
        subscribers = state.changes.subscriber_count(),
        user = %session.email,
        "change feed subscriber connected"
    );

    let stream = stream::unfold(receiver, |mut receiver| async move {
        next_change(&mut receiver)
            .await
            .map(|change| (Ok(to_sse_event(&change)), receiver))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn next_change(receiver: &mut Receiver<ChangeEvent>) -> Option<ChangeEvent> {
    loop {
        match receiver.recv().await {
            Ok(change) => return Some(change),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "change feed subscriber lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

fn to_sse_event(change: &ChangeEvent) -> Event {
    let data = serde_json::to_string(change).unwrap_or_else(|err| {
        tracing::error!("Failed to serialize change event: {}", err);
        "{}".to_string()
    });
    Event::default().event(change.entity.as_str()).data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ChangeAction, ChangeBus, EntityKind};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_next_change_skips_lag() {
        let bus = ChangeBus::new(2);
        let mut receiver = bus.subscribe();

        for _ in 0..4 {
            bus.created(EntityKind::Coach, Uuid::new_v4());
        }
        let last = Uuid::new_v4();
        bus.publish(EntityKind::Event, ChangeAction::Deleted, Some(last));

        let mut seen = Vec::new();
        while let Ok(Some(change)) =
            tokio::time::timeout(std::time::Duration::from_millis(50), next_change(&mut receiver))
                .await
        {
            seen.push(change);
        }

        assert!(!seen.is_empty());
        assert_eq!(seen.last().map(|c| c.id), Some(Some(last)));
    }

    #[tokio::test]
    async fn test_next_change_ends_when_bus_dropped() {
        let bus = ChangeBus::new(4);
        let mut receiver = bus.subscribe();
        drop(bus);

        assert!(next_change(&mut receiver).await.is_none());
    }
}
