// Live updates over WebSocket, fanned out through per-topic broadcast
// channels.
use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// A message pushed to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    pub event: String,
    pub data: Value,
}

impl RealtimeEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Topic-keyed broadcast hub. Publishing never blocks request handling;
/// events to topics nobody listens on are dropped.
pub struct RealtimeHub {
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    fn topic_user(user_id: Uuid) -> String {
        format!("user:{user_id}")
    }

    fn topic_tenant(tenant_id: Uuid, channel: &str) -> String {
        format!("tenant:{tenant_id}:{channel}")
    }

    pub fn subscribe_user(&self, user_id: Uuid) -> broadcast::Receiver<String> {
        self.subscribe(&Self::topic_user(user_id))
    }

    pub fn subscribe_tenant(&self, tenant_id: Uuid, channel: &str) -> broadcast::Receiver<String> {
        self.subscribe(&Self::topic_tenant(tenant_id, channel))
    }

    fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        if let Some(tx) = self
            .channels
            .read()
            .ok()
            .and_then(|map| map.get(topic).cloned())
        {
            return tx.subscribe();
        }

        match self.channels.write() {
            Ok(mut map) => map
                .entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe(),
            Err(_) => {
                // Poisoned lock; hand back a dead receiver rather than panic.
                warn!(topic, "realtime hub lock poisoned");
                broadcast::channel(1).1
            }
        }
    }

    /// Push a notification to one user's queue.
    pub fn publish_to_user(&self, user_id: Uuid, event: &RealtimeEvent) {
        self.publish(&Self::topic_user(user_id), event);
    }

    /// Push an event to everyone watching a tenant channel, e.g. the
    /// dashboard view counter.
    pub fn publish_to_tenant(&self, tenant_id: Uuid, channel: &str, event: &RealtimeEvent) {
        self.publish(&Self::topic_tenant(tenant_id, channel), event);
    }

    fn publish(&self, topic: &str, event: &RealtimeEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(topic, error = %e, "failed to serialize realtime event");
                return;
            }
        };

        let sender = self
            .channels
            .read()
            .ok()
            .and_then(|map| map.get(topic).cloned());

        if let Some(tx) = sender {
            // Err just means nobody is connected right now.
            if tx.send(payload).is_err() {
                debug!(topic, "no live subscribers for event");
            }
        } else {
            debug!(topic, "no channel for topic, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_user_event() {
        let hub = RealtimeHub::new();
        let user_id = Uuid::new_v4();
        let mut rx = hub.subscribe_user(user_id);

        hub.publish_to_user(
            user_id,
            &RealtimeEvent::new("notification", json!({"title": "Hi"})),
        );

        let raw = rx.recv().await.unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["event"], "notification");
        assert_eq!(parsed["data"]["title"], "Hi");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let hub = RealtimeHub::new();
        // Must not panic or error.
        hub.publish_to_user(Uuid::new_v4(), &RealtimeEvent::new("noop", json!({})));
        hub.publish_to_tenant(
            Uuid::new_v4(),
            "dashboard",
            &RealtimeEvent::new("viewUpdate", json!({"views": 3})),
        );
    }

    #[tokio::test]
    async fn tenant_channels_are_isolated() {
        let hub = RealtimeHub::new();
        let tenant = Uuid::new_v4();
        let mut dashboard = hub.subscribe_tenant(tenant, "dashboard");
        let mut comments = hub.subscribe_tenant(tenant, "comments");

        hub.publish_to_tenant(
            tenant,
            "comments",
            &RealtimeEvent::new("commentPending", json!({"commentId": "x"})),
        );

        let raw = comments.recv().await.unwrap();
        assert!(raw.contains("commentPending"));
        assert!(dashboard.try_recv().is_err());
    }
}
