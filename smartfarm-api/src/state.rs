//! Shared application state
//!
//! Thread-safe state shared between HTTP handlers, the WebSocket
//! broadcaster, and the background telemetry task.

use smartfarm_common::events::SmartfarmEvent;
use tokio::sync::broadcast;

/// Shared state accessible by all components
pub struct SharedState {
    /// Event broadcaster for WebSocket clients
    pub event_tx: broadcast::Sender<SmartfarmEvent>,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self { event_tx }
    }

    /// Broadcast an event to all WebSocket listeners
    pub fn broadcast_event(&self, event: SmartfarmEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<SmartfarmEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let state = SharedState::new();
        let mut rx = state.subscribe_events();

        state.broadcast_event(SmartfarmEvent::TicketStatusChanged {
            ticket_id: uuid::Uuid::new_v4(),
            status: "closed".to_string(),
            timestamp: chrono::Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "TicketStatusChanged");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let state = SharedState::new();
        state.broadcast_event(SmartfarmEvent::SensorMetrics {
            temperature: 20.0,
            humidity: 50,
            soil_moisture: 40,
            light_intensity: 3000,
            timestamp: chrono::Utc::now(),
        });
    }
}
