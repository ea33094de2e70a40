//! Event types for the SmartFarm telemetry channel

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events broadcast to connected WebSocket clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SmartfarmEvent {
    /// Simulated sensor reading, emitted every 5 seconds by the
    /// background metrics task. Values are generated, not measured.
    SensorMetrics {
        temperature: f64,
        humidity: i64,
        soil_moisture: i64,
        light_intensity: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A help request changed status
    TicketStatusChanged {
        ticket_id: Uuid,
        status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A yield forecast row was persisted
    ForecastCreated {
        forecast_id: Uuid,
        crop_name: String,
        region: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SmartfarmEvent {
    /// Stable event name used for logging and client-side dispatch
    pub fn event_type(&self) -> &'static str {
        match self {
            SmartfarmEvent::SensorMetrics { .. } => "SensorMetrics",
            SmartfarmEvent::TicketStatusChanged { .. } => "TicketStatusChanged",
            SmartfarmEvent::ForecastCreated { .. } => "ForecastCreated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SmartfarmEvent::SensorMetrics {
            temperature: 24.5,
            humidity: 60,
            soil_moisture: 45,
            light_intensity: 5200,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SensorMetrics");
        assert_eq!(json["temperature"], 24.5);
        assert_eq!(event.event_type(), "SensorMetrics");
    }
}
