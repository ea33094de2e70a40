//! Background sensor metrics task
//!
//! Emits one simulated sensor reading every 5 seconds on the broadcast
//! channel. There is no real hardware behind this; the values are drawn
//! uniformly from plausible ranges so dashboards have something to plot.

use crate::state::SharedState;
use chrono::Utc;
use rand::Rng;
use smartfarm_common::events::SmartfarmEvent;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Interval between simulated readings
const METRICS_PERIOD: Duration = Duration::from_secs(5);

/// Draw one simulated reading
pub fn generate_metrics() -> SmartfarmEvent {
    let mut rng = rand::thread_rng();
    SmartfarmEvent::SensorMetrics {
        // Temperature in Celsius, one decimal place
        temperature: (rng.gen_range(18.0..=32.0) * 10.0_f64).round() / 10.0,
        humidity: rng.gen_range(40..=90),
        soil_moisture: rng.gen_range(20..=80),
        light_intensity: rng.gen_range(1000..=10_000),
        timestamp: Utc::now(),
    }
}

/// Spawn the periodic metrics broadcaster
pub fn spawn_metrics_task(state: Arc<SharedState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_PERIOD);
        loop {
            interval.tick().await;
            let event = generate_metrics();
            debug!("Broadcasting {}", event.event_type());
            state.broadcast_event(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_within_ranges() {
        for _ in 0..200 {
            match generate_metrics() {
                SmartfarmEvent::SensorMetrics {
                    temperature,
                    humidity,
                    soil_moisture,
                    light_intensity,
                    ..
                } => {
                    assert!((18.0..=32.0).contains(&temperature), "temp {}", temperature);
                    // One decimal place
                    let tenths = temperature * 10.0;
                    assert!((tenths - tenths.round()).abs() < 1e-9);
                    assert!((40..=90).contains(&humidity));
                    assert!((20..=80).contains(&soil_moisture));
                    assert!((1000..=10_000).contains(&light_intensity));
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_task_broadcasts() {
        let state = Arc::new(SharedState::new());
        let mut rx = state.subscribe_events();

        let handle = spawn_metrics_task(state.clone());
        // First tick fires immediately
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no event within a second")
            .unwrap();
        assert_eq!(event.event_type(), "SensorMetrics");

        handle.abort();
    }
}
