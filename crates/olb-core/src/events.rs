//! Ordered sensor arrival events.
//!
//! The placement engine consumes arrivals synchronously from an
//! [`ArrivalQueue`]. Order matters: it decides which sensor sees which
//! load state. Timestamps are only used to order events; ties keep
//! insertion order.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::devices::SensorId;
use crate::environment::Environment;

/// A sensor produced its workload and needs a placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalEvent {
    pub sensor_id: SensorId,
    pub timestamp: f64,
}

/// How arrivals are ordered when built from an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalOrder {
    /// Ascending sensor id.
    #[default]
    ById,
    /// Seeded shuffle of the sensor ids.
    Shuffled,
    /// Descending sensor id.
    Reversed,
}

/// FIFO of arrivals sorted by timestamp, stable for equal timestamps.
#[derive(Debug, Clone, Default)]
pub struct ArrivalQueue {
    events: VecDeque<ArrivalEvent>,
}

impl ArrivalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from explicit events, sorting them by timestamp.
    pub fn from_events(events: impl IntoIterator<Item = ArrivalEvent>) -> Self {
        let mut events: Vec<ArrivalEvent> = events.into_iter().collect();
        // `sort_by` is stable, so equal timestamps keep their input order.
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self {
            events: events.into(),
        }
    }

    /// One arrival per sensor in the environment, at t = 0, 1, 2, ...
    pub fn from_environment(env: &Environment, order: ArrivalOrder, seed: u64) -> Self {
        let mut ids: Vec<SensorId> = env.sensors.iter().map(|s| s.id).collect();
        match order {
            ArrivalOrder::ById => ids.sort_unstable(),
            ArrivalOrder::Reversed => {
                ids.sort_unstable();
                ids.reverse();
            }
            ArrivalOrder::Shuffled => {
                ids.sort_unstable();
                let mut rng = StdRng::seed_from_u64(seed);
                ids.shuffle(&mut rng);
            }
        }
        Self::from_events(ids.into_iter().enumerate().map(|(i, sensor_id)| ArrivalEvent {
            sensor_id,
            timestamp: i as f64,
        }))
    }

    /// Insert an arrival behind every event with a timestamp <= its own.
    pub fn push(&mut self, event: ArrivalEvent) {
        let idx = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(idx, event);
    }

    pub fn pop(&mut self) -> Option<ArrivalEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn sensor_ids(&self) -> Vec<SensorId> {
        self.events.iter().map(|e| e.sensor_id).collect()
    }
}

impl Iterator for ArrivalQueue {
    type Item = ArrivalEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(sensor_id: SensorId, timestamp: f64) -> ArrivalEvent {
        ArrivalEvent {
            sensor_id,
            timestamp,
        }
    }

    #[test]
    fn sorts_by_timestamp() {
        let q = ArrivalQueue::from_events([event(1, 3.0), event(2, 1.0), event(3, 2.0)]);
        assert_eq!(q.sensor_ids(), vec![2, 3, 1]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let q = ArrivalQueue::from_events([event(5, 1.0), event(4, 1.0), event(3, 0.5)]);
        assert_eq!(q.sensor_ids(), vec![3, 5, 4]);
    }

    #[test]
    fn push_goes_behind_equal_timestamps() {
        let mut q = ArrivalQueue::from_events([event(1, 1.0), event(2, 2.0)]);
        q.push(event(3, 1.0));
        q.push(event(4, 0.0));
        assert_eq!(q.sensor_ids(), vec![4, 1, 3, 2]);
    }

    #[test]
    fn drains_in_order() {
        let mut q = ArrivalQueue::from_events([event(1, 0.0), event(2, 1.0)]);
        assert_eq!(q.pop().map(|e| e.sensor_id), Some(1));
        assert_eq!(q.pop().map(|e| e.sensor_id), Some(2));
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn environment_orders() {
        let env = Environment::generate(2000.0, 1000.0, 6, 2, 11).unwrap();

        let by_id = ArrivalQueue::from_environment(&env, ArrivalOrder::ById, 1);
        assert_eq!(by_id.sensor_ids(), vec![0, 1, 2, 3, 4, 5]);

        let reversed = ArrivalQueue::from_environment(&env, ArrivalOrder::Reversed, 1);
        assert_eq!(reversed.sensor_ids(), vec![5, 4, 3, 2, 1, 0]);

        let a = ArrivalQueue::from_environment(&env, ArrivalOrder::Shuffled, 99);
        let b = ArrivalQueue::from_environment(&env, ArrivalOrder::Shuffled, 99);
        assert_eq!(a.sensor_ids(), b.sensor_ids());
        let mut sorted = a.sensor_ids();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }
}
