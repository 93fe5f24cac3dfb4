use chrono::{DateTime, Utc};
use log::info;

use crate::robot::control::StepOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionEventKind {
    Pickup,
    Delivery,
    SpiralStep { length: u32 },
    Dance,
    Fault,
}

#[derive(Debug, Clone)]
pub struct MissionEvent {
    pub kind: MissionEventKind,
    pub timestamp: DateTime<Utc>,
    /// Robot clock when the event happened
    pub robot_time_ms: u64,
}

/// Timestamped history of the notable things the search loop did.
#[derive(Debug, Default)]
pub struct MissionLog {
    events: Vec<MissionEvent>,
    pickups: u32,
    deliveries: u32,
    faults: u32,
}

impl MissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `outcome` if it is worth remembering; spins and idle ticks
    /// are not.
    pub fn record(&mut self, outcome: StepOutcome, robot_time_ms: u64) -> Option<&MissionEvent> {
        let kind = match outcome {
            StepOutcome::ApproachedTarget => {
                self.pickups += 1;
                MissionEventKind::Pickup
            }
            StepOutcome::ApproachedDrop => {
                self.deliveries += 1;
                MissionEventKind::Delivery
            }
            StepOutcome::Escalated { length } => MissionEventKind::SpiralStep { length },
            StepOutcome::Danced => MissionEventKind::Dance,
            StepOutcome::Faulted => {
                self.faults += 1;
                MissionEventKind::Fault
            }
            StepOutcome::Cancelled | StepOutcome::Idle | StepOutcome::Spun { .. } => return None,
        };

        let event = MissionEvent {
            kind,
            timestamp: Utc::now(),
            robot_time_ms,
        };
        if kind == MissionEventKind::Delivery {
            info!(
                "Mission: Delivery #{} at {} ({} ms robot time).",
                self.deliveries,
                event.timestamp.format("%H:%M:%S"),
                robot_time_ms
            );
        }
        self.events.push(event);
        self.events.last()
    }

    pub fn events(&self) -> &[MissionEvent] {
        &self.events
    }

    /// Most recent events first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MissionEvent> {
        self.events.iter().rev().take(count)
    }

    pub fn pickups(&self) -> u32 {
        self.pickups
    }

    pub fn deliveries(&self) -> u32 {
        self.deliveries
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Robot time between the first pickup and the last delivery.
    pub fn busy_span_ms(&self) -> Option<u64> {
        let first = self
            .events
            .iter()
            .find(|e| e.kind == MissionEventKind::Pickup)?;
        let last = self
            .events
            .iter()
            .rev()
            .find(|e| e.kind == MissionEventKind::Delivery)?;
        last.robot_time_ms.checked_sub(first.robot_time_ms)
    }
}
