//! Per-bucket task counts.

use serde::{Deserialize, Serialize};

use crate::channel::TaskChannel;

/// Task counts for one bucket, one field per task category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounters {
    pub diagnostics: u32,
    pub medication: u32,
    pub nursing_care: u32,
}

impl TaskCounters {
    pub const ZERO: TaskCounters = TaskCounters {
        diagnostics: 0,
        medication: 0,
        nursing_care: 0,
    };

    pub fn get(&self, channel: TaskChannel) -> u32 {
        match channel {
            TaskChannel::Diagnostics => self.diagnostics,
            TaskChannel::Medication => self.medication,
            TaskChannel::NursingCare => self.nursing_care,
        }
    }

    pub fn set(&mut self, channel: TaskChannel, value: u32) {
        match channel {
            TaskChannel::Diagnostics => self.diagnostics = value,
            TaskChannel::Medication => self.medication = value,
            TaskChannel::NursingCare => self.nursing_care = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_cover_every_channel() {
        let mut counters = TaskCounters::default();
        assert!(counters.is_zero());

        for (i, channel) in TaskChannel::ALL.into_iter().enumerate() {
            counters.set(channel, i as u32 + 1);
            assert_eq!(counters.get(channel), i as u32 + 1);
        }
        assert!(!counters.is_zero());
    }
}
