use anyhow::{bail, Context};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const SLOT_TIME_FMT: &str = "%H:%M";

/// A bookable start time on one day. `is_not_taken == true` means the slot is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub slot_id: i32,
    pub start_time: String,
    pub is_not_taken: bool,
}

/// Daily slot layout: `[start, end)` cut into `minutes`-long slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub minutes: u32,
}

impl SlotGrid {
    pub fn new(start: NaiveTime, end: NaiveTime, minutes: u32) -> anyhow::Result<Self> {
        if minutes == 0 {
            bail!("Slot length must be positive");
        }
        if start >= end {
            bail!("Slot start must be before slot end");
        }
        Ok(Self {
            start,
            end,
            minutes,
        })
    }

    pub fn parse(start: &str, end: &str, minutes: u32) -> anyhow::Result<Self> {
        let start = NaiveTime::parse_from_str(start, SLOT_TIME_FMT).context("Wrong slot start")?;
        let end = NaiveTime::parse_from_str(end, SLOT_TIME_FMT).context("Wrong slot end")?;
        Self::new(start, end, minutes)
    }

    pub fn start_times(&self) -> Vec<String> {
        let step = Duration::minutes(self.minutes as i64);
        let mut times = vec![];
        let mut current = self.start;
        loop {
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || next > self.end {
                break;
            }
            times.push(current.format(SLOT_TIME_FMT).to_string());
            current = next;
        }
        times
    }

    pub fn contains(&self, time: &str) -> bool {
        self.start_times().iter().any(|t| t == time)
    }

    pub fn slots(&self, taken: &HashSet<String>) -> Vec<TimeSlot> {
        self.start_times()
            .into_iter()
            .enumerate()
            .map(|(index, start_time)| TimeSlot {
                slot_id: index as i32 + 1,
                is_not_taken: !taken.contains(&start_time),
                start_time,
            })
            .collect()
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            minutes: 60,
        }
    }
}
