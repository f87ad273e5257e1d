use serde::{Deserialize, Serialize};

use crate::{models::appointments::AppointmentStatus, utils::assert_filled};

/// Body of both booking and rescheduling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentPayload {
    pub reason: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub concern_category: String,
}

impl AppointmentPayload {
    /// Presence check used before rescheduling. Slot availability is the server's concern.
    pub fn validate(&self) -> anyhow::Result<()> {
        assert_filled(&[&self.reason, &self.scheduled_date, &self.scheduled_time])
    }

    pub fn validate_for_booking(&self) -> anyhow::Result<()> {
        assert_filled(&[
            &self.reason,
            &self.scheduled_date,
            &self.scheduled_time,
            &self.concern_category,
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAllQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}
