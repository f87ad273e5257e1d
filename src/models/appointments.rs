use diesel::prelude::*;
use crate::schema::appointments;
use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Queryable, Clone)]
pub struct Appointment {
    pub id: i32,
    pub user_id: i32,
    pub reason: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub concern_category: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub user_id: i32,
    pub reason: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub concern_category: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = appointments)]
pub struct RescheduleAppointment {
    pub reason: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub concern_category: Option<String>,
    pub status: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Approved,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }

    /// Statuses shown when filtering by `self`. Approved and Rescheduled are one group.
    pub fn group(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Pending => &[AppointmentStatus::Pending],
            AppointmentStatus::Approved => {
                &[AppointmentStatus::Approved, AppointmentStatus::Rescheduled]
            }
            AppointmentStatus::Completed => &[AppointmentStatus::Completed],
            AppointmentStatus::Cancelled => &[AppointmentStatus::Cancelled],
            AppointmentStatus::Rescheduled => &[AppointmentStatus::Rescheduled],
        }
    }

    pub fn matches_filter(&self, filter: AppointmentStatus) -> bool {
        filter.group().contains(self)
    }

    /// Whether the appointment still holds its slot.
    pub fn occupies_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match AppointmentStatus::ALL.iter().find(|status| status.as_str() == s) {
            Some(status) => Ok(*status),
            None => bail!("Unknown appointment status '{}'", s),
        }
    }
}
