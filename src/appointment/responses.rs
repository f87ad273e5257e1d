use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    appointments::{Appointment, AppointmentStatus},
    slots::TimeSlot,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItem {
    pub id: i32,
    pub user_id: i32,
    pub reason: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub concern_category: String,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AppointmentItem {
    pub fn from_data(data: Appointment) -> anyhow::Result<Self> {
        Ok(Self {
            status: data.status.parse()?,
            id: data.id,
            user_id: data.user_id,
            reason: data.reason,
            scheduled_date: data.scheduled_date,
            scheduled_time: data.scheduled_time,
            concern_category: data.concern_category,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentListResponse {
    pub success: bool,
    pub error: String,
    pub appointments: Vec<AppointmentItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentResponse {
    pub success: bool,
    pub error: String,
    pub appointment: Option<AppointmentItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotsResponse {
    pub success: bool,
    pub error: String,
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

crate::impl_err_response! {
    AppointmentListResponse,
    AppointmentResponse,
    SlotsResponse,
}
