use chrono::NaiveDate;

use crate::{
    appointment::{requests::AppointmentPayload, responses::AppointmentItem},
    client::{
        api::{AppointmentApi, AppointmentFilters},
        error::WorkflowError,
    },
    models::{appointments::AppointmentStatus, slots::TimeSlot},
    user::responses::UserProfile,
};

/// Success messages stay until `clear_messages` is called.
pub struct AppointmentWorkflow<A> {
    api: A,
    appointments: Vec<AppointmentItem>,
    error: Option<String>,
    success: Option<String>,
    is_loading: bool,
}

fn status_message(status: AppointmentStatus) -> String {
    format!("Appointment {} successfully", status.as_str().to_lowercase())
}

impl<A: AppointmentApi> AppointmentWorkflow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            appointments: vec![],
            error: None,
            success: None,
            is_loading: false,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn appointments(&self) -> &[AppointmentItem] {
        &self.appointments
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn clear_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.success = None;
    }

    fn fail(&mut self, action: &str, err: WorkflowError) -> WorkflowError {
        tracing::warn!(action, "{}", err);
        self.is_loading = false;
        self.error = Some(err.to_string());
        err
    }

    fn replace(&mut self, updated: AppointmentItem) {
        if let Some(slot) = self
            .appointments
            .iter_mut()
            .find(|appointment| appointment.id == updated.id)
        {
            *slot = updated;
        }
    }

    pub async fn fetch_appointments(
        &mut self,
        filters: &AppointmentFilters,
    ) -> Result<(), WorkflowError> {
        self.begin();
        match self.api.all_appointments(filters).await {
            Ok(appointments) => {
                self.appointments = appointments;
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("fetch_appointments", err)),
        }
    }

    pub async fn fetch_my_appointments(&mut self) -> Result<(), WorkflowError> {
        self.begin();
        match self.api.my_appointments().await {
            Ok(appointments) => {
                self.appointments = appointments;
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("fetch_my_appointments", err)),
        }
    }

    pub async fn update_status(
        &mut self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<(), WorkflowError> {
        self.begin();
        match self.api.update_status(id, status).await {
            Ok(updated) => {
                self.replace(updated);
                self.success = Some(status_message(status));
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("update_status", err)),
        }
    }

    pub async fn approve(&mut self, id: i32) -> Result<(), WorkflowError> {
        self.update_status(id, AppointmentStatus::Approved).await
    }

    pub async fn reject(&mut self, id: i32) -> Result<(), WorkflowError> {
        self.update_status(id, AppointmentStatus::Cancelled).await
    }

    pub async fn complete(&mut self, id: i32) -> Result<(), WorkflowError> {
        self.update_status(id, AppointmentStatus::Completed).await
    }

    /// Checks reason, date and time are present, then asks the server. Slot
    /// availability is left to the server.
    pub async fn reschedule(
        &mut self,
        id: i32,
        payload: &AppointmentPayload,
    ) -> Result<(), WorkflowError> {
        self.begin();
        if let Err(err) = payload.validate() {
            return Err(self.fail("reschedule", WorkflowError::validation(err)));
        }
        match self.api.reschedule(id, payload).await {
            Ok(updated) => {
                self.replace(updated);
                self.success = Some(status_message(AppointmentStatus::Rescheduled));
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("reschedule", err)),
        }
    }

    pub async fn book(&mut self, payload: &AppointmentPayload) -> Result<(), WorkflowError> {
        self.begin();
        if let Err(err) = payload.validate_for_booking() {
            return Err(self.fail("book", WorkflowError::validation(err)));
        }
        match self.api.create_appointment(payload).await {
            Ok(created) => {
                self.appointments.push(created);
                self.success = Some("Appointment scheduled successfully".to_string());
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("book", err)),
        }
    }

    /// Student cancellation: a status change, the entry stays in the list.
    pub async fn cancel(&mut self, id: i32) -> Result<(), WorkflowError> {
        self.begin();
        match self.api.cancel(id).await {
            Ok(updated) => {
                self.replace(updated);
                self.success = Some(status_message(AppointmentStatus::Cancelled));
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("cancel", err)),
        }
    }

    /// The student who booked appointment `id`, for the staff detail view.
    pub async fn requester(&mut self, id: i32) -> Result<UserProfile, WorkflowError> {
        let user_id = match self.appointments.iter().find(|appointment| appointment.id == id) {
            Some(appointment) => appointment.user_id,
            None => {
                let err = WorkflowError::Api("No such appointment".to_string());
                return Err(self.fail("requester", err));
            }
        };
        match self.api.user(user_id).await {
            Ok(user) => Ok(user),
            Err(err) => Err(self.fail("requester", err)),
        }
    }

    pub async fn available_slots(&mut self, date: NaiveDate) -> Result<Vec<TimeSlot>, WorkflowError> {
        match self.api.slots(date).await {
            Ok(slots) => Ok(slots.into_iter().filter(|slot| slot.is_not_taken).collect()),
            Err(err) => Err(self.fail("available_slots", err)),
        }
    }

    /// Appointments to display for a status group and calendar day.
    pub fn visible(
        &self,
        status: Option<AppointmentStatus>,
        day: Option<NaiveDate>,
    ) -> Vec<&AppointmentItem> {
        self.appointments
            .iter()
            .filter(|appointment| status.map_or(true, |filter| appointment.status.matches_filter(filter)))
            .filter(|appointment| day.map_or(true, |day| appointment.scheduled_date == day))
            .collect()
    }
}
