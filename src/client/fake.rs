use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::{collections::HashSet, sync::Mutex};

use crate::{
    appointment::{requests::AppointmentPayload, responses::AppointmentItem},
    auth::{
        requests::{LoginRequest, RegisterRequest},
        Session,
    },
    client::{
        api::{AppointmentApi, AppointmentFilters, AuthApi, StudentRecordApi},
        error::WorkflowError,
    },
    models::{
        appointments::AppointmentStatus,
        pds::{PdsSection, StudentRecordData},
        slots::{SlotGrid, TimeSlot},
        users::Role,
    },
    record::responses::{RecordResponse, SectionProgress, SectionSaveResponse},
    user::responses::UserProfile,
};

pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 1)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .unwrap()
}

pub fn appointment(id: i32, date: &str, status: AppointmentStatus) -> AppointmentItem {
    AppointmentItem {
        id,
        user_id: 1,
        reason: format!("Reason {}", id),
        scheduled_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        scheduled_time: "09:00".to_string(),
        concern_category: "Academic".to_string(),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[derive(Default)]
struct FakeState {
    appointments: Vec<AppointmentItem>,
    record: StudentRecordData,
    completed: bool,
    failure: Option<String>,
    failing_section: Option<PdsSection>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_appointments(appointments: Vec<AppointmentItem>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().appointments = appointments;
        api
    }

    pub fn with_record(record: StudentRecordData) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().record = record;
        api
    }

    /// Every following call fails with `message`.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().failure = Some(message.to_string());
    }

    /// Saves of `section` fail; everything else succeeds.
    pub fn fail_section(&self, section: PdsSection) {
        self.state.lock().unwrap().failing_section = Some(section);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn record(&self) -> StudentRecordData {
        self.state.lock().unwrap().record.clone()
    }

    pub fn completed(&self) -> bool {
        self.state.lock().unwrap().completed
    }

    fn enter<T>(
        &self,
        call: String,
        f: impl FnOnce(&mut FakeState) -> Result<T, WorkflowError>,
    ) -> Result<T, WorkflowError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(message) = &state.failure {
            return Err(WorkflowError::Api(message.clone()));
        }
        f(&mut *state)
    }

    fn modify(
        &self,
        call: String,
        id: i32,
        f: impl FnOnce(&mut AppointmentItem),
    ) -> Result<AppointmentItem, WorkflowError> {
        self.enter(call, |state| {
            let item = state
                .appointments
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| WorkflowError::Api("No such appointment".to_string()))?;
            f(item);
            Ok(item.clone())
        })
    }
}

fn record_response(state: &FakeState) -> RecordResponse {
    RecordResponse {
        success: true,
        error: "".to_string(),
        user_id: 1,
        completion: state.record.completion(),
        sections: SectionProgress::of(&state.record),
        completed: state.completed,
        record: Some(state.record.clone()),
    }
}

#[async_trait]
impl AppointmentApi for FakeApi {
    async fn my_appointments(&self) -> Result<Vec<AppointmentItem>, WorkflowError> {
        self.enter("my_appointments".to_string(), |state| Ok(state.appointments.clone()))
    }

    async fn all_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<Vec<AppointmentItem>, WorkflowError> {
        self.enter("all_appointments".to_string(), |state| {
            Ok(state
                .appointments
                .iter()
                .filter(|item| filters.status.map_or(true, |s| item.status.matches_filter(s)))
                .filter(|item| filters.start_date.map_or(true, |d| item.scheduled_date >= d))
                .filter(|item| filters.end_date.map_or(true, |d| item.scheduled_date <= d))
                .cloned()
                .collect())
        })
    }

    async fn slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, WorkflowError> {
        self.enter(format!("slots {}", date), |_| {
            let taken: HashSet<String> = ["10:00".to_string()].into_iter().collect();
            Ok(SlotGrid::default().slots(&taken))
        })
    }

    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError> {
        self.enter("create_appointment".to_string(), |state| {
            let id = state.appointments.iter().map(|item| item.id).max().unwrap_or(0) + 1;
            let mut item = appointment(id, &payload.scheduled_date, AppointmentStatus::Pending);
            item.reason = payload.reason.clone();
            item.scheduled_time = payload.scheduled_time.clone();
            item.concern_category = payload.concern_category.clone();
            state.appointments.push(item.clone());
            Ok(item)
        })
    }

    async fn update_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<AppointmentItem, WorkflowError> {
        self.modify(format!("update_status {} {}", id, status), id, |item| {
            item.status = status
        })
    }

    async fn reschedule(
        &self,
        id: i32,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError> {
        let date = NaiveDate::parse_from_str(&payload.scheduled_date, "%Y-%m-%d")
            .map_err(|_| WorkflowError::Api("Wrong date format".to_string()))?;
        self.modify(format!("reschedule {}", id), id, |item| {
            item.reason = payload.reason.clone();
            item.scheduled_date = date;
            item.scheduled_time = payload.scheduled_time.clone();
            item.status = AppointmentStatus::Rescheduled;
        })
    }

    async fn cancel(&self, id: i32) -> Result<AppointmentItem, WorkflowError> {
        self.modify(format!("cancel {}", id), id, |item| {
            item.status = AppointmentStatus::Cancelled
        })
    }

    async fn user(&self, id: i32) -> Result<UserProfile, WorkflowError> {
        self.enter(format!("user {}", id), |_| {
            Ok(UserProfile {
                id,
                username: format!("user{}", id),
                name: format!("User {}", id),
                email: "".to_string(),
                role: Role::Student,
                created_at: timestamp(),
            })
        })
    }
}

#[async_trait]
impl StudentRecordApi for FakeApi {
    async fn draft(&self) -> Result<RecordResponse, WorkflowError> {
        self.enter("draft".to_string(), |state| Ok(record_response(state)))
    }

    async fn save_section(
        &self,
        section: PdsSection,
        payload: Value,
    ) -> Result<SectionSaveResponse, WorkflowError> {
        self.enter(format!("save_section {}", section), |state| {
            if state.failing_section == Some(section) {
                return Err(WorkflowError::Api("DB error".to_string()));
            }
            state
                .record
                .set_section(section, payload)
                .map_err(|err| WorkflowError::Api(err.to_string()))?;
            Ok(SectionSaveResponse {
                success: true,
                error: "".to_string(),
                section: Some(section),
                section_completion: state.record.section_completion(section),
                completion: state.record.completion(),
            })
        })
    }

    async fn complete_onboarding(&self) -> Result<RecordResponse, WorkflowError> {
        self.enter("complete_onboarding".to_string(), |state| {
            let incomplete = state.record.incomplete_sections();
            if !incomplete.is_empty() {
                return Err(WorkflowError::Api("Please complete all sections".to_string()));
            }
            state.completed = true;
            Ok(record_response(state))
        })
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn register(&self, form: &RegisterRequest) -> Result<i32, WorkflowError> {
        self.enter(format!("register {}", form.username), |_| Ok(7))
    }

    async fn login(&self, form: &LoginRequest) -> Result<Session, WorkflowError> {
        self.enter(format!("login {}", form.username), |_| {
            Ok(Session {
                token: "token".to_string(),
                user_id: 7,
                username: form.username.clone(),
                name: "Ana Reyes".to_string(),
                role: Role::Student,
            })
        })
    }

    async fn logout(&self, session: &Session) -> Result<(), WorkflowError> {
        self.enter(format!("logout {}", session.username), |_| Ok(()))
    }
}

/// A record whose every section scores 100.
pub fn full_record() -> StudentRecordData {
    let mut record = StudentRecordData::default();
    let fields = [
        ("personalInfo.firstName", "Ana"),
        ("personalInfo.lastName", "Reyes"),
        ("personalInfo.birthDate", "2006-03-14"),
        ("personalInfo.sex", "Female"),
        ("personalInfo.civilStatus", "Single"),
        ("personalInfo.address", "12 Mabini St."),
        ("personalInfo.contactNumber", "09171234567"),
        ("personalInfo.email", "ana@example.com"),
        ("familyBackground.fatherName", "Jose Reyes"),
        ("familyBackground.fatherOccupation", "Driver"),
        ("familyBackground.motherName", "Maria Reyes"),
        ("familyBackground.motherOccupation", "Teacher"),
        ("familyBackground.guardianName", "Maria Reyes"),
        ("familyBackground.guardianContact", "09181234567"),
        ("health.physicalCondition", "Good"),
        ("health.remarks", "None"),
        ("enrollmentReasons.other", "Near home"),
    ];
    for (path, value) in fields {
        record.set_path(path, Value::from(value)).unwrap();
    }
    for level in ["elementary", "juniorHS", "seniorHS"] {
        for field in ["school", "address", "yearGraduated"] {
            record
                .set_path(&format!("education.{}.{}", level, field), Value::from("x"))
                .unwrap();
        }
    }
    record
}
