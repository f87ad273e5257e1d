use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    appointment::{requests::*, responses::*},
    auth::{requests::*, responses::*, Session},
    client::error::WorkflowError,
    models::{appointments::AppointmentStatus, pds::PdsSection, slots::TimeSlot},
    protocol::{Envelope, SimpleResponse},
    record::responses::*,
    user::{requests::CreateStaffRequest, responses::*},
    utils::DATE_FMT,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilters {
    pub status: Option<AppointmentStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AppointmentFilters {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(date) = self.start_date {
            pairs.push(("start_date", date.format(DATE_FMT).to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("end_date", date.format(DATE_FMT).to_string()));
        }
        pairs
    }
}

#[async_trait]
pub trait AppointmentApi: Send + Sync {
    async fn my_appointments(&self) -> Result<Vec<AppointmentItem>, WorkflowError>;
    async fn all_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<Vec<AppointmentItem>, WorkflowError>;
    async fn slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, WorkflowError>;
    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError>;
    async fn update_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<AppointmentItem, WorkflowError>;
    async fn reschedule(
        &self,
        id: i32,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError>;
    async fn cancel(&self, id: i32) -> Result<AppointmentItem, WorkflowError>;
    async fn user(&self, id: i32) -> Result<UserProfile, WorkflowError>;
}

#[async_trait]
pub trait StudentRecordApi: Send + Sync {
    async fn draft(&self) -> Result<RecordResponse, WorkflowError>;
    async fn save_section(
        &self,
        section: PdsSection,
        payload: Value,
    ) -> Result<SectionSaveResponse, WorkflowError>;
    async fn complete_onboarding(&self) -> Result<RecordResponse, WorkflowError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, form: &RegisterRequest) -> Result<i32, WorkflowError>;
    async fn login(&self, form: &LoginRequest) -> Result<Session, WorkflowError>;
    async fn logout(&self, session: &Session) -> Result<(), WorkflowError>;
}

/// Turns a failure envelope into an error.
pub fn open_envelope<T: Envelope>(response: T) -> Result<T, WorkflowError> {
    if response.success() {
        Ok(response)
    } else if response.error().trim().is_empty() {
        Err(WorkflowError::Unexpected)
    } else {
        Err(WorkflowError::Api(response.error().to_string()))
    }
}

fn expect_item<T>(item: Option<T>) -> Result<T, WorkflowError> {
    item.ok_or(WorkflowError::Unexpected)
}

#[derive(Debug, Clone)]
pub struct HttpPortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPortalClient {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn authenticated(&self, session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned + Envelope>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, WorkflowError> {
        let response = builder.send().await?.json::<T>().await?;
        open_envelope(response)
    }

    async fn get<T: DeserializeOwned + Envelope>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WorkflowError> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    async fn with_body<B: Serialize + Sync + ?Sized, T: DeserializeOwned + Envelope>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, WorkflowError> {
        self.send(self.request(method, path).json(body)).await
    }

    /// Admin only.
    pub async fn create_staff(&self, form: &CreateStaffRequest) -> Result<UserProfile, WorkflowError> {
        let response: UserResponse = self.with_body(Method::POST, "/users", form).await?;
        expect_item(response.user)
    }
}

#[async_trait]
impl AppointmentApi for HttpPortalClient {
    async fn my_appointments(&self) -> Result<Vec<AppointmentItem>, WorkflowError> {
        let response: AppointmentListResponse = self.get("/appointments", &[]).await?;
        Ok(response.appointments)
    }

    async fn all_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<Vec<AppointmentItem>, WorkflowError> {
        let response: AppointmentListResponse = self
            .get("/appointments/all", &filters.query_pairs())
            .await?;
        Ok(response.appointments)
    }

    async fn slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, WorkflowError> {
        let query = [("date", date.format(DATE_FMT).to_string())];
        let response: SlotsResponse = self.get("/appointments/slots", &query).await?;
        Ok(response.slots)
    }

    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError> {
        let response: AppointmentResponse = self
            .with_body(Method::POST, "/appointments", payload)
            .await?;
        expect_item(response.appointment)
    }

    async fn update_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<AppointmentItem, WorkflowError> {
        let path = format!("/appointments/{}/status", id);
        let response: AppointmentResponse = self
            .with_body(Method::PATCH, &path, &StatusUpdateRequest { status })
            .await?;
        expect_item(response.appointment)
    }

    async fn reschedule(
        &self,
        id: i32,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentItem, WorkflowError> {
        let path = format!("/appointments/{}/reschedule", id);
        let response: AppointmentResponse = self.with_body(Method::PUT, &path, payload).await?;
        expect_item(response.appointment)
    }

    async fn cancel(&self, id: i32) -> Result<AppointmentItem, WorkflowError> {
        let path = format!("/appointments/{}/cancel", id);
        let response: AppointmentResponse = self.send(self.request(Method::PATCH, &path)).await?;
        expect_item(response.appointment)
    }

    async fn user(&self, id: i32) -> Result<UserProfile, WorkflowError> {
        let response: UserResponse = self.get(&format!("/users/id/{}", id), &[]).await?;
        expect_item(response.user)
    }
}

#[async_trait]
impl StudentRecordApi for HttpPortalClient {
    async fn draft(&self) -> Result<RecordResponse, WorkflowError> {
        self.get("/student-records/draft", &[]).await
    }

    async fn save_section(
        &self,
        section: PdsSection,
        payload: Value,
    ) -> Result<SectionSaveResponse, WorkflowError> {
        let path = format!("/student-records/sections/{}", section);
        self.with_body(Method::PUT, &path, &payload).await
    }

    async fn complete_onboarding(&self) -> Result<RecordResponse, WorkflowError> {
        self.send(self.request(Method::POST, "/student-records/complete"))
            .await
    }
}

#[async_trait]
impl AuthApi for HttpPortalClient {
    async fn register(&self, form: &RegisterRequest) -> Result<i32, WorkflowError> {
        let response: RegisterResponse = self
            .with_body(Method::POST, "/auth/register", form)
            .await?;
        Ok(response.user_id)
    }

    async fn login(&self, form: &LoginRequest) -> Result<Session, WorkflowError> {
        let response: LoginResponse = self.with_body(Method::POST, "/auth/login", form).await?;
        Ok(response.into_session())
    }

    async fn logout(&self, session: &Session) -> Result<(), WorkflowError> {
        let builder = self
            .authenticated(session)
            .request(Method::POST, "/auth/logout");
        let _: SimpleResponse = self.send(builder).await?;
        Ok(())
    }
}
