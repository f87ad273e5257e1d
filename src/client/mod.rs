pub mod api;
pub mod appointments;
pub mod auth;
pub mod draft_cache;
pub mod error;
pub mod records;
pub mod routes;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{AppointmentApi, AppointmentFilters, AuthApi, HttpPortalClient, StudentRecordApi};
pub use appointments::AppointmentWorkflow;
pub use auth::AuthWorkflow;
pub use draft_cache::{DraftCache, FileDraftCache};
pub use error::WorkflowError;
pub use records::{PdsWorkflow, SectionOutcome};
pub use routes::{guard, RouteDecision};
