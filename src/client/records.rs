use futures::future::join_all;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::{
    client::{
        api::StudentRecordApi,
        draft_cache::{AutoSave, DraftCache},
        error::WorkflowError,
    },
    models::pds::{PdsSection, StudentRecordData},
};

#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome {
    pub section: PdsSection,
    pub result: Result<u8, WorkflowError>,
}

/// Edits stay local until a section is saved. Call `tick` periodically so
/// unsaved edits reach the draft cache.
pub struct PdsWorkflow<A, C> {
    api: A,
    cache: C,
    user_id: i32,
    record: StudentRecordData,
    completed: bool,
    autosave: AutoSave,
    error: Option<String>,
    success: Option<String>,
    is_loading: bool,
}

impl<A: StudentRecordApi, C: DraftCache> PdsWorkflow<A, C> {
    pub fn new(api: A, cache: C, user_id: i32) -> Self {
        Self {
            api,
            cache,
            user_id,
            record: StudentRecordData::default(),
            completed: false,
            autosave: AutoSave::default(),
            error: None,
            success: None,
            is_loading: false,
        }
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave = AutoSave::new(delay);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn record(&self) -> &StudentRecordData {
        &self.record
    }

    pub fn completion(&self) -> u8 {
        self.record.completion()
    }

    pub fn section_completion(&self, section: PdsSection) -> u8 {
        self.record.section_completion(section)
    }

    pub fn incomplete_sections(&self) -> Vec<PdsSection> {
        self.record.incomplete_sections()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
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

    fn fail(&mut self, action: &str, err: WorkflowError) -> WorkflowError {
        tracing::warn!(action, user_id = self.user_id, "{}", err);
        self.is_loading = false;
        self.error = Some(err.to_string());
        err
    }

    /// Fetches the saved draft. A locally cached draft of the same user wins
    /// over the server copy.
    pub async fn load(&mut self) -> Result<(), WorkflowError> {
        self.is_loading = true;
        self.error = None;
        let response = match self.api.draft().await {
            Ok(response) => response,
            Err(err) => return Err(self.fail("load", err)),
        };
        self.record = response.record.unwrap_or_default();
        self.completed = response.completed;

        match self.cache.load(self.user_id) {
            Ok(Some(cached)) => {
                tracing::debug!(user_id = self.user_id, "restored cached draft");
                self.record = cached;
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(user_id = self.user_id, "draft cache unavailable: {}", err),
        }
        self.is_loading = false;
        Ok(())
    }

    pub fn handle_input_change(&mut self, path: &str, value: Value) -> Result<(), WorkflowError> {
        self.handle_input_change_at(path, value, Instant::now())
    }

    pub fn handle_input_change_at(
        &mut self,
        path: &str,
        value: Value,
        now: Instant,
    ) -> Result<(), WorkflowError> {
        self.record
            .set_path(path, value)
            .map_err(WorkflowError::validation)?;
        self.autosave.touch(now);
        Ok(())
    }

    /// Writes the draft to the cache if the auto-save delay has elapsed.
    /// Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> Result<bool, WorkflowError> {
        if !self.autosave.is_due(now) {
            return Ok(false);
        }
        self.flush_draft()?;
        Ok(true)
    }

    pub fn flush_draft(&mut self) -> Result<(), WorkflowError> {
        self.cache.store(self.user_id, &self.record)?;
        self.autosave.reset();
        Ok(())
    }

    fn section_payload(&self, section: PdsSection) -> Result<Value, WorkflowError> {
        self.record.section_value(section).map_err(|err| {
            tracing::error!(section = %section, "{:#}", err);
            WorkflowError::Unexpected
        })
    }

    pub async fn save_section(&mut self, section: PdsSection) -> Result<u8, WorkflowError> {
        self.is_loading = true;
        self.error = None;
        let payload = match self.section_payload(section) {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail("save_section", err)),
        };
        match self.api.save_section(section, payload).await {
            Ok(response) => {
                self.success = Some(format!("{} saved successfully", section.label()));
                self.is_loading = false;
                Ok(response.completion)
            }
            Err(err) => Err(self.fail("save_section", err)),
        }
    }

    pub async fn save_all_sections(&mut self) -> Vec<SectionOutcome> {
        self.is_loading = true;
        self.error = None;

        let mut requests = vec![];
        let mut outcomes = vec![];
        for section in PdsSection::ALL {
            match self.section_payload(section) {
                Ok(payload) => requests.push((section, payload)),
                Err(err) => outcomes.push(SectionOutcome {
                    section,
                    result: Err(err),
                }),
            }
        }

        let api = &self.api;
        let saved = join_all(requests.into_iter().map(|(section, payload)| async move {
            SectionOutcome {
                section,
                result: api
                    .save_section(section, payload)
                    .await
                    .map(|response| response.completion),
            }
        }))
        .await;
        outcomes.extend(saved);
        outcomes.sort_by_key(|outcome| PdsSection::ALL.iter().position(|s| *s == outcome.section));

        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .map(|outcome| outcome.section.label())
            .collect();
        self.is_loading = false;
        if failed.is_empty() {
            self.success = Some("All sections saved successfully".to_string());
        } else {
            let message = format!("Failed to save: {}", failed.join(", "));
            tracing::warn!(user_id = self.user_id, "{}", message);
            self.error = Some(message);
        }
        outcomes
    }

    /// Final submission. Refused locally while any section is incomplete;
    /// otherwise every section is saved in order and onboarding is completed.
    /// A failed save stops the submission, leaving earlier sections saved.
    pub async fn submit_student_form(&mut self) -> Result<(), WorkflowError> {
        let incomplete = self.record.incomplete_sections();
        if !incomplete.is_empty() {
            let labels: Vec<&str> = incomplete.iter().map(|section| section.label()).collect();
            let err = WorkflowError::validation(format!(
                "Please complete all sections: {}",
                labels.join(", ")
            ));
            return Err(self.fail("submit_student_form", err));
        }

        for section in PdsSection::ALL {
            self.save_section(section).await?;
        }

        self.is_loading = true;
        match self.api.complete_onboarding().await {
            Ok(response) => {
                self.completed = response.completed;
                self.autosave.reset();
                if let Err(err) = self.cache.clear(self.user_id) {
                    tracing::warn!(user_id = self.user_id, "failed to clear draft cache: {}", err);
                }
                tracing::info!(user_id = self.user_id, "student form submitted");
                self.success = Some("Student form submitted successfully".to_string());
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail("submit_student_form", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        draft_cache::FileDraftCache,
        fake::{full_record, FakeApi},
    };
    use futures::executor::block_on;
    use serde_json::json;
    use tempfile::TempDir;

    fn workflow(api: FakeApi, dir: &TempDir) -> PdsWorkflow<FakeApi, FileDraftCache> {
        let mut workflow = PdsWorkflow::new(api, FileDraftCache::new(dir.path()), 7)
            .with_autosave_delay(Duration::from_secs(2));
        block_on(workflow.load()).unwrap();
        workflow
    }

    #[test]
    fn input_changes_follow_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(FakeApi::default(), &dir);

        workflow
            .handle_input_change("education.seniorHS.school", json!("Rizal High"))
            .unwrap();
        workflow
            .handle_input_change("health.consultedSpecialist", json!(true))
            .unwrap();

        assert_eq!(
            workflow.record().education.senior_hs.school.as_deref(),
            Some("Rizal High")
        );
        assert!(workflow.record().health.consulted_specialist);
        assert!(workflow.is_dirty());
    }

    #[test]
    fn unknown_path_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(FakeApi::default(), &dir);

        let err = workflow
            .handle_input_change("education.college.school", json!("X"))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(workflow.record(), &StudentRecordData::default());
        assert!(!workflow.is_dirty());
    }

    #[test]
    fn autosaved_draft_is_restored_for_same_user() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut first = workflow(FakeApi::default(), &dir);
        first
            .handle_input_change_at("personalInfo.firstName", json!("Ana"), start)
            .unwrap();
        first
            .handle_input_change_at("education.juniorHS.yearGraduated", json!("2020"), start)
            .unwrap();

        assert!(!first.tick(start + Duration::from_secs(1)).unwrap());
        assert!(first.tick(start + Duration::from_secs(2)).unwrap());
        assert!(!first.is_dirty());

        let mut server_copy = StudentRecordData::default();
        server_copy.personal_info.first_name = Some("Old".to_string());
        let second = workflow(FakeApi::with_record(server_copy), &dir);

        assert_eq!(second.record(), first.record());
    }

    #[test]
    fn cached_draft_of_another_user_is_not_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = StudentRecordData::default();
        record.personal_info.first_name = Some("Someone".to_string());
        FileDraftCache::new(dir.path()).store(8, &record).unwrap();

        let workflow = workflow(FakeApi::default(), &dir);
        assert_eq!(workflow.record(), &StudentRecordData::default());
    }

    #[test]
    fn saving_a_section_reports_completion() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(FakeApi::default(), &dir);
        workflow
            .handle_input_change("health.physicalCondition", json!("Good"))
            .unwrap();
        workflow
            .handle_input_change("health.remarks", json!("None"))
            .unwrap();

        let completion = block_on(workflow.save_section(PdsSection::Health)).unwrap();

        assert_eq!(completion, 20);
        assert_eq!(workflow.api().record().health.remarks.as_deref(), Some("None"));
        assert_eq!(workflow.success(), Some("Health Information saved successfully"));
    }

    #[test]
    fn save_all_can_partially_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::default();
        api.fail_section(PdsSection::Education);
        let mut workflow = workflow(api, &dir);
        workflow
            .handle_input_change("personalInfo.firstName", json!("Ana"))
            .unwrap();

        let outcomes = block_on(workflow.save_all_sections());

        assert_eq!(outcomes.len(), 5);
        for outcome in &outcomes {
            assert_eq!(outcome.result.is_err(), outcome.section == PdsSection::Education);
        }
        assert_eq!(
            workflow.api().record().personal_info.first_name.as_deref(),
            Some("Ana")
        );
        assert_eq!(workflow.error(), Some("Failed to save: Educational Background"));
    }

    #[test]
    fn incomplete_form_is_blocked_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(FakeApi::default(), &dir);
        workflow
            .handle_input_change("enrollmentReasons.scholarship", json!(true))
            .unwrap();
        let calls = workflow.api().call_count();

        let err = block_on(workflow.submit_student_form()).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Please complete all sections: Personal Information, Family Background, \
             Educational Background, Health Information"
        );
        assert_eq!(workflow.api().call_count(), calls);
    }

    #[test]
    fn complete_form_is_saved_in_order_then_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(FakeApi::default(), &dir);
        workflow.record = full_record();
        workflow.flush_draft().unwrap();

        block_on(workflow.submit_student_form()).unwrap();

        let calls = workflow.api().calls();
        assert_eq!(
            &calls[1..],
            &[
                "save_section personalInfo",
                "save_section familyBackground",
                "save_section education",
                "save_section health",
                "save_section enrollmentReasons",
                "complete_onboarding",
            ]
        );
        assert!(workflow.is_completed());
        assert!(workflow.api().completed());
        assert_eq!(workflow.success(), Some("Student form submitted successfully"));
        assert_eq!(FileDraftCache::new(dir.path()).load(7).unwrap(), None);
    }

    #[test]
    fn failed_save_stops_submission() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::default();
        api.fail_section(PdsSection::Education);
        let mut workflow = workflow(api, &dir);
        workflow.record = full_record();

        let err = block_on(workflow.submit_student_form()).unwrap_err();

        assert_eq!(err, WorkflowError::Api("DB error".to_string()));
        let calls = workflow.api().calls();
        assert_eq!(calls.last().map(String::as_str), Some("save_section education"));
        assert!(!calls.iter().any(|call| call == "complete_onboarding"));
        assert_eq!(
            workflow.api().record().family_background,
            full_record().family_background
        );
        assert!(!workflow.is_completed());
    }
}
