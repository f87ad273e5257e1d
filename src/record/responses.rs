use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::pds::{PdsSection, StudentRecordData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub section: PdsSection,
    pub label: String,
    pub completion: u8,
}

impl SectionProgress {
    pub fn of(data: &StudentRecordData) -> Vec<Self> {
        PdsSection::ALL
            .iter()
            .map(|section| SectionProgress {
                section: *section,
                label: section.label().to_string(),
                completion: data.section_completion(*section),
            })
            .collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordResponse {
    pub success: bool,
    pub error: String,
    pub user_id: i32,
    pub record: Option<StudentRecordData>,
    pub completion: u8,
    pub sections: Vec<SectionProgress>,
    pub completed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionSaveResponse {
    pub success: bool,
    pub error: String,
    pub section: Option<PdsSection>,
    pub section_completion: u8,
    pub completion: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub user_id: i32,
    pub name: String,
    pub completion: u8,
    pub completed: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordListResponse {
    pub success: bool,
    pub error: String,
    pub records: Vec<RecordSummary>,
}

crate::impl_err_response! {
    RecordResponse,
    SectionSaveResponse,
    RecordListResponse,
}
