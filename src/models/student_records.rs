use diesel::prelude::*;
use crate::{
    models::pds::{PdsSection, StudentRecordData},
    schema::student_records,
};
use anyhow::Context;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = student_records)]
pub struct StudentRecordRow {
    pub user_id: i32,
    pub personal_info: String,
    pub family_background: String,
    pub education: String,
    pub health: String,
    pub enrollment_reasons: String,
    pub completed: bool,
    pub updated_at: NaiveDateTime,
}

impl StudentRecordRow {
    pub fn new(user_id: i32, data: &StudentRecordData, now: NaiveDateTime) -> anyhow::Result<Self> {
        let encode = |section: PdsSection| -> anyhow::Result<String> {
            Ok(data.section_value(section)?.to_string())
        };
        Ok(Self {
            user_id,
            personal_info: encode(PdsSection::PersonalInfo)?,
            family_background: encode(PdsSection::FamilyBackground)?,
            education: encode(PdsSection::Education)?,
            health: encode(PdsSection::Health)?,
            enrollment_reasons: encode(PdsSection::EnrollmentReasons)?,
            completed: false,
            updated_at: now,
        })
    }

    pub fn data(&self) -> anyhow::Result<StudentRecordData> {
        let mut data = StudentRecordData::default();
        for section in PdsSection::ALL {
            let raw = self.section_text(section);
            let value = serde_json::from_str(raw)
                .with_context(|| format!("Stored section '{}' is corrupted", section))?;
            data.set_section(section, value)?;
        }
        Ok(data)
    }

    fn section_text(&self, section: PdsSection) -> &str {
        match section {
            PdsSection::PersonalInfo => &self.personal_info,
            PdsSection::FamilyBackground => &self.family_background,
            PdsSection::Education => &self.education,
            PdsSection::Health => &self.health,
            PdsSection::EnrollmentReasons => &self.enrollment_reasons,
        }
    }
}
