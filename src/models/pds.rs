use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PdsSection {
    PersonalInfo,
    FamilyBackground,
    Education,
    Health,
    EnrollmentReasons,
}

impl PdsSection {
    pub const ALL: [PdsSection; 5] = [
        PdsSection::PersonalInfo,
        PdsSection::FamilyBackground,
        PdsSection::Education,
        PdsSection::Health,
        PdsSection::EnrollmentReasons,
    ];

    /// Key used in JSON bodies and in the section-save URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            PdsSection::PersonalInfo => "personalInfo",
            PdsSection::FamilyBackground => "familyBackground",
            PdsSection::Education => "education",
            PdsSection::Health => "health",
            PdsSection::EnrollmentReasons => "enrollmentReasons",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PdsSection::PersonalInfo => "Personal Information",
            PdsSection::FamilyBackground => "Family Background",
            PdsSection::Education => "Educational Background",
            PdsSection::Health => "Health Information",
            PdsSection::EnrollmentReasons => "Reasons for Enrollment",
        }
    }
}

impl fmt::Display for PdsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdsSection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match PdsSection::ALL.iter().find(|section| section.as_str() == s) {
            Some(section) => Ok(*section),
            None => bail!("Unknown section '{}'", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub sex: Option<String>,
    pub civil_status: Option<String>,
    pub religion: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyBackground {
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub father_contact: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    pub mother_contact: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_relationship: Option<String>,
    pub guardian_contact: Option<String>,
    pub siblings: Option<String>,
    pub monthly_income: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolHistory {
    pub school: Option<String>,
    pub address: Option<String>,
    pub year_graduated: Option<String>,
    pub honors: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub elementary: SchoolHistory,
    #[serde(rename = "juniorHS")]
    pub junior_hs: SchoolHistory,
    #[serde(rename = "seniorHS")]
    pub senior_hs: SchoolHistory,
    pub strand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Health {
    pub physical_condition: Option<String>,
    pub remarks: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub consulted_specialist: bool,
    pub specialist_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentReasons {
    pub quality_education: bool,
    pub affordable_tuition: bool,
    pub scholarship: bool,
    pub proximity: bool,
    pub parents_choice: bool,
    pub peer_influence: bool,
    pub career_goals: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRecordData {
    pub personal_info: PersonalInfo,
    pub family_background: FamilyBackground,
    pub education: Education,
    pub health: Health,
    pub enrollment_reasons: EnrollmentReasons,
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

fn percent(fields: &[&Option<String>]) -> u8 {
    if fields.is_empty() {
        return 100;
    }
    let filled = fields.iter().filter(|field| is_filled(field)).count();
    (filled * 100 / fields.len()) as u8
}

impl PersonalInfo {
    pub fn completion(&self) -> u8 {
        percent(&[
            &self.first_name,
            &self.last_name,
            &self.birth_date,
            &self.sex,
            &self.civil_status,
            &self.address,
            &self.contact_number,
            &self.email,
        ])
    }
}

impl FamilyBackground {
    pub fn completion(&self) -> u8 {
        percent(&[
            &self.father_name,
            &self.father_occupation,
            &self.mother_name,
            &self.mother_occupation,
            &self.guardian_name,
            &self.guardian_contact,
        ])
    }
}

impl Education {
    pub fn completion(&self) -> u8 {
        let mut fields = vec![];
        for level in [&self.elementary, &self.junior_hs, &self.senior_hs] {
            fields.push(&level.school);
            fields.push(&level.address);
            fields.push(&level.year_graduated);
        }
        percent(&fields)
    }
}

impl Health {
    pub fn completion(&self) -> u8 {
        percent(&[&self.physical_condition, &self.remarks])
    }
}

impl EnrollmentReasons {
    pub fn completion(&self) -> u8 {
        let any = self.quality_education
            || self.affordable_tuition
            || self.scholarship
            || self.proximity
            || self.parents_choice
            || self.peer_influence
            || self.career_goals
            || is_filled(&self.other);
        if any {
            100
        } else {
            0
        }
    }
}

impl StudentRecordData {
    pub fn section_completion(&self, section: PdsSection) -> u8 {
        match section {
            PdsSection::PersonalInfo => self.personal_info.completion(),
            PdsSection::FamilyBackground => self.family_background.completion(),
            PdsSection::Education => self.education.completion(),
            PdsSection::Health => self.health.completion(),
            PdsSection::EnrollmentReasons => self.enrollment_reasons.completion(),
        }
    }

    /// Mean of the section percentages, rounded down.
    pub fn completion(&self) -> u8 {
        let total: u32 = PdsSection::ALL
            .iter()
            .map(|section| self.section_completion(*section) as u32)
            .sum();
        (total / PdsSection::ALL.len() as u32) as u8
    }

    pub fn incomplete_sections(&self) -> Vec<PdsSection> {
        PdsSection::ALL
            .iter()
            .copied()
            .filter(|section| self.section_completion(*section) < 100)
            .collect()
    }

    pub fn section_value(&self, section: PdsSection) -> anyhow::Result<Value> {
        let value = match section {
            PdsSection::PersonalInfo => serde_json::to_value(&self.personal_info),
            PdsSection::FamilyBackground => serde_json::to_value(&self.family_background),
            PdsSection::Education => serde_json::to_value(&self.education),
            PdsSection::Health => serde_json::to_value(&self.health),
            PdsSection::EnrollmentReasons => serde_json::to_value(&self.enrollment_reasons),
        };
        value.context("Section encoding error")
    }

    pub fn set_section(&mut self, section: PdsSection, value: Value) -> anyhow::Result<()> {
        let context = || format!("Wrong format on section '{}'", section);
        match section {
            PdsSection::PersonalInfo => {
                self.personal_info = serde_json::from_value(value).with_context(context)?
            }
            PdsSection::FamilyBackground => {
                self.family_background = serde_json::from_value(value).with_context(context)?
            }
            PdsSection::Education => {
                self.education = serde_json::from_value(value).with_context(context)?
            }
            PdsSection::Health => {
                self.health = serde_json::from_value(value).with_context(context)?
            }
            PdsSection::EnrollmentReasons => {
                self.enrollment_reasons = serde_json::from_value(value).with_context(context)?
            }
        }
        Ok(())
    }

    /// Writes `value` at a dot path such as `education.seniorHS.school`.
    /// The record is left unchanged when the path or value doesn't fit.
    pub fn set_path(&mut self, path: &str, value: Value) -> anyhow::Result<()> {
        let mut tree = serde_json::to_value(&*self).context("Record encoding error")?;
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            bail!("Unknown field '{}'", path);
        }

        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => bail!("Unknown field '{}'", path),
        };
        let mut node = &mut tree;
        for segment in parents {
            node = match node.get_mut(*segment) {
                Some(child) if child.is_object() => child,
                _ => bail!("Unknown field '{}'", path),
            };
        }
        match node.get_mut(*last) {
            Some(slot) if !slot.is_object() => *slot = value,
            _ => bail!("Unknown field '{}'", path),
        }

        *self = serde_json::from_value(tree).with_context(|| format!("Wrong value for '{}'", path))?;
        Ok(())
    }
}
