#![allow(dead_code)]

use actix_web::web;
use chrono::{Duration, Utc};
use guidance_portal::{
    auth,
    config::{BootstrapAdmin, Config},
    database, AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Fresh database with the bootstrap admin. Keep the directory alive for
/// the length of the test.
pub async fn setup() -> (TempDir, web::Data<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("portal.db").to_string_lossy().to_string();
    let pool = database::init_pool(&url).unwrap();
    let admin = BootstrapAdmin {
        username: ADMIN_USERNAME.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    auth::ensure_bootstrap_admin(&pool, Some(&admin)).await.unwrap();

    let config = Config {
        database_url: url,
        ..Config::default()
    };
    (dir, web::Data::new(AppState::new(pool, &config)))
}

/// A date a week from today, `YYYY-MM-DD`.
pub fn upcoming_date() -> String {
    (Utc::now().date_naive() + Duration::days(7))
        .format("%Y-%m-%d")
        .to_string()
}

/// Every field a fully scored PDS needs, as dot paths.
pub fn full_pds_fields() -> Vec<(String, Value)> {
    let mut fields: Vec<(String, Value)> = [
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
    ]
    .iter()
    .map(|(path, value)| (path.to_string(), json!(value)))
    .collect();
    for level in ["elementary", "juniorHS", "seniorHS"] {
        fields.push((format!("education.{}.school", level), json!("Central School")));
        fields.push((format!("education.{}.address", level), json!("Main St.")));
        fields.push((format!("education.{}.yearGraduated", level), json!("2020")));
    }
    fields.push(("enrollmentReasons.scholarship".to_string(), json!(true)));
    fields
}

/// `full_pds_fields` grouped into one JSON object per section.
pub fn full_pds_sections() -> Value {
    let mut root = json!({});
    for (path, value) in full_pds_fields() {
        let mut node = &mut root;
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last().unwrap();
        for segment in parents {
            node = node
                .as_object_mut()
                .unwrap()
                .entry(segment.to_string())
                .or_insert_with(|| json!({}));
        }
        node[*last] = value;
    }
    root
}
