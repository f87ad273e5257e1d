pub mod responses;

use crate::{
    auth::{get_session_from_token, BearerToken},
    database::{assert, get_db_conn},
    models::{
        pds::{PdsSection, StudentRecordData},
        student_records::StudentRecordRow,
        users::{Role, UserData},
    },
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::{prelude::*, SqliteConnection};
use serde_json::Value;

use self::responses::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(draft)
        .service(save_section)
        .service(complete)
        .service(list_records)
        .service(view_record);
}

crate::api_funcs! {
    (get, draft, "/draft", RecordResponse),
    (put, save_section, "/sections/{section}", SectionSaveResponse,
        path: web::Path<String>, info: web::Json<Value>),
    (post, complete, "/complete", RecordResponse),
    (get, list_records, "", RecordListResponse),
    (get, view_record, "/{user_id}", RecordResponse, path: web::Path<i32>),
}

fn load_row(conn: &mut SqliteConnection, user_id: i32) -> anyhow::Result<StudentRecordRow> {
    use crate::schema::student_records;

    let row = student_records::table
        .filter(student_records::user_id.eq(user_id))
        .get_result::<StudentRecordRow>(conn)
        .optional()
        .context("DB error")?;
    match row {
        Some(row) => Ok(row),
        None => StudentRecordRow::new(user_id, &StudentRecordData::default(), crate::utils::now()),
    }
}

fn record_response(row: &StudentRecordRow) -> anyhow::Result<RecordResponse> {
    let data = row.data()?;
    Ok(RecordResponse {
        success: true,
        error: "".to_string(),
        user_id: row.user_id,
        completion: data.completion(),
        sections: SectionProgress::of(&data),
        completed: row.completed,
        record: Some(data),
    })
}

async fn draft_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<RecordResponse> {
    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = session.user_id;
    let row = web::block(move || load_row(&mut conn, user_id)).await??;

    record_response(&row)
}

async fn save_section_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
    info: web::Json<Value>,
) -> anyhow::Result<SectionSaveResponse> {
    use crate::schema::student_records;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let section: PdsSection = path.into_inner().parse()?;
    let value = info.into_inner();
    if !value.is_object() {
        bail!("Wrong format on section '{}'", section);
    }

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = session.user_id;
    let data = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let row = load_row(conn, user_id)?;
            let mut data = row.data()?;
            data.set_section(section, value)?;

            let mut updated = StudentRecordRow::new(user_id, &data, crate::utils::now())?;
            updated.completed = row.completed && data.completion() == 100;
            diesel::replace_into(student_records::table)
                .values(&updated)
                .execute(conn)
                .context("DB error")?;

            Ok(data)
        })
    })
    .await??;

    tracing::info!(user_id, section = %section, "record section saved");
    Ok(SectionSaveResponse {
        success: true,
        error: "".to_string(),
        section: Some(section),
        section_completion: data.section_completion(section),
        completion: data.completion(),
    })
}

async fn complete_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<RecordResponse> {
    use crate::schema::student_records;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = session.user_id;
    let row = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let mut row = load_row(conn, user_id)?;
            let incomplete = row.data()?.incomplete_sections();
            if !incomplete.is_empty() {
                let labels: Vec<&str> = incomplete.iter().map(|section| section.label()).collect();
                bail!("Please complete all sections: {}", labels.join(", "));
            }

            row.completed = true;
            row.updated_at = crate::utils::now();
            diesel::replace_into(student_records::table)
                .values(&row)
                .execute(conn)
                .context("DB error")?;
            Ok(row)
        })
    })
    .await??;

    tracing::info!(user_id, "onboarding completed");
    record_response(&row)
}

async fn list_records_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<RecordListResponse> {
    use crate::schema::{student_records, users};

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin])?;

    let mut conn = get_db_conn(&state.pool)?;
    let rows = web::block(move || {
        student_records::table
            .inner_join(users::table)
            .order(users::name.asc())
            .get_results::<(StudentRecordRow, UserData)>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let records = rows
        .into_iter()
        .map(|(row, user)| {
            Ok(RecordSummary {
                user_id: row.user_id,
                name: user.name,
                completion: row.data()?.completion(),
                completed: row.completed,
                updated_at: row.updated_at,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(RecordListResponse {
        success: true,
        error: "".to_string(),
        records,
    })
}

async fn view_record_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<i32>,
) -> anyhow::Result<RecordResponse> {
    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin])?;

    let user_id = path.into_inner();
    assert::assert_user(&state.pool, user_id).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let row = web::block(move || load_row(&mut conn, user_id)).await??;

    record_response(&row)
}
