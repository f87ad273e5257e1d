pub mod requests;
pub mod responses;
mod utils;

use crate::{
    auth::{get_session_from_token, BearerToken},
    database::{assert, get_db_conn},
    models::{
        appointments::{Appointment, AppointmentStatus, NewAppointment, RescheduleAppointment},
        users::Role,
    },
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_mine)
        .service(list_all)
        .service(list_slots)
        .service(create)
        .service(update_status)
        .service(reschedule)
        .service(cancel);
}

crate::api_funcs! {
    (get, list_mine, "", AppointmentListResponse),
    (get, list_all, "/all", AppointmentListResponse, query: web::Query<ListAllQuery>),
    (get, list_slots, "/slots", SlotsResponse, query: web::Query<SlotsQuery>),
    (post, create, "", AppointmentResponse, info: web::Json<AppointmentPayload>),
    (patch, update_status, "/{id}/status", AppointmentResponse,
        path: web::Path<i32>, info: web::Json<StatusUpdateRequest>),
    (put, reschedule, "/{id}/reschedule", AppointmentResponse,
        path: web::Path<i32>, info: web::Json<AppointmentPayload>),
    (patch, cancel, "/{id}/cancel", AppointmentResponse, path: web::Path<i32>),
}

fn into_items(data: Vec<Appointment>) -> anyhow::Result<Vec<AppointmentItem>> {
    data.into_iter().map(AppointmentItem::from_data).collect()
}

fn appointment_response(data: Appointment) -> anyhow::Result<AppointmentResponse> {
    Ok(AppointmentResponse {
        success: true,
        error: "".to_string(),
        appointment: Some(AppointmentItem::from_data(data)?),
    })
}

async fn list_mine_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<AppointmentListResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = session.user_id;
    let appos = web::block(move || {
        appointments::table
            .filter(appointments::user_id.eq(user_id))
            .order((
                appointments::scheduled_date.desc(),
                appointments::scheduled_time.desc(),
            ))
            .get_results::<Appointment>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(AppointmentListResponse {
        success: true,
        error: "".to_string(),
        appointments: into_items(appos)?,
    })
}

async fn list_all_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    query: web::Query<ListAllQuery>,
) -> anyhow::Result<AppointmentListResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin, Role::FrontDesk])?;

    let query = query.into_inner();
    let filter = utils::parse_status_filter(query.status.as_deref())?;
    let statuses = utils::filter_statuses(filter);
    let (start_date, end_date) =
        crate::utils::parse_date_pair_str_opt(query.start_date, query.end_date)?;

    let mut conn = get_db_conn(&state.pool)?;
    let appos = web::block(move || {
        appointments::table
            .filter(appointments::status.eq_any(statuses))
            .filter(appointments::scheduled_date.between(start_date, end_date))
            .order((
                appointments::scheduled_date.asc(),
                appointments::scheduled_time.asc(),
            ))
            .get_results::<Appointment>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(AppointmentListResponse {
        success: true,
        error: "".to_string(),
        appointments: into_items(appos)?,
    })
}

async fn list_slots_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    query: web::Query<SlotsQuery>,
) -> anyhow::Result<SlotsResponse> {
    get_session_from_token(token, &state).await?;

    let date = crate::utils::parse_date_str(&query.date)?;
    let mut conn = get_db_conn(&state.pool)?;
    let taken = web::block(move || utils::taken_times(&mut conn, date, None)).await??;

    Ok(SlotsResponse {
        success: true,
        error: "".to_string(),
        date: date.format(crate::utils::DATE_FMT).to_string(),
        slots: state.slot_grid.slots(&taken),
    })
}

async fn create_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    info: web::Json<AppointmentPayload>,
) -> anyhow::Result<AppointmentResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let info = info.into_inner();
    info.validate_for_booking()?;
    let date = crate::utils::parse_date_str(&info.scheduled_date)?;
    if date < Utc::now().date_naive() {
        bail!("Cannot book a date in the past");
    }
    let time = info.scheduled_time.trim().to_string();
    utils::assert_slot_time(&state.slot_grid, &time)?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = session.user_id;
    let appo = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            utils::assert_slot_free(conn, date, &time, None)?;

            let now = crate::utils::now();
            let data = NewAppointment {
                user_id,
                reason: info.reason.trim().to_string(),
                scheduled_date: date,
                scheduled_time: time,
                concern_category: info.concern_category.trim().to_string(),
                status: AppointmentStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(appointments::table)
                .values(data)
                .get_result::<Appointment>(conn)
                .context("DB error")
        })
    })
    .await??;

    tracing::info!(id = appo.id, user_id, date = %appo.scheduled_date, "appointment booked");
    appointment_response(appo)
}

async fn update_status_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<i32>,
    info: web::Json<StatusUpdateRequest>,
) -> anyhow::Result<AppointmentResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin])?;

    let id = path.into_inner();
    assert::assert_appointment(&state.pool, id).await?;

    let status = info.into_inner().status;
    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let current = appointments::table
                .filter(appointments::id.eq(id))
                .get_result::<Appointment>(conn)
                .context("DB error")?;
            // A cancelled appointment gave its slot up.
            let reclaims_slot = !current.status.parse::<AppointmentStatus>()?.occupies_slot()
                && status.occupies_slot();
            if reclaims_slot {
                utils::assert_slot_free(
                    conn,
                    current.scheduled_date,
                    &current.scheduled_time,
                    Some(id),
                )?;
            }

            diesel::update(appointments::table.filter(appointments::id.eq(id)))
                .set((
                    appointments::status.eq(status.as_str()),
                    appointments::updated_at.eq(crate::utils::now()),
                ))
                .get_result::<Appointment>(conn)
                .context("DB error")
        })
    })
    .await??;

    tracing::info!(id, status = %status, by = session.user_id, "appointment status changed");
    appointment_response(appo)
}

async fn reschedule_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<i32>,
    info: web::Json<AppointmentPayload>,
) -> anyhow::Result<AppointmentResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin])?;

    let info = info.into_inner();
    info.validate()?;
    let id = path.into_inner();
    let date = crate::utils::parse_date_str(&info.scheduled_date)?;
    let time = info.scheduled_time.trim().to_string();
    utils::assert_slot_time(&state.slot_grid, &time)?;
    assert::assert_appointment(&state.pool, id).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            utils::assert_slot_free(conn, date, &time, Some(id))?;

            let category = info.concern_category.trim();
            let data = RescheduleAppointment {
                reason: info.reason.trim().to_string(),
                scheduled_date: date,
                scheduled_time: time,
                concern_category: if category.is_empty() {
                    None
                } else {
                    Some(category.to_string())
                },
                status: AppointmentStatus::Rescheduled.to_string(),
                updated_at: crate::utils::now(),
            };
            diesel::update(appointments::table.filter(appointments::id.eq(id)))
                .set(&data)
                .get_result::<Appointment>(conn)
                .context("DB error")
        })
    })
    .await??;

    tracing::info!(id, date = %appo.scheduled_date, time = %appo.scheduled_time, "appointment rescheduled");
    appointment_response(appo)
}

async fn cancel_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<i32>,
) -> anyhow::Result<AppointmentResponse> {
    use crate::schema::appointments;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Student])?;

    let id = path.into_inner();
    let appo = assert::assert_appointment(&state.pool, id).await?;
    if appo.user_id != session.user_id {
        bail!("No such appointment");
    }
    match appo.status.parse::<AppointmentStatus>()? {
        AppointmentStatus::Completed => bail!("Appointment already completed"),
        AppointmentStatus::Cancelled => bail!("Appointment already cancelled"),
        _ => {}
    }

    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        diesel::update(appointments::table.filter(appointments::id.eq(id)))
            .set((
                appointments::status.eq(AppointmentStatus::Cancelled.as_str()),
                appointments::updated_at.eq(crate::utils::now()),
            ))
            .get_result::<Appointment>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    tracing::info!(id, user_id = session.user_id, "appointment cancelled");
    appointment_response(appo)
}
