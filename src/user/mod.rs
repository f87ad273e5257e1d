pub mod requests;
pub mod responses;

use crate::{
    auth::{get_session_from_token, BearerToken},
    database::{assert, get_db_conn},
    models::users::{NewUser, Role, UserData},
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_me).service(view_user).service(create_staff);
}

crate::api_funcs! {
    (get, view_me, "/me", UserResponse),
    (get, view_user, "/id/{id}", UserResponse, path: web::Path<i32>),
    (post, create_staff, "", UserResponse, info: web::Json<CreateStaffRequest>),
}

async fn load_profile(state: &web::Data<AppState>, user_id: i32) -> anyhow::Result<UserProfile> {
    use crate::schema::users;

    let mut conn = get_db_conn(&state.pool)?;
    let data = web::block(move || {
        users::table
            .filter(users::id.eq(user_id))
            .get_result::<UserData>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    match data {
        Some(data) => UserProfile::from_data(data),
        None => bail!("No such user"),
    }
}

async fn view_me_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<UserResponse> {
    let session = get_session_from_token(token, &state).await?;
    let user = load_profile(&state, session.user_id).await?;

    Ok(UserResponse {
        success: true,
        error: "".to_string(),
        user: Some(user),
    })
}

async fn view_user_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<i32>,
) -> anyhow::Result<UserResponse> {
    get_session_from_token(token, &state).await?;
    let user = load_profile(&state, path.into_inner()).await?;

    Ok(UserResponse {
        success: true,
        error: "".to_string(),
        user: Some(user),
    })
}

async fn create_staff_impl(
    state: web::Data<AppState>,
    token: BearerToken,
    info: web::Json<CreateStaffRequest>,
) -> anyhow::Result<UserResponse> {
    use crate::schema::users;

    let session = get_session_from_token(token, &state).await?;
    session.require_role(&[Role::Admin])?;

    let info = info.into_inner();
    info.validate()?;
    let username = info.username.trim().to_string();
    assert::assert_username_free(&state.pool, username.clone()).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let data = NewUser {
        username,
        password: crate::utils::hash_password(&info.password),
        name: info.name,
        email: info.email,
        role: info.role.to_string(),
        created_at: crate::utils::now(),
    };
    let user = web::block(move || {
        diesel::insert_into(users::table)
            .values(data)
            .get_result::<UserData>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    tracing::info!(user_id = user.id, role = %user.role, by = session.user_id, "staff account created");
    Ok(UserResponse {
        success: true,
        error: "".to_string(),
        user: Some(UserProfile::from_data(user)?),
    })
}
