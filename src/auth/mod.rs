pub mod requests;
pub mod responses;
pub mod session;
mod utils;

use crate::{
    config::BootstrapAdmin,
    database::get_db_conn,
    models::{
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    protocol::SimpleResponse,
    AppState, DbPool,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};
pub use self::{
    session::Session,
    utils::{get_session_from_token, BearerToken},
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(logout);
}

crate::api_funcs! {
    (post, register, "/register", RegisterResponse, info: web::Json<RegisterRequest>),
    (post, login, "/login", LoginResponse, info: web::Json<LoginRequest>),
    (post, logout, "/logout", SimpleResponse),
}

async fn register_impl(
    state: web::Data<AppState>,
    _token: BearerToken,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<RegisterResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    info.validate()?;

    let mut conn = get_db_conn(&state.pool)?;
    let username = info.username.trim().to_string();
    let user_id = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let res = users::table
                .filter(users::username.eq(&username))
                .count()
                .get_result::<i64>(conn)
                .context("DB error")?;
            if res > 0 {
                bail!("Username already taken");
            }

            let data = NewUser {
                username,
                password: crate::utils::hash_password(&info.password),
                name: info.name,
                email: info.email,
                role: Role::Student.to_string(),
                created_at: crate::utils::now(),
            };
            let user_id = diesel::insert_into(users::table)
                .values(data)
                .returning(users::id)
                .get_result::<i32>(conn)
                .context("DB error")?;

            Ok(user_id)
        })
    })
    .await??;

    tracing::info!(user_id, "student registered");
    Ok(RegisterResponse {
        success: true,
        error: "".to_string(),
        user_id,
    })
}

async fn login_impl(
    state: web::Data<AppState>,
    _token: BearerToken,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    use crate::schema::{user_logins, users};

    let info = info.into_inner();
    let expired_before = crate::utils::now() - chrono::Duration::seconds(state.login_ttl_secs);
    let mut conn = get_db_conn(&state.pool)?;
    let (token, user) = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let hashed_password = crate::utils::hash_password(&info.password);
            let user = users::table
                .filter(users::username.eq(info.username.trim()))
                .filter(users::password.eq(&hashed_password))
                .get_result::<UserData>(conn)
                .optional()
                .context("DB error")?;
            let user = match user {
                Some(user) => user,
                None => bail!("Wrong username or password"),
            };

            diesel::delete(user_logins::table.filter(user_logins::login_time.lt(expired_before)))
                .execute(conn)
                .context("DB error")?;

            let token = crate::utils::generate_login_token(user.id, &user.role);
            let token_data = UserLoginData {
                token: token.clone(),
                user_id: user.id,
                login_time: crate::utils::now(),
            };
            diesel::insert_into(user_logins::table)
                .values(token_data)
                .execute(conn)
                .context("DB error")?;

            Ok((token, user))
        })
    })
    .await??;

    tracing::info!(user_id = user.id, role = %user.role, "logged in");
    Ok(LoginResponse {
        success: true,
        error: "".to_string(),
        token,
        user_id: user.id,
        role: user.role.parse()?,
        username: user.username,
        name: user.name,
    })
}

async fn logout_impl(
    state: web::Data<AppState>,
    token: BearerToken,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::user_logins;

    let token = match token.0 {
        Some(token) => token,
        None => bail!("You are not logged in"),
    };
    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        diesel::delete(user_logins::table.filter(user_logins::token.eq(token))).execute(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(SimpleResponse::ok())
}

/// Creates the configured admin account on first start.
pub async fn ensure_bootstrap_admin(
    pool: &DbPool,
    admin: Option<&BootstrapAdmin>,
) -> anyhow::Result<()> {
    use crate::schema::users;

    let admin = match admin {
        Some(admin) => admin.clone(),
        None => return Ok(()),
    };

    let mut conn = get_db_conn(pool)?;
    let created = web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let res = users::table
                .filter(users::username.eq(&admin.username))
                .count()
                .get_result::<i64>(conn)
                .context("DB error")?;
            if res > 0 {
                return Ok(false);
            }

            let data = NewUser {
                name: admin.username.clone(),
                username: admin.username,
                password: crate::utils::hash_password(&admin.password),
                email: "".to_string(),
                role: Role::Admin.to_string(),
                created_at: crate::utils::now(),
            };
            diesel::insert_into(users::table)
                .values(data)
                .execute(conn)
                .context("DB error")?;
            Ok(true)
        })
    })
    .await??;

    if created {
        tracing::info!("bootstrap admin account created");
    }
    Ok(())
}
