use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use std::future::{ready, Ready};

use crate::{
    auth::session::Session,
    database::get_db_conn,
    models::{user_logins::UserLoginData, users::UserData},
    AppState,
};

/// Token from an `Authorization: Bearer ...` header, if any.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        ready(Ok(BearerToken(token)))
    }
}

pub async fn get_session_from_token(
    token: BearerToken,
    state: &web::Data<AppState>,
) -> anyhow::Result<Session> {
    use crate::schema::{user_logins, users};

    let token = match token.0 {
        Some(token) => token,
        None => bail!("You are not logged in"),
    };

    let mut conn = get_db_conn(&state.pool)?;
    let lookup = token.clone();
    let data = web::block(move || {
        user_logins::table
            .inner_join(users::table)
            .filter(user_logins::token.eq(lookup))
            .get_result::<(UserLoginData, UserData)>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    if let Some((login, user)) = data {
        let time_diff = Utc::now()
            .naive_utc()
            .signed_duration_since(login.login_time);
        if time_diff.num_seconds() <= state.login_ttl_secs {
            Ok(Session {
                token,
                user_id: user.id,
                username: user.username,
                name: user.name,
                role: user.role.parse()?,
            })
        } else {
            bail!("Login has expired");
        }
    } else {
        bail!("You are not logged in");
    }
}
