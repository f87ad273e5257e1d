use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{database::get_db_conn, models::appointments::Appointment, DbPool};

pub async fn assert_user(pool: &DbPool, user_id: i32) -> anyhow::Result<()> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        users::table
            .filter(users::id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    if res == 0 {
        bail!("No such user");
    }

    Ok(())
}

pub async fn assert_username_free(pool: &DbPool, username: String) -> anyhow::Result<()> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        users::table
            .filter(users::username.eq(username))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    if res > 0 {
        bail!("Username already taken");
    }

    Ok(())
}

/// Loads the appointment, failing when the id is unknown.
pub async fn assert_appointment(pool: &DbPool, id: i32) -> anyhow::Result<Appointment> {
    use crate::schema::appointments;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        appointments::table
            .filter(appointments::id.eq(id))
            .get_result::<Appointment>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    match res {
        Some(appointment) => Ok(appointment),
        None => bail!("No such appointment"),
    }
}
