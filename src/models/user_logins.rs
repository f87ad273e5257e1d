use diesel::prelude::*;
use crate::schema::user_logins;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable)]
#[diesel(table_name = user_logins)]
pub struct UserLoginData {
    pub token: String,
    pub user_id: i32,
    pub login_time: NaiveDateTime,
}
