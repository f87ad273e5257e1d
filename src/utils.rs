/// Declares actix handlers that resolve the shared state and bearer token,
/// delegate to `<name>_impl` and wrap any error into the failure envelope.
#[macro_export]
macro_rules! api_funcs {
    ( $( ( $method:ident, $func_name:ident, $url:literal, $response:ty $(, $arg:ident : $arg_ty:ty )* $(,)? ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[actix_web::$method($url)]
                async fn $func_name(
                    state: actix_web::web::Data<$crate::AppState>,
                    token: $crate::auth::BearerToken,
                    $( $arg: $arg_ty ),*
                ) -> impl actix_web::Responder {
                    let response = match [<$func_name _impl>](state, token, $( $arg ),*).await {
                        Ok(response) => response,
                        Err(err) => {
                            tracing::warn!(handler = stringify!($func_name), "{:#}", err);
                            <$response>::err(err.to_string())
                        }
                    };
                    actix_web::HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

use anyhow::{bail, Context};
use blake2::{Blake2b, Digest};
use chrono::{NaiveDate, NaiveDateTime, Utc};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const REQUIRED_FIELDS_MSG: &str = "Please fill in all required fields";

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn assert_filled(fields: &[&str]) -> anyhow::Result<()> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        bail!(REQUIRED_FIELDS_MSG);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Blake2b::digest(password.as_bytes()))
}

pub fn generate_login_token(user_id: i32, role: &str) -> String {
    let seed = format!(
        "{}:{}:{}",
        user_id,
        role,
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    format!("{:x}", Blake2b::digest(seed.as_bytes()))
}

pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.as_ref().trim(), DATE_FMT).context("Wrong date format")
}

pub fn parse_date_pair_str_opt<S1: AsRef<str>, S2: AsRef<str>>(
    start_date: Option<S1>,
    end_date: Option<S2>,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let date_min = parse_date_str("1901-01-01")?;
    let date_max = parse_date_str("2901-01-01")?;
    let start_date = match start_date.filter(|d| !d.as_ref().trim().is_empty()) {
        Some(d) => parse_date_str(d).context("Wrong format on 'start_date'")?,
        None => date_min,
    };
    let end_date = match end_date.filter(|d| !d.as_ref().trim().is_empty()) {
        Some(d) => parse_date_str(d).context("Wrong format on 'end_date'")?,
        None => date_max,
    };
    if start_date > end_date {
        bail!("Invalid date range");
    }
    Ok((start_date, end_date))
}
