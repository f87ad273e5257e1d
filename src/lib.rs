#[macro_use]
extern crate diesel;

pub mod appointment;
pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod models;
pub mod protocol;
pub mod record;
pub mod schema;
pub mod user;
pub mod utils;

use actix_web::{
    error::{InternalError, JsonPayloadError, PathError, QueryPayloadError},
    web, HttpRequest, HttpResponse,
};
use diesel::{r2d2::ConnectionManager, SqliteConnection};

use crate::{config::Config, models::slots::SlotGrid, protocol::SimpleResponse};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Shared by every handler.
pub struct AppState {
    pub pool: DbPool,
    pub slot_grid: SlotGrid,
    pub login_ttl_secs: i64,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        Self {
            pool,
            slot_grid: config.slot_grid,
            login_ttl_secs: config.login_ttl_secs,
        }
    }
}

/// Extractor failures are answered with the usual failure body.
fn reject_request<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    tracing::warn!("malformed request: {}", err);
    let response = HttpResponse::Ok().json(SimpleResponse::err(format!("Wrong request format: {}", err)));
    InternalError::from_response(err, response).into()
}

/// Mounts every API scope.
pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(reject_request::<JsonPayloadError>))
        .app_data(web::QueryConfig::default().error_handler(reject_request::<QueryPayloadError>))
        .app_data(web::PathConfig::default().error_handler(reject_request::<PathError>));
    cfg.service(web::scope("/auth").configure(auth::config))
        .service(web::scope("/users").configure(user::config))
        .service(web::scope("/appointments").configure(appointment::config))
        .service(web::scope("/student-records").configure(record::config));
}
