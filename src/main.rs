use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use guidance_portal::{auth, config::Config, config_app, database, AppState};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let pool = database::init_pool(&config.database_url)?;
    auth::ensure_bootstrap_admin(&pool, config.bootstrap_admin.as_ref()).await?;

    let state = web::Data::new(AppState::new(pool, &config));
    let static_dir = config.static_dir.clone();

    tracing::info!(bind = %config.bind, database = %config.database_url, "guidance portal starting");

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(config_app);
        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}
