use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing::info;

use medirecords::config::AppConfig;
use medirecords::{db, handlers};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    config.logging.init();
    info!(?config, "medirecords starting");

    // single shared connection
    let pool = db::create_pool(&config.database).context("failed to connect to the database")?;
    {
        let mut conn = pool.get().context("failed to check out the database connection")?;
        db::ensure_schema(&mut conn)?;
    }

    let bind = (config.server.host.clone(), config.server.port);
    info!(host = %bind.0, port = bind.1, "listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    info!("medirecords stopped");
    Ok(())
}
