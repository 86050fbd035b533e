use dotenvy::dotenv;
use snafu::ResultExt as _;

use kawauso::error::{ApplicationError, BindAddressSnafu, ConnectDatabaseSnafu, WebServerSnafu};
use kawauso::{api, config, database, logging};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    logging::init();

    let config = config::load()?;

    let database = database::connect(&config.database)
        .await
        .context(ConnectDatabaseSnafu)?;

    let app = api::create_app(database);
    let router = api::create_router(app);

    let listener = tokio::net::TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu {
            address: config.host,
        })?;

    tracing::info!("listening on {}", config.host);
    axum::serve(listener, router).await.context(WebServerSnafu)?;

    Ok(())
}
