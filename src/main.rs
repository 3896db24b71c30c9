mod handlers;
mod models;
mod routes;
mod store;
mod utils;
use routes::{init_tracing, make_app};
use tokio::net::TcpListener;
use tracing::info;
use utils::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::init();
    let bind_addr = config.bind_addr.clone();
    let app = make_app(config)?;

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
