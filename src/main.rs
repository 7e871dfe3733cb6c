use p2k16::config::AppConfig;
use p2k16::queue::QueueClient;
use p2k16::routes::configure_routes;
use p2k16::{ldap, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init_logging(&config.log_level);

    let client = QueueClient::new(config.database.clone()).await?;
    client.ensure_schema().await?;

    // Runs for the lifetime of the process
    let ldap_sync = client.register_queue(ldap::registration(config.queue.clone())?);
    info!(queue = ldap_sync.queue(), consumer_id = ldap_sync.consumer_id(), "Queue consumer registered");

    let routes = configure_routes(client);

    info!(addr = %config.http_addr, "Starting server");
    warp::serve(routes).run(config.http_addr).await;

    Ok(())
}
