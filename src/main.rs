use signing_gateway::config::AppConfig;
use signing_gateway::server::Server;
use signing_gateway::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.server.log_level, config.is_production());

    tracing::info!(
        environment = ?config.server.environment,
        redis = config.redis.is_enabled(),
        "Loaded configuration"
    );

    let server = Server::new(&config).await?;
    server.run().await?;
    Ok(())
}
