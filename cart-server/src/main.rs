use cart_server::{setup_environment, Config, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, logging)
    setup_environment()?;

    tracing::info!("Cart server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. Server state (databases, managers)
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
