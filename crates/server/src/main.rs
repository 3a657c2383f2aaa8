//! faq-server - HTTP API answering FAQ questions by semantic similarity.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets usually live in .env during development
    dotenvy::dotenv().ok();

    let config = match std::env::var("FAQ_SERVER_CONFIG") {
        Ok(path) => ServerConfig::load_from(path)?,
        Err(_) => ServerConfig::load()?,
    };

    server::start_server(config).await?;

    Ok(())
}
