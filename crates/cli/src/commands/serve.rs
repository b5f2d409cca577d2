//! `eco serve`: Start the HTTP gateway.

use eco_config::AppConfig;
use std::sync::Arc;

pub async fn run(mut config: AppConfig, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let builder = eco_assembler::build_from_config(&config).await?;
    tracing::info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        modules = builder.catalog().referenced_files().len(),
        "Assembler ready, starting gateway"
    );

    println!("🌱 Eco Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Assets:    {}", config.content.assets_dir.display());

    eco_gateway::start(&config, Arc::new(builder)).await?;

    Ok(())
}
