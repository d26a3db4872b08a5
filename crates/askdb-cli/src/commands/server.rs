//! `askdb server` — Start the askdb HTTP backend server.

use askdb_core::AskConfig;

pub async fn run(host: String, port: u16, config: AskConfig) -> Result<(), String> {
    let server_config = askdb_server::ServerConfig {
        host: host.clone(),
        port,
        ask: config,
    };

    println!("Starting askdb server on {}:{}...", host, port);

    let addr = askdb_server::start_server(server_config).await?;
    println!("askdb server listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
