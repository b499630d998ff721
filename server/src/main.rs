use axum::routing::get;
use axum::Router;
use billiards_server::config::ServerConfig;
use billiards_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use billiards_server::ws::{ws_handler, AppState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    let app_state = AppState {
        game_tx,
        broadcast_tx: broadcast_tx.clone(),
        max_client_msgs_per_sec: config.max_client_msgs_per_sec,
        connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
        allowed_origins: config.allowed_origins.clone(),
    };

    // Spawn game loop
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, config).await;
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting billiards server on {}", listen_addr);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
