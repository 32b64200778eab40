use mock_server::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    log::info!("bug tracker mock backend running in {environment} mode on {addr}");
    log::info!("health check available at /api/health, bugs at /api/bugs");
    mock_server::run_with_state(listener, AppState::new(environment)).await
}
