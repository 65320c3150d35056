use tokio::net::TcpListener;

/// Serves the fake API locally so the harness can be pointed at it with
/// `api.base.url=http://127.0.0.1:<port>`.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("MOCK_API_PORT").unwrap_or_else(|_| "8089".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!(
        "mock API on http://{addr} ({} posts, {} users, {} todos)",
        mock_server::POSTS,
        mock_server::USERS,
        mock_server::TODOS
    );
    mock_server::run(listener).await
}
