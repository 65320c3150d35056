//! Shared setup for tests that talk to the live mock server.

use std::sync::Arc;

use api_harness::config::{BASE_URL_KEY, TIMEOUT_KEY};
use api_harness::{ApiClient, ConfigStore};

/// Start the mock server on a random port in a background thread and return
/// its base URL.
pub fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Config pointed at `base_url` with a response timeout in seconds.
pub fn config_for(base_url: &str, timeout_secs: u64) -> Arc<ConfigStore> {
    let config = ConfigStore::default();
    config.set_property(BASE_URL_KEY, base_url);
    config.set_property(TIMEOUT_KEY, timeout_secs.to_string());
    Arc::new(config)
}

/// Fresh mock server plus a client aimed at it.
pub fn client() -> ApiClient {
    api_harness::logging::init_test_logging();
    ApiClient::new(config_for(&spawn_server(), 5)).unwrap()
}
