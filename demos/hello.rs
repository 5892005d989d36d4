//! A small device web server: says hello, serves its own source and tidies
//! up whenever the network goes quiet.

use std::time::Duration;

use featherweb::{HttpServer, ServerConfig, ServerError};
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let config = ServerConfig::default().with_addr("0.0.0.0", 8080);
    let mut server = HttpServer::bind(config).await?;

    // Say Jello!
    server.route("/hello", |req| Box::pin(async move { req.send("Jello!").await }));

    // Stream this file back in small pieces.
    server.route("/source", |req| {
        Box::pin(async move {
            let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/hello.rs");
            let sent = req.send_file(path, 128).await?;
            info!("Sent {sent} bytes of source");
            Ok::<(), ServerError>(())
        })
    });

    server.shutdown_handle().stop_on_ctrl_c();

    server
        .run_with_idle(Duration::from_secs(5), 0u64, |idle_polls| {
            *idle_polls += 1;
            info!("We came up for air ({idle_polls} quiet polls so far)");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
