//! MJPEG camera server
//!
//! Run with: cargo run --example camera_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example camera_server                  # binds to 0.0.0.0:8000
//!   cargo run --example camera_server localhost        # binds to 127.0.0.1:8000
//!   cargo run --example camera_server 0.0.0.0:8080     # binds to 0.0.0.0:8080
//!
//! Spawns a camera pipeline child process emitting raw MJPEG on stdout and
//! relays it. Override the pipeline with the CAMERA_CMD environment
//! variable, e.g.:
//!
//!   CAMERA_CMD="ffmpeg -f v4l2 -i /dev/video0 -f mjpeg -q:v 5 -"
//!   CAMERA_CMD="libcamera-vid -t 0 --codec mjpeg --inline -o -"
//!   CAMERA_CMD=-   # read the stream from stdin instead
//!
//! Then open http://<host>:8000/ in a browser.

use std::net::SocketAddr;
use std::process::Stdio;

use tokio::process::Command;

use mjpeg_relay::{ServerConfig, StreamServer};

const DEFAULT_CAMERA_CMD: &str = "libcamera-vid -t 0 --codec mjpeg --inline -o -";

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8000
/// - "localhost:8080" -> 127.0.0.1:8080
/// - "0.0.0.0:8000" -> 0.0.0.0:8000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: camera_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8000)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CAMERA_CMD   Camera pipeline emitting MJPEG on stdout");
    eprintln!("               (default: {})", DEFAULT_CAMERA_CMD);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:8000".parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mjpeg_relay=debug".parse()?)
                .add_directive("camera_server=debug".parse()?),
        )
        .init();

    let camera_cmd =
        std::env::var("CAMERA_CMD").unwrap_or_else(|_| DEFAULT_CAMERA_CMD.to_string());

    println!("Starting MJPEG server on {}", bind_addr);
    println!("Camera pipeline: {}", camera_cmd);
    println!();
    println!("Open http://localhost:{}/ in a browser", bind_addr.port());

    let config = ServerConfig::with_addr(bind_addr);
    let server = StreamServer::new(config);

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutting down...");
    };

    if camera_cmd == "-" {
        server.run_with_feed(tokio::io::stdin(), shutdown).await?;
        return Ok(());
    }

    // Spawn the camera pipeline.
    let mut parts = camera_cmd.split_whitespace();
    let program = parts.next().ok_or("CAMERA_CMD is empty")?;

    let mut child = Command::new(program)
        .args(parts)
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    let camera_out = child.stdout.take().ok_or("Camera process has no stdout")?;

    server.run_with_feed(camera_out, shutdown).await?;

    // Tear the camera pipeline down with the listener.
    let _ = child.kill().await;
    Ok(())
}
