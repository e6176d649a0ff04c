//! # Rovio Teleop
//!
//! Drive a WowWee Rovio from a joystick.
//!
//! Reads joystick events as JSON lines on stdin, writes one velocity command
//! per event as a JSON line on stdout and calls the head-position service
//! when a head button is pressed. Logs go to stderr.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rovio_teleop::config::{Config, TransportConfig};
use rovio_teleop::teleop::messages::JoyEvent;
use rovio_teleop::teleop::node::TeleopNode;
use rovio_teleop::transport::head_client::{TcpHeadClient, UnavailableHeadClient};
use rovio_teleop::transport::jsonl::{decode_event, JsonLinesPublisher};
use rovio_teleop::transport::traits::HeadPositionClient;

/// Number of events between status log messages
const LOG_INTERVAL_EVENTS: u64 = 1000;

/// Main entry point for Rovio Teleop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging on stderr
///    - Load configuration from the path given as first argument, or defaults
///    - Build the stdout publisher and the head-position client
///
/// 2. **Main Loop**
///    - Read joystick events from stdin through a bounded queue
///    - Handle each event: publish velocity, maybe call the head service
///    - Log status every 1000 events
///
/// 3. **Shutdown**
///    - On Ctrl+C or end of input, log totals and exit
///    - The stdin reader is a detached thread, so an idle but open stdin
///      does not hold the process up
///    - Ctrl+C during a blocking head call takes effect once the call returns
///
/// # Examples
///
/// ```bash
/// joy_bridge | rovio-teleop config/rovio.toml | cmd_vel_bridge
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries commands, so logs go to stderr
    let (log_writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(log_writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Rovio Teleop v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    config.log_parameters();

    let transport = &config.transport;
    let publisher = JsonLinesPublisher::new(std::io::stdout(), transport.cmd_vel_topic.clone());
    let head_client = head_client_for(transport);
    let mut node = TeleopNode::from_config(&config, publisher, head_client);

    let (tx, mut rx) = mpsc::channel::<JoyEvent>(transport.queue_size);
    let joy_topic = transport.joy_topic.clone();
    // Not a runtime blocking task: those are joined on shutdown and a read
    // from an open stdin never returns
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_events(std::io::stdin().lock(), &joy_topic, tx))
        .context("Failed to start stdin reader")?;

    info!(
        "Listening for {} events, publishing {}",
        transport.joy_topic, transport.cmd_vel_topic
    );
    info!("Press Ctrl+C to exit");

    let mut last_log_count: u64 = 0;

    // Created once so a Ctrl+C arriving while an event is handled stays
    // pending for the next select
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };

                // The head call blocks until the service answers
                tokio::task::block_in_place(|| node.on_input_event(&event));

                let stats = node.stats();
                if stats.events - last_log_count >= LOG_INTERVAL_EVENTS {
                    info!("Handled {} events ({} commands published)",
                        stats.events, stats.commands_published);
                    last_log_count = stats.events;
                }
            }

            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    let stats = node.stats();
    info!(
        "Total events: {}, commands published: {}, head requests: {} ({} failed)",
        stats.events, stats.commands_published, stats.head_requests, stats.head_failures
    );

    Ok(())
}

/// Decode joystick events from `input` and queue them on `tx`.
///
/// Blocks the calling thread. Returns at end of input, on a read error, or
/// once the receiving side is gone. Malformed lines are logged and skipped.
fn forward_events<R: BufRead>(input: R, joy_topic: &str, tx: mpsc::Sender<JoyEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                return;
            }
        };

        match decode_event(&line, joy_topic) {
            Ok(Some(event)) => {
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Dropping malformed input line: {}", e),
        }
    }
    info!("Input stream closed");
}

/// Pick the head-position client for the configured endpoint
fn head_client_for(transport: &TransportConfig) -> Box<dyn HeadPositionClient> {
    match &transport.head_service_addr {
        Some(addr) => {
            info!("Service {} at {}", transport.head_service, addr);
            Box::new(TcpHeadClient::new(
                addr.clone(),
                transport.head_timeout_ms.map(Duration::from_millis),
            ))
        }
        None => {
            warn!(
                "No head_service_addr configured, calls to {} will fail",
                transport.head_service
            );
            Box::new(UnavailableHeadClient::new(transport.head_service.clone()))
        }
    }
}
