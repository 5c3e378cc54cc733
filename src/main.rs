//! # Exynos RIL
//!
//! Standalone daemon around the vendor adapter.
//!
//! Connects to the modem daemon socket, queries the initial card and call
//! state, and routes every inbound parcel through the vendor layer. Decoded
//! events go to a logging registrant sink.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use exynos_ril::config::{Config, LoggingConfig, TransportConfig};
use exynos_ril::registrant::logging::LoggingSink;
use exynos_ril::ril::adapter::VendorRil;
use exynos_ril::ril::base::BaseProtocol;
use exynos_ril::ril::encoder::VendorRequest;
use exynos_ril::ril::protocol::*;
use exynos_ril::ril::wire::WireBuffer;
use exynos_ril::transport::{self, FrameIo, Inbound};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Requests sent after every (re)connect
const STARTUP_REQUESTS: &[i32] = &[RIL_REQUEST_GET_SIM_STATUS, RIL_REQUEST_GET_CURRENT_CALLS];

/// Base handler for the codes the vendor layer passes through
#[derive(Debug, Default)]
struct LoggingBase;

impl BaseProtocol for LoggingBase {
    fn process_unsolicited(&mut self, buf: &mut WireBuffer, response_type: i32) {
        match buf.peek_i32() {
            Ok(code) => debug!(
                "Base protocol unsolicited {} ({}), type {}, {} bytes",
                unsol_to_string(code),
                code,
                response_type,
                buf.remaining()
            ),
            Err(e) => debug!("Base protocol unsolicited without code: {}", e),
        }
    }
}

/// Per-connection request bookkeeping around the adapter
struct Session<B> {
    ril: VendorRil<B>,
    pending: HashMap<i32, i32>,
    next_serial: i32,
}

impl<B: BaseProtocol> Session<B> {
    fn new(ril: VendorRil<B>) -> Self {
        Self {
            ril,
            pending: HashMap::new(),
            next_serial: 1,
        }
    }

    /// Forget requests issued on a previous connection
    fn reset(&mut self) {
        if !self.pending.is_empty() {
            warn!("Dropping {} unanswered requests", self.pending.len());
        }
        self.pending.clear();
    }

    async fn send<F: FrameIo + ?Sized>(&mut self, io: &mut F, request: VendorRequest) -> exynos_ril::error::Result<i32> {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);

        self.pending.insert(serial, request.code);
        io.write_frame(&request.into_frame(serial)).await?;
        Ok(serial)
    }

    fn handle_frame(&mut self, frame: &Bytes) {
        match Inbound::parse(frame) {
            Ok(Inbound::Unsolicited(mut buf)) => {
                let outcome = self.ril.process_unsolicited(&mut buf, RESPONSE_UNSOLICITED);
                debug!("Unsolicited: {:?}", outcome);
            }
            Ok(Inbound::Solicited { serial, error, mut payload }) => {
                let Some(code) = self.pending.remove(&serial) else {
                    warn!("[{:04}]< response for unknown request", serial);
                    return;
                };

                if error != 0 {
                    warn!("[{:04}]< {} failed with error {}", serial, request_to_string(code), error);
                    return;
                }

                match self.ril.decode_response(code, &mut payload) {
                    Ok(Some(response)) => {
                        info!("[{:04}]< {} {}", serial, request_to_string(code), response.to_json_line())
                    }
                    Ok(None) => debug!("[{:04}]< {} left to base protocol", serial, request_to_string(code)),
                    Err(e) => error!("[{:04}]< {} decode failed: {}", serial, request_to_string(code), e),
                }
            }
            Err(e) => warn!("Dropping inbound parcel: {}", e),
        }
    }

    /// Drive one connection until the peer closes it or it fails
    async fn run<F: FrameIo + ?Sized>(&mut self, io: &mut F) -> exynos_ril::error::Result<()> {
        for &code in STARTUP_REQUESTS {
            self.send(io, VendorRequest { code, payload: WireBuffer::new() }).await?;
        }

        while let Some(frame) = io.read_frame().await? {
            self.handle_frame(&frame);
        }
        Ok(())
    }
}

/// Connect, serve and reconnect forever
async fn serve(transport: &TransportConfig, session: &mut Session<LoggingBase>) {
    let retry = Duration::from_millis(transport.reconnect_interval_ms);

    loop {
        match transport::connect(&transport.socket_path, transport.max_frame_bytes).await {
            Ok(mut socket) => match session.run(&mut socket).await {
                Ok(()) => info!("Modem socket closed"),
                Err(e) => warn!("Connection lost: {}", e),
            },
            Err(e) => warn!("{}", e),
        }

        session.reset();
        info!("Reconnecting in {} ms", transport.reconnect_interval_ms);
        sleep(retry).await;
    }
}

/// Initialise tracing; the returned guard flushes the file writer on drop
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, "exynos-ril.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Main entry point
///
/// # Usage
///
/// ```bash
/// exynos-ril [CONFIG]
/// ```
///
/// A missing configuration file falls back to defaults. Quirk flags not set
/// in `[modem]` are read from `[modem] property_file`, or from `RO_RIL_*`
/// environment variables when no property file is configured.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _guard = init_logging(&config.logging);
    info!("Exynos RIL v{} starting...", env!("CARGO_PKG_VERSION"));

    let quirks = config.platform_quirks();
    info!("Modem quirks: {:?}", quirks);

    let ril = VendorRil::new(
        quirks,
        config.modem.qan_elements,
        LoggingBase,
        Arc::new(LoggingSink),
    );
    let mut session = Session::new(ril);

    info!("Press Ctrl+C to exit");
    tokio::select! {
        _ = serve(&config.transport, &mut session) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
