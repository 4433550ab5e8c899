//! Quillpost RPC server: JSON-RPC over stdin/stdout for a desktop or web shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"id":"...","title":"...","slug":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; set `RUST_LOG` to control verbosity.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;

use quillpost::app::App;
use quillpost::config::ClientConfig;
use quillpost::rpc_handler::handle_method;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed-window limiter over all methods.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(value: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(backend = %config.backend_url, data_dir = %config.data_dir.display(), "starting quillpost-rpc");
    let mut app = App::new(config)?;
    app.startup().await;
    let app = Mutex::new(app);

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            emit(&json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        tracing::debug!(%method, "rpc request");
        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::warn!(%method, error = %err, "rpc request failed");
                json!({"id": id, "error": err})
            }
        };
        emit(&response)?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
