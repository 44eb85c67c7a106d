/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Common utilities shared across examples.

#![allow(dead_code)]

use ironiso_core::{IsoMessage, Result};
use ironiso_schema::{KnownSchema, ProtocolSchema};
use std::env;
use std::sync::Arc;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8583;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Card acceptor terminal identification (field 41).
    pub terminal_id: String,
}

impl ExampleConfig {
    /// Loads the configuration from `ISO_HOST`, `ISO_PORT` and `ISO_TERMINAL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: env::var("ISO_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("ISO_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            terminal_id: env::var("ISO_TERMINAL").unwrap_or_else(|_| "TERM0001".to_string()),
        }
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Returns the protocol both demos speak.
pub fn protocol() -> Result<Arc<ProtocolSchema>> {
    Ok(Arc::new(KnownSchema::Iso87Ascii.schema()?))
}

/// Formats the current UTC time as `MMDDhhmmss` for field 7.
pub fn transmission_time() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let s = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let (mut y, mut rd) = (1970u64, s / 86400);
    loop {
        let dy = if is_leap(y) { 366 } else { 365 };
        if rd < dy {
            break;
        }
        rd -= dy;
        y += 1;
    }
    let dm = if is_leap(y) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };
    let (mut m, mut day) = (1u64, rd);
    for days in dm {
        if day < days {
            break;
        }
        day -= days;
        m += 1;
    }
    let tod = s % 86400;
    format!(
        "{:02}{:02}{:02}{:02}{:02}",
        m,
        day + 1,
        tod / 3600,
        (tod % 3600) / 60,
        tod % 60
    )
}

fn is_leap(y: u64) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

/// Logs every field of a message.
pub fn log_fields(label: &str, message: &IsoMessage) {
    tracing::info!("{} {}", label, message.mti());
    for (position, field) in message.fields() {
        tracing::info!("  {:>3}: {}", position, field);
    }
}
