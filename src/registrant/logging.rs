//! # Logging Sink
//!
//! `RegistrantSink` that records every notification as a JSON line through
//! `tracing`. Used by the daemon when no telephony core is attached.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use super::{EventKind, RegistrantSink, UnsolicitedEvent};

/// One logged notification
#[derive(Debug, Serialize)]
pub struct NotificationRecord<'a> {
    pub timestamp: String,
    pub kind: EventKind,
    pub payload: &'a UnsolicitedEvent,
}

impl<'a> NotificationRecord<'a> {
    pub fn new(at: DateTime<Utc>, kind: EventKind, payload: &'a UnsolicitedEvent) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            payload,
        }
    }

    /// Render as a single JSON line
    pub fn to_json_line(&self) -> String {
        // Every field is a plain string, enum or integer list
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Sink that logs notifications instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl RegistrantSink for LoggingSink {
    fn notify(&self, kind: EventKind, payload: UnsolicitedEvent) {
        let record = NotificationRecord::new(Utc::now(), kind, &payload);
        info!(target: "exynos_ril::registrant", "{}", record.to_json_line());
    }
}
