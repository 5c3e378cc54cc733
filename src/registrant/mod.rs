//! # Registrant Module
//!
//! Delivery of decoded events to subscribers in the telephony core.
//!
//! This module handles:
//! - The `RegistrantSink` contract the decoder and dispatcher notify
//! - Payload shapes carried with each notification
//! - The single-shot emergency-call marker shared with the caller

pub mod logging;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Subscriber channel a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// A listed call has voice privacy enabled
    VoicePrivacyOn,
    /// A listed call has voice privacy disabled
    VoicePrivacyOff,
    /// Test emergency call ended with no calls left
    EmergencyCallbackMode,
    /// SIM toolkit SMS send result
    CatSendSmsResult,
}

/// Decoded payload of an unsolicited event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum UnsolicitedEvent {
    IntList(Vec<i32>),
    Text(Option<String>),
    Void,
}

/// Notification sink owned by the telephony core
///
/// Calls are fire-and-forget; queuing is the sink's concern.
#[cfg_attr(test, mockall::automock)]
pub trait RegistrantSink: Send + Sync {
    fn notify(&self, kind: EventKind, payload: UnsolicitedEvent);
}

/// "Emergency call in progress" flag set by the caller, cleared by the decoder
#[derive(Debug, Default)]
pub struct EmergencyCallMarker {
    testing: AtomicBool,
}

impl EmergencyCallMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert the marker before placing a test emergency call
    pub fn set(&self) {
        self.testing.store(true, Ordering::SeqCst);
    }

    /// Test-and-clear; returns whether the marker was set
    pub fn take(&self) -> bool {
        self.testing.swap(false, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.testing.load(Ordering::SeqCst)
    }
}
