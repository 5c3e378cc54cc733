//! # Unsolicited Dispatcher
//!
//! Classifies unsolicited buffers by response code and routes them.
//!
//! ```text
//! code < 11000            -> rewind, hand untouched buffer to base      (Delegated)
//! code in table: decode   -> decode payload locally, notify registrant  (Delivered / Consumed)
//! code in table: remap    -> rewind, patch code in place, replay to base (Delegated)
//! anything else >= 11000  -> log and ignore                              (Dropped)
//! ```
//!
//! A payload that fails to decode is logged and dropped; the dispatcher
//! keeps no state between buffers, so the next one is unaffected.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::base::{response_ints, response_string, response_void, BaseProtocol};
use super::protocol::*;
use super::wire::WireBuffer;
use crate::error::{RilError, Result};
use crate::registrant::{EventKind, RegistrantSink, UnsolicitedEvent};

/// Payload shape of a locally decoded vendor event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    IntList,
    Text,
    Void,
}

/// What to do with a vendor-private code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsolAction {
    /// Decode here; notify `registrant` if there is one
    LocalDecode {
        kind: PayloadKind,
        registrant: Option<EventKind>,
    },
    /// Rewrite the code to this base protocol code and replay to the base handler
    Remap(i32),
    /// Known or unknown vendor event with no consumer
    Ignore,
}

const VENDOR_UNSOL_ACTIONS: &[(i32, UnsolAction)] = &[
    (
        RIL_UNSOL_STK_SEND_SMS_RESULT,
        UnsolAction::LocalDecode {
            kind: PayloadKind::IntList,
            registrant: Some(EventKind::CatSendSmsResult),
        },
    ),
    (
        RIL_UNSOL_AM,
        UnsolAction::LocalDecode {
            kind: PayloadKind::Text,
            registrant: None,
        },
    ),
    (
        RIL_UNSOL_DUN_PIN_CONTROL_SIGNAL,
        UnsolAction::LocalDecode {
            kind: PayloadKind::Void,
            registrant: None,
        },
    ),
    (
        RIL_UNSOL_SIM_SWAP_STATE_CHANGED,
        UnsolAction::Remap(RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED),
    ),
];

/// Why a buffer was dropped
#[derive(Debug)]
pub enum DropReason {
    /// Private-range code without a handler
    Unhandled,
    /// Payload failed to decode
    DecodeFailure(RilError),
}

/// Terminal state of one dispatch
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Decoded and handed to a registrant
    Delivered {
        code: i32,
        kind: EventKind,
        event: UnsolicitedEvent,
    },
    /// Decoded; no registrant consumes it
    Consumed { code: i32, event: UnsolicitedEvent },
    /// Passed to the base handler, optionally under a remapped code
    Delegated { code: i32, remapped_to: Option<i32> },
    Dropped { code: i32, reason: DropReason },
}

fn decode_payload(kind: PayloadKind, buf: &mut WireBuffer) -> Result<UnsolicitedEvent> {
    match kind {
        PayloadKind::IntList => response_ints(buf).map(UnsolicitedEvent::IntList),
        PayloadKind::Text => response_string(buf).map(UnsolicitedEvent::Text),
        PayloadKind::Void => response_void(buf).map(|()| UnsolicitedEvent::Void),
    }
}

/// Routes unsolicited buffers between vendor handling and the base protocol
pub struct UnsolicitedDispatcher<B> {
    table: HashMap<i32, UnsolAction>,
    base: B,
    sink: Arc<dyn RegistrantSink>,
}

impl<B> std::fmt::Debug for UnsolicitedDispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsolicitedDispatcher")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<B: BaseProtocol> UnsolicitedDispatcher<B> {
    pub fn new(base: B, sink: Arc<dyn RegistrantSink>) -> Self {
        Self {
            table: VENDOR_UNSOL_ACTIONS.iter().copied().collect(),
            base,
            sink,
        }
    }

    /// Action for a private-range code; unlisted codes are ignored
    pub fn action_for(&self, code: i32) -> UnsolAction {
        self.table.get(&code).copied().unwrap_or(UnsolAction::Ignore)
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    /// Dispatch one unsolicited buffer positioned at its response code
    ///
    /// Never fails: decode errors are logged and reported as
    /// [`DispatchOutcome::Dropped`].
    pub fn dispatch(&mut self, buf: &mut WireBuffer, response_type: i32) -> DispatchOutcome {
        let start = buf.position();

        let code = match buf.peek_i32() {
            Ok(code) => code,
            Err(e) => {
                // No code to classify; framing errors belong to the base protocol
                debug!("Unsolicited buffer without response code: {}", e);
                self.base.process_unsolicited(buf, response_type);
                return DispatchOutcome::Delegated { code: 0, remapped_to: None };
            }
        };

        if code < SAMSUNG_UNSOL_RESPONSE_BASE {
            self.base.process_unsolicited(buf, response_type);
            return DispatchOutcome::Delegated { code, remapped_to: None };
        }

        match self.action_for(code) {
            UnsolAction::Remap(target) => {
                if let Err(e) = buf.overwrite_i32_at(start, target) {
                    error!("Failed to remap {} to {}: {}", unsol_to_string(code), target, e);
                    return DispatchOutcome::Dropped {
                        code,
                        reason: DropReason::DecodeFailure(e),
                    };
                }
                debug!(
                    "[UNSL]< {} remapped to {}",
                    unsol_to_string(code),
                    unsol_to_string(target)
                );
                buf.rewind_to(start);
                self.base.process_unsolicited(buf, response_type);
                DispatchOutcome::Delegated {
                    code,
                    remapped_to: Some(target),
                }
            }
            UnsolAction::Ignore => {
                warn!("Unhandled OEM unsolicited response: {} ({})", code, unsol_to_string(code));
                DispatchOutcome::Dropped {
                    code,
                    reason: DropReason::Unhandled,
                }
            }
            UnsolAction::LocalDecode { kind, registrant } => {
                // Skip the code we peeked
                buf.rewind_to(start + 4);

                let event = match decode_payload(kind, buf) {
                    Ok(event) => event,
                    Err(e) => {
                        error!("Exception processing unsol response: {} ({}): {}", code, unsol_to_string(code), e);
                        return DispatchOutcome::Dropped {
                            code,
                            reason: DropReason::DecodeFailure(e),
                        };
                    }
                };

                debug!("[UNSL]< {} {:?}", unsol_to_string(code), event);

                match registrant {
                    Some(kind) => {
                        self.sink.notify(kind, event.clone());
                        DispatchOutcome::Delivered { code, kind, event }
                    }
                    None => DispatchOutcome::Consumed { code, event },
                }
            }
        }
    }
}
