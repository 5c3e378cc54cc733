//! # Vendor RIL Adapter
//!
//! Single handle over the Exynos-specific encoder, decoder and unsolicited
//! dispatcher. The generic telephony core calls into this for the requests
//! and responses the vendor layout changes and keeps handling everything
//! else itself.

use std::sync::Arc;

use serde::Serialize;

use super::base::BaseProtocol;
use super::decoder::{decode_call_list, decode_card_status, decode_operator_infos};
use super::encoder::{
    encode_accept_call, encode_dial, encode_send_sms_as_plain, encode_send_sms_expect_more,
    VendorRequest,
};
use super::protocol::*;
use super::quirks::QuirkConfig;
use super::unsol::{DispatchOutcome, UnsolicitedDispatcher};
use super::wire::WireBuffer;
use crate::error::Result;
use crate::registrant::{EmergencyCallMarker, RegistrantSink};

/// Decoded solicited response with a vendor-specific layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum VendorResponse {
    CardStatus(CardStatus),
    CallList(Vec<CallRecord>),
    OperatorInfos(Vec<OperatorInfo>),
}

impl VendorResponse {
    /// Render as a single JSON line
    pub fn to_json_line(&self) -> String {
        // Records hold only strings, enums, integers and byte lists
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Exynos vendor adapter composed over a base protocol handler
pub struct VendorRil<B> {
    quirks: QuirkConfig,
    qan_elements: usize,
    sink: Arc<dyn RegistrantSink>,
    emergency: Arc<EmergencyCallMarker>,
    dispatcher: UnsolicitedDispatcher<B>,
}

impl<B> std::fmt::Debug for VendorRil<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorRil")
            .field("quirks", &self.quirks)
            .field("qan_elements", &self.qan_elements)
            .finish_non_exhaustive()
    }
}

impl<B: BaseProtocol> VendorRil<B> {
    /// Build the adapter
    ///
    /// # Arguments
    ///
    /// * `quirks` - Modem quirks, resolved once by the caller
    /// * `qan_elements` - Strings per operator in a network scan response
    /// * `base` - Base protocol unsolicited handler
    /// * `sink` - Registrant sink for decoded events
    pub fn new(
        quirks: QuirkConfig,
        qan_elements: usize,
        base: B,
        sink: Arc<dyn RegistrantSink>,
    ) -> Self {
        Self {
            quirks,
            qan_elements,
            dispatcher: UnsolicitedDispatcher::new(base, Arc::clone(&sink)),
            sink,
            emergency: Arc::new(EmergencyCallMarker::new()),
        }
    }

    pub fn quirks(&self) -> &QuirkConfig {
        &self.quirks
    }

    /// Marker the caller sets before a test emergency call
    pub fn emergency_marker(&self) -> Arc<EmergencyCallMarker> {
        Arc::clone(&self.emergency)
    }

    pub fn dispatcher(&self) -> &UnsolicitedDispatcher<B> {
        &self.dispatcher
    }

    /// Answer the call at `index`, or the first call when `None`
    pub fn accept_call(&self, index: Option<i32>) -> VendorRequest {
        encode_accept_call(index.unwrap_or(0))
    }

    pub fn dial(&self, address: &str, clir_mode: i32, uus_info: Option<&UusInfo>) -> VendorRequest {
        encode_dial(address, clir_mode, uus_info, &self.quirks)
    }

    pub fn send_sms(&self, smsc_pdu: Option<&str>, pdu: &str) -> VendorRequest {
        encode_send_sms_as_plain(smsc_pdu, pdu)
    }

    pub fn send_sms_expect_more(&self, smsc_pdu: Option<&str>, pdu: &str) -> VendorRequest {
        encode_send_sms_expect_more(smsc_pdu, pdu)
    }

    /// Decode a solicited response for `request`
    ///
    /// Returns `Ok(None)` for requests whose layout is unchanged; the base
    /// protocol decodes those.
    pub fn decode_response(&self, request: i32, buf: &mut WireBuffer) -> Result<Option<VendorResponse>> {
        let response = match request {
            RIL_REQUEST_GET_SIM_STATUS => VendorResponse::CardStatus(decode_card_status(buf)?),
            RIL_REQUEST_GET_CURRENT_CALLS => VendorResponse::CallList(decode_call_list(
                buf,
                &self.quirks,
                self.sink.as_ref(),
                &self.emergency,
            )?),
            RIL_REQUEST_QUERY_AVAILABLE_NETWORKS => {
                VendorResponse::OperatorInfos(decode_operator_infos(buf, self.qan_elements)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(response))
    }

    /// Dispatch an unsolicited buffer positioned at its response code
    pub fn process_unsolicited(&mut self, buf: &mut WireBuffer, response_type: i32) -> DispatchOutcome {
        self.dispatcher.dispatch(buf, response_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ril::unsol::mocks::RecordingBase;
    use crate::registrant::{EventKind, MockRegistrantSink, UnsolicitedEvent};
    use mockall::predicate::eq;

    fn adapter(quirks: QuirkConfig, sink: MockRegistrantSink) -> VendorRil<RecordingBase> {
        VendorRil::new(quirks, DEFAULT_QAN_ELEMENTS, RecordingBase::new(), Arc::new(sink))
    }

    #[test]
    fn test_accept_call_defaults_to_first_call() {
        let ril = adapter(QuirkConfig::default(), MockRegistrantSink::new());
        assert_eq!(ril.accept_call(None), encode_accept_call(0));
        assert_eq!(ril.accept_call(Some(2)), encode_accept_call(2));
    }

    #[test]
    fn test_dial_uses_configured_quirks() {
        let quirks = QuirkConfig {
            next_gen_call_details: true,
            needs_video_call_field: false,
        };
        let ril = adapter(quirks, MockRegistrantSink::new());
        assert_eq!(ril.dial("112", 0, None), encode_dial("112", 0, None, &quirks));
    }

    #[test]
    fn test_send_sms_expect_more_downgraded() {
        let ril = adapter(QuirkConfig::default(), MockRegistrantSink::new());
        let request = ril.send_sms_expect_more(None, "0001");
        assert_eq!(request.code, RIL_REQUEST_SEND_SMS);
        assert_eq!(request, ril.send_sms(None, "0001"));
    }

    #[test]
    fn test_decode_response_routes_by_request() {
        let ril = adapter(QuirkConfig::default(), MockRegistrantSink::new());

        let mut buf = WireBuffer::new();
        buf.write_i32(0);
        buf.rewind_to(0);
        assert_eq!(
            ril.decode_response(RIL_REQUEST_QUERY_AVAILABLE_NETWORKS, &mut buf).unwrap(),
            Some(VendorResponse::OperatorInfos(vec![]))
        );

        let mut buf = WireBuffer::new();
        buf.write_i32(0);
        buf.rewind_to(0);
        assert_eq!(ril.decode_response(RIL_REQUEST_DIAL, &mut buf).unwrap(), None);
        // Base-handled responses are left unread
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_response_json_line() {
        let response = VendorResponse::OperatorInfos(vec![OperatorInfo {
            alpha_long: Some("Vendor One".to_string()),
            alpha_short: Some("Vendor One".to_string()),
            numeric: Some("00101".to_string()),
            state: OperatorState::Current,
        }]);

        assert_eq!(
            response.to_json_line(),
            r#"{"type":"OperatorInfos","value":[{"alpha_long":"Vendor One","alpha_short":"Vendor One","numeric":"00101","state":"Current"}]}"#
        );
    }

    #[test]
    fn test_call_list_json_line() {
        let response = VendorResponse::CallList(vec![CallRecord {
            state: CallState::Active,
            index: 1,
            toa: TOA_INTERNATIONAL,
            is_mpty: false,
            is_mt: true,
            als: 0,
            is_voice: true,
            is_voice_privacy: false,
            number: Some("+4915".to_string()),
            number_presentation: Presentation::Allowed,
            name: None,
            name_presentation: Presentation::Unknown,
            uus_info: None,
        }]);

        let line = response.to_json_line();
        assert!(line.starts_with(r#"{"type":"CallList","value":[{"state":"Active","index":1,"toa":145,"#));
        assert!(line.contains(r#""number":"+4915""#));
        assert!(line.contains(r#""name":null"#));
        assert!(line.contains(r#""uus_info":null"#));
    }

    #[test]
    fn test_emergency_marker_through_adapter() {
        let mut sink = MockRegistrantSink::new();
        sink.expect_notify()
            .with(eq(EventKind::EmergencyCallbackMode), eq(UnsolicitedEvent::Void))
            .times(1)
            .return_const(());
        let ril = adapter(QuirkConfig::default(), sink);

        ril.emergency_marker().set();
        for _ in 0..2 {
            let mut buf = WireBuffer::new();
            buf.write_i32(0);
            buf.rewind_to(0);
            assert_eq!(
                ril.decode_response(RIL_REQUEST_GET_CURRENT_CALLS, &mut buf).unwrap(),
                Some(VendorResponse::CallList(vec![]))
            );
        }
        assert!(!ril.emergency_marker().is_set());
    }

    #[test]
    fn test_process_unsolicited_remaps() {
        let mut ril = adapter(QuirkConfig::default(), MockRegistrantSink::new());

        let mut buf = WireBuffer::new();
        buf.write_i32(RIL_UNSOL_SIM_SWAP_STATE_CHANGED);
        buf.rewind_to(0);

        assert!(matches!(
            ril.process_unsolicited(&mut buf, RESPONSE_UNSOLICITED),
            DispatchOutcome::Delegated { remapped_to: Some(RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED), .. }
        ));
        let seen = ril.dispatcher().base().get_seen();
        assert_eq!(seen[0].bytes, RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED.to_le_bytes().to_vec());
    }
}
