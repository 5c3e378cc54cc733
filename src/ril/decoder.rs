//! # Response Decoder
//!
//! Decodes solicited responses whose layout the Exynos firmware extends:
//! card status, current calls and the network scan result.

use tracing::{debug, trace};

use super::base::response_strings;
use super::protocol::*;
use super::quirks::QuirkConfig;
use super::wire::WireBuffer;
use crate::error::{RilError, Result};
use crate::registrant::{EmergencyCallMarker, EventKind, RegistrantSink, UnsolicitedEvent};

/// Decode a card status response
///
/// An application count above [`CARD_MAX_APPS`] is clamped; only that many
/// application records are read.
///
/// # Errors
///
/// Returns error if the buffer is truncated, the card state is out of
/// range or the application count is negative.
pub fn decode_card_status(buf: &mut WireBuffer) -> Result<CardStatus> {
    let card_state = CardState::from_ril(buf.read_i32()?)?;
    let universal_pin_state = PinState::from_ril(buf.read_i32()?);
    let gsm_umts_subscription_app_index = buf.read_i32()?;
    let cdma_subscription_app_index = buf.read_i32()?;
    let ims_subscription_app_index = buf.read_i32()?;

    let num_applications = buf.read_i32()?;
    let num_applications = usize::try_from(num_applications)
        .map_err(|_| RilError::malformed(format!("negative application count: {}", num_applications)))?;
    if num_applications > CARD_MAX_APPS {
        debug!("Clamping application count {} to {}", num_applications, CARD_MAX_APPS);
    }
    let num_applications = num_applications.min(CARD_MAX_APPS);

    let mut applications = Vec::with_capacity(num_applications);
    for _ in 0..num_applications {
        applications.push(decode_app_status(buf)?);
    }

    Ok(CardStatus {
        card_state,
        universal_pin_state,
        gsm_umts_subscription_app_index,
        cdma_subscription_app_index,
        ims_subscription_app_index,
        applications,
    })
}

fn decode_app_status(buf: &mut WireBuffer) -> Result<AppStatus> {
    let app_type = AppType::from_ril(buf.read_i32()?);
    let app_state = AppState::from_ril(buf.read_i32()?);
    let perso_substate = PersoSubstate::from_ril(buf.read_i32()?);
    let aid = buf.read_string()?;
    let app_label = buf.read_string()?;
    let pin1_replaced = buf.read_i32()?;
    let pin1 = PinState::from_ril(buf.read_i32()?);
    let pin2 = PinState::from_ril(buf.read_i32()?);

    // pin1, puk1, pin2, puk2 and perso-unblock retry counters
    for _ in 0..5 {
        buf.read_i32()?;
    }

    Ok(AppStatus {
        app_type,
        app_state,
        perso_substate,
        aid,
        app_label,
        pin1_replaced,
        pin1,
        pin2,
    })
}

/// Apply type-of-address to a dialled/received number
///
/// International numbers get a leading `+` unless they already have one.
pub fn number_from_toa(number: Option<String>, toa: i32) -> Option<String> {
    match number {
        Some(n) if toa == TOA_INTERNATIONAL && !n.is_empty() && !n.starts_with('+') => {
            Some(format!("+{}", n))
        }
        other => other,
    }
}

/// Decode a current-calls response
///
/// Quirk-gated fields (video flag, call details) are consumed and
/// discarded. The returned list is ordered by `(state, index)`.
///
/// Every decoded record notifies the sink with voice privacy on or off.
/// An empty list while `emergency` is set emits one emergency callback
/// mode notification and clears the marker.
///
/// # Errors
///
/// Returns error on truncation, a negative count, or an out-of-range call
/// state or presentation. No notifications are sent for a failed decode.
pub fn decode_call_list(
    buf: &mut WireBuffer,
    quirks: &QuirkConfig,
    sink: &dyn RegistrantSink,
    emergency: &EmergencyCallMarker,
) -> Result<Vec<CallRecord>> {
    let num = buf.read_i32()?;
    let num = usize::try_from(num)
        .map_err(|_| RilError::malformed(format!("negative call count: {}", num)))?;

    let mut calls = Vec::with_capacity(num.min(16));
    for _ in 0..num {
        calls.push(decode_call_record(buf, quirks)?);
    }

    for call in &calls {
        if call.is_voice_privacy {
            sink.notify(EventKind::VoicePrivacyOn, UnsolicitedEvent::Void);
            debug!("InCall VoicePrivacy is enabled");
        } else {
            sink.notify(EventKind::VoicePrivacyOff, UnsolicitedEvent::Void);
            debug!("InCall VoicePrivacy is disabled");
        }
    }

    calls.sort_by_key(|call| (call.state, call.index));

    if num == 0 && emergency.take() {
        debug!("Call ended while testing emergency call, notifying ECM registrants");
        sink.notify(EventKind::EmergencyCallbackMode, UnsolicitedEvent::Void);
    }

    Ok(calls)
}

fn decode_call_record(buf: &mut WireBuffer, quirks: &QuirkConfig) -> Result<CallRecord> {
    let state = CallState::from_clcc(buf.read_i32()?)?;
    let index = (buf.read_i32()? & 0xff) as u8;
    let toa = buf.read_i32()?;
    let is_mpty = buf.read_i32()? != 0;
    let is_mt = buf.read_i32()? != 0;
    let als = buf.read_i32()?;
    let is_voice = buf.read_i32()? == 0;

    if quirks.needs_video_call_field {
        let is_video = buf.read_i32()? != 0;
        trace!("Call {} video flag: {}", index, is_video);
    }
    if quirks.next_gen_call_details {
        let call_type = buf.read_i32()?;
        let domain = buf.read_i32()?;
        let extras = buf.read_string()?;
        trace!(
            "Call {} details: type={}, domain={}, extras={:?}",
            index, call_type, domain, extras
        );
    }

    let is_voice_privacy = buf.read_i32()? != 0;
    let number = buf.read_string()?;
    let number_presentation = Presentation::from_clip(buf.read_i32()?)?;
    let name = buf.read_string()?;
    let name_presentation = Presentation::from_clip(buf.read_i32()?)?;

    let uus_info = if buf.read_i32()? == 1 {
        let uus = UusInfo {
            uus_type: buf.read_i32()?,
            dcs: buf.read_i32()?,
            user_data: buf.read_byte_array()?,
        };
        let data = uus.user_data.as_deref().unwrap_or_default();
        trace!(
            "Incoming UUS : type={}, dcs={}, length={}",
            uus.uus_type, uus.dcs, data.len()
        );
        trace!("Incoming UUS : data (string)={}", String::from_utf8_lossy(data));
        trace!("Incoming UUS : data (hex): {:02X?}", data);
        Some(uus)
    } else {
        trace!("Incoming UUS : NOT present!");
        None
    };

    Ok(CallRecord {
        state,
        index,
        toa,
        is_mpty,
        is_mt,
        als,
        is_voice,
        is_voice_privacy,
        number: number_from_toa(number, toa),
        number_presentation,
        name,
        name_presentation,
        uus_info,
    })
}

/// Decode a network scan response
///
/// The flat string array is grouped into tuples of `tuple_width` strings:
/// `[0]` long name, `[2]` numeric id, `[3]` state. The long name is used
/// for both the long and short operator names.
///
/// # Errors
///
/// Returns `MalformedResponse` if the string count is not a multiple of
/// `tuple_width`, if `tuple_width` is below 4, or if a state string is
/// null or unrecognised.
pub fn decode_operator_infos(buf: &mut WireBuffer, tuple_width: usize) -> Result<Vec<OperatorInfo>> {
    if tuple_width < DEFAULT_QAN_ELEMENTS {
        return Err(RilError::malformed(format!(
            "operator tuple width {} is below {}",
            tuple_width, DEFAULT_QAN_ELEMENTS
        )));
    }

    let strings = response_strings(buf)?;
    if strings.len() % tuple_width != 0 {
        return Err(RilError::malformed(format!(
            "QUERY_AVAILABLE_NETWORKS: invalid response. Got {} strings, expected multiple of {}",
            strings.len(),
            tuple_width
        )));
    }

    strings
        .chunks_exact(tuple_width)
        .map(|tuple| -> Result<OperatorInfo> {
            let alpha_long = tuple[0].clone();
            let numeric = tuple[2].clone();
            let state = tuple[3]
                .as_deref()
                .ok_or_else(|| RilError::malformed("null operator state"))?
                .to_lowercase();
            let state = OperatorState::parse(&state)?;

            debug!(
                "Add OperatorInfo: {:?}, {:?}, {:?}, {}",
                alpha_long, alpha_long, numeric, state.as_str()
            );

            Ok(OperatorInfo {
                alpha_short: alpha_long.clone(),
                alpha_long,
                numeric,
                state,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrant::MockRegistrantSink;
    use mockall::predicate::eq;

    fn write_app(buf: &mut WireBuffer, app_type: i32, aid: &str) {
        buf.write_i32(app_type);
        buf.write_i32(5); // Ready
        buf.write_i32(2); // Perso ready
        buf.write_string(Some(aid));
        buf.write_string(Some("label"));
        buf.write_i32(0);
        buf.write_i32(3); // pin1 disabled
        buf.write_i32(1); // pin2 enabled, not verified
        for retries in [3, 10, 3, 10, 0] {
            buf.write_i32(retries);
        }
    }

    fn card_status_buffer(num_apps: i32, written_apps: usize) -> WireBuffer {
        let mut buf = WireBuffer::new();
        buf.write_i32(1); // Present
        buf.write_i32(0);
        buf.write_i32(0);
        buf.write_i32(-1);
        buf.write_i32(-1);
        buf.write_i32(num_apps);
        for i in 0..written_apps {
            write_app(&mut buf, 2, &format!("a0000000871002{:02}", i));
        }
        buf.rewind_to(0);
        buf
    }

    #[test]
    fn test_decode_card_status() {
        let mut buf = card_status_buffer(2, 2);
        let status = decode_card_status(&mut buf).unwrap();

        assert_eq!(status.card_state, CardState::Present);
        assert_eq!(status.universal_pin_state, PinState::Unknown);
        assert_eq!(status.gsm_umts_subscription_app_index, 0);
        assert_eq!(status.cdma_subscription_app_index, -1);
        assert_eq!(status.applications.len(), 2);

        let app = &status.applications[1];
        assert_eq!(app.app_type, AppType::Usim);
        assert_eq!(app.app_state, AppState::Ready);
        assert_eq!(app.perso_substate, PersoSubstate::Ready);
        assert_eq!(app.aid.as_deref(), Some("a000000087100201"));
        assert_eq!(app.pin1, PinState::Disabled);
        assert_eq!(app.pin2, PinState::EnabledNotVerified);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_decode_card_status_clamps_application_count() {
        let mut buf = card_status_buffer(12, 12);
        let status = decode_card_status(&mut buf).unwrap();

        assert_eq!(status.applications.len(), CARD_MAX_APPS);
        // The excess records are left unread
        assert!(buf.remaining() > 0);
    }

    #[test]
    fn test_decode_card_status_negative_count() {
        let mut buf = card_status_buffer(-1, 0);
        assert!(matches!(
            decode_card_status(&mut buf),
            Err(RilError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_card_status_truncated_app() {
        let mut buf = card_status_buffer(2, 1);
        assert!(matches!(
            decode_card_status(&mut buf),
            Err(RilError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn test_number_from_toa() {
        assert_eq!(number_from_toa(Some("4930123".into()), 0x91).as_deref(), Some("+4930123"));
        assert_eq!(number_from_toa(Some("+4930123".into()), 0x91).as_deref(), Some("+4930123"));
        assert_eq!(number_from_toa(Some("030123".into()), 0x81).as_deref(), Some("030123"));
        assert_eq!(number_from_toa(Some(String::new()), 0x91).as_deref(), Some(""));
        assert_eq!(number_from_toa(None, 0x91), None);
    }

    struct Call {
        state: i32,
        index: i32,
        privacy: bool,
    }

    fn write_call(buf: &mut WireBuffer, call: &Call, quirks: &QuirkConfig) {
        buf.write_i32(call.state);
        buf.write_i32(call.index);
        buf.write_i32(0x91);
        buf.write_i32(0); // mpty
        buf.write_i32(1); // mt
        buf.write_i32(0); // als
        buf.write_i32(0); // voice
        if quirks.needs_video_call_field {
            buf.write_i32(1);
        }
        if quirks.next_gen_call_details {
            buf.write_i32(0);
            buf.write_i32(1);
            buf.write_string(Some("extras"));
        }
        buf.write_i32(call.privacy as i32);
        buf.write_string(Some("4930123"));
        buf.write_i32(0);
        buf.write_string(Some("Alice"));
        buf.write_i32(0);
        buf.write_i32(0); // no UUS
    }

    fn call_list_buffer(calls: &[Call], quirks: &QuirkConfig) -> WireBuffer {
        let mut buf = WireBuffer::new();
        buf.write_i32(calls.len() as i32);
        for call in calls {
            write_call(&mut buf, call, quirks);
        }
        buf.rewind_to(0);
        buf
    }

    fn quiet_sink() -> MockRegistrantSink {
        let mut sink = MockRegistrantSink::new();
        sink.expect_notify().return_const(());
        sink
    }

    #[test]
    fn test_decode_call_list_fields() {
        let quirks = QuirkConfig::default();
        let mut buf = call_list_buffer(&[Call { state: 4, index: 1, privacy: false }], &quirks);
        let calls = decode_call_list(&mut buf, &quirks, &quiet_sink(), &EmergencyCallMarker::new()).unwrap();

        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.state, CallState::Incoming);
        assert_eq!(call.index, 1);
        assert!(call.is_mt);
        assert!(!call.is_mpty);
        assert!(call.is_voice);
        assert_eq!(call.number.as_deref(), Some("+4930123"));
        assert_eq!(call.name.as_deref(), Some("Alice"));
        assert_eq!(call.number_presentation, Presentation::Allowed);
        assert_eq!(call.uus_info, None);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_decode_call_list_masks_index() {
        let quirks = QuirkConfig::default();
        let mut buf = call_list_buffer(&[Call { state: 0, index: 0x1_02, privacy: false }], &quirks);
        let calls = decode_call_list(&mut buf, &quirks, &quiet_sink(), &EmergencyCallMarker::new()).unwrap();
        assert_eq!(calls[0].index, 2);
    }

    #[test]
    fn test_decode_call_list_consumes_quirk_fields() {
        for quirks in [
            QuirkConfig { next_gen_call_details: true, needs_video_call_field: false },
            QuirkConfig { next_gen_call_details: false, needs_video_call_field: true },
            QuirkConfig { next_gen_call_details: true, needs_video_call_field: true },
        ] {
            let mut buf = call_list_buffer(
                &[Call { state: 0, index: 1, privacy: false }, Call { state: 1, index: 2, privacy: false }],
                &quirks,
            );
            let calls = decode_call_list(&mut buf, &quirks, &quiet_sink(), &EmergencyCallMarker::new()).unwrap();

            assert_eq!(calls.len(), 2, "quirks {:?}", quirks);
            assert_eq!(calls[1].name.as_deref(), Some("Alice"));
            assert_eq!(buf.remaining(), 0, "quirks {:?}", quirks);
        }
    }

    #[test]
    fn test_decode_call_list_quirk_mismatch_fails() {
        let written = QuirkConfig { next_gen_call_details: true, needs_video_call_field: false };
        let mut buf = call_list_buffer(&[Call { state: 0, index: 1, privacy: false }], &written);

        // Decoding without the quirk reads the stanza as the wrong fields
        let result = decode_call_list(&mut buf, &QuirkConfig::default(), &quiet_sink(), &EmergencyCallMarker::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_call_list_sorted_by_state_then_index() {
        let quirks = QuirkConfig::default();
        let mut buf = call_list_buffer(
            &[
                Call { state: 2, index: 3, privacy: false }, // Dialing
                Call { state: 1, index: 2, privacy: false }, // Holding
                Call { state: 0, index: 5, privacy: false }, // Active
                Call { state: 0, index: 1, privacy: false }, // Active
            ],
            &quirks,
        );
        let calls = decode_call_list(&mut buf, &quirks, &quiet_sink(), &EmergencyCallMarker::new()).unwrap();

        let order: Vec<(CallState, u8)> = calls.iter().map(|c| (c.state, c.index)).collect();
        assert_eq!(
            order,
            vec![
                (CallState::Active, 1),
                (CallState::Active, 5),
                (CallState::Holding, 2),
                (CallState::Dialing, 3),
            ]
        );
    }

    #[test]
    fn test_decode_call_list_with_uus() {
        let quirks = QuirkConfig::default();
        let mut buf = WireBuffer::new();
        buf.write_i32(1);
        write_call(&mut buf, &Call { state: 0, index: 1, privacy: false }, &quirks);
        // Replace the trailing "no UUS" flag with a UUS block
        let uus_pos = buf.len() - 4;
        buf.rewind_to(uus_pos);
        buf.write_i32(1);
        buf.write_i32(0);
        buf.write_i32(4);
        buf.write_byte_array(Some(b"hi"));
        buf.rewind_to(0);

        let calls = decode_call_list(&mut buf, &quirks, &quiet_sink(), &EmergencyCallMarker::new()).unwrap();
        assert_eq!(
            calls[0].uus_info,
            Some(UusInfo { uus_type: 0, dcs: 4, user_data: Some(b"hi".to_vec()) })
        );
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_decode_call_list_voice_privacy_per_record() {
        let quirks = QuirkConfig::default();
        let mut buf = call_list_buffer(
            &[
                Call { state: 0, index: 1, privacy: true },
                Call { state: 1, index: 2, privacy: false },
                Call { state: 1, index: 3, privacy: true },
            ],
            &quirks,
        );

        let mut sink = MockRegistrantSink::new();
        sink.expect_notify()
            .with(eq(EventKind::VoicePrivacyOn), eq(UnsolicitedEvent::Void))
            .times(2)
            .return_const(());
        sink.expect_notify()
            .with(eq(EventKind::VoicePrivacyOff), eq(UnsolicitedEvent::Void))
            .times(1)
            .return_const(());

        decode_call_list(&mut buf, &quirks, &sink, &EmergencyCallMarker::new()).unwrap();
    }

    #[test]
    fn test_decode_empty_call_list_emergency_single_shot() {
        let quirks = QuirkConfig::default();
        let marker = EmergencyCallMarker::new();
        marker.set();

        let mut sink = MockRegistrantSink::new();
        sink.expect_notify()
            .with(eq(EventKind::EmergencyCallbackMode), eq(UnsolicitedEvent::Void))
            .times(1)
            .return_const(());

        let mut buf = call_list_buffer(&[], &quirks);
        assert!(decode_call_list(&mut buf, &quirks, &sink, &marker).unwrap().is_empty());
        assert!(!marker.is_set());

        let mut buf = call_list_buffer(&[], &quirks);
        assert!(decode_call_list(&mut buf, &quirks, &sink, &marker).unwrap().is_empty());
    }

    #[test]
    fn test_emergency_marker_kept_while_calls_remain() {
        let quirks = QuirkConfig::default();
        let marker = EmergencyCallMarker::new();
        marker.set();

        let mut sink = MockRegistrantSink::new();
        sink.expect_notify()
            .with(eq(EventKind::EmergencyCallbackMode), eq(UnsolicitedEvent::Void))
            .never();
        sink.expect_notify().return_const(());

        let mut buf = call_list_buffer(&[Call { state: 0, index: 1, privacy: false }], &quirks);
        decode_call_list(&mut buf, &quirks, &sink, &marker).unwrap();
        assert!(marker.is_set());
    }

    #[test]
    fn test_decode_call_list_bad_state() {
        let quirks = QuirkConfig::default();
        let mut buf = call_list_buffer(&[Call { state: 9, index: 1, privacy: false }], &quirks);

        let mut sink = MockRegistrantSink::new();
        sink.expect_notify().never();

        assert!(matches!(
            decode_call_list(&mut buf, &quirks, &sink, &EmergencyCallMarker::new()),
            Err(RilError::MalformedResponse(_))
        ));
    }

    fn operator_buffer(strings: &[Option<&str>]) -> WireBuffer {
        let mut buf = WireBuffer::new();
        buf.write_i32(strings.len() as i32);
        for s in strings {
            buf.write_string(*s);
        }
        buf.rewind_to(0);
        buf
    }

    #[test]
    fn test_decode_operator_infos() {
        let mut buf = operator_buffer(&[
            Some("Telekom.de"), Some("TDG"), Some("26201"), Some("CURRENT"),
            Some("Vodafone.de"), None, Some("26202"), Some("Forbidden"),
        ]);
        let infos = decode_operator_infos(&mut buf, 4).unwrap();

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].alpha_long.as_deref(), Some("Telekom.de"));
        assert_eq!(infos[0].alpha_short.as_deref(), Some("Telekom.de"));
        assert_eq!(infos[0].numeric.as_deref(), Some("26201"));
        assert_eq!(infos[0].state, OperatorState::Current);
        assert_eq!(infos[1].alpha_short.as_deref(), Some("Vodafone.de"));
        assert_eq!(infos[1].state, OperatorState::Forbidden);
    }

    #[test]
    fn test_decode_operator_infos_wider_tuples() {
        let mut buf = operator_buffer(&[
            Some("O2 - de"), Some("O2"), Some("26207"), Some("available"), Some("LTE"),
        ]);
        let infos = decode_operator_infos(&mut buf, 5).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].state, OperatorState::Available);
    }

    #[test]
    fn test_decode_operator_infos_misaligned() {
        let mut buf = operator_buffer(&[
            Some("Telekom.de"), Some("TDG"), Some("26201"), Some("current"), Some("stray"),
        ]);
        assert!(matches!(
            decode_operator_infos(&mut buf, 4),
            Err(RilError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_operator_infos_empty() {
        let mut buf = operator_buffer(&[]);
        assert!(decode_operator_infos(&mut buf, 4).unwrap().is_empty());
    }

    #[test]
    fn test_decode_operator_infos_null_state() {
        let mut buf = operator_buffer(&[Some("A"), Some("B"), Some("1"), None]);
        assert!(decode_operator_infos(&mut buf, 4).is_err());
    }

    #[test]
    fn test_decode_operator_infos_narrow_tuple_width() {
        let mut buf = operator_buffer(&[Some("A"), Some("B"), Some("1")]);
        assert!(decode_operator_infos(&mut buf, 3).is_err());
    }
}
