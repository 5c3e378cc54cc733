//! # RIL Protocol Constants and Types
//!
//! Request codes, unsolicited codes and the structured records decoded from
//! modem responses.

use serde::Serialize;
use tracing::warn;

use crate::error::{RilError, Result};

/// Inbound envelope type for a reply to a request
pub const RESPONSE_SOLICITED: i32 = 0;

/// Inbound envelope type for an asynchronous notification
pub const RESPONSE_UNSOLICITED: i32 = 1;

pub const RIL_REQUEST_GET_SIM_STATUS: i32 = 1;
pub const RIL_REQUEST_GET_CURRENT_CALLS: i32 = 9;
pub const RIL_REQUEST_DIAL: i32 = 10;
pub const RIL_REQUEST_SEND_SMS: i32 = 25;
pub const RIL_REQUEST_SEND_SMS_EXPECT_MORE: i32 = 26;
pub const RIL_REQUEST_ANSWER: i32 = 40;
pub const RIL_REQUEST_QUERY_AVAILABLE_NETWORKS: i32 = 48;

/// Base protocol code the SIM swap notification is remapped onto
pub const RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED: i32 = 1019;

/// First code of the vendor-private unsolicited range
pub const SAMSUNG_UNSOL_RESPONSE_BASE: i32 = 11000;

pub const RIL_UNSOL_RELEASE_COMPLETE_MESSAGE: i32 = 11001;
pub const RIL_UNSOL_STK_SEND_SMS_RESULT: i32 = 11002;
pub const RIL_UNSOL_STK_CALL_CONTROL_RESULT: i32 = 11003;
pub const RIL_UNSOL_DUN_CALL_STATUS: i32 = 11004;
pub const RIL_UNSOL_O2_HOME_ZONE_INFO: i32 = 11007;
pub const RIL_UNSOL_DEVICE_READY_NOTI: i32 = 11008;
pub const RIL_UNSOL_GPS_NOTI: i32 = 11009;
pub const RIL_UNSOL_AM: i32 = 11010;
pub const RIL_UNSOL_DUN_PIN_CONTROL_SIGNAL: i32 = 11011;
pub const RIL_UNSOL_DATA_SUSPEND_RESUME: i32 = 11012;
pub const RIL_UNSOL_SAP: i32 = 11013;
pub const RIL_UNSOL_SIM_SMS_STORAGE_AVAILALE: i32 = 11015;
pub const RIL_UNSOL_HSDPA_STATE_CHANGED: i32 = 11016;
pub const RIL_UNSOL_WB_AMR_STATE: i32 = 11017;
pub const RIL_UNSOL_TWO_MIC_STATE: i32 = 11018;
pub const RIL_UNSOL_DHA_STATE: i32 = 11019;
pub const RIL_UNSOL_UART: i32 = 11020;
pub const RIL_UNSOL_RESPONSE_HANDOVER: i32 = 11021;
pub const RIL_UNSOL_IPV6_ADDR: i32 = 11022;
pub const RIL_UNSOL_NWK_INIT_DISC_REQUEST: i32 = 11023;
pub const RIL_UNSOL_RTS_INDICATION: i32 = 11024;
pub const RIL_UNSOL_OMADM_SEND_DATA: i32 = 11025;
pub const RIL_UNSOL_DUN: i32 = 11026;
pub const RIL_UNSOL_SYSTEM_REBOOT: i32 = 11027;
pub const RIL_UNSOL_VOICE_PRIVACY_CHANGED: i32 = 11028;
pub const RIL_UNSOL_UTS_GETSMSCOUNT: i32 = 11029;
pub const RIL_UNSOL_UTS_GETSMSMSG: i32 = 11030;
pub const RIL_UNSOL_UTS_GET_UNREAD_SMS_STATUS: i32 = 11031;
pub const RIL_UNSOL_MIP_CONNECT_STATUS: i32 = 11032;
pub const RIL_UNSOL_SIM_SWAP_STATE_CHANGED: i32 = 11057;
pub const RIL_UNSOL_SNDMGR_WB_AMR_REPORT: i32 = 20017;
pub const RIL_UNSOL_SNDMGR_CLOCK_CTRL: i32 = 20022;

/// Maximum number of applications kept from a card status response
pub const CARD_MAX_APPS: usize = 8;

/// Type-of-address value for international numbers
pub const TOA_INTERNATIONAL: i32 = 0x91;

/// Default number of strings per operator in a network scan response
pub const DEFAULT_QAN_ELEMENTS: usize = 4;

/// Name of a request code for logging
pub fn request_to_string(request: i32) -> &'static str {
    match request {
        RIL_REQUEST_GET_SIM_STATUS => "GET_SIM_STATUS",
        RIL_REQUEST_GET_CURRENT_CALLS => "GET_CURRENT_CALLS",
        RIL_REQUEST_DIAL => "DIAL",
        RIL_REQUEST_SEND_SMS => "SEND_SMS",
        RIL_REQUEST_SEND_SMS_EXPECT_MORE => "SEND_SMS_EXPECT_MORE",
        RIL_REQUEST_ANSWER => "ANSWER",
        RIL_REQUEST_QUERY_AVAILABLE_NETWORKS => "QUERY_AVAILABLE_NETWORKS",
        _ => "<unknown request>",
    }
}

/// Name of an unsolicited code for logging
pub fn unsol_to_string(code: i32) -> &'static str {
    match code {
        RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED => "UNSOL_RESPONSE_SIM_STATUS_CHANGED",
        SAMSUNG_UNSOL_RESPONSE_BASE => "SAMSUNG_UNSOL_RESPONSE_BASE",
        RIL_UNSOL_RELEASE_COMPLETE_MESSAGE => "UNSOL_RELEASE_COMPLETE_MESSAGE",
        RIL_UNSOL_STK_SEND_SMS_RESULT => "UNSOL_STK_SEND_SMS_RESULT",
        RIL_UNSOL_STK_CALL_CONTROL_RESULT => "UNSOL_STK_CALL_CONTROL_RESULT",
        RIL_UNSOL_DUN_CALL_STATUS => "UNSOL_DUN_CALL_STATUS",
        RIL_UNSOL_O2_HOME_ZONE_INFO => "UNSOL_O2_HOME_ZONE_INFO",
        RIL_UNSOL_DEVICE_READY_NOTI => "UNSOL_DEVICE_READY_NOTI",
        RIL_UNSOL_GPS_NOTI => "UNSOL_GPS_NOTI",
        RIL_UNSOL_AM => "UNSOL_AM",
        RIL_UNSOL_DUN_PIN_CONTROL_SIGNAL => "UNSOL_DUN_PIN_CONTROL_SIGNAL",
        RIL_UNSOL_DATA_SUSPEND_RESUME => "UNSOL_DATA_SUSPEND_RESUME",
        RIL_UNSOL_SAP => "UNSOL_SAP",
        RIL_UNSOL_SIM_SMS_STORAGE_AVAILALE => "UNSOL_SIM_SMS_STORAGE_AVAILALE",
        RIL_UNSOL_HSDPA_STATE_CHANGED => "UNSOL_HSDPA_STATE_CHANGED",
        RIL_UNSOL_WB_AMR_STATE => "UNSOL_WB_AMR_STATE",
        RIL_UNSOL_TWO_MIC_STATE => "UNSOL_TWO_MIC_STATE",
        RIL_UNSOL_DHA_STATE => "UNSOL_DHA_STATE",
        RIL_UNSOL_UART => "UNSOL_UART",
        RIL_UNSOL_RESPONSE_HANDOVER => "UNSOL_RESPONSE_HANDOVER",
        RIL_UNSOL_IPV6_ADDR => "UNSOL_IPV6_ADDR",
        RIL_UNSOL_NWK_INIT_DISC_REQUEST => "UNSOL_NWK_INIT_DISC_REQUEST",
        RIL_UNSOL_RTS_INDICATION => "UNSOL_RTS_INDICATION",
        RIL_UNSOL_OMADM_SEND_DATA => "UNSOL_OMADM_SEND_DATA",
        RIL_UNSOL_DUN => "UNSOL_DUN",
        RIL_UNSOL_SYSTEM_REBOOT => "UNSOL_SYSTEM_REBOOT",
        RIL_UNSOL_VOICE_PRIVACY_CHANGED => "UNSOL_VOICE_PRIVACY_CHANGED",
        RIL_UNSOL_UTS_GETSMSCOUNT => "UNSOL_UTS_GETSMSCOUNT",
        RIL_UNSOL_UTS_GETSMSMSG => "UNSOL_UTS_GETSMSMSG",
        RIL_UNSOL_UTS_GET_UNREAD_SMS_STATUS => "UNSOL_UTS_GET_UNREAD_SMS_STATUS",
        RIL_UNSOL_MIP_CONNECT_STATUS => "UNSOL_MIP_CONNECT_STATUS",
        RIL_UNSOL_SIM_SWAP_STATE_CHANGED => "UNSOL_SIM_SWAP_STATE_CHANGED",
        RIL_UNSOL_SNDMGR_WB_AMR_REPORT => "UNSOL_SNDMGR_WB_AMR_REPORT",
        RIL_UNSOL_SNDMGR_CLOCK_CTRL => "UNSOL_SNDMGR_CLOCK_CTRL",
        _ => "<unknown unsolicited>",
    }
}

/// Physical card state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardState {
    Absent,
    Present,
    Error,
    Restricted,
}

impl CardState {
    /// Map the wire value, rejecting anything outside the protocol range
    pub fn from_ril(value: i32) -> Result<Self> {
        match value {
            0 => Ok(CardState::Absent),
            1 => Ok(CardState::Present),
            2 => Ok(CardState::Error),
            3 => Ok(CardState::Restricted),
            _ => Err(RilError::malformed(format!("unrecognized card state: {}", value))),
        }
    }
}

/// PIN verification state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinState {
    Unknown,
    EnabledNotVerified,
    EnabledVerified,
    Disabled,
    EnabledBlocked,
    EnabledPermBlocked,
}

impl PinState {
    pub fn from_ril(value: i32) -> Self {
        match value {
            0 => PinState::Unknown,
            1 => PinState::EnabledNotVerified,
            2 => PinState::EnabledVerified,
            3 => PinState::Disabled,
            4 => PinState::EnabledBlocked,
            5 => PinState::EnabledPermBlocked,
            _ => {
                warn!("Unrecognized pin state: {}", value);
                PinState::Unknown
            }
        }
    }
}

/// Card application type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppType {
    Unknown,
    Sim,
    Usim,
    Ruim,
    Csim,
    Isim,
}

impl AppType {
    pub fn from_ril(value: i32) -> Self {
        match value {
            0 => AppType::Unknown,
            1 => AppType::Sim,
            2 => AppType::Usim,
            3 => AppType::Ruim,
            4 => AppType::Csim,
            5 => AppType::Isim,
            _ => {
                warn!("Unrecognized app type: {}", value);
                AppType::Unknown
            }
        }
    }
}

/// Card application state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppState {
    Unknown,
    Detected,
    Pin,
    Puk,
    SubscriptionPerso,
    Ready,
}

impl AppState {
    pub fn from_ril(value: i32) -> Self {
        match value {
            0 => AppState::Unknown,
            1 => AppState::Detected,
            2 => AppState::Pin,
            3 => AppState::Puk,
            4 => AppState::SubscriptionPerso,
            5 => AppState::Ready,
            _ => {
                warn!("Unrecognized app state: {}", value);
                AppState::Unknown
            }
        }
    }
}

/// Personalisation (network lock) sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PersoSubstate {
    Unknown,
    InProgress,
    Ready,
    SimNetwork,
    SimNetworkSubset,
    SimCorporate,
    SimServiceProvider,
    SimSim,
    SimNetworkPuk,
    SimNetworkSubsetPuk,
    SimCorporatePuk,
    SimServiceProviderPuk,
    SimSimPuk,
    RuimNetwork1,
    RuimNetwork2,
    RuimHrpd,
    RuimCorporate,
    RuimServiceProvider,
    RuimRuim,
    RuimNetwork1Puk,
    RuimNetwork2Puk,
    RuimHrpdPuk,
    RuimCorporatePuk,
    RuimServiceProviderPuk,
    RuimRuimPuk,
}

impl PersoSubstate {
    const ALL: [PersoSubstate; 25] = [
        PersoSubstate::Unknown,
        PersoSubstate::InProgress,
        PersoSubstate::Ready,
        PersoSubstate::SimNetwork,
        PersoSubstate::SimNetworkSubset,
        PersoSubstate::SimCorporate,
        PersoSubstate::SimServiceProvider,
        PersoSubstate::SimSim,
        PersoSubstate::SimNetworkPuk,
        PersoSubstate::SimNetworkSubsetPuk,
        PersoSubstate::SimCorporatePuk,
        PersoSubstate::SimServiceProviderPuk,
        PersoSubstate::SimSimPuk,
        PersoSubstate::RuimNetwork1,
        PersoSubstate::RuimNetwork2,
        PersoSubstate::RuimHrpd,
        PersoSubstate::RuimCorporate,
        PersoSubstate::RuimServiceProvider,
        PersoSubstate::RuimRuim,
        PersoSubstate::RuimNetwork1Puk,
        PersoSubstate::RuimNetwork2Puk,
        PersoSubstate::RuimHrpdPuk,
        PersoSubstate::RuimCorporatePuk,
        PersoSubstate::RuimServiceProviderPuk,
        PersoSubstate::RuimRuimPuk,
    ];

    pub fn from_ril(value: i32) -> Self {
        match usize::try_from(value).ok().and_then(|i| Self::ALL.get(i)) {
            Some(&state) => state,
            None => {
                warn!("Unrecognized perso substate: {}", value);
                PersoSubstate::Unknown
            }
        }
    }
}

/// One application on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppStatus {
    pub app_type: AppType,
    pub app_state: AppState,
    pub perso_substate: PersoSubstate,
    /// Application identifier (hex string)
    pub aid: Option<String>,
    pub app_label: Option<String>,
    pub pin1_replaced: i32,
    pub pin1: PinState,
    pub pin2: PinState,
}

/// Decoded card status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStatus {
    pub card_state: CardState,
    pub universal_pin_state: PinState,
    pub gsm_umts_subscription_app_index: i32,
    pub cdma_subscription_app_index: i32,
    pub ims_subscription_app_index: i32,
    /// At most [`CARD_MAX_APPS`] entries
    pub applications: Vec<AppStatus>,
}

/// Call state as reported by +CLCC
///
/// Declaration order is the call ordering used when sorting a call list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CallState {
    Active,
    Holding,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
}

impl CallState {
    pub fn from_clcc(value: i32) -> Result<Self> {
        match value {
            0 => Ok(CallState::Active),
            1 => Ok(CallState::Holding),
            2 => Ok(CallState::Dialing),
            3 => Ok(CallState::Alerting),
            4 => Ok(CallState::Incoming),
            5 => Ok(CallState::Waiting),
            _ => Err(RilError::malformed(format!("illegal call state: {}", value))),
        }
    }
}

/// Number/name presentation as reported by +CLIP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Presentation {
    Allowed,
    Restricted,
    Unknown,
    Payphone,
}

impl Presentation {
    pub fn from_clip(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Presentation::Allowed),
            1 => Ok(Presentation::Restricted),
            2 => Ok(Presentation::Unknown),
            3 => Ok(Presentation::Payphone),
            _ => Err(RilError::malformed(format!("illegal presentation: {}", value))),
        }
    }
}

/// User-to-user signalling sideband
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UusInfo {
    pub uus_type: i32,
    pub dcs: i32,
    pub user_data: Option<Vec<u8>>,
}

/// One entry of a current-calls response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub state: CallState,
    /// Connection index, masked to 0-255
    pub index: u8,
    /// Type of address
    pub toa: i32,
    pub is_mpty: bool,
    pub is_mt: bool,
    pub als: i32,
    pub is_voice: bool,
    pub is_voice_privacy: bool,
    pub number: Option<String>,
    pub number_presentation: Presentation,
    pub name: Option<String>,
    pub name_presentation: Presentation,
    pub uus_info: Option<UusInfo>,
}

/// Availability of a scanned network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatorState {
    Unknown,
    Available,
    Current,
    Forbidden,
}

impl OperatorState {
    /// Parse an already lowercased state string
    pub fn parse(state: &str) -> Result<Self> {
        match state {
            "unknown" => Ok(OperatorState::Unknown),
            "available" => Ok(OperatorState::Available),
            "current" => Ok(OperatorState::Current),
            "forbidden" => Ok(OperatorState::Forbidden),
            _ => Err(RilError::malformed(format!("unrecognized operator state: {}", state))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorState::Unknown => "unknown",
            OperatorState::Available => "available",
            OperatorState::Current => "current",
            OperatorState::Forbidden => "forbidden",
        }
    }
}

/// One network from an operator search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorInfo {
    pub alpha_long: Option<String>,
    pub alpha_short: Option<String>,
    pub numeric: Option<String>,
    pub state: OperatorState,
}
