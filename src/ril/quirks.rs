//! # Modem Quirks
//!
//! Capability flags that change the wire layout for a given modem
//! generation. Resolved once when the adapter is built and then passed by
//! value into every encode and decode call.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};

/// Property selecting the next-generation call-details layout
pub const PROP_SAMSUNG_NEXTGEN_MODEM: &str = "ro.ril.samsung_nextgen_modem";

/// Property selecting the extra video-call field in call lists
pub const PROP_NEEDS_VIDEOCALL_FIELD: &str = "ro.ril.needs_videocall_field";

/// Immutable set of modem quirks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuirkConfig {
    /// Modem expects/sends the (type, domain, extras) call-details stanza
    pub next_gen_call_details: bool,
    /// Call list entries carry an `is_video` field after `is_voice`
    pub needs_video_call_field: bool,
}

impl QuirkConfig {
    /// Resolve quirks from a platform property store
    ///
    /// Both flags default to `false` when the property is absent or
    /// unparsable.
    pub fn from_properties<P: PropertyStore + ?Sized>(props: &P) -> Self {
        let quirks = Self {
            next_gen_call_details: props.get_bool(PROP_SAMSUNG_NEXTGEN_MODEM, false),
            needs_video_call_field: props.get_bool(PROP_NEEDS_VIDEOCALL_FIELD, false),
        };
        debug!("Resolved modem quirks: {:?}", quirks);
        quirks
    }
}

/// Read-only key/value property source
pub trait PropertyStore {
    /// Raw value of a property, if set
    fn get(&self, key: &str) -> Option<String>;

    /// Boolean property using the platform's accepted spellings
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => parse_bool(&value).unwrap_or(default),
            None => default,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "y" | "yes" | "on" | "true" => Some(true),
        "0" | "n" | "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

impl PropertyStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Property store backed by process environment variables
///
/// `ro.ril.samsung_nextgen_modem` is looked up as `RO_RIL_SAMSUNG_NEXTGEN_MODEM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPropertyStore;

impl EnvPropertyStore {
    pub fn env_key(key: &str) -> String {
        key.replace('.', "_").to_ascii_uppercase()
    }
}

impl PropertyStore for EnvPropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_key(key)).ok()
    }
}

/// Properties set when the factory property file cannot be read
pub const FACTORY_DEFAULT_PROPERTIES: &str = "ro.vendor.multisim.simslotcount=1";

/// Property store loaded from a `key=value` file
///
/// Parsing stops at the first empty line. Lines that do not split into
/// exactly one key and one value are logged and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePropertyStore {
    props: HashMap<String, String>,
}

impl FilePropertyStore {
    /// Parse `key=value` lines
    pub fn from_lines(data: &str) -> Self {
        let mut props = HashMap::new();

        for line in data.split('\n') {
            if line.is_empty() {
                break;
            }

            let parts: Vec<&str> = line.split('=').collect();
            if let [key, value] = parts[..] {
                info!("Setting property: {}", line);
                props.insert(key.to_string(), value.to_string());
            } else {
                error!("Invalid property line: {}", line);
            }
        }

        Self { props }
    }

    /// Load a property file
    ///
    /// An unreadable file yields [`FACTORY_DEFAULT_PROPERTIES`].
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        info!("Loading properties from {}", path.display());

        let store = match fs::read_to_string(path) {
            Ok(data) => Self::from_lines(&data),
            Err(e) => {
                warn!("Could not read {} ({}), setting defaults", path.display(), e);
                Self::from_lines(FACTORY_DEFAULT_PROPERTIES)
            }
        };
        debug!("Loaded {} properties", store.len());
        store
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }
}

impl PropertyStore for FilePropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.props.get(key).cloned()
    }
}
