//! City/state/pincode resolution.
//!
//! The city registry is a static lookup; pincode serviceability is the one
//! external call, debounced per probe and guarded against superseded
//! responses with a generation counter.

use crate::clients::ServiceabilityApi;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

pub static PINCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("pincode regex is valid"));

/// Format-level pincode check, no network involved.
pub fn is_valid_pincode_format(pincode: &str) -> bool {
    PINCODE_RE.is_match(pincode)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PincodeStatus {
    Valid,
    Invalid,
    /// The serviceability backend could not be reached. Callers must offer
    /// a retry rather than treating the destination as invalid.
    Indeterminate,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CityRecord {
    pub key: String,
    pub label: String,
    pub state: String,
    pub pincodes: Vec<String>,
}

fn city(label: &str, state: &str, pincodes: &[&str]) -> CityRecord {
    CityRecord {
        key: normalize_city_key(label),
        label: label.to_string(),
        state: state.to_string(),
        pincodes: pincodes.iter().map(|p| p.to_string()).collect(),
    }
}

/// Serviceable metros and their representative pincodes.
static CITY_REGISTRY: Lazy<Vec<CityRecord>> = Lazy::new(|| {
    vec![
        city("Bengaluru", "Karnataka", &["560001", "560034", "560066"]),
        city("Mysuru", "Karnataka", &["570001", "570020"]),
        city("Mumbai", "Maharashtra", &["400001", "400050", "400070"]),
        city("Pune", "Maharashtra", &["411001", "411045"]),
        city("New Delhi", "Delhi", &["110001", "110016", "110092"]),
        city("Chennai", "Tamil Nadu", &["600001", "600040"]),
        city("Hyderabad", "Telangana", &["500001", "500081"]),
        city("Kolkata", "West Bengal", &["700001", "700016"]),
        city("Ahmedabad", "Gujarat", &["380001", "380015"]),
        city("Jaipur", "Rajasthan", &["302001", "302017"]),
    ]
});

/// Canonical lookup key for a free-text city token: lowercase, trimmed,
/// internal whitespace collapsed to single underscores.
pub fn normalize_city_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn lookup_city(raw: &str) -> Option<&'static CityRecord> {
    let key = normalize_city_key(raw);
    CITY_REGISTRY.iter().find(|c| c.key == key)
}

/// Cities in the given state, sorted by display label.
pub fn cities_for_state(state: &str) -> Vec<&'static CityRecord> {
    let wanted = state.trim().to_lowercase();
    let mut cities: Vec<&CityRecord> = CITY_REGISTRY
        .iter()
        .filter(|c| c.state.to_lowercase() == wanted)
        .collect();
    cities.sort_by(|a, b| a.label.cmp(&b.label));
    cities
}

/// Guard against superseded pincode checks. Each keystroke-driven check
/// claims a new generation and waits out the debounce window before touching
/// the network; only the response matching the latest generation publishes
/// its result.
#[derive(Debug)]
pub struct PincodeProbe {
    generation: AtomicU64,
    debounce: Duration,
}

impl PincodeProbe {
    pub fn new(debounce: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            debounce,
        }
    }

    /// Claims a new generation for an outgoing check.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// Location resolution service: static city lookups plus the external
/// pincode serviceability probe.
#[derive(Clone)]
pub struct LocationService {
    serviceability: Arc<dyn ServiceabilityApi>,
    pincode_debounce: Duration,
}

impl LocationService {
    pub fn new(serviceability: Arc<dyn ServiceabilityApi>, pincode_debounce: Duration) -> Self {
        Self {
            serviceability,
            pincode_debounce,
        }
    }

    /// Fresh probe carrying the configured debounce window. One probe per
    /// input field; its generations order the checks.
    pub fn probe(&self) -> PincodeProbe {
        PincodeProbe::new(self.pincode_debounce)
    }

    /// Validates a pincode: format first, then the postal backend. A backend
    /// failure is indeterminate, never invalid.
    #[instrument(skip(self))]
    pub async fn validate_pincode(&self, pincode: &str) -> PincodeStatus {
        if !is_valid_pincode_format(pincode) {
            return PincodeStatus::Invalid;
        }

        match self.serviceability.validate_pincode(pincode).await {
            Ok(true) => PincodeStatus::Valid,
            Ok(false) => PincodeStatus::Invalid,
            Err(e) => {
                warn!("Pincode validation unavailable for {}: {}", pincode, e);
                PincodeStatus::Indeterminate
            }
        }
    }

    /// Validates under a probe generation. The debounce window is waited out
    /// first; a newer check started in the meantime cancels this one before
    /// it reaches the network. Returns `None` when the check was superseded,
    /// either during the wait or while the response was in flight; a stale
    /// result must not be published.
    pub async fn validate_pincode_guarded(
        &self,
        probe: &PincodeProbe,
        generation: u64,
        pincode: &str,
    ) -> Option<PincodeStatus> {
        tokio::time::sleep(probe.debounce()).await;
        if !probe.is_current(generation) {
            return None;
        }

        let status = self.validate_pincode(pincode).await;
        probe.is_current(generation).then_some(status)
    }
}
