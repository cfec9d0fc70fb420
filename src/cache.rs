//! Live device cache and the derived domain record
//!
//! The poller writes one [`CacheEntry`] per device serial number; the read
//! endpoint serves the full set. Entries are replaced wholesale when a newer
//! snapshot arrives and are never removed once created, so a device whose
//! fetch fails keeps serving its last known state. The cache is memory-only
//! and empties on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::vendor::snapshot::{BatteryPackSnapshot, LITHIUM_BATTERY_PACK};

// ---------------------------------------------------------------------------
// Derived domain record
// ---------------------------------------------------------------------------

/// Battery pack metrics derived from the raw snapshot.
///
/// Numeric fields are parsed from the vendor's string representation;
/// unparsable values serialize as `null`. Unit and rating strings pass
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryMetrics {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub soc: Option<i64>,
    pub soh: Option<i64>,
    pub rated_energy: Option<f64>,
    pub energy_unit: String,
    pub nameplate_rated_power: String,
}

/// Energy-management subsystem metrics derived from the raw snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmsMetrics {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub soc: Option<i64>,
    pub soh: Option<i64>,
}

/// The per-device payload served by the read endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    pub battery: BatteryMetrics,
    pub ems: EmsMetrics,
}

/// One cached device, keyed by serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(rename = "type")]
    pub device_type: String,
    pub serial_number: String,
    pub data: DeviceMetrics,
}

impl CacheEntry {
    /// Derive the compact domain record from a raw battery pack snapshot.
    pub fn from_snapshot(serial_number: &str, snapshot: &BatteryPackSnapshot) -> Self {
        Self {
            device_type: LITHIUM_BATTERY_PACK.to_string(),
            serial_number: serial_number.to_string(),
            data: DeviceMetrics {
                battery: BatteryMetrics {
                    voltage: parse_f64(&snapshot.batt_volt),
                    current: parse_f64(&snapshot.batt_curr),
                    soc: parse_i64(&snapshot.batt_soc),
                    soh: parse_i64(&snapshot.batt_soh),
                    rated_energy: parse_f64(&snapshot.rated_energy),
                    energy_unit: snapshot.energy_unit.clone(),
                    nameplate_rated_power: snapshot.nameplate_rated_power.clone(),
                },
                ems: EmsMetrics {
                    voltage: parse_f64(&snapshot.ems_voltage),
                    current: parse_f64(&snapshot.ems_current),
                    soc: parse_i64(&snapshot.ems_soc),
                    soh: parse_i64(&snapshot.ems_soh),
                },
            },
        }
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse().ok().filter(|v: &f64| v.is_finite())
}

/// Integer fields occasionally arrive with a decimal part; truncate like the
/// vendor's own dashboards do.
fn parse_i64(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|v| v.trunc() as i64))
}

// ---------------------------------------------------------------------------
// DeviceCache
// ---------------------------------------------------------------------------

/// Clonable handle to the shared device cache.
///
/// Written exclusively by the poll cycle, read by the HTTP endpoint. The
/// readiness flag flips once the first poll cycle completes successfully;
/// until then the read endpoint answers 503.
#[derive(Clone, Default)]
pub struct DeviceCache {
    inner: Arc<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ready: AtomicBool,
}

impl DeviceCache {
    /// Create an empty, not-yet-ready cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for its serial number.
    pub async fn upsert(&self, entry: CacheEntry) {
        let mut entries = self.inner.entries.write().await;
        entries.insert(entry.serial_number.clone(), entry);
    }

    /// A point-in-time copy of all entries, sorted by serial number for
    /// stable output.
    pub async fn entries(&self) -> Vec<CacheEntry> {
        let entries = self.inner.entries.read().await;
        let mut all: Vec<CacheEntry> = entries.values().cloned().collect();
        all.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        all
    }

    /// Number of cached devices.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Flag the cache as initialized; called after the first successful
    /// poll cycle.
    pub fn mark_ready(&self) {
        self.inner.ready.store(true, Ordering::SeqCst);
    }

    /// Whether at least one poll cycle has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }
}
