//! Poll cycle driver
//!
//! Runs one cycle immediately at startup, then one per interval tick:
//! ensure a valid session, list the account's devices, fetch each device's
//! snapshot strictly in sequence, and upsert the derived records into the
//! cache. Devices are fetched one after another deliberately; the vendor
//! endpoint is treated as intolerant of bursty concurrent load, and the
//! single-writer cache discipline follows from it.
//!
//! Cycles never overlap: the loop awaits each cycle before asking the timer
//! for the next tick, and a missed tick is delayed rather than burst.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::auth::SessionManager;
use crate::cache::{CacheEntry, DeviceCache};
use crate::error::Result;
use crate::vendor::VendorApi;

/// After this many consecutive failed cycles the failure log escalates from
/// warn to error so operators get an alertable signal.
const FAILURE_ESCALATION_THRESHOLD: u32 = 5;

/// Periodic poll driver owning the session manager, the vendor client, and
/// a handle to the shared cache.
pub struct Poller<C: VendorApi> {
    api: C,
    sessions: SessionManager,
    cache: DeviceCache,
    interval: Duration,
    consecutive_failures: u32,
}

impl<C: VendorApi> Poller<C> {
    /// Wire up a poller. `interval` is fixed for the process lifetime.
    pub fn new(api: C, sessions: SessionManager, cache: DeviceCache, interval: Duration) -> Self {
        Self {
            api,
            sessions,
            cache,
            interval,
            consecutive_failures: 0,
        }
    }

    /// Drive cycles forever. The first tick fires immediately.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_cycle().await {
                Ok(updated) => {
                    self.consecutive_failures = 0;
                    self.cache.mark_ready();
                    tracing::info!(
                        "Poll cycle complete: {} device(s) updated, {} cached",
                        updated,
                        self.cache.len().await
                    );
                }
                Err(e) => {
                    self.consecutive_failures += 1;
                    if self.consecutive_failures >= FAILURE_ESCALATION_THRESHOLD {
                        tracing::error!(
                            "Poll cycle failed ({} consecutive): {:#}",
                            self.consecutive_failures,
                            e
                        );
                    } else {
                        tracing::warn!("Poll cycle failed: {:#}", e);
                    }
                }
            }
        }
    }

    /// Run one full cycle: session check, directory listing, per-device
    /// fetch and upsert. Returns the number of devices updated.
    ///
    /// A single device's failure does not abort the cycle; its previous
    /// cache entry, if any, is left untouched. Session and directory
    /// failures abort the whole cycle and surface to the caller.
    pub async fn run_cycle(&mut self) -> Result<usize> {
        let session = self.sessions.ensure_valid(&self.api).await?;
        let devices = self.api.list_devices(&session).await?;
        tracing::debug!("Directory listed {} device(s)", devices.len());

        let mut updated = 0;
        for device_sn in &devices {
            match self.api.fetch_snapshot(&session, device_sn).await {
                Ok(snapshot) => {
                    self.cache
                        .upsert(CacheEntry::from_snapshot(device_sn, &snapshot))
                        .await;
                    updated += 1;
                }
                Err(e) => {
                    tracing::warn!("Snapshot fetch for {} failed: {:#}", device_sn, e);
                }
            }
        }
        Ok(updated)
    }
}
