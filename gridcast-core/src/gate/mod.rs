mod persist;

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use parking_lot::Mutex;
use tokio::{task::JoinHandle, time};

use crate::Config;

pub use persist::*;

/// Why the viewer is being asked to upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeReason {
    /// The daily watch budget ran out
    WatchTimeExpired,
    /// A locked slot was selected
    LockedSlot,
}

/// Decides which stream slots a viewer may watch and whether their daily
/// watch budget is exhausted. One gate exists per viewer session.
///
/// Pro viewers bypass both slot locking and expiry. Their watch time is
/// still accumulated for bookkeeping.
pub struct ViewerGate {
    config: Config,
    is_pro: bool,
    store: Box<dyn WatchStore>,

    state: Mutex<GateState>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug)]
struct GateState {
    watch_time_seconds: u64,
    /// The day stamp the watch time belongs to
    day: String,
    watching: bool,

    show_upgrade_modal: bool,
    upgrade_reason: Option<UpgradeReason>,
}

impl ViewerGate {
    pub fn new(config: Config, is_pro: bool, store: Box<dyn WatchStore>) -> Self {
        Self::restored_at(config, is_pro, store, Utc::now())
    }

    /// Creates a gate as of the given instant. A persisted record from an
    /// earlier calendar day is discarded, resetting the watch time to zero.
    pub fn restored_at(
        config: Config,
        is_pro: bool,
        store: Box<dyn WatchStore>,
        now: DateTime<Utc>,
    ) -> Self {
        let day = config.day_stamp(now);

        let watch_time_seconds = store
            .load()
            .filter(|record| record.date == day)
            .map(|record| record.time)
            .unwrap_or(0);

        Self {
            config,
            is_pro,
            store,
            state: Mutex::new(GateState {
                watch_time_seconds,
                day,
                watching: false,
                show_upgrade_modal: false,
                upgrade_reason: None,
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Whether the given slot index is off limits for this viewer
    pub fn is_slot_locked(&self, index: usize) -> bool {
        if self.is_pro {
            return false;
        }

        index >= self.config.free_slot_limit
    }

    pub fn watch_time_seconds(&self) -> u64 {
        self.state.lock().watch_time_seconds
    }

    /// Whether the daily budget is used up. Always false for pro viewers.
    pub fn watch_time_expired(&self) -> bool {
        !self.is_pro && self.watch_time_seconds() >= self.config.free_watch_budget_seconds
    }

    pub fn is_watching(&self) -> bool {
        self.state.lock().watching
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.config
            .free_watch_budget_seconds
            .saturating_sub(self.watch_time_seconds())
    }

    /// The remaining budget as `M:SS`
    pub fn format_remaining(&self) -> String {
        let remaining = self.remaining_seconds();

        format!("{}:{:02}", remaining / 60, remaining % 60)
    }

    /// Starts accumulating watch time. Does nothing when the budget is
    /// already exhausted, or when a previous start is still in effect.
    pub fn start_watching(self: &Arc<Self>) {
        if self.watch_time_expired() {
            return;
        }

        {
            let mut state = self.state.lock();

            if state.watching {
                return;
            }

            state.watching = true;
        }

        self.spawn_ticker();
    }

    /// Stops accumulating watch time and releases the timer
    pub fn stop_watching(&self) {
        self.state.lock().watching = false;

        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
    }

    /// Raises the upgrade prompt. Used by the grid when a locked slot is
    /// selected.
    pub fn prompt_upgrade(&self, reason: UpgradeReason) {
        let mut state = self.state.lock();

        state.show_upgrade_modal = true;
        state.upgrade_reason = Some(reason);
    }

    pub fn show_upgrade_modal(&self) -> bool {
        self.state.lock().show_upgrade_modal
    }

    pub fn upgrade_reason(&self) -> Option<UpgradeReason> {
        self.state.lock().upgrade_reason
    }

    /// Clears the upgrade prompt after the viewer has seen it
    pub fn dismiss_upgrade_prompt(&self) {
        let mut state = self.state.lock();

        state.show_upgrade_modal = false;
        state.upgrade_reason = None;
    }

    /// Advances the watch time by one second, persisting the new value.
    /// Returns false once accumulation should stop.
    fn tick(&self) -> bool {
        let mut state = self.state.lock();

        if !state.watching {
            return false;
        }

        state.watch_time_seconds += 1;

        let expired =
            !self.is_pro && state.watch_time_seconds >= self.config.free_watch_budget_seconds;

        if expired {
            // Expiry is a single transition: accumulation stops and the
            // upgrade prompt is raised before the lock is released
            state.watching = false;
            state.show_upgrade_modal = true;
            state.upgrade_reason = Some(UpgradeReason::WatchTimeExpired);

            info!("Watch budget exhausted for the day");
        }

        self.store.save(&WatchRecord {
            time: state.watch_time_seconds,
            date: state.day.clone(),
        });

        !expired
    }

    /// Spawns the once-per-second tick task. Only one task may be live at
    /// a time per gate.
    fn spawn_ticker(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock();

        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let gate: Weak<Self> = Arc::downgrade(self);

        *ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));

            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let Some(gate) = gate.upgrade() else { break };

                if !gate.tick() {
                    break;
                }
            }
        }));
    }
}

impl Drop for ViewerGate {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 2, 12, 0, 0).unwrap()
    }

    fn gate_with_time(time: u64, is_pro: bool) -> (Arc<ViewerGate>, Arc<MemoryWatchStore>) {
        let store = Arc::new(MemoryWatchStore::with_record(WatchRecord {
            time,
            date: "2023-01-02".to_string(),
        }));

        let gate = Arc::new(ViewerGate::restored_at(
            Config::default(),
            is_pro,
            Box::new(store.clone()),
            today(),
        ));

        (gate, store)
    }

    #[test]
    fn test_slot_lock_boundary() {
        let (free, _) = gate_with_time(0, false);

        assert!(!free.is_slot_locked(0));
        assert!(!free.is_slot_locked(4));
        assert!(free.is_slot_locked(5));
        assert!(free.is_slot_locked(7));

        let (pro, _) = gate_with_time(0, true);

        assert!(!pro.is_slot_locked(0));
        assert!(!pro.is_slot_locked(5));
        assert!(!pro.is_slot_locked(7));
    }

    #[tokio::test]
    async fn test_expiry_is_atomic() {
        let (gate, store) = gate_with_time(899, false);

        gate.start_watching();
        assert!(gate.is_watching());

        // The tick that crosses the budget stops the session, marks the
        // reason, and raises the prompt all at once
        assert!(!gate.tick());

        assert!(gate.watch_time_expired());
        assert!(!gate.is_watching());
        assert!(gate.show_upgrade_modal());
        assert_eq!(gate.upgrade_reason(), Some(UpgradeReason::WatchTimeExpired));

        // The final second was persisted
        assert_eq!(store.load().unwrap().time, 900);
    }

    #[tokio::test]
    async fn test_start_after_expiry_is_a_noop() {
        let (gate, _) = gate_with_time(900, false);

        assert!(gate.watch_time_expired());

        gate.start_watching();
        assert!(!gate.is_watching());
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_a_noop() {
        let (gate, _) = gate_with_time(0, false);

        gate.stop_watching();
        assert!(!gate.is_watching());
    }

    #[tokio::test]
    async fn test_pro_never_expires() {
        let (gate, _) = gate_with_time(900, true);

        assert!(!gate.watch_time_expired());

        gate.start_watching();
        assert!(gate.is_watching());

        // Accumulation continues for bookkeeping
        assert!(gate.tick());
        assert_eq!(gate.watch_time_seconds(), 901);
        assert!(!gate.watch_time_expired());
        assert!(!gate.show_upgrade_modal());
    }

    #[test]
    fn test_day_rollover_resets_watch_time() {
        let store = MemoryWatchStore::with_record(WatchRecord {
            time: 800,
            date: "2023-01-01".to_string(),
        });

        let gate =
            ViewerGate::restored_at(Config::default(), false, Box::new(store), today());

        assert_eq!(gate.watch_time_seconds(), 0);
        assert!(!gate.watch_time_expired());
    }

    #[test]
    fn test_same_day_restore_keeps_watch_time() {
        let (gate, _) = gate_with_time(800, false);

        assert_eq!(gate.watch_time_seconds(), 800);
    }

    #[test]
    fn test_format_remaining() {
        let (fresh, _) = gate_with_time(0, false);
        assert_eq!(fresh.format_remaining(), "15:00");

        let (partial, _) = gate_with_time(831, false);
        assert_eq!(partial.format_remaining(), "1:09");

        let (expired, _) = gate_with_time(900, false);
        assert_eq!(expired.format_remaining(), "0:00");
    }

    #[tokio::test]
    async fn test_ticks_accumulate_and_persist() {
        let (gate, store) = gate_with_time(0, false);

        gate.start_watching();

        assert!(gate.tick());
        assert!(gate.tick());
        assert!(gate.tick());

        assert_eq!(gate.watch_time_seconds(), 3);
        assert_eq!(
            store.load(),
            Some(WatchRecord {
                time: 3,
                date: "2023-01-02".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_second_start_is_a_noop() {
        let (gate, _) = gate_with_time(0, false);

        gate.start_watching();
        gate.start_watching();

        assert!(gate.is_watching());

        // A single stop tears the one live ticker down
        gate.stop_watching();

        assert!(!gate.is_watching());
        assert!(gate.ticker.lock().is_none());
    }

    #[tokio::test]
    async fn test_stop_releases_the_ticker() {
        let (gate, _) = gate_with_time(0, false);

        gate.start_watching();
        assert!(gate.ticker.lock().is_some());

        gate.stop_watching();
        assert!(gate.ticker.lock().is_none());

        // Ticks after stopping are ignored
        assert!(!gate.tick());
        assert_eq!(gate.watch_time_seconds(), 0);
    }

    #[tokio::test]
    async fn test_dismissing_the_upgrade_prompt() {
        let (gate, _) = gate_with_time(0, false);

        gate.prompt_upgrade(UpgradeReason::LockedSlot);
        assert!(gate.show_upgrade_modal());
        assert_eq!(gate.upgrade_reason(), Some(UpgradeReason::LockedSlot));

        gate.dismiss_upgrade_prompt();
        assert!(!gate.show_upgrade_modal());
        assert_eq!(gate.upgrade_reason(), None);
    }
}
