use chrono::{DateTime, FixedOffset, Utc};

/// The configuration of a gridcast deployment
#[derive(Debug, Clone)]
pub struct Config {
    /// How many stream slots a company can configure
    pub total_slots: usize,
    /// How many leading slot indices stay unlocked for free viewers
    pub free_slot_limit: usize,
    /// The daily watch allowance for free viewers, in seconds
    pub free_watch_budget_seconds: u64,
    /// Offset from UTC in seconds, deciding when the daily budget resets
    pub utc_offset_seconds: i32,
}

impl Config {
    /// The calendar day the given instant falls on, as a `YYYY-MM-DD` stamp
    /// in the configured timezone
    pub fn day_stamp(&self, at: DateTime<Utc>) -> String {
        let offset =
            FixedOffset::east_opt(self.utc_offset_seconds).expect("utc offset is within range");

        at.with_timezone(&offset)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    }

    /// How many slots are locked for free viewers
    pub fn locked_slot_count(&self) -> usize {
        self.total_slots.saturating_sub(self.free_slot_limit)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // A 4x2 grid of players
            total_slots: 8,
            // Free viewers get the first five slots
            free_slot_limit: 5,
            // 15 minutes per day
            free_watch_budget_seconds: 60 * 15,
            // Budgets roll over at UTC midnight unless configured otherwise
            utc_offset_seconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_stamp() {
        let config = Config::default();
        let late_evening = Utc.with_ymd_and_hms(2023, 1, 1, 23, 30, 0).unwrap();

        assert_eq!(config.day_stamp(late_evening), "2023-01-01");
    }

    #[test]
    fn test_day_stamp_with_offset() {
        let config = Config {
            // UTC+2, so 23:30 UTC is already past midnight
            utc_offset_seconds: 2 * 3600,
            ..Config::default()
        };

        let late_evening = Utc.with_ymd_and_hms(2023, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(config.day_stamp(late_evening), "2023-01-02");

        let config = Config {
            // UTC-5, so half past midnight is still the previous day
            utc_offset_seconds: -5 * 3600,
            ..Config::default()
        };

        let past_midnight = Utc.with_ymd_and_hms(2023, 1, 2, 0, 30, 0).unwrap();
        assert_eq!(config.day_stamp(past_midnight), "2023-01-01");
    }

    #[test]
    fn test_locked_slot_count() {
        assert_eq!(Config::default().locked_slot_count(), 3);
    }
}
