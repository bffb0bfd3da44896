use serde::{Deserialize, Serialize};

/// Seven-slot daily bonus streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreak {
    pub day_index: u8,
    pub last_claim_ms: Option<i64>,
}

impl DailyStreak {
    pub const DAYS: u8 = 7;

    /// Out-of-range or unparsable indices restart the streak.
    pub fn parse_index(raw: Option<&str>) -> u8 {
        raw.and_then(|s| s.trim().parse::<u8>().ok())
            .filter(|day| *day < Self::DAYS)
            .unwrap_or(0)
    }

    pub fn reward(&self, table: &[u64]) -> u64 {
        table.get(self.day_index as usize).copied().unwrap_or(0)
    }

    pub fn next_index(&self) -> u8 {
        (self.day_index + 1) % Self::DAYS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [u64; 7] = [100, 200, 300, 400, 500, 600, 700];

    #[test]
    fn wraps_after_last_day() {
        let streak = DailyStreak {
            day_index: 6,
            last_claim_ms: None,
        };
        assert_eq!(streak.reward(&TABLE), 700);
        assert_eq!(streak.next_index(), 0);
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert_eq!(DailyStreak::parse_index(Some("3")), 3);
        assert_eq!(DailyStreak::parse_index(Some("7")), 0);
        assert_eq!(DailyStreak::parse_index(Some("-1")), 0);
        assert_eq!(DailyStreak::parse_index(None), 0);
    }
}
