use crate::error::Rejection;
use crate::storage::HashrateConfig;

/// Displayed mining speed in Gh/s. Cosmetic: it never changes accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hashrate {
    pub current: u32,
    pub max: u32,
}

impl Hashrate {
    /// Stored values above the max are clamped; garbage reads as the initial rate.
    pub fn parse(raw: Option<&str>, config: &HashrateConfig) -> Self {
        let current = raw
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(config.initial)
            .min(config.max);
        Self {
            current,
            max: config.max,
        }
    }

    /// # Errors
    /// [`Rejection::HashrateMaxed`] when already at the max.
    pub fn boosted(&self, step: u32) -> Result<Self, Rejection> {
        if self.current >= self.max {
            return Err(Rejection::HashrateMaxed { max: self.max });
        }
        Ok(Self {
            current: self.current.saturating_add(step).min(self.max),
            max: self.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_steps_to_max() {
        let config = HashrateConfig::default();
        let mut rate = Hashrate::parse(None, &config);
        assert_eq!(rate.current, 30);
        for _ in 0..7 {
            rate = rate.boosted(config.step).unwrap();
        }
        assert_eq!(rate.current, 100);
        assert_eq!(rate.boosted(config.step), Err(Rejection::HashrateMaxed { max: 100 }));
    }

    #[test]
    fn parse_clamps() {
        let config = HashrateConfig::default();
        assert_eq!(Hashrate::parse(Some("250"), &config).current, 100);
        assert_eq!(Hashrate::parse(Some("fast"), &config).current, 30);
    }
}
