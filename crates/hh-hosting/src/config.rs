use std::time::Duration;

use hh_core::Chips;
use hh_engine::HandControl;

/// Process configuration, read once at startup from the environment (§10.4),
/// matching the teacher's own `std::env::var("BIND_ADDR")` convention rather
/// than introducing a config file format.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub bind_addr: String,
    pub seats: usize,
    pub starting_stack: Chips,
    pub sb: Chips,
    pub bb: Chips,
    pub move_time_ms: u64,
    pub hand_control: HandControl,
    pub presentation: bool,
    pub presentation_delay_ms: u64,
}

impl HostConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            seats: env_parse("SEATS", 6)?,
            starting_stack: env_parse("STARTING_STACK", 10_000)?,
            sb: env_parse("SB", 50)?,
            bb: env_parse("BB", 100)?,
            move_time_ms: env_parse("MOVE_TIME_MS", 20_000)?,
            hand_control: match std::env::var("HAND_CONTROL").unwrap_or_else(|_| "auto".to_string()).as_str() {
                "operator" => HandControl::Operator,
                _ => HandControl::Auto,
            },
            presentation: env_parse::<u8>("PRESENTATION", 0)? != 0,
            presentation_delay_ms: env_parse("PRESENTATION_DELAY_MS", 1_500)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(2..=10).contains(&self.seats) {
            anyhow::bail!("SEATS must be in [2, 10], got {}", self.seats);
        }
        if self.bb < 2 * self.sb {
            anyhow::bail!("BB ({}) must be at least twice SB ({})", self.bb, self.sb);
        }
        if self.sb <= 0 || self.bb <= 0 {
            anyhow::bail!("SB and BB must be positive");
        }
        Ok(())
    }

    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }

    pub fn presentation_delay(&self) -> Option<Duration> {
        self.presentation.then(|| Duration::from_millis(self.presentation_delay_ms))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bb_smaller_than_twice_sb() {
        let config = HostConfig {
            bind_addr: "0.0.0.0:0".to_string(),
            seats: 6,
            starting_stack: 10_000,
            sb: 50,
            bb: 75,
            move_time_ms: 20_000,
            hand_control: HandControl::Auto,
            presentation: false,
            presentation_delay_ms: 1_500,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_seat_count_outside_band() {
        let mut config = HostConfig {
            bind_addr: "0.0.0.0:0".to_string(),
            seats: 1,
            starting_stack: 10_000,
            sb: 50,
            bb: 100,
            move_time_ms: 20_000,
            hand_control: HandControl::Auto,
            presentation: false,
            presentation_delay_ms: 1_500,
        };
        assert!(config.validate().is_err());
        config.seats = 11;
        assert!(config.validate().is_err());
        config.seats = 9;
        assert!(config.validate().is_ok());
    }
}
