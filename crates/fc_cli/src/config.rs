use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use fc_cache::CacheConfig;
use fc_sources::SourceConfig;

/// Accepts `90`, `45s`, `30m`, `1h15m30s`, `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let overflow = || format!("Duration too large: {}", s);
        let mut total: u64 = 0;
        let mut pending: Option<u64> = None;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if let Some(digit) = c.to_digit(10) {
                let value = pending
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit)))
                    .ok_or_else(overflow)?;
                pending = Some(value);
                continue;
            }
            let factor = unit_seconds(c).ok_or_else(|| format!("Invalid duration unit: {}", c))?;
            let amount = pending.take().ok_or_else(|| format!("Unit {} has no number", c))?;
            total = amount
                .checked_mul(factor)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(overflow)?;
        }

        // A bare trailing number counts as seconds
        match pending {
            Some(secs) => total = total.checked_add(secs).ok_or_else(overflow)?,
            None if s.trim().is_empty() => return Err("Duration must include a number".to_string()),
            None => {}
        }

        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

/// Settings shared by every subcommand. Each flag can also come from the
/// environment.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// How long a fetched feed is served before it is refreshed
    #[arg(long, env = "FEEDCACHE_TTL", default_value = "30m")]
    pub ttl: HumanDuration,

    /// Per-request timeout for provider calls
    #[arg(long, env = "FEEDCACHE_FETCH_TIMEOUT", default_value = "10s")]
    pub fetch_timeout: HumanDuration,

    /// Items requested per category or topic
    #[arg(long, env = "FEEDCACHE_MAX_RESULTS", default_value_t = fc_cache::config::DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    #[arg(long, env = "FEEDCACHE_BOOKS_URL", default_value = fc_sources::config::DEFAULT_BOOKS_URL)]
    pub books_url: String,

    #[arg(long, env = "FEEDCACHE_ARXIV_URL", default_value = fc_sources::config::DEFAULT_ARXIV_URL)]
    pub arxiv_url: String,

    /// Return an empty feed instead of the last good one when every fetch fails
    #[arg(long, env = "FEEDCACHE_NO_STALE")]
    pub no_stale: bool,
}

impl Settings {
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::default()
            .with_books_url(&self.books_url)
            .with_arxiv_url(&self.arxiv_url)
            .with_timeout(self.fetch_timeout.0)
    }

    pub fn cache_config(&self) -> CacheConfig {
        // The outer task guard sits a little above the HTTP timeout so the
        // client's own error wins when both would fire.
        let mut config = CacheConfig::default()
            .with_ttl(self.ttl.0)
            .with_fetch_timeout(self.fetch_timeout.0 + Duration::from_secs(1))
            .with_stale_fallback(!self.no_stale);
        config.default_max_results = self.max_results;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_human_duration() {
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(1800));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("1h 5".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3605));
    }

    #[test]
    fn test_reject_bad_durations() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("ten".parse::<HumanDuration>().is_err());
        assert!("5mm".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_huge_durations_are_errors() {
        assert!("999999999999999999d".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
    }
}
