use crate::fetcher::DEFAULT_BASE_URL;
use crate::monitor::Schedule;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "odpt-live-map",
    about = "Polls ODPT train positions and serves interpolated map frames",
    version
)]
pub struct Config {
    /// ODPT consumer key. Left empty, requests still go out and the API
    /// answers with its own auth error.
    #[arg(long, env = "ODPT_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "ODPT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Language code used for station names and status text
    #[arg(long, env = "ODPT_LANGUAGE", default_value = "ja")]
    pub language: String,

    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..))]
    pub train_refresh_ms: u64,

    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Re-fetch congestion every N seconds (default: once at startup)
    #[arg(
        long,
        env = "ODPT_CONGESTION_REFRESH_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub congestion_refresh_secs: Option<u64>,

    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            train_refresh: Duration::from_millis(self.train_refresh_ms),
            tick: Duration::from_millis(self.tick_ms),
            congestion_refresh: self.congestion_refresh_secs.map(Duration::from_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
