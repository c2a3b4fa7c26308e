use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::{
        fs,
        time::Duration,
    },
    time::OffsetDateTime,
};

mod server;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the bid arbitration service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,

    /// Integer number identifying this node in the cluster. Shard
    /// assignments in the ownership table refer to this value.
    #[arg(long = "node-id")]
    #[arg(env = "NODE_ID")]
    pub node_id: i32,

    /// Postgres connection string for the keyed aggregate store and the
    /// bid ledger.
    #[arg(long = "database-url")]
    #[arg(env = "DATABASE_URL")]
    pub database_url: String,

    /// ClickHouse endpoint for completion-stats telemetry. When omitted,
    /// stats are dropped.
    #[arg(long = "analytics-url")]
    #[arg(env = "ANALYTICS_URL")]
    pub analytics_url: Option<String>,

    /// ClickHouse database holding the completion-stats table.
    #[arg(long = "analytics-database")]
    #[arg(env = "ANALYTICS_DATABASE")]
    #[arg(default_value = "arbiter")]
    pub analytics_database: String,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the cluster-agreed values
    /// (simulated start, timing windows, wait bounds).
    #[arg(long = "config")]
    #[arg(env = "ARBITER_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Target start of the simulated timeline. Every node derives its
    /// clock-offset candidate from this; the elected offset is shared.
    #[serde(with = "time::serde::rfc3339")]
    pub simulated_start: OffsetDateTime,

    pub timing: TimingConfig,

    /// Bound on a long-poll wait before the observer is released with no
    /// update.
    #[serde(with = "humantime_serde")]
    pub long_poll_timeout: Duration,

    /// Bound on item-lock acquisition before a bid fails retryably.
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,

    /// How often the sweeper looks for items whose deadline elapsed.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,

    /// How often the shard map snapshot is reloaded.
    #[serde(with = "humantime_serde")]
    pub ownership_refresh_interval: Duration,
}

/// The state-machine windows. Deliberately configuration, not constants.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimingConfig {
    /// Quiet period after the latest accepted bid before last call.
    #[serde(with = "humantime_serde")]
    pub last_call: Duration,
    /// Final countdown; a new high bid restarts it.
    #[serde(with = "humantime_serde")]
    pub close: Duration,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}
