//! Agent configuration from environment variables and command-line flags.
//! Flags win over the environment; bad values fall back with a warning.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;
pub const DEFAULT_CLIENT_BUFFER: usize = 8;
/// Upper bound for both queue depths; tokio channels reject huge capacities.
pub const MAX_BUFFER: usize = 65_536;

pub const ENV_PORT: &str = "PORT";
pub const ENV_INTERVAL_MS: &str = "HOSTWATCH_INTERVAL_MS";
pub const ENV_QUEUE_CAPACITY: &str = "HOSTWATCH_QUEUE_CAPACITY";
pub const ENV_CLIENT_BUFFER: &str = "HOSTWATCH_CLIENT_BUFFER";
pub const ENV_DISK_PATH: &str = "HOSTWATCH_DISK_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub port: u16,
    pub interval: Duration,
    pub queue_capacity: usize,
    pub client_buffer: usize,
    /// None picks `/hostfs` when present, else `/`.
    pub disk_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            interval: DEFAULT_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            client_buffer: DEFAULT_CLIENT_BUFFER,
            disk_path: None,
        }
    }
}

#[derive(Debug)]
pub enum Cli {
    Run(AgentConfig),
    Help(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT] [--interval-ms MS]\n\
         \n\
         Environment:\n  \
         {ENV_PORT}                      listen port (default {DEFAULT_PORT})\n  \
         {ENV_INTERVAL_MS}     sampling period in ms (default {})\n  \
         {ENV_QUEUE_CAPACITY}  dispatch queue depth (default {DEFAULT_QUEUE_CAPACITY})\n  \
         {ENV_CLIENT_BUFFER}   per-client buffer depth (default {DEFAULT_CLIENT_BUFFER})\n  \
         {ENV_DISK_PATH}       filesystem to report (default / or /hostfs)",
        DEFAULT_INTERVAL.as_millis()
    )
}

impl AgentConfig {
    pub fn from_env_and_args() -> Result<Cli, String> {
        Self::parse(std::env::args(), |k| std::env::var(k).ok())
    }

    pub fn parse<I, F>(args: I, env: F) -> Result<Cli, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut it = args.into_iter();
        let prog = it.next().unwrap_or_else(|| "hostwatch_agent".into());

        let mut port = env(ENV_PORT);
        let mut interval_ms = env(ENV_INTERVAL_MS);
        while let Some(a) = it.next() {
            match a.as_str() {
                "-h" | "--help" => return Ok(Cli::Help(usage(&prog))),
                "--port" | "-p" => port = it.next(),
                "--interval-ms" => interval_ms = it.next(),
                _ if a.starts_with("--port=") => port = a.split_once('=').map(|(_, v)| v.into()),
                _ if a.starts_with("--interval-ms=") => {
                    interval_ms = a.split_once('=').map(|(_, v)| v.into())
                }
                _ => return Err(format!("unexpected argument '{a}'\n{}", usage(&prog))),
            }
        }

        let interval_ms = parse_or(
            "interval",
            interval_ms,
            DEFAULT_INTERVAL.as_millis() as u64,
            |v| *v > 0,
        );
        Ok(Cli::Run(AgentConfig {
            port: parse_or("port", port, DEFAULT_PORT, |_| true),
            interval: Duration::from_millis(interval_ms),
            queue_capacity: parse_or(
                "queue capacity",
                env(ENV_QUEUE_CAPACITY),
                DEFAULT_QUEUE_CAPACITY,
                |v| (1..=MAX_BUFFER).contains(v),
            ),
            client_buffer: parse_or(
                "client buffer",
                env(ENV_CLIENT_BUFFER),
                DEFAULT_CLIENT_BUFFER,
                |v| (1..=MAX_BUFFER).contains(v),
            ),
            disk_path: env(ENV_DISK_PATH)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }))
    }
}

fn parse_or<T>(what: &str, raw: Option<String>, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!("invalid {what} '{raw}', using default");
            default
        }
    }
}
