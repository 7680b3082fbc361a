//! Endpoint resolution and display options.
//!
//! Hosts come either from a `-H` list (`host_1:8000-8004,host_2:8000`) or
//! from a YAML cluster config keyed by environment:
//!
//! ```yaml
//! production:
//!   servers:
//!     - cache-01:11211:1
//!     - cache-02:11211:1
//! ```

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::model::{DEFAULT_PORT, HostEndpoint};
use crate::view::Mode;

/// Fallback parent key for environment blocks.
const TIMELINE_KEY: &str = "timeline";

/// Fatal configuration problems, reported before the monitor starts.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Yaml(serde_yml::Error),
    /// No block for the environment at the top level or under `timeline`.
    MissingEnvironment(String),
    /// The environment block has no (or an empty) `servers` list.
    NoServers(String),
    InvalidHost(String),
    /// The resolved endpoint list is empty.
    NoHosts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Yaml(e) => write!(f, "cannot parse config: {}", e),
            ConfigError::MissingEnvironment(env) => {
                write!(f, "can't parse yaml for env {}", env)
            }
            ConfigError::NoServers(env) => write!(f, "no servers for env {}", env),
            ConfigError::InvalidHost(h) => write!(f, "invalid host '{}'", h),
            ConfigError::NoHosts => write!(f, "no hosts to monitor"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yml::Error> for ConfigError {
    fn from(e: serde_yml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

/// Everything the monitor needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub endpoints: Vec<HostEndpoint>,
    /// Poll interval; zero means print once and exit.
    pub interval: Duration,
    /// No colors, no cursor control, no raw mode.
    pub plain: bool,
    pub mode: Mode,
    /// Per-host connect and read timeout.
    pub timeout: Duration,
}

impl Options {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoHosts);
        }
        Ok(())
    }

    pub fn single_shot(&self) -> bool {
        self.interval.is_zero()
    }
}

/// Parses one `host[:port[-end]]` item, expanding a port range.
fn expand_item(item: &str) -> Result<Vec<HostEndpoint>, ConfigError> {
    let invalid = || ConfigError::InvalidHost(item.to_string());
    if let Some((host, ports)) = item.rsplit_once(':')
        && let Some((start, end)) = ports.split_once('-')
    {
        let start: u16 = start.trim().parse().map_err(|_| invalid())?;
        let end: u16 = end.trim().parse().map_err(|_| invalid())?;
        if start > end || host.is_empty() {
            return Err(invalid());
        }
        return Ok((start..=end).map(|p| HostEndpoint::new(host, p)).collect());
    }
    HostEndpoint::from_str(item)
        .map(|ep| vec![ep])
        .map_err(|_| invalid())
}

/// Parses a comma-separated host list. Ports default to 11211.
pub fn parse_host_list(list: &str) -> Result<Vec<HostEndpoint>, ConfigError> {
    let mut endpoints = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        endpoints.extend(expand_item(item)?);
    }
    Ok(endpoints)
}

#[derive(Debug, Deserialize)]
struct EnvBlock {
    #[serde(default)]
    servers: Vec<String>,
}

/// Keeps `host:port` from a `host:port:extra...` server entry.
fn server_address(item: &str) -> &str {
    let mut parts = item.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(host), Some(port), Some(_))
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            &item[..host.len() + 1 + port.len()]
        }
        _ => item,
    }
}

/// Resolves the server list of `env` from YAML `content`.
pub fn parse_cluster_config(content: &str, env: &str) -> Result<Vec<HostEndpoint>, ConfigError> {
    let root: serde_yml::Value = serde_yml::from_str(content)?;
    let block = root
        .get(env)
        .or_else(|| root.get(TIMELINE_KEY).and_then(|t| t.get(env)))
        .ok_or_else(|| ConfigError::MissingEnvironment(env.to_string()))?;
    let block: EnvBlock = serde_yml::from_value(block.clone())?;
    if block.servers.is_empty() {
        return Err(ConfigError::NoServers(env.to_string()));
    }
    block
        .servers
        .iter()
        .map(|item| {
            let addr = server_address(item.trim());
            HostEndpoint::from_str(addr).map_err(|_| ConfigError::InvalidHost(item.clone()))
        })
        .collect()
}

/// Reads a YAML cluster config file and resolves `env`.
pub fn load_cluster_config(path: &Path, env: &str) -> Result<Vec<HostEndpoint>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let endpoints = parse_cluster_config(&content, env)?;
    debug!(path = %path.display(), env, hosts = endpoints.len(), "loaded cluster config");
    Ok(endpoints)
}

/// Default `-H` value.
pub fn default_host() -> String {
    format!("localhost:{}", DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn host_list_with_ranges() {
        let eps = parse_host_list("host_1:8000-8002, host_2:8000,host_3").unwrap();
        let names: Vec<String> = eps.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "host_1:8000",
                "host_1:8001",
                "host_1:8002",
                "host_2:8000",
                "host_3:11211"
            ]
        );
    }

    #[test]
    fn bad_host_items() {
        assert!(matches!(
            parse_host_list("h:9000-8000"),
            Err(ConfigError::InvalidHost(_))
        ));
        assert!(parse_host_list("h:port").is_err());
        assert!(parse_host_list(":11211").is_err());
        assert!(parse_host_list("").unwrap().is_empty());
    }

    #[test]
    fn server_entries_drop_extra_fields() {
        assert_eq!(server_address("cache-01:11211:1"), "cache-01:11211");
        assert_eq!(server_address("cache-01:11211"), "cache-01:11211");
        assert_eq!(server_address("cache-01"), "cache-01");
    }

    #[test]
    fn top_level_environment() {
        let yaml = "production:\n  servers:\n    - a:11211:1\n    - b:11212\n";
        let eps = parse_cluster_config(yaml, "production").unwrap();
        assert_eq!(
            eps,
            vec![HostEndpoint::new("a", 11211), HostEndpoint::new("b", 11212)]
        );
    }

    #[test]
    fn timeline_environment() {
        let yaml = "timeline:\n  development:\n    servers: [\"dev:22122\"]\n";
        let eps = parse_cluster_config(yaml, "development").unwrap();
        assert_eq!(eps, vec![HostEndpoint::new("dev", 22122)]);
    }

    #[test]
    fn missing_environment_and_servers() {
        let yaml = "production:\n  servers:\n    - a:1\nstaging:\n  hash: fnv1a_64\n";
        assert!(matches!(
            parse_cluster_config(yaml, "test"),
            Err(ConfigError::MissingEnvironment(_))
        ));
        assert!(matches!(
            parse_cluster_config(yaml, "staging"),
            Err(ConfigError::NoServers(_))
        ));
        assert!(matches!(
            parse_cluster_config(": : :", "production"),
            Err(ConfigError::Yaml(_)) | Err(ConfigError::MissingEnvironment(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "production:\n  servers:\n    - cache-01:11211:1").unwrap();
        let eps = load_cluster_config(file.path(), "production").unwrap();
        assert_eq!(eps, vec![HostEndpoint::new("cache-01", 11211)]);

        let missing = load_cluster_config(Path::new("/nonexistent/mctop.yml"), "production");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn validate_requires_hosts() {
        let mut opts = Options {
            endpoints: vec![],
            interval: Duration::ZERO,
            plain: false,
            mode: Mode::Slab,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(opts.validate(), Err(ConfigError::NoHosts)));
        assert!(opts.single_shot());
        opts.endpoints.push(HostEndpoint::new("a", 1));
        assert!(opts.validate().is_ok());
    }
}
