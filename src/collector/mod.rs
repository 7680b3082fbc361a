//! Statistics collector for cache-server clusters.
//!
//! Each tick opens one short-lived TCP connection per host, issues
//! `stats`, `stats settings` and `stats slabs`, and turns the three
//! response blocks into a [`HostSnapshot`]. Hosts are probed concurrently
//! and every probe yields an explicit result; nothing is silently dropped.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  collect_cluster()                   │
//! │   one scoped thread per endpoint, joined per tick    │
//! │                          │                           │
//! │                   ┌──────▼──────┐                    │
//! │                   │ StatsSource │ (trait)            │
//! │                   └──────┬──────┘                    │
//! └──────────────────────────┼───────────────────────────┘
//!                ┌───────────┴───────────┐
//!         ┌──────▼─────────┐      ┌──────▼──────┐
//!         │ TcpStatsSource │      │ MockSource  │
//!         │  (protocol.rs) │      │ (Testing)   │
//!         └────────────────┘      └─────────────┘
//! ```

pub mod mock;
pub mod protocol;

use std::fmt;
use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::model::{HostEndpoint, HostSnapshot};
use crate::util::now_secs;

pub use mock::MockSource;

/// Why a single host probe failed.
#[derive(Debug)]
pub enum CollectError {
    /// Resolution, connect or socket failure.
    Io(io::Error),
    /// The configured timeout elapsed while connecting or reading.
    Timeout,
    /// The server sent something other than a well-formed stats block.
    Protocol(String),
    /// A consumed field carried a value that is not a number.
    Parse(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Timeout => write!(f, "timed out"),
            CollectError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            CollectError::Parse(msg) => write!(f, "malformed value: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => CollectError::Timeout,
            _ => CollectError::Io(e),
        }
    }
}

/// Outcome of probing one endpoint.
pub type ProbeResult = (HostEndpoint, Result<HostSnapshot, CollectError>);

/// Something that can produce one host's snapshot.
///
/// Implementations must be shareable across the probe threads of a tick.
pub trait StatsSource: Send + Sync {
    fn probe(&self, endpoint: &HostEndpoint) -> Result<HostSnapshot, CollectError>;
}

/// Probes real servers over TCP.
#[derive(Debug, Clone)]
pub struct TcpStatsSource {
    timeout: Duration,
}

impl TcpStatsSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The timeout bounds each connect attempt. Name resolution happens
    /// before it and is not bounded; a slow resolver stalls the whole tick.
    fn connect(&self, endpoint: &HostEndpoint) -> Result<TcpStream, CollectError> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()?
            .collect();
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => e.into(),
            None => CollectError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses for {}", endpoint),
            )),
        })
    }
}

impl StatsSource for TcpStatsSource {
    fn probe(&self, endpoint: &HostEndpoint) -> Result<HostSnapshot, CollectError> {
        let probed_at = now_secs();
        let stream = self.connect(endpoint)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;

        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let raw = protocol::exchange(&mut reader, &mut writer, probed_at)?;
        protocol::build_snapshot(endpoint.clone(), &raw)
    }
}

/// Probes every endpoint concurrently and waits for all of them.
///
/// Results come back in endpoint order, one per endpoint.
pub fn collect_cluster<S: StatsSource + ?Sized>(
    source: &S,
    endpoints: &[HostEndpoint],
) -> Vec<ProbeResult> {
    let started = Instant::now();
    let results: Vec<ProbeResult> = std::thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .iter()
            .map(|endpoint| (endpoint, scope.spawn(move || source.probe(endpoint))))
            .collect();
        handles
            .into_iter()
            .map(|(endpoint, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(CollectError::Protocol("probe thread panicked".to_string()))
                });
                (endpoint.clone(), result)
            })
            .collect()
    });

    for (endpoint, result) in &results {
        match result {
            Ok(snap) => debug!(
                host = %endpoint,
                latency_ms = snap.counters.latency * 1000.0,
                "probe ok"
            ),
            Err(e) => warn!(host = %endpoint, error = %e, "probe failed"),
        }
    }
    debug!(
        hosts = endpoints.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "collection pass finished"
    );
    results
}
