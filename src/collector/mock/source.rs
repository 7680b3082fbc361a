use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use crate::collector::{CollectError, StatsSource};
use crate::model::{HostEndpoint, HostSnapshot};

enum Reply {
    Snapshot(HostSnapshot),
    Error(fn() -> CollectError),
}

impl Reply {
    fn produce(&self) -> Result<HostSnapshot, CollectError> {
        match self {
            Reply::Snapshot(s) => Ok(s.clone()),
            Reply::Error(make) => Err(make()),
        }
    }
}

/// In-memory `StatsSource`.
///
/// Replies queued for an endpoint are consumed one per probe; the last one
/// repeats forever. Endpoints with no replies fail with `NotFound`.
#[derive(Default)]
pub struct MockSource {
    replies: Mutex<HashMap<HostEndpoint, VecDeque<Reply>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply for the snapshot's own endpoint.
    pub fn with_snapshot(self, snapshot: HostSnapshot) -> Self {
        self.push(snapshot.endpoint.clone(), Reply::Snapshot(snapshot));
        self
    }

    /// Queues a failing reply.
    pub fn with_error(self, endpoint: &HostEndpoint, make: fn() -> CollectError) -> Self {
        self.push(endpoint.clone(), Reply::Error(make));
        self
    }

    fn push(&self, endpoint: HostEndpoint, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(endpoint).or_default().push_back(reply);
        }
    }
}

impl StatsSource for MockSource {
    fn probe(&self, endpoint: &HostEndpoint) -> Result<HostSnapshot, CollectError> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| CollectError::Protocol("mock source poisoned".to_string()))?;
        let queue = replies.get_mut(endpoint).ok_or_else(|| {
            CollectError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no mock reply for {}", endpoint),
            ))
        })?;
        if queue.len() > 1
            && let Some(reply) = queue.pop_front()
        {
            return reply.produce();
        }
        match queue.front() {
            Some(reply) => reply.produce(),
            None => Err(CollectError::Protocol("empty mock queue".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios;

    #[test]
    fn last_reply_repeats() {
        let ep = HostEndpoint::new("a", 1);
        let mut second = scenarios::host_snapshot(&ep);
        second.counters.uptime = 99;
        let source = MockSource::new()
            .with_snapshot(scenarios::host_snapshot(&ep))
            .with_snapshot(second);

        assert_eq!(source.probe(&ep).unwrap().counters.uptime, 3600);
        assert_eq!(source.probe(&ep).unwrap().counters.uptime, 99);
        assert_eq!(source.probe(&ep).unwrap().counters.uptime, 99);
    }

    #[test]
    fn unknown_endpoint_fails() {
        let source = MockSource::new();
        assert!(source.probe(&HostEndpoint::new("nowhere", 1)).is_err());
    }
}
