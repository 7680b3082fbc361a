//! Parsers for the text statistics protocol.
//!
//! A request is one line (`stats`, `stats settings`, `stats slabs`); the
//! response is a run of `STAT <name> <value>` lines closed by a line that
//! starts with `END`. These are pure functions over `BufRead`/string input
//! so they can be tested without sockets.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, Write};
use std::time::Instant;

use super::CollectError;
use crate::model::{
    Category, Command, CommandTable, GlobalCounters, HostEndpoint, HostSnapshot, SlabStats,
};

/// One parsed `STAT <name> <value>` line.
pub type StatLine = (String, String);

/// Request lines, in the order they are issued on one connection.
pub const REQ_STATS: &[u8] = b"stats\r\n";
pub const REQ_SETTINGS: &[u8] = b"stats settings\r\n";
pub const REQ_SLABS: &[u8] = b"stats slabs\r\n";

/// The three response blocks of one collection pass, unparsed.
#[derive(Debug, Clone, Default)]
pub struct RawStats {
    pub stats: Vec<StatLine>,
    pub settings: Vec<StatLine>,
    pub slabs: Vec<StatLine>,
    /// Wall-clock duration of the `stats` exchange, in seconds.
    pub latency: f64,
    /// Collector wall clock at probe time, used when the server sends no
    /// `aggregate_ts`.
    pub probed_at: f64,
}

/// Reads one response block up to and including its `END` line.
pub fn read_block<R: BufRead>(reader: &mut R) -> Result<Vec<StatLine>, CollectError> {
    let mut lines = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Err(CollectError::Protocol(
                "connection closed before END".to_string(),
            ));
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.starts_with("END") {
            return Ok(lines);
        }
        lines.push(parse_stat_line(line)?);
    }
}

fn parse_stat_line(line: &str) -> Result<StatLine, CollectError> {
    if let Some(rest) = line.strip_prefix("STAT ") {
        let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
        if name.is_empty() {
            return Err(CollectError::Protocol(format!("empty stat name: {:?}", line)));
        }
        return Ok((name.to_string(), value.trim().to_string()));
    }
    if line.starts_with("ERROR")
        || line.starts_with("CLIENT_ERROR")
        || line.starts_with("SERVER_ERROR")
    {
        return Err(CollectError::Protocol(format!("server replied {:?}", line)));
    }
    Err(CollectError::Protocol(format!("unexpected line {:?}", line)))
}

/// Issues the three requests in sequence over one connection.
///
/// `reader` and `writer` are the two halves of the same stream.
pub fn exchange<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    probed_at: f64,
) -> Result<RawStats, CollectError> {
    let started = Instant::now();
    writer.write_all(REQ_STATS)?;
    writer.flush()?;
    let stats = read_block(reader)?;
    let latency = started.elapsed().as_secs_f64();

    writer.write_all(REQ_SETTINGS)?;
    writer.flush()?;
    let settings = read_block(reader)?;

    writer.write_all(REQ_SLABS)?;
    writer.flush()?;
    let slabs = read_block(reader)?;

    Ok(RawStats {
        stats,
        settings,
        slabs,
        latency,
        probed_at,
    })
}

/// Flat name -> value lookup over one block. Later duplicates win.
struct Fields<'a> {
    map: HashMap<&'a str, &'a str>,
}

impl<'a> Fields<'a> {
    fn new(lines: &'a [StatLine]) -> Self {
        Self {
            map: lines
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
        }
    }

    /// Integer field, 0 when absent.
    fn int(&self, name: &str) -> Result<i64, CollectError> {
        Ok(self.opt_int(name)?.unwrap_or(0))
    }

    fn opt_int(&self, name: &str) -> Result<Option<i64>, CollectError> {
        match self.map.get(name) {
            None => Ok(None),
            Some(v) => v
                .parse::<i64>()
                .map(Some)
                .map_err(|_| CollectError::Parse(format!("{} = {:?}", name, v))),
        }
    }

    /// First present field among `names`, 0 when none is present.
    fn first_int(&self, names: &[String]) -> Result<i64, CollectError> {
        for name in names {
            if let Some(v) = self.opt_int(name)? {
                return Ok(v);
            }
        }
        Ok(0)
    }

    fn opt_float(&self, name: &str) -> Result<Option<f64>, CollectError> {
        match self.map.get(name) {
            None => Ok(None),
            Some(v) => v
                .parse::<f64>()
                .map(Some)
                .map_err(|_| CollectError::Parse(format!("{} = {:?}", name, v))),
        }
    }
}

/// Field names that may carry the hit (or miss) count for `cmd`. Retrievals
/// report per key (`get_key_hit`) rather than per request.
fn outcome_names(cmd: Command, outcome: &str) -> [String; 2] {
    [
        format!("{}_{}", cmd.name(), outcome),
        format!("{}_key_{}", cmd.name(), outcome),
    ]
}

/// Builds the per-command table from the `stats` block.
///
/// Only categories the command reports are inserted; the rest stay absent.
pub fn parse_commands(stats: &[StatLine]) -> Result<CommandTable<i64>, CollectError> {
    let fields = Fields::new(stats);
    let mut table = CommandTable::new();
    for cmd in Command::ALL {
        let name = cmd.name();
        table.insert(cmd, Category::Count, fields.int(name)?);
        table.insert(cmd, Category::Error, fields.int(&format!("{}_error", name))?);
        if cmd.reports(Category::Success) {
            table.insert(
                cmd,
                Category::Success,
                fields.int(&format!("{}_success", name))?,
            );
        }
        if cmd.reports(Category::Hit) {
            table.insert(cmd, Category::Hit, fields.first_int(&outcome_names(cmd, "hit"))?);
            table.insert(cmd, Category::Miss, fields.first_int(&outcome_names(cmd, "miss"))?);
        }
        if let Some(field) = cmd.exist_field() {
            table.insert(cmd, Category::Exist, fields.int(field)?);
        }
    }
    Ok(table)
}

/// Groups `<index>:<field>` lines into per-slab blocks, ordered by index.
///
/// Names without an index prefix are summary lines and are skipped.
pub fn group_slab_blocks(
    slabs: &[StatLine],
) -> Result<Vec<BTreeMap<String, i64>>, CollectError> {
    let mut blocks: BTreeMap<usize, BTreeMap<String, i64>> = BTreeMap::new();
    for (name, value) in slabs {
        let Some((index, field)) = name.split_once(':') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let value = value
            .parse::<i64>()
            .map_err(|_| CollectError::Parse(format!("{} = {:?}", name, value)))?;
        blocks
            .entry(index)
            .or_default()
            .insert(field.to_string(), value);
    }
    Ok(blocks.into_values().collect())
}

/// Builds the chunk-size keyed slab table. Blocks without `chunk_size` are
/// incomplete or reserved classes and are dropped.
pub fn parse_slabs(slabs: &[StatLine]) -> Result<BTreeMap<u64, SlabStats>, CollectError> {
    let mut table: BTreeMap<u64, SlabStats> = BTreeMap::new();
    for block in group_slab_blocks(slabs)? {
        let Some(&chunk_size) = block.get("chunk_size") else {
            continue;
        };
        let chunk_size = u64::try_from(chunk_size)
            .map_err(|_| CollectError::Parse(format!("chunk_size = {}", chunk_size)))?;
        let get = |field: &str| block.get(field).copied().unwrap_or(0);
        let first = |names: &[String]| {
            names
                .iter()
                .find_map(|n| block.get(n.as_str()).copied())
                .unwrap_or(0)
        };
        let locate = Command::ALL
            .iter()
            .filter(|c| c.reports(Category::Hit))
            .map(|&c| first(&outcome_names(c, "hit")))
            .sum();
        let insert = Command::ALL
            .iter()
            .filter(|c| c.reports(Category::Success))
            .map(|c| get(&format!("{}_success", c.name())))
            .sum();
        let stats = SlabStats {
            slab_curr: get("slab_curr"),
            item_curr: get("item_curr"),
            data_curr: get("data_curr"),
            data_value: get("data_value_curr"),
            evictions: get("item_evict"),
            slab_evictions: get("slab_evict"),
            expirations: get("item_expire"),
            locate,
            insert,
        };
        table.entry(chunk_size).or_default().add(&stats);
    }
    Ok(table)
}

/// Turns the three raw blocks of one host into a snapshot.
pub fn build_snapshot(endpoint: HostEndpoint, raw: &RawStats) -> Result<HostSnapshot, CollectError> {
    let stats = Fields::new(&raw.stats);
    let settings = Fields::new(&raw.settings);
    let commands = parse_commands(&raw.stats)?;
    let requests = commands
        .iter()
        .filter(|&(_, cat, _)| cat == Category::Count)
        .map(|(_, _, v)| v)
        .sum();

    let counters = GlobalCounters {
        uptime: stats.int("uptime")?,
        connections: stats.int("conn_curr")?,
        data: stats.int("data_curr")?,
        max_bytes: settings.int("maxbytes")?,
        requests,
        expirations: stats.int("item_expire")?,
        evictions: stats.int("item_evict")?,
        bytes_read: stats.int("data_read")?,
        bytes_written: stats.int("data_written")?,
        server_errors: stats.int("server_error")?,
        latency: raw.latency,
        timestamp: stats.opt_float("aggregate_ts")?.unwrap_or(raw.probed_at),
    };

    Ok(HostSnapshot {
        endpoint,
        counters,
        slabs: parse_slabs(&raw.slabs)?,
        commands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios;
    use std::io::Cursor;

    fn lines(pairs: &[(&str, &str)]) -> Vec<StatLine> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn read_block_stops_at_end() {
        let mut input = Cursor::new("STAT uptime 42\r\nSTAT pid 7\r\nEND\r\nSTAT after 1\r\n");
        let block = read_block(&mut input).unwrap();
        assert_eq!(block, lines(&[("uptime", "42"), ("pid", "7")]));
    }

    #[test]
    fn read_block_keeps_empty_values() {
        let mut input = Cursor::new("STAT interface \r\nEND\r\n");
        let block = read_block(&mut input).unwrap();
        assert_eq!(block, lines(&[("interface", "")]));
    }

    #[test]
    fn read_block_fails_on_eof() {
        let mut input = Cursor::new("STAT uptime 42\r\n");
        let err = read_block(&mut input).unwrap_err();
        assert!(matches!(err, CollectError::Protocol(_)));
    }

    #[test]
    fn read_block_fails_on_error_reply() {
        let mut input = Cursor::new("ERROR\r\n");
        assert!(matches!(
            read_block(&mut input),
            Err(CollectError::Protocol(_))
        ));
        let mut input = Cursor::new("garbage\r\nEND\r\n");
        assert!(read_block(&mut input).is_err());
    }

    #[test]
    fn exchange_issues_requests_in_order() {
        let transcript = format!(
            "{}{}{}",
            scenarios::STATS,
            scenarios::SETTINGS,
            scenarios::SLABS
        );
        let mut reader = Cursor::new(transcript);
        let mut written = Vec::new();
        let raw = exchange(&mut reader, &mut written, 1.0).unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "stats\r\nstats settings\r\nstats slabs\r\n"
        );
        assert!(!raw.stats.is_empty());
        assert!(!raw.settings.is_empty());
        assert!(!raw.slabs.is_empty());
        assert!(raw.latency >= 0.0);
    }

    #[test]
    fn commands_respect_category_subsets() {
        let stats = lines(&[
            ("set", "10"),
            ("set_success", "9"),
            ("get", "20"),
            ("get_key_hit", "15"),
            ("get_key_miss", "5"),
            ("cas", "4"),
            ("cas_badval", "1"),
            ("add_exist", "2"),
            ("delete_hit", "3"),
        ]);
        let t = parse_commands(&stats).unwrap();
        assert_eq!(t.get(Command::Set, Category::Count), Some(10));
        assert_eq!(t.get(Command::Set, Category::Success), Some(9));
        assert_eq!(t.get(Command::Set, Category::Hit), None);
        assert_eq!(t.get(Command::Get, Category::Hit), Some(15));
        assert_eq!(t.get(Command::Get, Category::Miss), Some(5));
        assert_eq!(t.get(Command::Get, Category::Success), None);
        assert_eq!(t.get(Command::Cas, Category::Exist), Some(1));
        assert_eq!(t.get(Command::Add, Category::Exist), Some(2));
        assert_eq!(t.get(Command::Delete, Category::Hit), Some(3));
        assert_eq!(t.get(Command::Delete, Category::Exist), None);
        // Reported but missing fields default to zero.
        assert_eq!(t.get(Command::Replace, Category::Miss), Some(0));
        assert_eq!(t.get(Command::Incr, Category::Error), Some(0));
    }

    #[test]
    fn direct_hit_field_wins_over_key_field() {
        let stats = lines(&[("get_hit", "7"), ("get_key_hit", "15")]);
        let t = parse_commands(&stats).unwrap();
        assert_eq!(t.get(Command::Get, Category::Hit), Some(7));
    }

    #[test]
    fn malformed_consumed_value_is_an_error() {
        let stats = lines(&[("set", "ten")]);
        assert!(matches!(
            parse_commands(&stats),
            Err(CollectError::Parse(_))
        ));
    }

    #[test]
    fn slab_blocks_grouped_and_filtered() {
        let slabs = lines(&[
            ("1:chunk_size", "96"),
            ("1:slab_curr", "2"),
            ("1:item_curr", "100"),
            ("2:slab_curr", "0"),
            ("active_slabs", "1"),
            ("3:chunk_size", "120"),
            ("3:item_evict", "4"),
            ("3:get_key_hit", "6"),
            ("3:append_hit", "1"),
            ("3:set_success", "5"),
            ("3:cas_success", "2"),
        ]);
        let blocks = group_slab_blocks(&slabs).unwrap();
        assert_eq!(blocks.len(), 3);

        let table = parse_slabs(&slabs).unwrap();
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![96, 120]);
        assert_eq!(table[&96].slab_curr, 2);
        assert_eq!(table[&96].item_curr, 100);
        assert_eq!(table[&120].evictions, 4);
        assert_eq!(table[&120].locate, 7);
        assert_eq!(table[&120].insert, 7);
    }

    #[test]
    fn slab_value_must_be_numeric() {
        let slabs = lines(&[("1:chunk_size", "big")]);
        assert!(parse_slabs(&slabs).is_err());
    }

    #[test]
    fn build_snapshot_from_scenario() {
        let raw = scenarios::raw_stats();
        let snap = build_snapshot(HostEndpoint::new("cache-01", 11211), &raw).unwrap();
        assert_eq!(snap.counters.uptime, 3600);
        assert_eq!(snap.counters.connections, 12);
        assert_eq!(snap.counters.max_bytes, 64 * 1024 * 1024);
        assert_eq!(snap.counters.data, 9600);
        assert_eq!(snap.counters.timestamp, 1_700_000_000.5);
        // set 100 + get 300 + delete 10, every other command absent on the wire.
        assert_eq!(snap.counters.requests, 410);
        assert_eq!(snap.slabs.len(), 1);
        assert_eq!(snap.slabs[&96].data_value, 8000);
    }

    #[test]
    fn missing_aggregate_ts_uses_probe_clock() {
        let raw = RawStats {
            probed_at: 123.0,
            ..RawStats::default()
        };
        let snap = build_snapshot(HostEndpoint::new("h", 1), &raw).unwrap();
        assert_eq!(snap.counters.timestamp, 123.0);
        assert_eq!(snap.counters.uptime, 0);
        assert!(snap.slabs.is_empty());
    }
}
