//! Console command parsing.
//!
//! One command per line. Station numbers are 1-based as listed by
//! `stations`.

use anyhow::{bail, Context, Result};
use nightcap_core::parse_timer_minutes;

/// Which station a `select` command refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum StationRef {
    /// Zero-based position in the station table.
    Index(usize),
    /// Stream address.
    Address(String),
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stations,
    Select(StationRef),
    Toggle,
    Volume(f32),
    Timer(u32),
    Cancel,
    Status,
    Info,
    Clock,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  stations              list stations
  select <n|address>    switch station
  toggle | play | stop  start or stop playback
  volume <0..1>         set volume
  timer <minutes>       stop playback after the given minutes
  cancel                cancel the sleep timer
  status                show playback and timer
  info                  query the current stream
  clock                 show the current time
  help                  show this help
  quit                  exit";

const KNOWN: &[&str] = &[
    "stations", "list", "toggle", "play", "stop", "cancel", "status", "info", "clock", "time",
    "help", "?", "quit", "exit", "q",
];

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("too many arguments for '{}'", word);
    }

    let name = word.to_ascii_lowercase();
    let command = match (name.as_str(), arg) {
        ("stations" | "list", None) => Command::Stations,
        ("select" | "station", Some(arg)) => Command::Select(parse_station_ref(arg)?),
        ("toggle" | "play" | "stop", None) => Command::Toggle,
        ("volume" | "vol", Some(arg)) => Command::Volume(parse_volume(arg)?),
        ("timer", Some(arg)) => Command::Timer(parse_timer_minutes(arg)?),
        ("cancel", None) => Command::Cancel,
        ("status", None) => Command::Status,
        ("info", None) => Command::Info,
        ("clock" | "time", None) => Command::Clock,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        ("select" | "station" | "volume" | "vol" | "timer", None) => {
            bail!("'{}' needs an argument", word)
        }
        (name, Some(_)) if KNOWN.contains(&name) => bail!("'{}' takes no argument", word),
        _ => bail!("unknown command '{}' (try 'help')", word),
    };
    Ok(Some(command))
}

fn parse_station_ref(arg: &str) -> Result<StationRef> {
    match arg.parse::<usize>() {
        Ok(0) => bail!("stations are numbered from 1"),
        Ok(number) => Ok(StationRef::Index(number - 1)),
        Err(_) => Ok(StationRef::Address(arg.to_string())),
    }
}

fn parse_volume(arg: &str) -> Result<f32> {
    let volume: f32 = arg
        .parse()
        .with_context(|| format!("'{}' is not a volume between 0 and 1", arg))?;
    if volume.is_nan() {
        bail!("'{}' is not a volume between 0 and 1", arg);
    }
    Ok(volume)
}
