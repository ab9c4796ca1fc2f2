//! Parsing of the UCI commands that carry arguments.

use std::time::Duration;

use chess_core::{Clock, SearchLimits};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("'{0}' needs a value")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for '{token}'")]
    InvalidValue { token: &'static str, value: String },
    #[error("unknown go argument '{0}'")]
    UnknownToken(String),
    #[error("setoption needs 'name <option>'")]
    MissingName,
}

/// Builds search limits from the arguments of `go`.
pub fn parse_go(args: &[&str]) -> Result<SearchLimits, ProtocolError> {
    let mut limits = SearchLimits::default();
    let mut clock = Clock::default();
    let mut has_clock = false;

    let mut it = args.iter().copied();
    while let Some(token) = it.next() {
        match token {
            "infinite" => limits.infinite = true,
            // Pondering is searched as a normal move.
            "ponder" => {}
            "depth" => limits.depth = Some(number("depth", it.next())?),
            "nodes" => limits.nodes = Some(number("nodes", it.next())?),
            "movetime" => limits.move_time = Some(millis("movetime", it.next())?),
            "movestogo" => {
                clock.movestogo = Some(number("movestogo", it.next())?);
                has_clock = true;
            }
            "wtime" => {
                clock.wtime = millis("wtime", it.next())?;
                has_clock = true;
            }
            "btime" => {
                clock.btime = millis("btime", it.next())?;
                has_clock = true;
            }
            "winc" => clock.winc = millis("winc", it.next())?,
            "binc" => clock.binc = millis("binc", it.next())?,
            other => return Err(ProtocolError::UnknownToken(other.to_string())),
        }
    }

    if has_clock {
        limits.clock = Some(clock);
    }
    Ok(limits)
}

fn number<T: std::str::FromStr>(token: &'static str, value: Option<&str>) -> Result<T, ProtocolError> {
    let value = value.ok_or(ProtocolError::MissingValue(token))?;
    value.parse().map_err(|_| ProtocolError::InvalidValue {
        token,
        value: value.to_string(),
    })
}

/// Some GUIs send negative clock times once a flag has fallen.
fn millis(token: &'static str, value: Option<&str>) -> Result<Duration, ProtocolError> {
    let ms: i64 = number(token, value)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

/// Splits `name <words...> [value <words...>]`; buttons have no value.
pub fn parse_setoption(args: &[&str]) -> Result<(String, String), ProtocolError> {
    let name_at = args
        .iter()
        .position(|&t| t == "name")
        .ok_or(ProtocolError::MissingName)?;
    let rest = &args[name_at + 1..];
    let value_at = rest.iter().position(|&t| t == "value").unwrap_or(rest.len());

    let name = rest[..value_at].join(" ");
    if name.is_empty() {
        return Err(ProtocolError::MissingName);
    }
    let value = rest.get(value_at + 1..).map(|v| v.join(" ")).unwrap_or_default();
    Ok((name, value))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
