//! Command script parser using nom
//!
//! One command per line, command words case-insensitive:
//! ```text
//! # comment
//! PUT <key> <value>
//! GET <key>
//! PEEK <key>
//! DEL <key>
//! LEN
//! KEYS
//! STATS
//! CLEAR
//! ```

use lrucache::{Key, Value};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{i64 as integer, space1},
    combinator::{all_consuming, map, value},
    sequence::{pair, preceded},
    IResult,
};

use crate::error::{Error, Result};

/// Command words accepted by the parser
const COMMANDS: &[&str] = &["PUT", "GET", "PEEK", "DEL", "LEN", "KEYS", "STATS", "CLEAR"];

/// A single script command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Put(Key, Value),
    Get(Key),
    Peek(Key),
    Del(Key),
    Len,
    Keys,
    Stats,
    Clear,
}

fn argument(input: &str) -> IResult<&str, i64> {
    preceded(space1, integer)(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        map(
            preceded(tag_no_case("PUT"), pair(argument, argument)),
            |(key, value)| Command::Put(key, value),
        ),
        map(preceded(tag_no_case("GET"), argument), Command::Get),
        map(preceded(tag_no_case("PEEK"), argument), Command::Peek),
        map(preceded(tag_no_case("DEL"), argument), Command::Del),
        value(Command::Len, tag_no_case("LEN")),
        value(Command::Keys, tag_no_case("KEYS")),
        value(Command::Stats, tag_no_case("STATS")),
        value(Command::Clear, tag_no_case("CLEAR")),
    ))(input)
}

/// Parse one script line
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    match all_consuming(command)(line) {
        Ok((_, cmd)) => Ok(Some(cmd)),
        Err(_) => {
            let word = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase();
            if COMMANDS.contains(&word.as_str()) {
                Err(Error::Parse(word))
            } else {
                Err(Error::UnknownCommand(word))
            }
        }
    }
}
