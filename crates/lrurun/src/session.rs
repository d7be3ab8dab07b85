//! Executes script commands against a single cache

use std::io::{self, BufRead, Write};

use lrucache::{LruCache, Value};
use tracing::warn;

use crate::error::Error;
use crate::script::{parse_command, Command};

/// One cache plus the commands replayed against it
pub struct Session {
    cache: LruCache,
}

impl Session {
    /// Create a session around a new cache with the given capacity
    ///
    /// Capacities below 1 are rejected with `InvalidCapacity`.
    pub fn new(capacity: i64) -> lrucache::Result<Self> {
        Ok(Self {
            cache: LruCache::try_from_signed(capacity)?,
        })
    }

    /// Run a single command and render its response line
    pub fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Put(key, value) => {
                self.cache.put(key, value);
                "OK".to_string()
            }
            Command::Get(key) => format_value(self.cache.get(key)),
            Command::Peek(key) => format_value(self.cache.peek(key)),
            Command::Del(key) => format_value(self.cache.remove(key)),
            Command::Len => self.cache.len().to_string(),
            Command::Keys => {
                if self.cache.is_empty() {
                    "(empty)".to_string()
                } else {
                    self.cache
                        .keys()
                        .map(|key| key.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                }
            }
            Command::Stats => {
                let stats = self.cache.stats();
                format!(
                    "hits={} misses={} inserts={} updates={} evictions={} hit_ratio={:.2}",
                    stats.hits(),
                    stats.misses(),
                    stats.inserts(),
                    stats.updates(),
                    stats.evictions(),
                    stats.hit_ratio()
                )
            }
            Command::Clear => {
                self.cache.clear();
                "OK".to_string()
            }
        }
    }

    /// Replay every line of `input`, writing one response per command
    ///
    /// Bad lines are answered with `ERR <message>` and skipped. Returns the
    /// number of commands executed.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> io::Result<usize> {
        let mut executed = 0;
        let mut line_no = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let parsed = match std::str::from_utf8(&buf) {
                Ok(line) => parse_command(line),
                Err(_) => Err(Error::InvalidUtf8),
            };
            let response = match parsed {
                Ok(Some(command)) => {
                    executed += 1;
                    self.execute(command)
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(line = line_no, "Script error: {}", e);
                    format!("ERR {}", e)
                }
            };
            writeln!(output, "{}", response)?;
        }

        output.flush()?;
        Ok(executed)
    }

    /// Get the underlying cache
    pub fn cache(&self) -> &LruCache {
        &self.cache
    }
}

fn format_value(value: Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "(nil)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(capacity: i64, script: &str) -> Vec<String> {
        let mut session = Session::new(capacity).unwrap();
        let mut output = Vec::new();
        session.run(script.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_recency_scenario() {
        let out = replay(2, "PUT 1 1\nPUT 2 2\nGET 1\nPUT 3 3\nGET 2\nGET 1\nGET 3\n");
        assert_eq!(out, vec!["OK", "OK", "1", "OK", "(nil)", "1", "3"]);
    }

    #[test]
    fn test_update_scenario() {
        let out = replay(2, "PUT 1 1\nPUT 2 2\nPUT 1 10\nPUT 3 3\nGET 1\nGET 2\nGET 3\n");
        assert_eq!(out, vec!["OK", "OK", "OK", "OK", "10", "(nil)", "3"]);
    }

    #[test]
    fn test_keys_len_and_stats() {
        let out = replay(3, "KEYS\nPUT 1 1\nPUT 2 2\nGET 1\nGET 5\nKEYS\nLEN\nSTATS\n");
        assert_eq!(
            out,
            vec![
                "(empty)",
                "OK",
                "OK",
                "1",
                "(nil)",
                "1 2",
                "2",
                "hits=1 misses=1 inserts=2 updates=0 evictions=0 hit_ratio=0.50",
            ]
        );
    }

    #[test]
    fn test_peek_del_clear() {
        let out = replay(2, "PUT 1 1\nPUT 2 2\nPEEK 1\nPUT 3 3\nDEL 2\nDEL 2\nCLEAR\nLEN\n");
        assert_eq!(out, vec!["OK", "OK", "1", "OK", "2", "(nil)", "OK", "0"]);
    }

    #[test]
    fn test_errors_do_not_stop_the_script() {
        let mut session = Session::new(2).unwrap();
        let mut output = Vec::new();
        let script = "# warm up\nPUT 1 1\n\nFROB 1\nGET\nGET 1\n";

        let executed = session.run(script.as_bytes(), &mut output).unwrap();

        assert_eq!(executed, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "OK\nERR unknown command 'FROB'\nERR wrong arguments for 'GET'\n1\n"
        );
        assert_eq!(session.cache().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut session = Session::new(2).unwrap();
        let mut output = Vec::new();
        let script: &[u8] = b"PUT 1 1\nPUT \xff 2\nGET 1\n";

        let executed = session.run(script, &mut output).unwrap();

        assert_eq!(executed, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "OK\nERR invalid UTF-8\n1\n"
        );
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let out = replay(2, "PUT 1 1\r\nGET 1");
        assert_eq!(out, vec!["OK", "1"]);
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        assert_eq!(
            Session::new(0).err(),
            Some(lrucache::Error::InvalidCapacity(0))
        );
        assert_eq!(
            Session::new(-1).err(),
            Some(lrucache::Error::InvalidCapacity(-1))
        );
    }
}
