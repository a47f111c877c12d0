use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn BufRead>,
    is_pipe: bool,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let input_path = input_path.as_ref();
        let is_pipe = input_path.to_string_lossy() == "-";

        let reader: Box<dyn BufRead> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)
                .with_context(|| format!("Failed to open {}", input_path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// Process the input line by line.
    /// The callback receives the 1-based line number and the line without its
    /// terminator, and returns Ok(false) to stop early.
    pub fn process_lines<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> Result<bool>,
    {
        let mut line = String::new();
        let mut number = 0;

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break; // EOF
            }
            number += 1;

            if !callback(number, line.trim_end_matches(['\r', '\n']))? {
                break;
            }
        }

        Ok(())
    }
}

/// Parses one line of hex octets.
///
/// Octets may be separated by spaces or commas and carry a `0x` prefix;
/// unseparated runs like `17273D` are split into pairs. Everything after `#`
/// is a comment. Returns `None` for a line with no octets.
pub fn parse_hex_line(line: &str) -> Result<Option<Vec<u8>>> {
    let content = line.split('#').next().unwrap_or_default();
    let mut octets = Vec::new();

    for token in content.split([' ', '\t', ',']).filter(|t| !t.is_empty()) {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if digits.is_empty() {
            bail!("Invalid hex octet {token:?}");
        }

        let decoded =
            hex::decode(digits).with_context(|| format!("Invalid hex octet {token:?}"))?;
        octets.extend(decoded);
    }

    Ok((!octets.is_empty()).then_some(octets))
}
