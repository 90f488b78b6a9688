//! Record-level reader for the DXF text stream.
//!
//! DXF ASCII files are a flat sequence of records, each two physical lines:
//! an integer group code and a raw value.  A value line of exactly `EOF`
//! ends the stream.  Numeric parsing is deliberately permissive — legacy
//! writers produce enough garbage that the classic `atoi`/`atof` behavior
//! (longest valid prefix, otherwise zero) is the only workable contract.

use crate::error::Result;
use encoding_rs::Encoding;
use std::io::{BufReader, Read};

/// A DXF code/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CodePair {
    /// The DXF group code.
    pub code: i32,
    /// Raw value line, trailing line endings stripped.
    pub value: String,
}

impl CodePair {
    /// Create a new code/value pair.
    pub fn new(code: i32, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }

    /// Value as an integer, `atoi`-style: garbage parses as 0.
    pub fn as_i32(&self) -> i32 {
        lenient_i32(&self.value)
    }

    /// Value as a double, `atof`-style: garbage parses as 0.0.
    pub fn as_f64(&self) -> f64 {
        lenient_f64(&self.value)
    }
}

/// Parse the longest leading integer, ignoring surrounding whitespace.
/// Anything unparsable is 0.
pub(crate) fn lenient_i32(s: &str) -> i32 {
    let s = s.trim_start();
    let mut end = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    s[..end].parse::<i32>().unwrap_or(0)
}

/// Parse the longest leading floating-point number.  Anything unparsable
/// is 0.0.
pub(crate) fn lenient_f64(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        let c = bytes[end] as char;
        let ok = c.is_ascii_digit()
            || (end == 0 && (c == '-' || c == '+'))
            || (c == '.' && !seen_dot && !seen_exp)
            || ((c == 'e' || c == 'E') && !seen_exp && end > 0)
            || ((c == '-' || c == '+')
                && end > 0
                && (bytes[end - 1] == b'e' || bytes[end - 1] == b'E'));
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        if c == 'e' || c == 'E' {
            seen_exp = true;
        }
        end += 1;
    }
    // a trailing exponent marker ("1e") is not a number; back it off
    while end > 0 {
        if s[..end].parse::<f64>().is_ok() {
            return s[..end].parse::<f64>().unwrap_or(0.0);
        }
        end -= 1;
    }
    0.0
}

/// Reads code/value record pairs from a byte stream.
pub struct RecordReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    /// Non-UTF8 fallback encoding.  `None` means Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
    finished: bool,
    truncated: bool,
}

impl<R: Read> RecordReader<R> {
    /// Create a new record reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            encoding: None,
            finished: false,
            truncated: false,
        }
    }

    /// Set the fallback encoding for non-UTF8 bytes.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = Some(encoding);
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// True when the stream ended in the middle of a record (a code line
    /// with no value line).
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Read a single line, handling non-UTF8 bytes gracefully.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();

        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    bytes.push(byte[0]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.line_number += 1;

        // UTF-8 first, then the configured encoding, then Latin-1
        let line = match String::from_utf8(bytes.clone()) {
            Ok(s) => s,
            Err(_) => {
                if let Some(enc) = self.encoding {
                    let (decoded, _, _) = enc.decode(&bytes);
                    decoded.into_owned()
                } else {
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        };

        Ok(Some(line.trim().to_string()))
    }

    /// Read the next record pair.  `None` means end of stream: the input
    /// ran out, the `EOF` sentinel appeared, or a record was truncated.
    pub fn read_pair(&mut self) -> Result<Option<CodePair>> {
        if self.finished {
            return Ok(None);
        }

        let code_line = match self.read_line()? {
            Some(line) => line,
            None => {
                self.finished = true;
                return Ok(None);
            }
        };
        let code = lenient_i32(&code_line);

        let value_line = match self.read_line()? {
            Some(line) => line,
            None => {
                self.finished = true;
                self.truncated = true;
                return Ok(None);
            }
        };

        if value_line == "EOF" {
            self.finished = true;
            return Ok(None);
        }

        Ok(Some(CodePair::new(code, value_line)))
    }
}
