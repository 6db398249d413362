//! Line-framed records exchanged with the measurement host.
//!
//! ```text
//! BEGIN
//! ATTR\nK\n<len>\n<key>\nV\n<len>\n<value>
//! RESULT\n<len>\n<text>
//! ```
//!
//! Every record ends with a newline and `<len>` is the payload length in
//! bytes, so payloads may themselves contain newlines.

use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRecord {
    Begin,
    Attr { key: String, value: String },
    Result(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record stream ended inside a record")]
    UnexpectedEof,
    #[error("unknown record marker: {0:?}")]
    UnknownRecord(String),
    #[error("expected {expected:?} but found {found:?}")]
    MissingMarker { expected: &'static str, found: String },
    #[error("invalid payload length: {0:?}")]
    InvalidLength(String),
    #[error("payload of {len} bytes is not followed by a newline")]
    MissingTerminator { len: usize },
}

#[must_use]
pub fn encode_record(record: &HostRecord) -> String {
    match record {
        HostRecord::Begin => "BEGIN\n".to_owned(),
        HostRecord::Attr { key, value } => format!(
            "ATTR\nK\n{}\n{key}\nV\n{}\n{value}\n",
            key.len(),
            value.len()
        ),
        HostRecord::Result(text) => format!("RESULT\n{}\n{text}\n", text.len()),
    }
}

pub fn write_record<W: Write>(out: &mut W, record: &HostRecord) -> io::Result<()> {
    out.write_all(encode_record(record).as_bytes())?;
    out.flush()
}

pub fn decode_records(input: &str) -> Result<Vec<HostRecord>, RecordError> {
    let mut cursor = Cursor { input, pos: 0 };
    let mut records = Vec::new();
    while let Some(marker) = cursor.line() {
        let record = match marker {
            "BEGIN" => HostRecord::Begin,
            "ATTR" => {
                cursor.marker("K")?;
                let key = cursor.payload()?;
                cursor.marker("V")?;
                let value = cursor.payload()?;
                HostRecord::Attr {
                    key: key.to_owned(),
                    value: value.to_owned(),
                }
            }
            "RESULT" => HostRecord::Result(cursor.payload()?.to_owned()),
            other => return Err(RecordError::UnknownRecord(other.to_owned())),
        };
        records.push(record);
    }
    Ok(records)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn line(&mut self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let end = rest.find('\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        Some(&rest[..end])
    }

    fn marker(&mut self, expected: &'static str) -> Result<(), RecordError> {
        match self.line() {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(RecordError::MissingMarker {
                expected,
                found: found.to_owned(),
            }),
            None => Err(RecordError::UnexpectedEof),
        }
    }

    fn payload(&mut self) -> Result<&'a str, RecordError> {
        let len_line = self.line().ok_or(RecordError::UnexpectedEof)?;
        let len = len_line
            .trim()
            .parse::<usize>()
            .map_err(|_| RecordError::InvalidLength(len_line.to_owned()))?;
        let end = self
            .pos
            .checked_add(len)
            .ok_or_else(|| RecordError::InvalidLength(len_line.to_owned()))?;
        let payload = self
            .input
            .get(self.pos..end)
            .ok_or(RecordError::UnexpectedEof)?;
        if self.input[end..].starts_with('\n') {
            self.pos = end + 1;
            Ok(payload)
        } else {
            Err(RecordError::MissingTerminator { len })
        }
    }
}
