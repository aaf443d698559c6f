// Streaming record producer over a (decompressed) dump
//
// Lines end at `\n` only and are read as raw bytes, then decoded lossily:
// invalid UTF-8 sequences are dropped from the line, the rest of the line is
// kept. Only I/O errors from the underlying reader (e.g. a corrupt gzip
// member) end the stream.

use chrono::NaiveDate;
use flate2::read::MultiGzDecoder;
use std::io::{self, BufRead, BufReader, Read};

use super::line::parse_line;
use crate::hour::HourPartition;

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageviewRecord {
    pub project: String,
    pub page: String,
    pub views: i64,
    pub date: NaiveDate,
    pub hour: u8,
}

/// Lazy, finite iterator of records parsed from a line-oriented dump.
///
/// Malformed lines are skipped silently; the iterator yields `Err` only when
/// reading from the source fails, after which it is exhausted.
pub struct PageviewRecords<R> {
    reader: R,
    partition: HourPartition,
    buf: Vec<u8>,
    decoded: String,
    lines_read: u64,
    failed: bool,
}

impl<R: BufRead> PageviewRecords<R> {
    pub fn new(reader: R, partition: HourPartition) -> Self {
        Self {
            reader,
            partition,
            buf: Vec::with_capacity(256),
            decoded: String::with_capacity(256),
            lines_read: 0,
            failed: false,
        }
    }

    /// Number of raw lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn partition(&self) -> HourPartition {
        self.partition
    }
}

impl<R: Read> PageviewRecords<BufReader<MultiGzDecoder<R>>> {
    /// Records from a gzip-compressed dump (multi-member streams supported).
    pub fn from_gzip(reader: R, partition: HourPartition) -> Self {
        Self::new(BufReader::new(MultiGzDecoder::new(reader)), partition)
    }
}

impl<R: BufRead> Iterator for PageviewRecords<R> {
    type Item = io::Result<PageviewRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
            self.lines_read += 1;

            let line = decode_lossy(&self.buf, &mut self.decoded);
            if let Some(parsed) = parse_line(line) {
                return Some(Ok(PageviewRecord {
                    project: parsed.project.to_string(),
                    page: parsed.page.to_string(),
                    views: parsed.views,
                    date: self.partition.date(),
                    hour: self.partition.hour(),
                }));
            }
        }
    }
}

/// Decode `bytes` as UTF-8, dropping invalid sequences.
///
/// Borrows straight from `bytes` when they are already valid; otherwise the
/// valid fragments are collected into `scratch`.
fn decode_lossy<'a>(bytes: &'a [u8], scratch: &'a mut String) -> &'a str {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s;
    }

    scratch.clear();
    for chunk in bytes.utf8_chunks() {
        scratch.push_str(chunk.valid());
    }
    scratch.as_str()
}
