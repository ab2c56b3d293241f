use crate::output::filter::CrawlRecord;
use std::io::{self, Write};

/// Header line written once before any record
pub const HEADER: &str = "url,page_object,fetch_time";

/// Writes comma-joined output lines
///
/// Values are written verbatim; embedded commas are not quoted.
pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.inner, "{}", HEADER)
    }

    /// Writes `<url>,<page_object>,<fetch_time>`; a missing time is left empty
    pub fn write_record(&mut self, record: &CrawlRecord) -> io::Result<()> {
        writeln!(
            self.inner,
            "{},{},{}",
            record.url,
            record.page_object,
            record.fetch_time.as_deref().unwrap_or("")
        )
    }

    /// Writes `<key>,<count>`
    pub fn write_count(&mut self, key: &str, count: u64) -> io::Result<()> {
        writeln!(self.inner, "{},{}", key, count)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
