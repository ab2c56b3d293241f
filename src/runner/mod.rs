//! Run loop - drives the lookup for every input key
//!
//! Keys are read one per line, trimmed, and resolved strictly one at a time:
//! every page of a key is written before the next key's first request is
//! sent. Output therefore follows input order, and within a key it follows
//! fetch time, newest first.

use crate::client::SearchClient;
use crate::config::QueryConfig;
use crate::output::{process_page, RecordWriter};
use crate::pagination::{retrieve_key, Termination};
use crate::HistoryError;
use chrono::Utc;
use std::borrow::Cow;
use std::io::{BufRead, Write};

/// Keys between periodic progress lines
pub const PROGRESS_INTERVAL: u64 = 100;

/// Counters kept for the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Non-blank keys processed so far
    pub progress_count: u64,
    /// Hits returned by the index across all pages and keys
    pub found: u64,
    /// Hits that passed the exact-match filter and were written
    pub matched: u64,
    /// Keys whose retrieval was aborted by an error
    pub failed: u64,
}

/// Sequential lookup over a stream of keys
pub struct Runner<W: Write> {
    client: SearchClient,
    config: QueryConfig,
    writer: RecordWriter<W>,
    state: RunState,
}

impl<W: Write> Runner<W> {
    /// Creates a runner writing records to `out`
    pub fn new(client: SearchClient, config: QueryConfig, out: W) -> Self {
        if config.count_only && config.all_results {
            tracing::warn!("--all-results has no effect together with --count-only");
        }

        Self {
            client,
            config,
            writer: RecordWriter::new(out),
            state: RunState::default(),
        }
    }

    /// Returns the counters so far
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Returns the output writer
    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }

    /// Runs the lookup for every key in `input`
    ///
    /// The header is written first, even if there are no keys. Blank lines are
    /// skipped. Lines that are not valid UTF-8 are decoded lossily. A key
    /// whose retrieval fails is logged and counted; the run moves on to the
    /// next key. Only input and output I/O errors end the run.
    pub async fn run<R: BufRead>(&mut self, mut input: R) -> Result<RunState, HistoryError> {
        self.writer.write_header()?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                tracing::warn!("Input line is not valid UTF-8, using {:?}", line.trim());
            }
            let key = line.trim();
            if key.is_empty() {
                continue;
            }

            self.state.progress_count += 1;
            if self.state.progress_count % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Processing {}'s key, found:{} / matched:{}",
                    self.state.progress_count,
                    self.state.found,
                    self.state.matched
                );
            }

            self.process_key(key).await?;

            tracing::info!(
                "For input #{}, found:{} / matched:{}",
                self.state.progress_count,
                self.state.found,
                self.state.matched
            );
        }

        self.writer.flush()?;
        Ok(self.state)
    }

    /// Retrieves, filters and writes the records for one key
    async fn process_key(&mut self, key: &str) -> Result<(), HistoryError> {
        let client = &self.client;
        let config = &self.config;
        let writer = &mut self.writer;
        let state = &mut self.state;

        let outcome = retrieve_key(client, key, config, |hits| {
            state.found += hits.len() as u64;
            let records = process_page(
                hits,
                key,
                config.match_field,
                config.exact_match,
                Utc::now(),
            );
            for record in &records {
                writer.write_record(record)?;
            }
            state.matched += records.len() as u64;
            Ok(())
        })
        .await?;

        if let Some(count) = outcome.count {
            self.writer.write_count(key, count)?;
        }

        if outcome.termination == Termination::Aborted {
            self.state.failed += 1;
        }

        tracing::debug!(
            "Key {} finished ({:?}) after {} page(s)",
            key,
            outcome.termination,
            outcome.pages
        );

        Ok(())
    }
}
