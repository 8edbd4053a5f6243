//! The record source: a lazy, cursor-resumable stream over paginated
//! history.
//!
//! [`RecordStream`] pulls pages from a [`HistoryClient`] one at a time
//! (strictly synchronous, no fetch-ahead) and yields individual records.
//! Rate-limit signals are honored in place (sleep the platform-requested
//! interval, re-issue the same page request) and transient network errors
//! are retried with bounded exponential backoff. Everything else
//! propagates to the caller.
//!
//! The stream is not restartable: after partial consumption the only way
//! back in is [`RecordStream::resume`] with the cursor obtained from
//! [`RecordStream::resume_cursor`], which re-enters the history at the
//! last-yielded record instead of position zero.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use crate::client::{Cursor, HistoryClient};
use crate::error::{Result, TgrabError};
use crate::record::RawRecord;
use crate::target::Target;

/// Default page size for history requests.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Retry policy for transient failures.
///
/// Applies only to [`TgrabError::Network`]; rate-limit waits are always
/// honored in full and never count as attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per page request before the error becomes fatal.
    pub max_attempts: u32,
    /// Base delay of the exponential backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt bound.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the backoff base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Backoff delay before retry number `attempt` (1-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Lazy sequence of [`RawRecord`]s pulled page-by-page from a client.
///
/// Implements `Iterator<Item = Result<RawRecord>>`. A yielded error is
/// terminal: the stream fuses afterwards.
pub struct RecordStream<'c, C: HistoryClient> {
    client: &'c mut C,
    target: Target,
    cursor: Option<Cursor>,
    page_size: usize,
    retry: RetryPolicy,
    buffer: VecDeque<RawRecord>,
    last_yielded: Option<u64>,
    exhausted: bool,
    failed: bool,
    pages_fetched: u64,
}

impl<'c, C: HistoryClient> RecordStream<'c, C> {
    /// Opens a stream at the head of the target's history.
    pub fn open(client: &'c mut C, target: Target) -> Self {
        Self::with_cursor(client, target, None)
    }

    /// Re-enters a partially consumed history at `cursor`.
    pub fn resume(client: &'c mut C, target: Target, cursor: Cursor) -> Self {
        Self::with_cursor(client, target, Some(cursor))
    }

    fn with_cursor(client: &'c mut C, target: Target, cursor: Option<Cursor>) -> Self {
        Self {
            client,
            target,
            cursor,
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            buffer: VecDeque::new(),
            last_yielded: None,
            exhausted: false,
            failed: false,
            pages_fetched: 0,
        }
    }

    /// Sets the page size for subsequent fetches.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The resume token: identifier of the last record yielded, if any.
    ///
    /// Persist this across an interruption and pass it to
    /// [`RecordStream::resume`] to continue without re-downloading.
    pub fn resume_cursor(&self) -> Option<Cursor> {
        self.last_yielded.map(|offset_id| Cursor { offset_id })
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Fetches the next page into the buffer, honoring rate limits and
    /// retrying transient failures.
    fn fetch_page(&mut self) -> Result<()> {
        let mut attempt: u32 = 0;

        let page = loop {
            match self
                .client
                .history_page(&self.target, self.cursor.as_ref(), self.page_size)
            {
                Ok(page) => break page,
                Err(TgrabError::RateLimited { seconds }) => {
                    // The platform told us exactly how long to wait; the
                    // same request is re-issued, never skipped.
                    thread::sleep(Duration::from_secs(seconds));
                }
                Err(TgrabError::Network { message, .. }) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return Err(TgrabError::network(attempt, message));
                    }
                    thread::sleep(self.retry.delay_for(attempt));
                }
                Err(e) => return Err(e),
            }
        };

        self.pages_fetched += 1;
        if page.records.is_empty() || page.next.is_none() {
            self.exhausted = true;
        }
        self.cursor = page.next;
        self.buffer.extend(page.records);
        Ok(())
    }
}

impl<C: HistoryClient> Iterator for RecordStream<'_, C> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(rec) = self.buffer.pop_front() {
                self.last_yielded = Some(rec.id);
                return Some(Ok(rec));
            }
            if self.exhausted || self.failed {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}
