//! Pagination state for one input key
//!
//! A key starts in `Initial`, may move to `Scrolling` when the index hands
//! back a cursor, and always ends in `Done`. Nothing here is shared between
//! keys: each key gets a fresh [`KeyPagination`].

use crate::client::{EndpointKind, Hit, SearchResponse};
use crate::config::RetrievalMode;
use crate::query::SearchRequest;
use crate::HistoryError;

/// Why a key's retrieval stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Count request answered
    Counted,
    /// One capped page processed, no cursor followed
    SinglePage,
    /// The index returned a page with zero hits
    Exhausted,
    /// A transport or decode error ended retrieval early
    Aborted,
}

/// Where a key's retrieval currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// Fresh query, no cursor yet
    Initial,
    /// Following a scroll cursor
    Scrolling { scroll_id: String },
    /// Terminal
    Done(Termination),
}

impl PaginationState {
    /// Returns true if no further requests will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// What the caller should do with a response
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Process these hits
    Page(Vec<Hit>),
    /// Emit this count
    Count(u64),
    /// Zero hits: retrieval for this key is over
    NoMoreResults,
}

/// Request/state pair driven one response at a time
#[derive(Debug, Clone)]
pub struct KeyPagination {
    mode: RetrievalMode,
    state: PaginationState,
    request: SearchRequest,
    pages: usize,
}

impl KeyPagination {
    /// Starts pagination for a freshly built request
    pub fn new(request: SearchRequest, mode: RetrievalMode) -> Self {
        Self {
            mode,
            state: PaginationState::Initial,
            request,
            pages: 0,
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Returns the request the next call will carry
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Number of non-empty pages handed out so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns the termination reason once done
    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            PaginationState::Done(termination) => Some(termination),
            _ => None,
        }
    }

    /// Returns the operation and body of the next request, or `None` when done
    pub fn next_call(&self) -> Option<(EndpointKind, &SearchRequest)> {
        let kind = match (&self.state, self.mode) {
            (PaginationState::Done(_), _) => return None,
            (PaginationState::Initial, RetrievalMode::Count) => EndpointKind::Count,
            (PaginationState::Initial, RetrievalMode::SinglePage) => EndpointKind::Search,
            (PaginationState::Initial, RetrievalMode::Scroll) => EndpointKind::ScrollOpen,
            (PaginationState::Scrolling { .. }, _) => EndpointKind::ScrollContinue,
        };
        Some((kind, &self.request))
    }

    /// Applies a successful response and returns what to do with it
    ///
    /// `endpoint` is only used to describe a count response that lacks its
    /// count.
    pub fn on_response(
        &mut self,
        response: SearchResponse,
        endpoint: &str,
    ) -> Result<Step, HistoryError> {
        let scrolling = match self.state {
            PaginationState::Done(_) => return Ok(Step::NoMoreResults),
            PaginationState::Initial => false,
            PaginationState::Scrolling { .. } => true,
        };

        if !scrolling && self.mode == RetrievalMode::Count {
            return match response.count {
                Some(count) => {
                    self.state = PaginationState::Done(Termination::Counted);
                    Ok(Step::Count(count))
                }
                None => {
                    self.abort();
                    Err(HistoryError::MissingCount {
                        endpoint: endpoint.to_string(),
                    })
                }
            };
        }

        if response.hits.is_empty() {
            self.state = PaginationState::Done(Termination::Exhausted);
            return Ok(Step::NoMoreResults);
        }

        match response.scroll_id {
            // Keep the previous cursor if the index did not send a new one
            None if scrolling => {}
            Some(scroll_id) if scrolling || self.mode == RetrievalMode::Scroll => {
                self.request.continue_with(scroll_id.clone());
                self.state = PaginationState::Scrolling { scroll_id };
            }
            _ => self.state = PaginationState::Done(Termination::SinglePage),
        }

        self.pages += 1;
        Ok(Step::Page(response.hits))
    }

    /// Ends retrieval for this key after a failed request
    pub fn abort(&mut self) {
        self.state = PaginationState::Done(Termination::Aborted);
    }
}
