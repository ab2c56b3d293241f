//! Transport client module
//!
//! This module contains everything that talks to the search index:
//! - Endpoint URLs for search, scroll and count operations
//! - The HTTP transport and its error classification
//! - Decoding of search and count responses

mod endpoint;
mod response;
mod transport;

pub use endpoint::{EndpointKind, SearchEndpoint};
pub use response::{Hit, SearchResponse};
pub use transport::{build_http_client, SearchClient};
