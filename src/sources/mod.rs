/// Sources module
///
/// Upstream token sources the cache fetches from.
use std::future::Future;

use crate::cache::token::Token;
use crate::errors::RelayError;

pub mod http;

/// One outbound attempt to obtain a fresh token. Implementations do not retry.
pub trait TokenSource: Send + Sync + 'static {
    fn fetch_token(&self) -> impl Future<Output = Result<Token, RelayError>> + Send;
}
