//! Authorization of generate requests.
//!
//! A request carries an opaque token proving payment. Verification against the
//! payment provider is deployment specific and lives behind [`TokenVerifier`];
//! the default [`PresenceVerifier`] only requires that a token is present.

use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TokenVerifier::verify`].
pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Decides whether a request may generate a document.
pub trait TokenVerifier: Send + Sync {
    /// Accept or reject `token`. Rejection is [`Error::AuthorizationMissing`].
    fn verify<'a>(&'a self, token: Option<&'a str>) -> VerifyFuture<'a>;
}

/// Accepts any non-blank token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceVerifier;

impl TokenVerifier for PresenceVerifier {
    fn verify<'a>(&'a self, token: Option<&'a str>) -> VerifyFuture<'a> {
        let present = token.is_some_and(|t| !t.trim().is_empty());
        Box::pin(async move {
            if present {
                Ok(())
            } else {
                log::debug!("Rejecting request without authorization token");
                Err(Error::AuthorizationMissing)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_presence_verifier() {
        let verifier = PresenceVerifier;
        assert!(verifier.verify(Some("tok_123")).await.is_ok());
        assert!(matches!(verifier.verify(None).await, Err(Error::AuthorizationMissing)));
        assert!(matches!(verifier.verify(Some("")).await, Err(Error::AuthorizationMissing)));
        assert!(matches!(verifier.verify(Some("  \t")).await, Err(Error::AuthorizationMissing)));
    }

    #[tokio::test]
    async fn test_dyn_verifier() {
        struct DenyAll;
        impl TokenVerifier for DenyAll {
            fn verify<'a>(&'a self, _token: Option<&'a str>) -> VerifyFuture<'a> {
                Box::pin(async { Err(Error::AuthorizationMissing) })
            }
        }

        let verifiers: Vec<Box<dyn TokenVerifier>> = vec![Box::new(PresenceVerifier), Box::new(DenyAll)];
        let results: Vec<bool> = futures_results(&verifiers, "tok").await;
        assert_eq!(results, [true, false]);
    }

    async fn futures_results(verifiers: &[Box<dyn TokenVerifier>], token: &str) -> Vec<bool> {
        let mut out = Vec::new();
        for v in verifiers {
            out.push(v.verify(Some(token)).await.is_ok());
        }
        out
    }
}
