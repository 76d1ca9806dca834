//! Signed requests.
//!
//! Every state-changing route acts for the account whose Ed25519 key signed
//! the request. The signature covers the method, the path, a nonce and the
//! raw body, and travels in three headers:
//!
//! - `x-tavern-public-key`: 32-byte public key, hex
//! - `x-tavern-signature`: 64-byte signature over [`signing_payload`], hex
//! - `x-tavern-nonce`: Unix milliseconds, strictly increasing per account
//!
//! The acting address is [`tavern_crypto::address_of`] the public key. Body
//! fields that name an account are optional and must match the signer.

use std::collections::HashMap;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use tavern_crypto::{address_of, blake2b_256_multi, decode_fixed, sign_message, verify_signature, Keypair};
use tavern_keeper::Tavern;
use tavern_types::{Address, Timestamp};

use crate::error::RpcError;

pub const PUBLIC_KEY_HEADER: &str = "x-tavern-public-key";
pub const SIGNATURE_HEADER: &str = "x-tavern-signature";
pub const NONCE_HEADER: &str = "x-tavern-nonce";

/// How far a nonce may sit from the keeper clock, in seconds.
pub const NONCE_WINDOW_SECS: u64 = 300;

const MAX_SIGNED_BODY: usize = 64 * 1024;
const DOMAIN: &[u8] = b"tavern-request-v1";

/// Digest a request signature commits to.
pub fn signing_payload(method: &str, path: &str, nonce: u64, body: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[
        DOMAIN,
        b"\n",
        method.as_bytes(),
        b"\n",
        path.as_bytes(),
        b"\n",
        &nonce.to_be_bytes(),
        body,
    ])
}

/// Headers a client attaches to sign `body` for `method path`.
pub fn signature_headers(
    keypair: &Keypair,
    method: &str,
    path: &str,
    nonce: u64,
    body: &[u8],
) -> [(&'static str, String); 3] {
    let signature = sign_message(&signing_payload(method, path, nonce, body), &keypair.secret);
    [
        (PUBLIC_KEY_HEADER, hex::encode(keypair.public)),
        (SIGNATURE_HEADER, hex::encode(signature)),
        (NONCE_HEADER, nonce.to_string()),
    ]
}

/// Last accepted nonce per account.
///
/// Entries older than the freshness window are dropped on every check,
/// since any nonce at or below them is already stale.
#[derive(Debug, Default)]
pub struct NonceBook {
    last: Mutex<HashMap<Address, u64>>,
}

impl NonceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.last.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.last.lock().await.is_empty()
    }

    /// Authenticate one request, returning the signer's address.
    pub async fn verify(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
        now: Timestamp,
    ) -> Result<Address, RpcError> {
        let public_key: [u8; 32] = decode_fixed(header(headers, PUBLIC_KEY_HEADER)?)
            .map_err(|e| RpcError::Unauthenticated(format!("{PUBLIC_KEY_HEADER}: {e}")))?;
        let signature: [u8; 64] = decode_fixed(header(headers, SIGNATURE_HEADER)?)
            .map_err(|e| RpcError::Unauthenticated(format!("{SIGNATURE_HEADER}: {e}")))?;
        let nonce: u64 = header(headers, NONCE_HEADER)?
            .parse()
            .map_err(|_| RpcError::Unauthenticated(format!("{NONCE_HEADER} is not an integer")))?;

        let nonce_secs = nonce / 1_000;
        if nonce_secs.abs_diff(now.as_secs()) > NONCE_WINDOW_SECS {
            return Err(RpcError::Unauthenticated("nonce outside freshness window".into()));
        }

        let payload = signing_payload(method.as_str(), path, nonce, body);
        if !verify_signature(&payload, &signature, &public_key) {
            return Err(RpcError::Unauthenticated("bad signature".into()));
        }

        let signer = address_of(&public_key);
        let mut last = self.last.lock().await;
        let floor = now.as_secs().saturating_sub(NONCE_WINDOW_SECS);
        last.retain(|_, seen| *seen / 1_000 >= floor);
        if let Some(seen) = last.get(&signer) {
            if nonce <= *seen {
                return Err(RpcError::Unauthenticated("nonce already used".into()));
            }
        }
        last.insert(signer, nonce);
        Ok(signer)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, RpcError> {
    headers
        .get(name)
        .ok_or_else(|| RpcError::Unauthenticated(format!("missing {name}")))?
        .to_str()
        .map_err(|_| RpcError::Unauthenticated(format!("{name} is not ascii")))
}

/// Shared router state.
#[derive(Clone)]
pub struct RpcState {
    pub tavern: Arc<Tavern>,
    pub nonces: Arc<NonceBook>,
}

impl RpcState {
    pub fn new(tavern: Arc<Tavern>) -> Self {
        Self {
            tavern,
            nonces: Arc::new(NonceBook::new()),
        }
    }
}

impl FromRef<RpcState> for Arc<Tavern> {
    fn from_ref(state: &RpcState) -> Self {
        Arc::clone(&state.tavern)
    }
}

/// A request body that names the account it acts for, if any.
pub trait ClaimsAccount {
    fn claimed_account(&self) -> Option<Address>;
}

/// A verified request: the signer and its decoded body.
#[derive(Debug)]
pub struct Signed<T> {
    pub signer: Address,
    pub body: T,
}

#[async_trait]
impl<T> FromRequest<RpcState> for Signed<T>
where
    T: DeserializeOwned + ClaimsAccount + Send,
{
    type Rejection = RpcError;

    async fn from_request(req: Request, state: &RpcState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_SIGNED_BODY)
            .await
            .map_err(|e| RpcError::InvalidRequest(format!("body: {e}")))?;
        let signer = state
            .nonces
            .verify(
                &parts.method,
                parts.uri.path(),
                &parts.headers,
                &bytes,
                state.tavern.now(),
            )
            .await?;

        let raw: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        let body: T = serde_json::from_slice(raw)
            .map_err(|e| RpcError::InvalidRequest(format!("body: {e}")))?;
        if let Some(claimed) = body.claimed_account() {
            if claimed != signer {
                return Err(RpcError::Forbidden(format!(
                    "request names {claimed} but is signed by {signer}"
                )));
            }
        }
        Ok(Signed { signer, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tavern_crypto::keypair_from_seed;

    const NOW: u64 = 1_700_000_000;

    fn headers_for(kp: &Keypair, path: &str, nonce: u64, body: &[u8]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in signature_headers(kp, "POST", path, nonce, body) {
            map.insert(name, HeaderValue::from_str(&value).unwrap());
        }
        map
    }

    #[tokio::test]
    async fn valid_signature_yields_signer_address() {
        let kp = keypair_from_seed(&[5; 32]);
        let book = NonceBook::new();
        let headers = headers_for(&kp, "/office/claim", NOW * 1_000, b"{}");
        let signer = book
            .verify(&Method::POST, "/office/claim", &headers, b"{}", Timestamp::new(NOW))
            .await
            .unwrap();
        assert_eq!(signer, address_of(&kp.public));
    }

    #[tokio::test]
    async fn signature_is_bound_to_path_and_body() {
        let kp = keypair_from_seed(&[5; 32]);
        let book = NonceBook::new();
        let headers = headers_for(&kp, "/office/claim", NOW * 1_000, b"{}");
        let err = book
            .verify(&Method::POST, "/office/relinquish", &headers, b"{}", Timestamp::new(NOW))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthenticated");
        let err = book
            .verify(&Method::POST, "/office/claim", &headers, b"{\"x\":1}", Timestamp::new(NOW))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthenticated");
    }

    #[tokio::test]
    async fn replayed_and_stale_nonces_rejected() {
        let kp = keypair_from_seed(&[6; 32]);
        let book = NonceBook::new();
        let now = Timestamp::new(NOW);
        let first = headers_for(&kp, "/p", NOW * 1_000, b"");
        book.verify(&Method::POST, "/p", &first, b"", now).await.unwrap();
        assert!(book.verify(&Method::POST, "/p", &first, b"", now).await.is_err());

        let stale = headers_for(&kp, "/p", (NOW - NONCE_WINDOW_SECS - 1) * 1_000, b"");
        assert!(book.verify(&Method::POST, "/p", &stale, b"", now).await.is_err());
    }

    #[tokio::test]
    async fn expired_nonce_entries_are_dropped() {
        let book = NonceBook::new();
        for seed in 1..=3u8 {
            let kp = keypair_from_seed(&[seed; 32]);
            let headers = headers_for(&kp, "/p", NOW * 1_000, b"");
            book.verify(&Method::POST, "/p", &headers, b"", Timestamp::new(NOW))
                .await
                .unwrap();
        }
        assert_eq!(book.len().await, 3);

        let later = NOW + NONCE_WINDOW_SECS + 10;
        let kp = keypair_from_seed(&[9; 32]);
        let headers = headers_for(&kp, "/p", later * 1_000, b"");
        book.verify(&Method::POST, "/p", &headers, b"", Timestamp::new(later))
            .await
            .unwrap();
        assert_eq!(book.len().await, 1);
    }

    #[tokio::test]
    async fn missing_headers_rejected() {
        let book = NonceBook::new();
        let err = book
            .verify(&Method::POST, "/p", &HeaderMap::new(), b"", Timestamp::new(NOW))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Unauthenticated(_)));
    }
}
