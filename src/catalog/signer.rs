//! Per-request credential signing.
//!
//! The catalog API authenticates every call with three query parameters:
//!
//! ```text
//! ts     = current UTC time in whole seconds
//! apikey = public key
//! hash   = md5(ts + private_key + public_key), lowercase hex
//! ```
//!
//! The timestamp comes from a [`Clock`] so tests can pin it.

use std::fmt;
use std::sync::Arc;

use md5::{Digest, Md5};

/// Source of the current UTC time in seconds.
pub trait Clock: Send + Sync {
    fn now_utc_seconds(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_utc_seconds(&self) -> i64 {
        self.0
    }
}

/// The three signing parameters attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub ts: String,
    pub apikey: String,
    pub hash: String,
}

impl Signature {
    /// Query pairs in the order the API documents them.
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("ts", self.ts.as_str()),
            ("apikey", self.apikey.as_str()),
            ("hash", self.hash.as_str()),
        ]
    }
}

#[derive(Clone)]
pub struct RequestSigner {
    public_key: String,
    private_key: String,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    /// Creates a signer that reads the system clock.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self::with_clock(public_key, private_key, Arc::new(SystemClock))
    }

    pub fn with_clock(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            clock,
        }
    }

    /// Signs a request at the clock's current time.
    pub fn sign(&self) -> Signature {
        self.sign_at(self.clock.now_utc_seconds())
    }

    /// Signs a request for an explicit timestamp.
    pub fn sign_at(&self, now_utc_seconds: i64) -> Signature {
        let ts = now_utc_seconds.to_string();
        let digest = Md5::digest(format!("{ts}{}{}", self.private_key, self.public_key).as_bytes());
        Signature {
            ts,
            apikey: self.public_key.clone(),
            hash: hex::encode(digest),
        }
    }
}

// Keeps the private key out of logs.
impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
