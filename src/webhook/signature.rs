use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Digest {
    Sha256,
    Sha1,
}

/// One signature header convention.
struct Scheme {
    headers: &'static [&'static str],
    prefixes: &'static [&'static str],
    /// Whether a value with none of the prefixes is taken as a bare hex digest.
    bare_hex: bool,
    digest: Digest,
}

/// Checked in order; the first scheme whose header is present with an
/// acceptable format decides the outcome.
static SCHEMES: [Scheme; 3] = [
    // Gitea / Gogs
    Scheme {
        headers: &["X-Gitea-Signature", "X-Gogs-Signature"],
        prefixes: &["sha256=", "SHA256="],
        bare_hex: true,
        digest: Digest::Sha256,
    },
    // GitHub-style
    Scheme {
        headers: &["X-Hub-Signature-256"],
        prefixes: &["sha256=", "SHA256="],
        bare_hex: false,
        digest: Digest::Sha256,
    },
    // Legacy GitHub-style
    Scheme {
        headers: &["X-Hub-Signature"],
        prefixes: &["sha1=", "SHA1="],
        bare_hex: false,
        digest: Digest::Sha1,
    },
];

impl Scheme {
    fn extract<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let value = self
            .headers
            .iter()
            .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
            .filter(|v| !v.is_empty())?;

        match self.prefixes.iter().find_map(|p| value.strip_prefix(p)) {
            Some(hex) => Some(hex),
            None if self.bare_hex => Some(value),
            None => None,
        }
    }
}

/// Verify a webhook delivery against the shared secret.
///
/// `body` must be the raw request bytes. An empty secret accepts every
/// delivery, which is only meant for local testing.
pub fn verify(secret: &str, body: &[u8], headers: &HeaderMap) -> bool {
    if secret.is_empty() {
        return true;
    }

    for scheme in SCHEMES.iter() {
        if let Some(signature) = scheme.extract(headers) {
            debug!(digest = ?scheme.digest, header = scheme.headers[0], "checking signature");
            return digest_matches(scheme.digest, secret.as_bytes(), body, signature);
        }
    }

    debug!("no signature header present");
    false
}

/// Constant-time comparison of `signature_hex` against the HMAC of `body`.
fn digest_matches(digest: Digest, key: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    match digest {
        Digest::Sha256 => match HmacSha256::new_from_slice(key) {
            Ok(mut mac) => {
                mac.update(body);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
        Digest::Sha1 => match HmacSha1::new_from_slice(key) {
            Ok(mut mac) => {
                mac.update(body);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
    }
}
