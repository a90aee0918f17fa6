//! Manifest download.
//!
//! One HTTP GET through the curl crate (libcurl). The whole body is collected
//! before parsing, so nothing is ever checked against a partial manifest. No
//! retries here; callers that want them wrap [`fetch_manifest`].

use crate::config::FetchConfig;
use crate::manifest::{Manifest, ManifestError};

/// Why a manifest could not be obtained. Either way, no report can be produced.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// URL does not parse or is not http/https. Raised before any I/O.
    #[error("invalid manifest URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Connection, transport, non-2xx status, or oversized body.
    #[error("failed to fetch manifest from {url}: {reason}")]
    Network { url: String, reason: String },
    /// Body arrived but is not a valid manifest.
    #[error(transparent)]
    Parse(#[from] ManifestError),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }

    fn network(url: &str, reason: impl ToString) -> Self {
        FetchError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Fetches and parses the manifest at `url`.
///
/// Follows redirects. Runs in the current thread; call from `spawn_blocking` if
/// used from async code.
pub fn fetch_manifest(url: &str, cfg: &FetchConfig) -> Result<Manifest, FetchError> {
    check_url(url)?;
    let body = get_body(url, cfg)?;
    tracing::debug!("fetched manifest from {} ({} bytes)", url, body.len());
    let manifest = Manifest::from_json_slice(&body)?;
    tracing::info!(
        "manifest {} lists {} files",
        manifest.version().unwrap_or("(unversioned)"),
        manifest.len()
    );
    Ok(manifest)
}

fn check_url(url: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}

fn get_body(url: &str, cfg: &FetchConfig) -> Result<Vec<u8>, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let mut too_large = false;
    let limit = cfg.max_body_bytes;

    let mut easy = curl::easy::Easy::new();
    let setup = (|| -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(cfg.connect_timeout())?;
        // Zero means no overall limit, same as libcurl.
        easy.timeout(cfg.timeout())?;
        Ok(())
    })();
    setup.map_err(|e| FetchError::network(url, e))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if body.len() as u64 + data.len() as u64 > limit {
                    too_large = true;
                    return Ok(0); // abort transfer
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(|e| FetchError::network(url, e))?;
        let performed = transfer.perform();
        drop(transfer);
        if too_large {
            return Err(FetchError::network(
                url,
                format!("response body exceeds {} bytes", limit),
            ));
        }
        performed.map_err(|e| FetchError::network(url, e))?;
    }

    let code = easy
        .response_code()
        .map_err(|e| FetchError::network(url, e))?;
    if !(200..300).contains(&code) {
        return Err(FetchError::network(url, format!("HTTP {}", code)));
    }
    Ok(body)
}
