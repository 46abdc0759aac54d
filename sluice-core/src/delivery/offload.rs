//! Transfer offload to the hosting server.
//!
//! Instead of streaming bytes itself, a delivery can emit a header that
//! tells the server in front of the application to perform the transfer:
//! `X-Sendfile` carries the literal filesystem path for module-based hosts,
//! `X-Accel-Redirect` carries an internal location for reverse proxies. The
//! capability is declared by host configuration at startup; nothing about
//! the environment is sniffed at runtime.

use axum::http::header::{HeaderName, HeaderValue};

use super::headers::{ResponseHead, compose_common};
use super::DeliveryRequest;

const X_SENDFILE: HeaderName = HeaderName::from_static("x-sendfile");
const X_ACCEL_REDIRECT: HeaderName = HeaderName::from_static("x-accel-redirect");

/// Offload mechanism the hosting environment provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OffloadMode {
    /// No offload; all transfers stream through the application
    #[default]
    Disabled,
    /// Host honors `X-Sendfile` with a filesystem path
    SendfileHeader,
    /// Reverse proxy honors `X-Accel-Redirect` under this internal location.
    /// Mapping the location back to a real path is the proxy's configuration.
    InternalRedirect { location: String },
}

/// Emits offload headers according to the configured capability.
#[derive(Debug, Clone)]
pub struct OffloadDispatcher {
    mode: OffloadMode,
}

impl OffloadDispatcher {
    /// Creates a dispatcher for the host-declared capability.
    pub fn new(mode: OffloadMode) -> Self {
        Self { mode }
    }

    /// Whether the hosting environment can take over transfers at all.
    pub fn supports(&self) -> bool {
        self.mode != OffloadMode::Disabled
    }

    /// Builds the bodiless response head that delegates the transfer.
    ///
    /// Standard headers (content type, disposition, caching, security) are
    /// composed as for any delivery; exactly one offload header is added.
    /// Returns `None` when offload is disabled or the target path cannot be
    /// expressed as a header value, in which case the caller falls back to
    /// streaming.
    pub fn dispatch(&self, request: &DeliveryRequest, resolved_mime: &str) -> Option<ResponseHead> {
        let (name, value) = match &self.mode {
            OffloadMode::Disabled => return None,
            OffloadMode::SendfileHeader => {
                let path = request.file_path.to_str()?;
                (X_SENDFILE, HeaderValue::from_str(path).ok()?)
            }
            OffloadMode::InternalRedirect { location } => {
                let file_name = request.file_path.file_name()?.to_str()?;
                let redirect = format!(
                    "{}/{}",
                    location.trim_end_matches('/'),
                    urlencoding::encode(file_name)
                );
                (X_ACCEL_REDIRECT, HeaderValue::from_str(&redirect).ok()?)
            }
        };

        let mut head = compose_common(request, resolved_mime);
        head.headers.insert(name, value);
        Some(head)
    }
}
