//! Response status and header composition for file delivery.
//!
//! Every delivered file gets no-store caching and anti-sniffing headers.
//! Content types that can execute in a browser context are never served
//! under their own type: they are forced to a generic binary type with
//! attachment disposition, regardless of what the caller asked for.

use axum::http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    HeaderMap, HeaderName, HeaderValue, PRAGMA,
};
use axum::http::StatusCode;

use super::range::ByteRange;
use super::DeliveryRequest;

/// Fallback type for content that must not execute in the browser.
pub const GENERIC_BINARY_TYPE: &str = "application/octet-stream";

/// Content types capable of executing in a browser context.
///
/// Serving these inline under their own type turns a file download endpoint
/// into an XSS vector, so they are always delivered as opaque attachments.
const ACTIVE_CONTENT_TYPES: &[&str] = &[
    "text/html",
    "application/xhtml+xml",
    "text/javascript",
    "application/javascript",
    "application/x-javascript",
    "text/ecmascript",
    "application/ecmascript",
    "image/svg+xml",
];

const X_CONTENT_TYPE_OPTIONS: HeaderName = HeaderName::from_static("x-content-type-options");
const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Status and headers for one delivery response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Checks whether a resolved content type is on the active-content denylist.
///
/// Comparison ignores case and any parameters (`text/html; charset=utf-8`).
pub fn is_active_content(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or(mime).trim().to_lowercase();
    ACTIVE_CONTENT_TYPES.contains(&essence.as_str())
}

/// Composes the headers every delivery shares: caching, security, content
/// type, and disposition. Status is 200; range-specific headers are layered
/// on by [`compose`].
pub fn compose_common(request: &DeliveryRequest, resolved_mime: &str) -> ResponseHead {
    let mut headers = HeaderMap::new();

    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_ROBOTS_TAG, HeaderValue::from_static("noindex, nofollow"));

    let active = is_active_content(resolved_mime);
    let effective_mime = if active {
        GENERIC_BINARY_TYPE
    } else {
        resolved_mime
    };
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(effective_mime)
            .unwrap_or_else(|_| HeaderValue::from_static(GENERIC_BINARY_TYPE)),
    );

    // Active content is an attachment no matter what the caller prefers
    let attachment = request.force_download || active;
    let disposition = content_disposition_value(attachment, &request.display_name);
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    ResponseHead {
        status: StatusCode::OK,
        headers,
    }
}

/// Composes the full response head for a streamed delivery.
///
/// With a range: 206 plus `Content-Range` and the range's byte count as
/// `Content-Length`. Without: 200 and the total size. `Accept-Ranges`
/// advertises `bytes` unless range support is disabled for the request.
pub fn compose(
    request: &DeliveryRequest,
    resolved_mime: &str,
    range: Option<&ByteRange>,
    total_size: u64,
) -> ResponseHead {
    let mut head = compose_common(request, resolved_mime);

    let accept_ranges = if request.range_enabled { "bytes" } else { "none" };
    head.headers
        .insert(ACCEPT_RANGES, HeaderValue::from_static(accept_ranges));

    match range {
        Some(range) => {
            head.status = StatusCode::PARTIAL_CONTENT;
            head.headers.insert(
                CONTENT_RANGE,
                HeaderValue::from_str(&format!(
                    "bytes {}-{}/{}",
                    range.start(),
                    range.end(),
                    range.total_size()
                ))
                .unwrap_or_else(|_| HeaderValue::from_static("bytes */0")),
            );
            head.headers.insert(
                CONTENT_LENGTH,
                HeaderValue::from_str(&range.len().to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("0")),
            );
        }
        None => {
            head.headers.insert(
                CONTENT_LENGTH,
                HeaderValue::from_str(&total_size.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("0")),
            );
        }
    }

    head
}

/// Builds the Content-Disposition value for a display name.
///
/// The primary `filename=` parameter is ASCII-sanitized for legacy clients.
/// When sanitization had to alter the name, an RFC 5987 `filename*=`
/// parameter carries the percent-encoded original so modern clients recover
/// the real name.
fn content_disposition_value(attachment: bool, display_name: &str) -> String {
    let kind = if attachment { "attachment" } else { "inline" };
    let sanitized = ascii_sanitize(display_name);

    let mut value = format!("{kind}; filename=\"{sanitized}\"");
    if sanitized != display_name {
        value.push_str("; filename*=UTF-8''");
        value.push_str(&urlencoding::encode(display_name));
    }
    value
}

/// Replaces everything a quoted ASCII filename parameter cannot carry.
fn ascii_sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryConfig;
    use crate::delivery::range::{RangeOutcome, parse_range};

    fn request(display_name: &str) -> DeliveryRequest {
        DeliveryRequest::new("/srv/files/data.bin", display_name, &DeliveryConfig::default())
    }

    fn header_str<'a>(head: &'a ResponseHead, name: &str) -> &'a str {
        head.headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {name}"))
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_full_content_head() {
        let head = compose(&request("data.bin"), "application/pdf", None, 1000);

        assert_eq!(head.status, StatusCode::OK);
        assert_eq!(header_str(&head, "content-length"), "1000");
        assert_eq!(header_str(&head, "accept-ranges"), "bytes");
        assert_eq!(header_str(&head, "content-type"), "application/pdf");
        assert_eq!(header_str(&head, "cache-control"), "no-store, no-cache");
        assert_eq!(header_str(&head, "x-content-type-options"), "nosniff");
        assert_eq!(header_str(&head, "x-robots-tag"), "noindex, nofollow");
        assert!(head.headers.get("content-range").is_none());
    }

    #[test]
    fn test_partial_content_head() {
        let RangeOutcome::Partial(range) = parse_range(Some("bytes=500-"), 1000) else {
            panic!("expected partial range");
        };
        let head = compose(&request("data.bin"), "application/pdf", Some(&range), 1000);

        assert_eq!(head.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(header_str(&head, "content-range"), "bytes 500-999/1000");
        assert_eq!(header_str(&head, "content-length"), "500");
        assert_eq!(header_str(&head, "accept-ranges"), "bytes");
    }

    #[test]
    fn test_accept_ranges_none_when_disabled() {
        let mut req = request("data.bin");
        req.range_enabled = false;
        let head = compose(&req, "application/pdf", None, 1000);

        assert_eq!(header_str(&head, "accept-ranges"), "none");
    }

    #[test]
    fn test_active_content_is_forced_to_attachment() {
        // Inline preference must not survive for types that execute in a browser
        let mut req = request("page.html");
        req.force_download = false;
        let head = compose(&req, "text/html", None, 1000);

        assert_eq!(header_str(&head, "content-type"), GENERIC_BINARY_TYPE);
        assert!(header_str(&head, "content-disposition").starts_with("attachment"));
    }

    #[test]
    fn test_active_content_detection() {
        assert!(is_active_content("text/html"));
        assert!(is_active_content("Text/HTML; charset=utf-8"));
        assert!(is_active_content("application/javascript"));
        assert!(is_active_content("image/svg+xml"));
        assert!(!is_active_content("application/pdf"));
        assert!(!is_active_content("video/mp4"));
    }

    #[test]
    fn test_inline_allowed_for_passive_content() {
        let mut req = request("report.pdf");
        req.force_download = false;
        let head = compose(&req, "application/pdf", None, 1000);

        assert_eq!(header_str(&head, "content-type"), "application/pdf");
        assert!(header_str(&head, "content-disposition").starts_with("inline"));
    }

    #[test]
    fn test_ascii_filename_has_single_parameter() {
        let head = compose(&request("report.pdf"), "application/pdf", None, 1000);
        let disposition = header_str(&head, "content-disposition");

        assert_eq!(disposition, "attachment; filename=\"report.pdf\"");
        assert!(!disposition.contains("filename*"));
    }

    #[test]
    fn test_non_ascii_filename_adds_rfc5987_parameter() {
        let head = compose(&request("résumé.pdf"), "application/pdf", None, 1000);
        let disposition = header_str(&head, "content-disposition");

        assert!(disposition.contains("filename=\"r_sum_.pdf\""));
        assert!(disposition.contains("filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"));
    }

    #[test]
    fn test_quotes_in_filename_are_sanitized() {
        let head = compose(&request("a\"b\\c.txt"), "text/plain", None, 10);
        let disposition = header_str(&head, "content-disposition");

        assert!(disposition.contains("filename=\"a_b_c.txt\""));
        assert!(disposition.contains("filename*=UTF-8''"));
    }
}
