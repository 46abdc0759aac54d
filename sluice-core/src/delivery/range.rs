//! HTTP byte-range parsing for file delivery.
//!
//! Parses the single-range `bytes=<start>-<end>` form against a known total
//! size. Pure and deterministic; all I/O stays in the caller.

/// An inclusive byte window into a file of known size.
///
/// Constructed only by [`parse_range`], which guarantees
/// `0 <= start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total_size: u64,
}

impl ByteRange {
    /// First byte offset of the window.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset of the window (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Size of the file the window was validated against.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of bytes the window covers.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Result of parsing a client-supplied range header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable range; serve the full content
    Full,
    /// A validated partial window
    Partial(ByteRange),
    /// A recognized range that lies outside the file; respond 416
    Unsatisfiable { total_size: u64 },
}

/// Parses an HTTP Range header value against a known total size.
///
/// Handles the standard single-range `bytes=start-end` form where either
/// bound may be omitted: a missing start means 0, a missing end means
/// `total_size - 1`. Multi-range requests and anything that does not parse
/// degrade to [`RangeOutcome::Full`] rather than guessing a window. A
/// syntactically valid range whose bounds fall outside the file returns
/// [`RangeOutcome::Unsatisfiable`].
///
/// # Examples
/// ```
/// use sluice_core::delivery::{RangeOutcome, parse_range};
///
/// let outcome = parse_range(Some("bytes=500-"), 1000);
/// let RangeOutcome::Partial(range) = outcome else {
///     panic!("expected partial range");
/// };
/// assert_eq!((range.start(), range.end(), range.len()), (500, 999, 500));
/// ```
pub fn parse_range(header: Option<&str>, total_size: u64) -> RangeOutcome {
    let Some(raw) = header else {
        return RangeOutcome::Full;
    };

    let Some(spec) = raw.trim().strip_prefix("bytes=") else {
        return RangeOutcome::Full;
    };

    // Multi-range requests degrade to a full transfer
    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() && end_str.is_empty() {
        return RangeOutcome::Full;
    }

    let start = if start_str.is_empty() {
        0
    } else {
        match start_str.parse::<u64>() {
            Ok(value) => value,
            Err(_) => return RangeOutcome::Full,
        }
    };

    let end = if end_str.is_empty() {
        total_size.saturating_sub(1)
    } else {
        match end_str.parse::<u64>() {
            Ok(value) => value,
            Err(_) => return RangeOutcome::Full,
        }
    };

    if total_size == 0 || start > end || end >= total_size {
        return RangeOutcome::Unsatisfiable { total_size };
    }

    RangeOutcome::Partial(ByteRange {
        start,
        end,
        total_size,
    })
}
