//! Streaming a stored file into a response, with conditional and range
//! request handling.

use std::io::SeekFrom;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use filedrop_store::OpenFile;
use httpdate::{fmt_http_date, parse_http_date};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::ApiError;

/// How the response should present the file.
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions<'a> {
    /// Used for the content type and, for attachments, the suggested name.
    pub name: &'a str,
    /// Set `Content-Disposition: attachment`.
    pub attachment: bool,
    /// Operation name reported if serving fails.
    pub operation: &'static str,
}

/// HTTP dates have one-second resolution.
fn truncate_to_seconds(time: SystemTime) -> Option<SystemTime> {
    let secs = time.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(UNIX_EPOCH + Duration::from_secs(secs))
}

fn header_date(headers: &HeaderMap, name: header::HeaderName) -> Option<SystemTime> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_http_date(value).ok())
}

fn not_modified(request_headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    match (
        modified.and_then(truncate_to_seconds),
        header_date(request_headers, header::IF_MODIFIED_SINCE),
    ) {
        (Some(modified), Some(since)) => modified <= since,
        _ => false,
    }
}

/// `If-Range` only carries dates here; an entity tag never matches since
/// no tags are issued.
fn if_range_matches(request_headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    let Some(value) = request_headers.get(header::IF_RANGE) else {
        return true;
    };
    let Some(date) = value.to_str().ok().and_then(|v| parse_http_date(v).ok()) else {
        return false;
    };
    modified
        .and_then(truncate_to_seconds)
        .is_some_and(|modified| modified <= date)
}

/// Outcome of interpreting a `Range` header against a file length.
#[derive(Debug, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: serve the whole file.
    Full,
    /// Serve bytes `start..=end`.
    Partial { start: u64, end: u64 },
    /// Syntactically valid but outside the file.
    Unsatisfiable,
}

/// Interpret a single `bytes=` range.
///
/// Malformed headers and multi-range requests fall back to [`RangeRequest::Full`].
pub fn parse_range(value: Option<&HeaderValue>, len: u64) -> RangeRequest {
    let Some(ranges) = value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().strip_prefix("bytes="))
    else {
        return RangeRequest::Full;
    };
    if ranges.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start_part, end_part)) = ranges.split_once('-') else {
        return RangeRequest::Full;
    };
    let (start_part, end_part) = (start_part.trim(), end_part.trim());

    if start_part.is_empty() {
        // Suffix range: the last `n` bytes.
        let Ok(suffix) = end_part.parse::<u64>() else {
            return RangeRequest::Full;
        };
        if suffix == 0 || len == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial {
            start: len.saturating_sub(suffix),
            end: len - 1,
        };
    }

    let Ok(start) = start_part.parse::<u64>() else {
        return RangeRequest::Full;
    };
    let end = if end_part.is_empty() {
        None
    } else {
        match end_part.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            _ => return RangeRequest::Full,
        }
    };

    if start >= len {
        return RangeRequest::Unsatisfiable;
    }
    let end = end.map_or(len - 1, |end| end.min(len - 1));
    RangeRequest::Partial { start, end }
}

/// `attachment; filename="..."` for `name`.
///
/// Control characters cannot appear in a header value, so they are replaced
/// with `_`; the stored name is unaffected.
fn content_disposition(name: &str) -> HeaderValue {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push('_'),
            c => escaped.push(c),
        }
    }
    HeaderValue::from_bytes(format!("attachment; filename=\"{escaped}\"").as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Build the response for an opened file.
///
/// The file handle moves into the response body and is closed when the
/// body finishes streaming or is dropped.
pub async fn serve_file(
    opened: OpenFile,
    request_headers: &HeaderMap,
    options: ServeOptions<'_>,
) -> Result<Response, ApiError> {
    let OpenFile {
        mut file,
        len,
        modified,
    } = opened;

    let mut headers = HeaderMap::new();
    if let Some(value) = modified
        .map(fmt_http_date)
        .and_then(|date| HeaderValue::from_str(&date).ok())
    {
        headers.insert(header::LAST_MODIFIED, value);
    }

    if not_modified(request_headers, modified) {
        return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
    }

    let mime = mime_guess::from_path(options.name).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.essence_str()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if options.attachment {
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(options.name),
        );
    }

    let range = if if_range_matches(request_headers, modified) {
        parse_range(request_headers.get(header::RANGE), len)
    } else {
        RangeRequest::Full
    };

    match range {
        RangeRequest::Full => {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
            let body = Body::from_stream(ReaderStream::new(file));
            Ok((StatusCode::OK, headers, body).into_response())
        }
        RangeRequest::Partial { start, end } => {
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(|e| ApiError::io(options.operation, e))?;
            tracing::debug!(name = options.name, start, end, "serving range");

            if let Ok(value) = HeaderValue::from_str(&format!("bytes {start}-{end}/{len}")) {
                headers.insert(header::CONTENT_RANGE, value);
            }
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
            let body = Body::from_stream(ReaderStream::new(file.take(length)));
            Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
        }
        RangeRequest::Unsatisfiable => Err(ApiError::RangeNotSatisfiable { len }),
    }
}
