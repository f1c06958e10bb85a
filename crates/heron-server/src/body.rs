//! Bounded request body reading.
//!
//! The declared `content-length` is checked first, then the body is pulled
//! frame by frame and abandoned as soon as the running total passes the
//! limit. `gzip` and `deflate` bodies are decoded afterwards under the same
//! limit, so a small compressed payload cannot inflate past it.

use std::io::Read;

use bytes::{Bytes, BytesMut};
use flate2::read::{GzDecoder, ZlibDecoder};
use heron_core::DispatchError;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue};
use hyper::body::Body;
use http_body_util::BodyExt;

/// Size and decoding limits for one request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// Largest accepted body, measured after decoding.
    pub max_bytes: usize,
    /// Decode `gzip` and `deflate`. When off, encoded bodies pass through untouched.
    pub decompress: bool,
}

/// Reads `body` into memory under `limits`.
///
/// When the body was decoded, `content-encoding` is removed from `headers`
/// and `content-length` is rewritten to the decoded size.
pub async fn read_body<B>(body: B, headers: &mut HeaderMap, limits: BodyLimits) -> Result<Bytes, DispatchError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    if let Some(declared) = declared_length(headers)? {
        if declared > limits.max_bytes as u64 {
            return Err(DispatchError::payload_too_large(limits.max_bytes));
        }
    }

    let raw = collect_bounded(body, limits.max_bytes).await?;
    if !limits.decompress {
        return Ok(raw);
    }

    let Some(encoding) = content_encoding(headers)? else {
        return Ok(raw);
    };

    let decoded = match encoding.as_str() {
        "identity" => return Ok(raw),
        "gzip" | "x-gzip" => inflate(GzDecoder::new(raw.as_ref()), limits.max_bytes, &encoding)?,
        "deflate" => inflate(ZlibDecoder::new(raw.as_ref()), limits.max_bytes, &encoding)?,
        other => {
            return Err(DispatchError::bad_request(format!("unsupported content-encoding '{other}'")));
        }
    };

    headers.remove(CONTENT_ENCODING);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(decoded.len()));
    Ok(decoded)
}

fn declared_length(headers: &HeaderMap) -> Result<Option<u64>, DispatchError> {
    headers
        .get(CONTENT_LENGTH)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|text| text.trim().parse::<u64>().ok())
                .ok_or_else(|| DispatchError::bad_request("invalid content-length"))
        })
        .transpose()
}

fn content_encoding(headers: &HeaderMap) -> Result<Option<String>, DispatchError> {
    let Some(value) = headers.get(CONTENT_ENCODING) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| DispatchError::bad_request("invalid content-encoding"))?
        .trim()
        .to_ascii_lowercase();
    if value.contains(',') {
        return Err(DispatchError::bad_request(format!("unsupported content-encoding '{value}'")));
    }
    Ok(Some(value))
}

async fn collect_bounded<B>(body: B, max_bytes: usize) -> Result<Bytes, DispatchError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut buf = BytesMut::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|err| DispatchError::bad_request(format!("failed to read request body: {err}")))?;
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > max_bytes {
                return Err(DispatchError::payload_too_large(max_bytes));
            }
            buf.extend_from_slice(&data);
        }
    }

    Ok(buf.freeze())
}

fn inflate(decoder: impl Read, max_bytes: usize, encoding: &str) -> Result<Bytes, DispatchError> {
    let mut out = Vec::new();
    decoder
        .take(max_bytes as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|err| DispatchError::bad_request(format!("corrupt {encoding} body: {err}")))?;
    if out.len() > max_bytes {
        return Err(DispatchError::payload_too_large(max_bytes));
    }
    Ok(Bytes::from(out))
}
