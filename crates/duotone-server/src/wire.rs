//! Minimal HTTP/1.1 framing over a byte stream.
//!
//! One request per connection: the head is read up to `\r\n\r\n`, the body
//! up to `Content-Length`, and the response is written with
//! `Connection: close`.

use http::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ServerError;

/// Largest accepted request head (request line plus headers).
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

const READ_CHUNK: usize = 8 * 1024;

pub type Request = http::Request<Vec<u8>>;
pub type Response = http::Response<Vec<u8>>;

/// Read one request from `reader`, rejecting bodies over `max_body` bytes.
pub async fn read_request<R>(reader: &mut R, max_body: usize) -> Result<Request, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ServerError::HeadTooLarge);
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(if buf.is_empty() {
                ServerError::Closed
            } else {
                ServerError::bad_request("incomplete request head")
            });
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    if head_end > MAX_HEAD_BYTES {
        return Err(ServerError::HeadTooLarge);
    }

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| ServerError::bad_request("request head is not valid UTF-8"))?;
    let (method, uri, headers) = parse_head(head)?;

    let content_length = content_length(&headers)?;
    let mut body = buf.split_off(head_end + 4);

    match content_length {
        Some(len) if len > max_body => return Err(ServerError::PayloadTooLarge),
        Some(len) => {
            while body.len() < len {
                let n = reader.read(&mut chunk).await?;
                if n == 0 {
                    return Err(ServerError::bad_request("request body truncated"));
                }
                body.extend_from_slice(&chunk[..n]);
            }
            body.truncate(len);
        }
        None if headers.contains_key(TRANSFER_ENCODING) => {
            return Err(ServerError::LengthRequired);
        }
        None if method == Method::POST || method == Method::PUT => {
            return Err(ServerError::LengthRequired);
        }
        None => body.clear(),
    }

    let mut request = http::Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.version_mut() = Version::HTTP_11;
    *request.headers_mut() = headers;
    Ok(request)
}

fn parse_head(head: &str) -> Result<(Method, Uri, HeaderMap), ServerError> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut parts = request_line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ServerError::bad_request("malformed request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ServerError::bad_request(format!("unsupported protocol {version}")));
    }

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| ServerError::bad_request("invalid method"))?;
    let uri: Uri = target
        .parse()
        .map_err(|_| ServerError::bad_request("invalid request target"))?;

    let mut headers = HeaderMap::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            return Err(ServerError::bad_request("malformed header line"));
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ServerError::bad_request("invalid header name"))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ServerError::bad_request("invalid header value"))?;
        headers.append(name, value);
    }

    Ok((method, uri, headers))
}

fn content_length(headers: &HeaderMap) -> Result<Option<usize>, ServerError> {
    headers
        .get(CONTENT_LENGTH)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .ok_or_else(|| ServerError::bad_request("invalid Content-Length"))
        })
        .transpose()
}

/// Serialize `response` onto `writer`. With `head_only` the body is omitted
/// but `Content-Length` still reports its size.
pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    head_only: bool,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let status = response.status();
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in response.headers() {
        if name == CONTENT_LENGTH || name == CONNECTION {
            continue;
        }
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str(&format!("content-length: {}\r\n", response.body().len()));
    head.push_str("connection: close\r\n\r\n");

    writer.write_all(head.as_bytes()).await?;
    if !head_only {
        writer.write_all(response.body()).await?;
    }
    writer.flush().await
}

/// A response with a body and content type.
pub fn bytes_response(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// A JSON response.
pub fn json_response(status: StatusCode, value: &serde_json::Value) -> Response {
    bytes_response(
        status,
        "application/json; charset=utf-8",
        value.to_string().into_bytes(),
    )
}

/// An empty response.
pub fn empty_response(status: StatusCode) -> Response {
    let mut response = http::Response::new(Vec::new());
    *response.status_mut() = status;
    response
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
