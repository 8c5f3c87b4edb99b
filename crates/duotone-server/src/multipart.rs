//! `multipart/form-data` body parsing.
//!
//! The whole body is already in memory, so parts are sliced out of it
//! directly. Text parts become fields; parts with a `filename` become files.

use std::collections::HashMap;

use crate::error::ServerError;
use crate::wire::find;

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// Client-side file name, if sent.
    pub file_name: Option<String>,
    /// Declared MIME type, if sent.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Vec<u8>,
}

/// A parsed form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    /// Text value of `name`. The first occurrence wins.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// First file uploaded under `name`.
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.iter().find(|f| f.field == name)
    }

    /// Remove and return the first file uploaded under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        let idx = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(idx))
    }
}

/// Extract the boundary from a `Content-Type` header value.
pub fn boundary(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v.trim().trim_matches('"'))
        .filter(|b| !b.is_empty() && b.len() <= 70)
}

/// Parse `body` as `multipart/form-data` with the boundary from `content_type`.
pub fn parse(content_type: &str, body: &[u8]) -> Result<MultipartForm, ServerError> {
    let boundary = boundary(content_type)
        .ok_or_else(|| ServerError::bad_request("expected multipart/form-data with a boundary"))?;
    let delimiter = format!("--{boundary}").into_bytes();
    let separator = format!("\r\n--{boundary}").into_bytes();

    let start = find(body, &delimiter)
        .ok_or_else(|| ServerError::bad_request("multipart boundary not found"))?;
    let mut rest = &body[start + delimiter.len()..];
    let mut form = MultipartForm::default();

    loop {
        if rest.starts_with(b"--") {
            // Closing delimiter.
            return Ok(form);
        }
        rest = rest
            .strip_prefix(b"\r\n")
            .ok_or_else(|| ServerError::bad_request("malformed multipart delimiter"))?;

        let head_end = find(rest, b"\r\n\r\n")
            .ok_or_else(|| ServerError::bad_request("malformed multipart part headers"))?;
        let head = std::str::from_utf8(&rest[..head_end])
            .map_err(|_| ServerError::bad_request("multipart headers are not valid UTF-8"))?;
        let content = &rest[head_end + 4..];

        let end = find(content, &separator)
            .ok_or_else(|| ServerError::bad_request("unterminated multipart part"))?;
        add_part(&mut form, head, &content[..end])?;
        rest = &content[end + separator.len()..];
    }
}

fn add_part(form: &mut MultipartForm, head: &str, data: &[u8]) -> Result<(), ServerError> {
    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;

    for line in head.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((k, v)) = param.split_once('=') else {
                    continue;
                };
                let v = v.trim().trim_matches('"').to_owned();
                match k.trim().to_ascii_lowercase().as_str() {
                    "name" => name = Some(v),
                    "filename" => file_name = Some(v),
                    _ => {}
                }
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_owned());
        }
    }

    let field = name.ok_or_else(|| ServerError::bad_request("multipart part without a name"))?;
    match file_name.as_deref() {
        // An empty file input still sends a part with `filename=""`.
        Some("") => {}
        Some(_) => form.files.push(FilePart {
            field,
            file_name,
            content_type,
            data: data.to_vec(),
        }),
        None => {
            let value = String::from_utf8_lossy(data).into_owned();
            form.fields.entry(field).or_insert(value);
        }
    }
    Ok(())
}
