//! multipart/form-data encoding
//!
//! Bodies are encoded up front so the total length is known before the
//! first byte is sent, which is what byte-level progress is measured
//! against.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BOUNDARY: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Text(String),
    File {
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub body: PartBody,
}

#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .unsigned_abs();
        let seq = NEXT_BOUNDARY.fetch_add(1, Ordering::Relaxed);
        Self::with_boundary(format!("----dkl-form-{:x}{:04x}", nanos, seq))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::File {
                filename: filename.into(),
                content_type: content_type.into(),
                data,
            },
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Value of the first text part with this name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.body {
            PartBody::Text(v) if p.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// File names of every file part with this field name, in order
    pub fn file_names(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|p| match &p.body {
                PartBody::File { filename, .. } if p.name == name => Some(filename.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Length in bytes of [`encode`](Self::encode)'s output
    pub fn encoded_len(&self) -> u64 {
        let delimiter = 2 + self.boundary.len() as u64 + 2;
        let parts: u64 = self
            .parts
            .iter()
            .map(|p| delimiter + part_header(p).len() as u64 + body_len(&p.body) + 2)
            .sum();
        parts + 2 + self.boundary.len() as u64 + 4
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len() as usize);
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(part_header(part).as_bytes());
            match &part.body {
                PartBody::Text(value) => out.extend_from_slice(value.as_bytes()),
                PartBody::File { data, .. } => out.extend_from_slice(data),
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
        out
    }
}

fn part_header(part: &Part) -> String {
    match &part.body {
        PartBody::Text(_) => format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape(&part.name)
        ),
        PartBody::File {
            filename,
            content_type,
            ..
        } => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            escape(&part.name),
            escape(filename),
            content_type
        ),
    }
}

fn body_len(body: &PartBody) -> u64 {
    match body {
        PartBody::Text(value) => value.len() as u64,
        PartBody::File { data, .. } => data.len() as u64,
    }
}

// Same escaping browsers apply to field and file names.
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
