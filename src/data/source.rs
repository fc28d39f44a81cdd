use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

/// Tabular formats the cleaner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// First worksheet of an Excel workbook.
    Excel,
    /// Comma-separated UTF-8 text with a header row.
    Csv,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Excel => write!(f, "Excel"),
            SourceFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl SourceFormat {
    /// Guess from the URL or path extension (query string ignored).
    pub fn from_extension(source_ref: &str) -> Option<Self> {
        let path = source_ref.split(['?', '#']).next().unwrap_or(source_ref);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" => Some(SourceFormat::Excel),
            _ => None,
        }
    }

    /// Guess from a `Content-Type` header value. Generic binary types say
    /// nothing and yield `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/csv" | "application/csv" | "text/plain" => Some(SourceFormat::Csv),
            m if m.contains("spreadsheetml") || m.contains("ms-excel") => {
                Some(SourceFormat::Excel)
            }
            _ => None,
        }
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.starts_with("text/html") || lower.starts_with("application/xhtml")
}

/// Sign-in pages are sometimes served as `application/octet-stream`.
fn looks_like_html(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    text.starts_with("<!doctype html") || text.starts_with("<html")
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Raw sheet bytes plus the format they were declared as.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub format: SourceFormat,
}

/// Retrieves the raw bytes of a player sheet. The pipeline talks to this
/// trait so tests can substitute canned responses.
pub trait Fetch {
    fn fetch(&self, source_ref: &str) -> Result<Fetched, LoadError>;
}

/// Default request timeout for the remote sheet.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `http(s)://` sources with a blocking reqwest client and reads
/// anything else from the local filesystem.
pub struct SourceFetcher {
    client: reqwest::blocking::Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("sb-player-models/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::network("http client", e))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    fn fetch_http(&self, url: &str) -> Result<Fetched, LoadError> {
        log::info!("Downloading player sheet from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LoadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::network(url, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if is_html_content_type(&content_type) {
            return Err(LoadError::Format {
                source_ref: url.to_string(),
                content_type,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| LoadError::network(url, e))?
            .to_vec();
        if looks_like_html(&bytes) {
            return Err(LoadError::Format {
                source_ref: url.to_string(),
                content_type: "an HTML page".to_string(),
            });
        }

        let format = SourceFormat::from_content_type(&content_type)
            .or_else(|| SourceFormat::from_extension(url))
            .unwrap_or(SourceFormat::Excel);
        log::debug!(
            "Fetched {} bytes from {url} ({content_type:?}, read as {format})",
            bytes.len()
        );
        Ok(Fetched { bytes, format })
    }

    fn fetch_file(&self, path: &str) -> Result<Fetched, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::network(path, e))?;
        if looks_like_html(&bytes) {
            return Err(LoadError::Format {
                source_ref: path.to_string(),
                content_type: "an HTML page".to_string(),
            });
        }
        let format = SourceFormat::from_extension(path).unwrap_or(SourceFormat::Excel);
        Ok(Fetched { bytes, format })
    }
}

impl Fetch for SourceFetcher {
    fn fetch(&self, source_ref: &str) -> Result<Fetched, LoadError> {
        let lower = source_ref.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            self.fetch_http(source_ref)
        } else {
            self.fetch_file(source_ref)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use assert_matches::assert_matches;

    use super::*;

    /// Serve exactly one canned HTTP response on a random local port.
    fn serve_once(status: &str, content_type: &str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://{addr}/players.xlsx")
    }

    fn fetcher() -> SourceFetcher {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        SourceFetcher::from_client(client)
    }

    #[test]
    fn html_content_type_is_a_format_error() {
        let url = serve_once("200 OK", "text/html; charset=utf-8", b"<p>sign in</p>");
        let err = fetcher().fetch(&url).unwrap_err();
        assert_matches!(err, LoadError::Format { content_type, .. } if content_type.starts_with("text/html"));
    }

    #[test]
    fn html_body_behind_binary_content_type_is_a_format_error() {
        let url = serve_once(
            "200 OK",
            "application/octet-stream",
            b"<!DOCTYPE html><html><body>Sign in</body></html>",
        );
        assert_matches!(fetcher().fetch(&url), Err(LoadError::Format { .. }));
    }

    #[test]
    fn non_success_status_is_a_network_error() {
        let url = serve_once("404 Not Found", "text/plain", b"missing");
        let err = fetcher().fetch(&url).unwrap_err();
        assert_matches!(err, LoadError::Network { reason, .. } if reason.contains("404"));
    }

    #[test]
    fn csv_content_type_wins_over_extension() {
        let url = serve_once("200 OK", "text/csv", b"Name,Age\nAda,21\n");
        let fetched = fetcher().fetch(&url).unwrap();
        assert_eq!(fetched.format, SourceFormat::Csv);
        assert_eq!(fetched.bytes, b"Name,Age\nAda,21\n");
    }

    #[test]
    fn generic_content_type_falls_back_to_extension() {
        let url = serve_once("200 OK", "application/octet-stream", b"PK\x03\x04");
        assert_eq!(fetcher().fetch(&url).unwrap().format, SourceFormat::Excel);
    }

    #[test]
    fn missing_local_file_is_a_network_error() {
        let err = fetcher().fetch("/definitely/not/here.csv").unwrap_err();
        assert_matches!(err, LoadError::Network { .. });
    }

    #[test]
    fn extension_detection_ignores_query_string() {
        assert_eq!(
            SourceFormat::from_extension("https://host/sheet.csv?raw=true"),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_extension("data/Players.XLSX"),
            Some(SourceFormat::Excel)
        );
        assert_eq!(SourceFormat::from_extension("https://host/export"), None);
    }
}
