use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use super::models::{Playlist, Track};

/// Errors surfaced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (refused, DNS, timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    /// The response body did not match the expected shape.
    #[error("bad response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// A local file picked for an upload could not be read.
    #[error("cannot read {path}: {source}")]
    UploadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared upload progress, 0 to 100. Written by the streaming reader while
/// the request body goes out, read by the UI every frame.
pub type ProgressHandle = Arc<Mutex<u8>>;

/// Everything the upload form collects.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub title: Option<String>,
    /// Already split and trimmed; sent as a JSON array string when non-empty.
    pub tags: Vec<String>,
    pub cover: Option<PathBuf>,
}

/// Blocking client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    media: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        // Media downloads move whole files; the blocking client's default
        // 30 second deadline would cut them off.
        let media = Client::builder().timeout(None).build()?;
        Ok(Self {
            http,
            media,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_timeout,
        })
    }

    /// Deadline-free client for media downloads, used by the duration
    /// probe worker.
    pub fn media_http(&self) -> &Client {
        &self.media
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)).send()?;
        decode(resp)
    }

    pub fn list_tracks(&self) -> Result<Vec<Track>, ApiError> {
        self.get_json("/api/tracks/")
    }

    pub fn top_tracks(&self) -> Result<Vec<Track>, ApiError> {
        self.get_json("/api/stats/top-tracks/")
    }

    pub fn search_tags(&self, fragment: &str) -> Result<Vec<String>, ApiError> {
        let resp = self
            .http
            .get(self.url("/api/tags/"))
            .query(&[("q", fragment)])
            .send()?;
        decode(resp)
    }

    pub fn generate_mix(&self, prompt: &str) -> Result<Playlist, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/generate-mix/"))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()?;
        decode(resp)
    }

    pub fn delete_track(&self, id: u64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/tracks/{id}/")))
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(())
    }

    /// Multipart upload of an audio file plus optional cover/title/tags.
    ///
    /// The audio and cover parts stream through counting readers so
    /// `progress` tracks bytes actually written to the socket.
    pub fn upload_track(
        &self,
        request: &UploadRequest,
        progress: &ProgressHandle,
    ) -> Result<Track, ApiError> {
        let audio_len = file_len(&request.file)?;
        let cover_len = match &request.cover {
            Some(p) => file_len(p)?,
            None => 0,
        };
        let total = audio_len + cover_len;

        if let Ok(mut p) = progress.lock() {
            *p = 0;
        }

        let audio = open_source(&request.file)?;
        let audio_part = Part::reader_with_length(
            CountingReader {
                inner: audio,
                sent: 0,
                offset: 0,
                total,
                progress: progress.clone(),
            },
            audio_len,
        )
        .file_name(file_name_of(&request.file));

        let mut form = Form::new().part("file", audio_part);

        if let Some(cover) = &request.cover {
            let cover_file = open_source(cover)?;
            let cover_part = Part::reader_with_length(
                CountingReader {
                    inner: cover_file,
                    sent: 0,
                    offset: audio_len,
                    total,
                    progress: progress.clone(),
                },
                cover_len,
            )
            .file_name(file_name_of(cover));
            form = form.part("cover", cover_part);
        }

        if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            form = form.text("title", title.to_string());
        }
        if !request.tags.is_empty() {
            form = form.text("tags", serde_json::to_string(&request.tags)?);
        }

        let resp = self
            .http
            .post(self.url("/api/tracks/upload/"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()?;
        decode(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    let body = resp.text()?;
    Ok(serde_json::from_str(&body)?)
}

fn file_len(path: &Path) -> Result<u64, ApiError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| ApiError::UploadSource {
            path: path.display().to_string(),
            source,
        })
}

fn open_source(path: &Path) -> Result<File, ApiError> {
    File::open(path).map_err(|source| ApiError::UploadSource {
        path: path.display().to_string(),
        source,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

/// Wraps a part's reader and publishes cumulative percent as bytes flow out.
pub(super) struct CountingReader<R> {
    pub(super) inner: R,
    pub(super) sent: u64,
    /// Bytes attributed to parts that streamed before this one.
    pub(super) offset: u64,
    pub(super) total: u64,
    pub(super) progress: ProgressHandle,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.sent += n as u64;
        if self.total > 0 {
            let pct = ((self.offset + self.sent) * 100 / self.total).min(100) as u8;
            if let Ok(mut p) = self.progress.lock() {
                *p = pct;
            }
        }
        Ok(n)
    }
}
