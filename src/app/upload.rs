use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::api::UploadRequest;

/// Input fields of the upload form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    File,
    Title,
    Tags,
    Cover,
}

impl UploadField {
    pub fn next(self) -> Self {
        match self {
            Self::File => Self::Title,
            Self::Title => Self::Tags,
            Self::Tags => Self::Cover,
            Self::Cover => Self::File,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::File => Self::Cover,
            Self::Title => Self::File,
            Self::Tags => Self::Title,
            Self::Cover => Self::Tags,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::File => "audio",
            Self::Title => "title",
            Self::Tags => "tags",
            Self::Cover => "cover",
        }
    }
}

/// A scheduled tag lookup waiting out its debounce window.
#[derive(Debug, Clone)]
struct TagLookup {
    seq: u64,
    fragment: String,
    due_at: Instant,
}

/// The upload form, including the debounced tag autocomplete machine.
///
/// Lookups carry a sequence number; only the response matching the most
/// recently fired lookup is accepted, so a slow response for an old
/// fragment can never clobber a newer one.
#[derive(Debug)]
pub struct UploadForm {
    pub file: String,
    pub title: String,
    pub tags: String,
    pub cover: String,
    pub field: UploadField,
    pub suggestions: Vec<String>,
    pub highlighted: Option<usize>,
    pending: Option<TagLookup>,
    fired_seq: u64,
    next_seq: u64,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            file: String::new(),
            title: String::new(),
            tags: String::new(),
            cover: String::new(),
            field: UploadField::File,
            suggestions: Vec::new(),
            highlighted: None,
            pending: None,
            fired_seq: 0,
            next_seq: 1,
        }
    }
}

impl UploadForm {
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.field {
            UploadField::File => &mut self.file,
            UploadField::Title => &mut self.title,
            UploadField::Tags => &mut self.tags,
            UploadField::Cover => &mut self.cover,
        }
    }

    /// The fragment after the last comma, the part a lookup completes.
    pub fn fragment(&self) -> &str {
        self.tags.rsplit(',').next().unwrap_or("").trim()
    }

    /// Call after every edit of the tags field. A non-empty fragment arms
    /// a debounced lookup; an empty one clears the dropdown outright and
    /// orphans anything still in flight.
    pub fn note_tags_edited(&mut self, now: Instant, debounce: Duration) {
        self.highlighted = None;
        let fragment = self.fragment().to_string();
        if fragment.is_empty() {
            self.hide_suggestions();
            return;
        }
        self.pending = Some(TagLookup {
            seq: self.next_seq,
            fragment,
            due_at: now + debounce,
        });
        self.next_seq += 1;
    }

    /// Returns the lookup to dispatch once its debounce window has passed.
    pub fn due_lookup(&mut self, now: Instant) -> Option<(u64, String)> {
        if self.pending.as_ref()?.due_at > now {
            return None;
        }
        let lookup = self.pending.take()?;
        self.fired_seq = lookup.seq;
        Some((lookup.seq, lookup.fragment))
    }

    /// Applies a lookup response. Returns false when the response is stale,
    /// either outrun by a newer fired lookup or superseded by one still
    /// waiting out its debounce.
    pub fn accept_suggestions(&mut self, seq: u64, suggestions: Vec<String>) -> bool {
        if seq != self.fired_seq || self.pending.is_some() {
            return false;
        }
        self.highlighted = None;
        self.suggestions = suggestions;
        true
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => (i + 1).min(self.suggestions.len() - 1),
        });
    }

    pub fn highlight_prev(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    /// Appends the highlighted suggestion to the tag list unless it is
    /// already present, then closes the dropdown.
    pub fn pick_highlighted(&mut self) -> bool {
        let Some(index) = self.highlighted else {
            return false;
        };
        let Some(tag) = self.suggestions.get(index).cloned() else {
            return false;
        };
        let mut parts: Vec<String> = self
            .tags
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !parts.contains(&tag) {
            parts.push(tag);
        }
        self.tags = parts.join(", ");
        self.hide_suggestions();
        true
    }

    /// Closes the dropdown without touching the typed text.
    pub fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
        self.pending = None;
        // Orphan any in-flight lookup so its late response is rejected.
        self.fired_seq = self.next_seq;
        self.next_seq += 1;
    }

    /// The tag list as submitted: split on commas, trimmed, empties
    /// dropped, duplicates kept.
    pub fn parsed_tags(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Builds the upload request, or `None` when no audio file is set.
    pub fn to_request(&self) -> Option<UploadRequest> {
        let file = self.file.trim();
        if file.is_empty() {
            return None;
        }
        let cover = self.cover.trim();
        let title = self.title.trim();
        Some(UploadRequest {
            file: PathBuf::from(file),
            title: (!title.is_empty()).then(|| title.to_string()),
            tags: self.parsed_tags(),
            cover: (!cover.is_empty()).then(|| PathBuf::from(cover)),
        })
    }

    /// Clears every field after a successful upload.
    pub fn reset(&mut self) {
        self.file.clear();
        self.title.clear();
        self.tags.clear();
        self.cover.clear();
        self.hide_suggestions();
    }
}
