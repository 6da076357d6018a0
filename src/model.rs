//! Data model handed to the reader application.
//!
//! Every value is built fresh by one extraction call and never mutated afterwards.

use serde::{Serialize, Serializer};

/// One novel on a catalog or search-results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    /// Display name; never empty.
    pub title: String,
    /// Absolute cover URL, or empty when the entry had no image.
    pub cover_image_url: String,
    /// Absolute detail-page URL. Unique within one [`ListingPage`].
    pub detail_link: String,
}

/// One page of catalog or search results, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    /// True when the page links to an older page of results.
    pub has_more: bool,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Publication status. Serialized as the numeric code the reader application expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovelStatus {
    Ongoing,
    Completed,
    Hiatus,
    Dropped,
    Unknown,
}

impl NovelStatus {
    pub fn code(self) -> u8 {
        match self {
            NovelStatus::Ongoing => 0,
            NovelStatus::Completed => 1,
            NovelStatus::Hiatus => 2,
            NovelStatus::Dropped => 3,
            NovelStatus::Unknown => 5,
        }
    }

    /// Classify a free-text status label by case-insensitive substring.
    ///
    /// Checked in priority order ongoing, completed, hiatus, dropped; anything else is Unknown.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("ongoing") {
            NovelStatus::Ongoing
        } else if label.contains("completed") {
            NovelStatus::Completed
        } else if label.contains("hiatus") {
            NovelStatus::Hiatus
        } else if label.contains("dropped") {
            NovelStatus::Dropped
        } else {
            NovelStatus::Unknown
        }
    }
}

impl Serialize for NovelStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Metadata and chapter index of one novel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDetail {
    /// Page heading; empty if the page had none.
    pub title: String,
    pub cover_image_url: String,
    /// Description paragraphs joined with `\n`.
    pub synopsis: String,
    /// Comma-and-space joined author names.
    pub author: String,
    /// Comma-and-space joined artist names.
    pub artist: String,
    #[serde(rename = "statusCode")]
    pub status: NovelStatus,
    /// Genres followed by tags, in page order, not deduplicated.
    pub tags: Vec<String>,
    /// Oldest first.
    pub chapters: Vec<Chapter>,
}

/// One entry of a novel's chapter index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    /// Absolute chapter URL.
    pub url: String,
    /// Release time in milliseconds since the epoch; None when the page showed no date.
    pub published_at_millis: Option<i64>,
    /// Always None for this site.
    pub scanlator: Option<String>,
}

/// Title and body markup of one chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBody {
    pub title_text: String,
    pub body_html: String,
}

impl ChapterBody {
    /// `<h2>{title}</h2><hr><br>{body}`, with the title escaped.
    pub fn render(&self) -> String {
        format!(
            "<h2>{}</h2><hr><br>{}",
            html_escape_inner(&self.title_text),
            self.body_html
        )
    }
}

fn html_escape_inner(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
