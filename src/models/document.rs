use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

/// Discriminator carried in the `_type` field of a CMS document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "posts")]
    Post,
    #[serde(rename = "video")]
    Video,
}

impl ContentKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "posts" => Some(ContentKind::Post),
            "video" => Some(ContentKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Video => "video",
        }
    }

    /// Site path segment the published document is served under.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Video => "videos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Post => "Post",
            ContentKind::Video => "Video",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A published CMS document, restricted to the kinds that trigger
/// notifications.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type")]
pub enum ContentDocument {
    #[serde(rename = "posts")]
    Post(PostDocument),
    #[serde(rename = "video")]
    Video(VideoDocument),
}

impl ContentDocument {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentDocument::Post(_) => ContentKind::Post,
            ContentDocument::Video(_) => ContentKind::Video,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "lenient")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<AuthorRef>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "lenient")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<AuthorRef>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub blocks: Vec<ContentBlock>,
}

impl PostDocument {
    pub fn blocks(&self) -> &[ContentBlock] {
        preferred_blocks(&self.content, &self.blocks)
    }
}

impl VideoDocument {
    pub fn blocks(&self) -> &[ContentBlock] {
        preferred_blocks(&self.content, &self.blocks)
    }
}

/// `content` wins over the legacy `blocks` key unless it is empty.
fn preferred_blocks<'a>(
    content: &'a [ContentBlock],
    blocks: &'a [ContentBlock],
) -> &'a [ContentBlock] {
    if content.is_empty() { blocks } else { content }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "lenient")]
    pub current: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subheading: Option<String>,
    #[serde(default)]
    pub body: Option<JsonValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<AuthorRef>,
}

impl ContentBlock {
    /// Flattens the block body into plain text. Accepts either a plain string
    /// or a portable-text array of blocks with `children[].text` spans.
    pub fn body_text(&self) -> Option<String> {
        let text = match self.body.as_ref()? {
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Array(blocks) => blocks
                .iter()
                .filter_map(portable_text_paragraph)
                .collect::<Vec<_>>()
                .join("\n\n"),
            _ => return None,
        };

        if text.is_empty() { None } else { Some(text) }
    }
}

fn portable_text_paragraph(block: &JsonValue) -> Option<String> {
    let paragraph: String = block
        .get("children")?
        .as_array()?
        .iter()
        .filter_map(|span| span.get("text").and_then(JsonValue::as_str))
        .collect();

    let paragraph = paragraph.trim();
    if paragraph.is_empty() {
        None
    } else {
        Some(paragraph.to_string())
    }
}

/// Deserializes a field, mapping a value of the wrong shape to `None` instead
/// of failing the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the blocks that parse and drops anything else in the array.
fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let blocks = match value {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(blocks)
}
