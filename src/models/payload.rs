use serde::Serialize;

use crate::models::document::{AuthorRef, ContentBlock, ContentDocument, ContentKind};

pub const FALLBACK_HEADING: &str = "New Content";
pub const FALLBACK_EXCERPT: &str = "No description available";
pub const FALLBACK_SLUG: &str = "no-slug";

/// Fallback-safe projection of a published document shared by every channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub kind: ContentKind,
    pub document_id: Option<String>,
    pub heading: String,
    pub slug: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub author: Option<Author>,
    pub sections: Vec<ContentSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSection {
    pub heading: Option<String>,
    pub subheading: Option<String>,
    pub text: Option<String>,
}

impl NotificationPayload {
    pub fn canonical_url(&self, site_url: &str) -> String {
        format!(
            "{}/{}/{}",
            site_url.trim_end_matches('/'),
            self.kind.path_segment(),
            self.slug
        )
    }
}

/// Builds the notification payload. Never fails: every missing or malformed
/// field resolves to a fallback.
pub fn normalize(document: &ContentDocument) -> NotificationPayload {
    match document {
        ContentDocument::Post(post) => assemble(
            ContentKind::Post,
            Fields {
                id: post.id.as_deref(),
                title: None,
                slug: post.slug.as_ref().and_then(|s| s.current.as_deref()),
                excerpt: post.excerpt.as_deref(),
                image_url: post.image_url.as_deref(),
                video_url: None,
                author: post.author.as_ref(),
                blocks: post.blocks(),
            },
        ),
        ContentDocument::Video(video) => assemble(
            ContentKind::Video,
            Fields {
                id: video.id.as_deref(),
                title: video.title.as_deref(),
                slug: video.slug.as_ref().and_then(|s| s.current.as_deref()),
                excerpt: video.excerpt.as_deref(),
                image_url: video.image_url.as_deref(),
                video_url: video.video_url.as_deref(),
                author: video.author.as_ref(),
                blocks: video.blocks(),
            },
        ),
    }
}

struct Fields<'a> {
    id: Option<&'a str>,
    title: Option<&'a str>,
    slug: Option<&'a str>,
    excerpt: Option<&'a str>,
    image_url: Option<&'a str>,
    video_url: Option<&'a str>,
    author: Option<&'a AuthorRef>,
    blocks: &'a [ContentBlock],
}

fn assemble(kind: ContentKind, fields: Fields<'_>) -> NotificationPayload {
    let first_block = fields.blocks.first();

    let heading = first_block
        .and_then(|b| present(b.heading.as_deref()))
        .or_else(|| present(fields.title))
        .unwrap_or(FALLBACK_HEADING);

    let excerpt = present(fields.excerpt)
        .or_else(|| first_block.and_then(|b| present(b.subheading.as_deref())))
        .unwrap_or(FALLBACK_EXCERPT);

    let slug = present(fields.slug).unwrap_or(FALLBACK_SLUG);

    let image_url = present(fields.image_url).or_else(|| {
        fields
            .blocks
            .iter()
            .find_map(|b| present(b.image_url.as_deref()))
    });

    let author = fields
        .author
        .and_then(resolve_author)
        .or_else(|| {
            fields
                .blocks
                .iter()
                .find_map(|b| b.author.as_ref().and_then(resolve_author))
        });

    let sections = fields
        .blocks
        .iter()
        .map(|b| ContentSection {
            heading: present(b.heading.as_deref()).map(str::to_string),
            subheading: present(b.subheading.as_deref()).map(str::to_string),
            text: b.body_text(),
        })
        .collect();

    NotificationPayload {
        kind,
        document_id: present(fields.id).map(str::to_string),
        heading: heading.to_string(),
        slug: slug.to_string(),
        excerpt: excerpt.to_string(),
        image_url: image_url.map(str::to_string),
        video_url: present(fields.video_url).map(str::to_string),
        author,
        sections,
    }
}

fn resolve_author(author: &AuthorRef) -> Option<Author> {
    let name = present(author.name.as_deref())?;

    Some(Author {
        name: name.to_string(),
        role: present(author.role.as_deref()).map(str::to_string),
        avatar_url: present(author.avatar_url.as_deref()).map(str::to_string),
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn normalize_json(value: Value) -> NotificationPayload {
        let document: ContentDocument = serde_json::from_value(value).unwrap();
        normalize(&document)
    }

    #[test]
    fn post_without_blocks_uses_fallbacks() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "title": "Hi",
            "slug": { "current": "hi" }
        }));

        assert_eq!(payload.heading, "New Content");
        assert_eq!(payload.slug, "hi");
        assert_eq!(payload.excerpt, "No description available");
        assert_eq!(
            payload.canonical_url("https://studio.test/"),
            "https://studio.test/posts/hi"
        );
    }

    #[test]
    fn empty_documents_still_produce_headings_and_slugs() {
        for kind in ["posts", "video"] {
            let payload = normalize_json(json!({ "_type": kind }));

            assert_eq!(payload.heading, FALLBACK_HEADING);
            assert_eq!(payload.slug, FALLBACK_SLUG);
            assert_eq!(payload.excerpt, FALLBACK_EXCERPT);
            assert!(payload.author.is_none());
        }
    }

    #[test]
    fn first_block_heading_wins_over_video_title() {
        let payload = normalize_json(json!({
            "_type": "video",
            "title": "Showreel",
            "content": [{ "heading": "Behind the scenes" }]
        }));

        assert_eq!(payload.heading, "Behind the scenes");
    }

    #[test]
    fn video_title_used_when_blocks_lack_heading() {
        let payload = normalize_json(json!({
            "_type": "video",
            "title": "Showreel",
            "slug": { "current": "showreel" },
            "videoUrl": "https://cdn.test/showreel.mp4",
            "content": [{ "heading": "   " }]
        }));

        assert_eq!(payload.heading, "Showreel");
        assert_eq!(payload.video_url.as_deref(), Some("https://cdn.test/showreel.mp4"));
        assert_eq!(
            payload.canonical_url("https://studio.test"),
            "https://studio.test/videos/showreel"
        );
    }

    #[test]
    fn excerpt_falls_back_to_first_block_subheading() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "content": [{ "heading": "Launch", "subheading": "A new identity" }]
        }));

        assert_eq!(payload.excerpt, "A new identity");

        let payload = normalize_json(json!({
            "_type": "posts",
            "excerpt": "Direct excerpt",
            "content": [{ "subheading": "Ignored" }]
        }));

        assert_eq!(payload.excerpt, "Direct excerpt");
    }

    #[test]
    fn author_prefers_document_then_first_block_with_author() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "content": [
                { "heading": "One" },
                { "author": { "name": "" } },
                { "author": { "name": "Ada", "role": "Art Director", "avatarUrl": "https://cdn.test/ada.png" } },
                { "author": { "name": "Bob" } }
            ]
        }));

        let author = payload.author.unwrap();
        assert_eq!(author.name, "Ada");
        assert_eq!(author.role.as_deref(), Some("Art Director"));
        assert_eq!(author.avatar_url.as_deref(), Some("https://cdn.test/ada.png"));

        let payload = normalize_json(json!({
            "_type": "posts",
            "author": { "name": "Doc Author" },
            "content": [{ "author": { "name": "Block Author" } }]
        }));

        assert_eq!(payload.author.unwrap().name, "Doc Author");
    }

    #[test]
    fn image_falls_back_to_first_block_image() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "content": [{ "heading": "A" }, { "imageUrl": "https://cdn.test/b.jpg" }]
        }));

        assert_eq!(payload.image_url.as_deref(), Some("https://cdn.test/b.jpg"));
    }

    #[test]
    fn post_never_carries_video_url() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "videoUrl": "https://cdn.test/clip.mp4"
        }));

        assert!(payload.video_url.is_none());
    }

    #[test]
    fn sections_mirror_blocks_in_order() {
        let payload = normalize_json(json!({
            "_type": "posts",
            "content": [
                { "heading": "First", "body": "Body one" },
                { "subheading": "Second" }
            ]
        }));

        assert_eq!(payload.sections.len(), 2);
        assert_eq!(payload.sections[0].text.as_deref(), Some("Body one"));
        assert_eq!(payload.sections[1].subheading.as_deref(), Some("Second"));
    }
}
