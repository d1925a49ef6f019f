//! Email templates, one per content kind, selected through a lookup table.

use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use tracing::{debug, warn};

use crate::models::{
    document::ContentKind,
    payload::{ContentSection, NotificationPayload},
    template::{RenderContext, RenderedEmail},
};

pub const CONTINUE_READING: &str = "Continue reading →";

pub trait EmailTemplate: Send + Sync {
    fn kind(&self) -> ContentKind;

    fn render(&self, payload: &NotificationPayload, ctx: &RenderContext)
    -> Result<RenderedEmail, Error>;
}

pub struct TemplateRegistry {
    templates: HashMap<ContentKind, Box<dyn EmailTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, template: Box<dyn EmailTemplate>) -> Self {
        self.templates.insert(template.kind(), template);
        self
    }

    pub fn render(
        &self,
        payload: &NotificationPayload,
        ctx: &RenderContext,
    ) -> Result<RenderedEmail, Error> {
        let template = self
            .templates
            .get(&payload.kind)
            .ok_or_else(|| anyhow!("No email template registered for '{}'", payload.kind))?;

        debug!(kind = %payload.kind, slug = %payload.slug, "Rendering email template");

        template.render(payload, ctx)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
            .with_template(Box::new(PostTemplate))
            .with_template(Box::new(VideoTemplate))
    }
}

/// Bounded excerpt of the document's content blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPreview {
    pub items: Vec<PreviewItem>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem {
    pub heading: Option<String>,
    pub text: Option<String>,
}

impl ContentPreview {
    pub fn build(sections: &[ContentSection], block_limit: usize, char_limit: usize) -> Self {
        let candidates: Vec<&ContentSection> = sections
            .iter()
            .filter(|s| s.heading.is_some() || s.subheading.is_some() || s.text.is_some())
            .collect();

        let mut truncated = candidates.len() > block_limit;

        let items = candidates
            .into_iter()
            .take(block_limit)
            .map(|section| {
                let text = section.text.as_deref().or(section.subheading.as_deref()).map(|text| {
                    let (clipped, cut) = clip(text, char_limit);
                    truncated |= cut;
                    clipped
                });

                PreviewItem {
                    heading: section.heading.clone(),
                    text,
                }
            })
            .collect();

        Self { items, truncated }
    }

    fn to_html(&self, url: &str) -> String {
        let mut html = String::new();

        for item in &self.items {
            html.push_str("<div style=\"margin:0 0 16px\">");
            if let Some(heading) = &item.heading {
                html.push_str(&format!(
                    "<h3 style=\"margin:0 0 4px;font-size:16px\">{}</h3>",
                    escape_html(heading)
                ));
            }
            if let Some(text) = &item.text {
                html.push_str(&format!(
                    "<p style=\"margin:0;color:#444;white-space:pre-line\">{}</p>",
                    escape_html(text)
                ));
            }
            html.push_str("</div>");
        }

        if self.truncated {
            html.push_str(&format!(
                "<p><a href=\"{}\" style=\"color:#111;font-weight:600\">{}</a></p>",
                escape_html(url),
                CONTINUE_READING
            ));
        }

        html
    }

    fn to_text(&self, url: &str) -> String {
        let mut text = String::new();

        for item in &self.items {
            if let Some(heading) = &item.heading {
                text.push_str(heading);
                text.push('\n');
            }
            if let Some(body) = &item.text {
                text.push_str(body);
                text.push('\n');
            }
            text.push('\n');
        }

        if self.truncated {
            text.push_str(&format!("{} {}\n", CONTINUE_READING, url));
        }

        text
    }
}

fn clip(text: &str, char_limit: usize) -> (String, bool) {
    if text.chars().count() <= char_limit {
        return (text.to_string(), false);
    }

    let mut clipped: String = text.chars().take(char_limit).collect();
    clipped.truncate(clipped.trim_end().len());
    clipped.push('…');
    (clipped, true)
}

pub struct PostTemplate;

const POST_HTML: &str = r#"<!DOCTYPE html>
<html>
<body style="margin:0;padding:24px;background:#f6f6f6;font-family:Helvetica,Arial,sans-serif">
<div style="max-width:600px;margin:0 auto;background:#fff;padding:32px">
<p style="margin:0 0 8px;text-transform:uppercase;font-size:12px;letter-spacing:1px;color:#888">New post</p>
<h1 style="margin:0 0 16px;font-size:28px">{{heading}}</h1>
{{hero}}
<p style="font-size:16px;color:#333">{{excerpt}}</p>
{{author}}
{{preview}}
<p style="margin-top:24px"><a href="{{url}}" style="display:inline-block;padding:12px 20px;background:#111;color:#fff;text-decoration:none">Read the full post</a></p>
</div>
</body>
</html>"#;

const POST_TEXT: &str = "New post: {{heading}}

{{excerpt}}
{{author}}
{{preview}}Read the full post: {{url}}
";

impl EmailTemplate for PostTemplate {
    fn kind(&self) -> ContentKind {
        ContentKind::Post
    }

    fn render(
        &self,
        payload: &NotificationPayload,
        ctx: &RenderContext,
    ) -> Result<RenderedEmail, Error> {
        let url = payload.canonical_url(&ctx.site_url);
        let preview = ContentPreview::build(
            &payload.sections,
            ctx.preview_block_limit,
            ctx.preview_char_limit,
        );

        let hero = payload
            .image_url
            .as_deref()
            .map(|src| {
                format!(
                    "<img src=\"{}\" alt=\"{}\" style=\"width:100%;height:auto;margin:0 0 16px\">",
                    escape_html(src),
                    escape_html(&payload.heading)
                )
            })
            .unwrap_or_default();

        let author_html = payload
            .author
            .as_ref()
            .map(|author| {
                let avatar = author
                    .avatar_url
                    .as_deref()
                    .map(|src| {
                        format!(
                            "<img src=\"{}\" alt=\"\" width=\"32\" height=\"32\" style=\"border-radius:16px;vertical-align:middle;margin-right:8px\">",
                            escape_html(src)
                        )
                    })
                    .unwrap_or_default();
                let role = author
                    .role
                    .as_deref()
                    .map(|r| format!(" · {}", escape_html(r)))
                    .unwrap_or_default();
                format!(
                    "<p style=\"color:#666;font-size:14px\">{}By {}{}</p>",
                    avatar,
                    escape_html(&author.name),
                    role
                )
            })
            .unwrap_or_default();

        let author_text = payload
            .author
            .as_ref()
            .map(|author| match &author.role {
                Some(role) => format!("By {} ({})\n", author.name, role),
                None => format!("By {}\n", author.name),
            })
            .unwrap_or_default();

        let body_html = render_placeholders(
            POST_HTML,
            &HashMap::from([
                ("heading", escape_html(&payload.heading)),
                ("excerpt", escape_html(&payload.excerpt)),
                ("url", escape_html(&url)),
                ("hero", hero),
                ("author", author_html),
                ("preview", preview.to_html(&url)),
            ]),
        )?;

        let body_text = render_placeholders(
            POST_TEXT,
            &HashMap::from([
                ("heading", payload.heading.clone()),
                ("excerpt", payload.excerpt.clone()),
                ("author", author_text),
                ("preview", preview.to_text(&url)),
                ("url", url.clone()),
            ]),
        )?;

        Ok(RenderedEmail {
            subject: format!("New post: {}", payload.heading),
            body_html,
            body_text,
        })
    }
}

pub struct VideoTemplate;

const VIDEO_HTML: &str = r#"<!DOCTYPE html>
<html>
<body style="margin:0;padding:24px;background:#0d0d0d;font-family:Helvetica,Arial,sans-serif;color:#f2f2f2">
<div style="max-width:600px;margin:0 auto;padding:32px;background:#1a1a1a">
<p style="margin:0 0 8px;text-transform:uppercase;font-size:12px;letter-spacing:1px;color:#999">New video</p>
<h1 style="margin:0 0 16px;font-size:28px">{{heading}}</h1>
{{thumbnail}}
<p style="font-size:16px">{{excerpt}}</p>
{{preview}}
<p style="margin-top:24px"><a href="{{url}}" style="display:inline-block;padding:12px 20px;background:#f2f2f2;color:#111;text-decoration:none">▶ Watch now</a></p>
{{direct}}
</div>
</body>
</html>"#;

const VIDEO_TEXT: &str = "New video: {{heading}}

{{excerpt}}

{{preview}}Watch now: {{url}}
{{direct}}";

impl EmailTemplate for VideoTemplate {
    fn kind(&self) -> ContentKind {
        ContentKind::Video
    }

    fn render(
        &self,
        payload: &NotificationPayload,
        ctx: &RenderContext,
    ) -> Result<RenderedEmail, Error> {
        let url = payload.canonical_url(&ctx.site_url);
        let preview = ContentPreview::build(
            &payload.sections,
            ctx.preview_block_limit,
            ctx.preview_char_limit,
        );

        let thumbnail = payload
            .image_url
            .as_deref()
            .map(|src| {
                format!(
                    "<a href=\"{}\"><img src=\"{}\" alt=\"{}\" style=\"width:100%;height:auto;margin:0 0 16px\"></a>",
                    escape_html(&url),
                    escape_html(src),
                    escape_html(&payload.heading)
                )
            })
            .unwrap_or_default();

        let direct_html = payload
            .video_url
            .as_deref()
            .map(|src| {
                format!(
                    "<p style=\"font-size:12px;color:#999\">Direct link: <a href=\"{0}\" style=\"color:#999\">{0}</a></p>",
                    escape_html(src)
                )
            })
            .unwrap_or_default();

        let direct_text = payload
            .video_url
            .as_deref()
            .map(|src| format!("Direct link: {}\n", src))
            .unwrap_or_default();

        let body_html = render_placeholders(
            VIDEO_HTML,
            &HashMap::from([
                ("heading", escape_html(&payload.heading)),
                ("excerpt", escape_html(&payload.excerpt)),
                ("url", escape_html(&url)),
                ("thumbnail", thumbnail),
                ("preview", preview.to_html(&url)),
                ("direct", direct_html),
            ]),
        )?;

        let body_text = render_placeholders(
            VIDEO_TEXT,
            &HashMap::from([
                ("heading", payload.heading.clone()),
                ("excerpt", payload.excerpt.clone()),
                ("preview", preview.to_text(&url)),
                ("url", url.clone()),
                ("direct", direct_text),
            ]),
        )?;

        Ok(RenderedEmail {
            subject: format!("New video: {}", payload.heading),
            body_html,
            body_text,
        })
    }
}

/// Replaces `{{name}}` placeholders in a single pass. Substituted values are
/// never rescanned, so content containing braces passes through untouched.
fn render_placeholders(
    template: &str,
    variables: &HashMap<&str, String>,
) -> Result<String, Error> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after
            .find("}}")
            .ok_or_else(|| anyhow!("Unterminated placeholder in template"))?;
        let name = after[..end].trim();

        match variables.get(name) {
            Some(value) => result.push_str(value),
            None => {
                warn!(missing_variable = %name, "Template contains unreplaced variable");
                return Err(anyhow!("Missing variable in template: {{{{{}}}}}", name));
            }
        }

        rest = &after[end + 2..];
    }

    result.push_str(rest);
    Ok(result)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
