use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body_html: String,
    pub body_text: String,
}

/// Site-level settings a template needs besides the payload itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub site_url: String,
    pub preview_block_limit: usize,
    pub preview_char_limit: usize,
}
