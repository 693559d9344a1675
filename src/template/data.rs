//! Data provided to Handlebars templates.

use serde::Serialize;

use std::borrow::Cow;

use crate::{fonts::FontFace, template::TemplateOptions};

/// Root data structure sent to the Handlebars template.
///
/// # Examples
///
/// Here's example of JSON serialization of this type:
///
/// ```
/// # use og_image_html::{fonts::{FontFace, FontSet}, template::*, ParsedRequest};
/// let fonts = FontSet::from_faces(vec![FontFace::woff2("Inter", 700, b"font")]);
/// let renderer = Renderer::new(TemplateOptions::default(), fonts);
/// let request = ParsedRequest::new("Hello & bye", "2024-01-01").with_emoji("😀");
/// let data = renderer.render_data(&request).unwrap();
///
/// let expected_json = serde_json::json!({
///     "creator": {
///         "name": "og-image-html",
///         "version": "0.1.0",
///         "repo": "https://github.com/datsukan/og-image-html"
///     },
///     "title": "Generated Image",
///     "stylesheet_script_url": "https://cdn.tailwindcss.com?plugins=line-clamp",
///     "emoji_base_url": "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/",
///     "brand": {
///         "name": "datsukan",
///         "avatar_url": "https://datsukan.me/_next/image?url=%2Fimages%2Favatar.jpg&w=96&q=75"
///     },
///     "sanitize_markdown": true,
///     "escape_published_at": false,
///     "fonts": [{
///         "family": "Inter",
///         "weight": 700,
///         "style": "normal",
///         "mime_type": "font/woff2",
///         "format": "woff2",
///         "base64_data": "Zm9udA=="
///     }],
///     "body_html": "Hello &amp; bye",
///     "emoji_url": "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg/1f600.svg",
///     "published_at": "2024-01-01"
/// });
/// assert_eq!(serde_json::to_value(data).unwrap(), expected_json);
/// ```
#[derive(Debug, Serialize)]
#[non_exhaustive]
pub struct HandlebarsData<'r> {
    /// Information about the rendering software.
    pub creator: CreatorData,
    /// Template options used for rendering. These options are flattened into the parent
    /// during serialization.
    #[serde(flatten)]
    pub options: &'r TemplateOptions,
    /// Embedded font faces.
    pub fonts: &'r [FontFace],
    /// Card text as an HTML fragment, with emoji replaced by images.
    pub body_html: String,
    /// Image URL for the card emoji. Empty if the emoji could not be resolved.
    pub emoji_url: String,
    /// Publish date, escaped if [`TemplateOptions::escape_published_at`] is set.
    pub published_at: Cow<'r, str>,
}

/// Information about software used for rendering (i.e., this crate).
///
/// It can make sense to include this info as a comment in the rendered template
/// for debugging purposes.
#[derive(Debug, Serialize)]
#[non_exhaustive]
pub struct CreatorData {
    /// Name of software rendering the template.
    pub name: &'static str,
    /// Version of the rendering software.
    pub version: &'static str,
    /// Link to the git repository with the rendering software.
    pub repo: &'static str,
}

impl Default for CreatorData {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            repo: env!("CARGO_PKG_REPOSITORY"),
        }
    }
}
