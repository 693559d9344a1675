//! Self-contained HTML cards for Open Graph preview images.
//!
//! # What it does
//!
//! This crate renders a single HTML document that a headless browser can screenshot into
//! a social-share preview image. Given a [`ParsedRequest`], the rendered page contains:
//!
//! - Web fonts embedded as base64 `@font-face` data URLs, so that the page does not fetch fonts
//!   at screenshot time
//! - The request text, either rendered from Markdown or HTML-escaped
//! - Emoji replaced with [Twemoji] SVG images, so that the page looks identical regardless
//!   of emoji fonts installed on the rendering machine
//! - A static footer with the publish date and the author brand
//!
//! # Design decisions
//!
//! - **Explicit asset loading.** Fonts are read once into a [`FontSet`](fonts::FontSet), which
//!   is then passed to the [`Renderer`](template::Renderer). There is no global state.
//!
//! - **Narrow capabilities.** Markdown rendering, sanitization and emoji mapping are
//!   [traits](text) with default implementations, so that the renderer can be exercised
//!   with stubs.
//!
//! - **Structured templating.** The page is a [Handlebars] template. Slots receiving
//!   pre-sanitized HTML are explicitly marked as trusted; everything else is escaped.
//!
//! [Twemoji]: https://github.com/jdecked/twemoji
//! [Handlebars]: https://handlebarsjs.com/
//!
//! # Examples
//!
//! ```
//! use og_image_html::{
//!     fonts::{FontFace, FontSet},
//!     template::{Renderer, TemplateOptions},
//!     ParsedRequest,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! // Real code would use `FontSet::load("path/to/fonts")?`.
//! let fonts = FontSet::from_faces(vec![FontFace::woff2("Inter", 400, b"not really a font")]);
//! let renderer = Renderer::new(TemplateOptions::default(), fonts);
//!
//! let request = ParsedRequest::new("Hello, **world**! 😀", "2024-01-01")
//!     .with_markdown(true)
//!     .with_emoji("📝");
//! let html = renderer.render(&request)?;
//! assert!(html.contains("<strong>world</strong>"));
//! assert!(html.contains("/svg/1f4dd.svg"));
//! # Ok(())
//! # }
//! ```

// Documentation settings.
#![cfg_attr(docsrs, feature(doc_cfg))]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};

use std::{error::Error as StdError, fmt};

pub mod fonts;
pub mod template;
pub mod text;

/// Boxed error produced by pluggable [text capabilities](text).
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Errors that can occur when rendering a [`ParsedRequest`].
#[derive(Debug)]
#[non_exhaustive]
pub enum RenderError {
    /// Error rendering Markdown text.
    Markdown(BoxedError),
    /// Error sanitizing plain text.
    Sanitize(BoxedError),
    /// Error converting emoji to images, or resolving the standalone emoji URL.
    Emoji(BoxedError),
    /// Error filling the Handlebars template.
    Template(handlebars::RenderError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown(err) => write!(formatter, "Failed rendering Markdown: {err}"),
            Self::Sanitize(err) => write!(formatter, "Failed sanitizing text: {err}"),
            Self::Emoji(err) => write!(formatter, "Failed converting emoji: {err}"),
            Self::Template(err) => write!(formatter, "Failed rendering template: {err}"),
        }
    }
}

impl StdError for RenderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Markdown(err) | Self::Sanitize(err) | Self::Emoji(err) => Some(err.as_ref()),
            Self::Template(err) => Some(err),
        }
    }
}

impl From<handlebars::RenderError> for RenderError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err)
    }
}

/// Parameters of a single preview card, as extracted from an HTTP request.
///
/// The JSON representation uses `publishedAt` for [`Self::published_at()`], matching
/// the request layer:
///
/// ```
/// # use og_image_html::ParsedRequest;
/// let request: ParsedRequest = serde_json::from_str(
///     r#"{ "text": "Hi", "md": true, "emoji": "😀", "publishedAt": "2024-01-01" }"#,
/// ).unwrap();
/// assert!(request.is_markdown());
/// assert_eq!(request.published_at(), "2024-01-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRequest {
    text: String,
    #[serde(default)]
    md: bool,
    #[serde(default)]
    emoji: String,
    published_at: String,
}

impl ParsedRequest {
    /// Creates a plain-text request without an emoji.
    pub fn new(text: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            md: false,
            emoji: String::new(),
            published_at: published_at.into(),
        }
    }

    /// Sets whether the text should be interpreted as Markdown.
    #[must_use]
    pub fn with_markdown(mut self, md: bool) -> Self {
        self.md = md;
        self
    }

    /// Sets the emoji displayed above the text.
    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    /// Returns the author-supplied text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Checks whether the text is Markdown.
    pub fn is_markdown(&self) -> bool {
        self.md
    }

    /// Returns the emoji displayed above the text.
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Returns the pre-formatted publish date.
    pub fn published_at(&self) -> &str {
        &self.published_at
    }
}
