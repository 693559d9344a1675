//! Templating logic for rendering preview cards to HTML.
//!
//! Templating is based on [Handlebars]. The default template lays out a 1200×630 card
//! styled with [Tailwind CSS] utility classes; it can be [replaced](Renderer::custom())
//! while keeping the same [data](HandlebarsData).
//!
//! [Handlebars]: https://handlebarsjs.com/
//! [Tailwind CSS]: https://tailwindcss.com/
//!
//! # Examples
//!
//! See [`Renderer`] for examples of usage.

use handlebars::{Handlebars, Template as HandlebarsTemplate};
use serde::{Deserialize, Serialize};

use std::{borrow::Cow, fmt, io::Write};

mod data;
#[cfg(test)]
mod tests;

pub use self::data::{CreatorData, HandlebarsData};

use crate::{
    fonts::FontSet,
    text::{
        AllowList, CommonMark, Emojifier, EscapeHtml, MarkdownRenderer, Sanitizer, Twemoji,
    },
    ParsedRequest, RenderError,
};

const DEFAULT_TEMPLATE: &str = include_str!("og.html.handlebars");
const MAIN_TEMPLATE_NAME: &str = "main";

/// Author brand displayed in the card footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    /// Displayed name.
    pub name: String,
    /// URL of the avatar image.
    pub avatar_url: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            name: "datsukan".to_owned(),
            avatar_url: "https://datsukan.me/_next/image?url=%2Fimages%2Favatar.jpg&w=96&q=75"
                .to_owned(),
        }
    }
}

/// Configurable options of a [`Renderer`].
///
/// Options can be deserialized with missing fields taking default values:
///
/// ```
/// # use og_image_html::template::TemplateOptions;
/// let options: TemplateOptions = serde_json::from_str(
///     r#"{ "brand": { "name": "octocat" }, "escape_published_at": true }"#,
/// ).unwrap();
/// assert_eq!(options.brand.name, "octocat");
/// assert!(options.escape_published_at);
/// assert!(options.sanitize_markdown);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Page title. The default value is `Generated Image`.
    pub title: String,
    /// URL of the script providing CSS utility classes used by the template.
    /// The default value points to the Tailwind CSS Play CDN with the `line-clamp` plugin.
    pub stylesheet_script_url: String,
    /// Base URL of Twemoji assets, used by the default [`Emojifier`].
    pub emoji_base_url: String,
    /// Brand displayed in the card footer.
    pub brand: Brand,
    /// Whether to clean HTML rendered from Markdown with an allow-list sanitizer, which removes
    /// scripts and other unsafe markup embedded into Markdown. The default value is `true`.
    pub sanitize_markdown: bool,
    /// Whether to HTML-escape the publish date. By default, the date is trusted and inserted
    /// into the page as-is.
    pub escape_published_at: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            title: "Generated Image".to_owned(),
            stylesheet_script_url: "https://cdn.tailwindcss.com?plugins=line-clamp".to_owned(),
            emoji_base_url: Twemoji::DEFAULT_BASE_URL.to_owned(),
            brand: Brand::default(),
            sanitize_markdown: true,
            escape_published_at: false,
        }
    }
}

/// Renderer of [`ParsedRequest`]s into self-contained HTML pages.
///
/// # Customization
///
/// Text capabilities can be replaced using [`Self::with_markdown()`], [`Self::with_sanitizer()`]
/// and [`Self::with_emojifier()`]. By default, the renderer uses [`CommonMark`] for Markdown,
/// [`EscapeHtml`] for plain text and [`Twemoji`] (with [`TemplateOptions::emoji_base_url`])
/// for emoji.
///
/// A custom [Handlebars] template can be supplied via [`Self::custom()`]. Data supplied
/// to a template is [`HandlebarsData`]. Templates are rendered in strict mode, i.e., referencing
/// a missing field is an error.
///
/// [Handlebars]: https://handlebarsjs.com/
///
/// # Examples
///
/// ```
/// use og_image_html::{fonts::{FontFace, FontSet}, template::*, ParsedRequest};
///
/// # fn main() -> anyhow::Result<()> {
/// let fonts = FontSet::from_faces(vec![FontFace::woff2("Inter", 400, b"font")]);
/// let options = TemplateOptions {
///     brand: Brand {
///         name: "octocat".to_owned(),
///         ..Brand::default()
///     },
///     ..TemplateOptions::default()
/// };
/// let renderer = Renderer::new(options, fonts);
///
/// let request = ParsedRequest::new("<b>1 < 2</b>", "2024-01-01").with_emoji("😀");
/// let html = renderer.render(&request)?;
/// assert!(html.contains("&lt;b&gt;1 &lt; 2&lt;&#x2F;b&gt;"));
/// assert!(html.contains(r#"<span class="text-2xl text-gray-800 font-bold">octocat</span>"#));
/// # Ok(())
/// # }
/// ```
pub struct Renderer {
    options: TemplateOptions,
    fonts: FontSet,
    handlebars: Handlebars<'static>,
    markdown: Box<dyn MarkdownRenderer>,
    sanitizer: Box<dyn Sanitizer>,
    emojifier: Box<dyn Emojifier>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Renderer")
            .field("options", &self.options)
            .field("fonts", &self.fonts)
            .field("markdown", &self.markdown)
            .field("sanitizer", &self.sanitizer)
            .field("emojifier", &self.emojifier)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Initializes the default template based on provided `options` and `fonts`.
    pub fn new(options: TemplateOptions, fonts: FontSet) -> Self {
        let template = HandlebarsTemplate::compile(DEFAULT_TEMPLATE)
            .expect("Default template should be valid");
        Self::custom(template, options, fonts)
    }

    /// Initializes a custom template.
    pub fn custom(template: HandlebarsTemplate, options: TemplateOptions, fonts: FontSet) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_template(MAIN_TEMPLATE_NAME, template);
        let emojifier = Twemoji::new(options.emoji_base_url.clone());
        Self {
            options,
            fonts,
            handlebars,
            markdown: Box::new(CommonMark),
            sanitizer: Box::new(EscapeHtml),
            emojifier: Box::new(emojifier),
        }
    }

    /// Replaces the Markdown renderer.
    #[must_use]
    pub fn with_markdown(mut self, markdown: impl MarkdownRenderer + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    /// Replaces the sanitizer for plain text.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// Replaces the emoji mapping.
    #[must_use]
    pub fn with_emojifier(mut self, emojifier: impl Emojifier + 'static) -> Self {
        self.emojifier = Box::new(emojifier);
        self
    }

    /// Returns options used by this renderer.
    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Generates data for rendering.
    ///
    /// # Errors
    ///
    /// Propagates errors from the text capabilities.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), err)
    )]
    pub fn render_data<'s>(
        &'s self,
        request: &'s ParsedRequest,
    ) -> Result<HandlebarsData<'s>, RenderError> {
        let body_html = self.render_body(request)?;

        let emoji_url = self
            .emojifier
            .emoji_to_url(request.emoji())
            .map_err(RenderError::Emoji)?;
        let emoji_url = emoji_url.unwrap_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::warn!(emoji = request.emoji(), "emoji has no image URL");
            String::new()
        });

        let published_at = if self.options.escape_published_at {
            Cow::Owned(handlebars::html_escape(request.published_at()))
        } else {
            Cow::Borrowed(request.published_at())
        };

        Ok(HandlebarsData {
            creator: CreatorData::default(),
            options: &self.options,
            fonts: self.fonts.faces(),
            body_html,
            emoji_url,
            published_at,
        })
    }

    /// Renders the card text: either Markdown or sanitized plain text, with emoji
    /// replaced by images.
    fn render_body(&self, request: &ParsedRequest) -> Result<String, RenderError> {
        let html = if request.is_markdown() {
            let html = self
                .markdown
                .render_markdown(request.text())
                .map_err(RenderError::Markdown)?;
            if self.options.sanitize_markdown {
                AllowList.sanitize(&html).map_err(RenderError::Sanitize)?
            } else {
                html
            }
        } else {
            self.sanitizer
                .sanitize(request.text())
                .map_err(RenderError::Sanitize)?
        };
        self.emojifier.emojify(&html).map_err(RenderError::Emoji)
    }

    /// Renders the `request` to an HTML string.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the text capabilities fails, or if the template cannot
    /// be rendered.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, err, fields(request.md = request.is_markdown()))
    )]
    pub fn render(&self, request: &ParsedRequest) -> Result<String, RenderError> {
        let data = self.render_data(request)?;

        #[cfg(feature = "tracing")]
        let _entered = tracing::debug_span!("render_template").entered();
        self.handlebars
            .render(MAIN_TEMPLATE_NAME, &data)
            .map_err(RenderError::Template)
    }

    /// Renders the `request` into the provided `destination`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::render()`], and I/O errors writing to `destination`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, err, fields(request.md = request.is_markdown()))
    )]
    pub fn render_to_write<W: Write>(
        &self,
        request: &ParsedRequest,
        destination: W,
    ) -> Result<(), RenderError> {
        let data = self.render_data(request)?;

        #[cfg(feature = "tracing")]
        let _entered = tracing::debug_span!("render_to_write").entered();
        self.handlebars
            .render_to_write(MAIN_TEMPLATE_NAME, &data, destination)
            .map_err(RenderError::Template)
    }
}
