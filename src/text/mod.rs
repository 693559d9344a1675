//! Text capabilities used by the [`Renderer`](crate::template::Renderer): Markdown rendering,
//! sanitization and emoji mapping.
//!
//! Each capability is a narrow trait, so that it can be replaced, e.g. with a stub in tests.
//! The default implementations are [`CommonMark`], [`EscapeHtml`] and [`Twemoji`].

use pulldown_cmark::{html, Options, Parser};
use quick_xml::escape::escape;

use std::fmt;

mod emoji;

pub use self::emoji::{extract_img_src, icon_name, MarkupError, Twemoji};
use crate::BoxedError;

/// Converts Markdown text to HTML.
pub trait MarkdownRenderer: fmt::Debug + Send + Sync {
    /// Renders `text` to an HTML fragment.
    ///
    /// # Errors
    ///
    /// May return errors if the text cannot be rendered.
    fn render_markdown(&self, text: &str) -> Result<String, BoxedError>;
}

/// Makes untrusted text safe to be inserted into HTML.
pub trait Sanitizer: fmt::Debug + Send + Sync {
    /// Sanitizes `text` producing an HTML fragment.
    ///
    /// # Errors
    ///
    /// May return errors if the text cannot be sanitized.
    fn sanitize(&self, text: &str) -> Result<String, BoxedError>;
}

/// Maps emoji to images.
pub trait Emojifier: fmt::Debug + Send + Sync {
    /// Replaces emoji in the text content of the `html` fragment with `<img>` tags.
    ///
    /// # Errors
    ///
    /// May return errors if the conversion fails.
    fn emojify(&self, html: &str) -> Result<String, BoxedError>;

    /// Resolves a single emoji to its image URL. Returns `Ok(None)` if `emoji` is not
    /// recognized as an emoji.
    ///
    /// # Errors
    ///
    /// May return errors if the conversion fails.
    fn emoji_to_url(&self, emoji: &str) -> Result<Option<String>, BoxedError>;
}

/// [CommonMark] renderer with the GitHub extensions for tables, strikethrough and task lists.
///
/// Raw HTML in the input is passed through; it's the caller's responsibility
/// to sanitize the output if necessary.
///
/// [CommonMark]: https://commonmark.org/
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMark;

impl CommonMark {
    const OPTIONS: Options = Options::ENABLE_TABLES
        .union(Options::ENABLE_STRIKETHROUGH)
        .union(Options::ENABLE_TASKLISTS);
}

impl MarkdownRenderer for CommonMark {
    fn render_markdown(&self, text: &str) -> Result<String, BoxedError> {
        let parser = Parser::new_ext(text, Self::OPTIONS);
        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}

/// Sanitizer replacing all HTML-significant chars (`&<>"'/`) with entities.
/// The output never contains tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeHtml;

impl Sanitizer for EscapeHtml {
    fn sanitize(&self, text: &str) -> Result<String, BoxedError> {
        // Entities produced by `escape` never contain `/`.
        Ok(escape(text).replace('/', "&#x2F;"))
    }
}

/// Allow-list sanitizer based on [`ammonia`]. Keeps safe formatting tags (e.g., `<strong>`)
/// and removes scripts, event handlers and other dangerous markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowList;

impl Sanitizer for AllowList {
    fn sanitize(&self, text: &str) -> Result<String, BoxedError> {
        Ok(ammonia::clean(text))
    }
}
