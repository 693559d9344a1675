//! Twemoji-style emoji mapping.

use quick_xml::{escape::escape, events::Event, Reader};
use unicode_segmentation::UnicodeSegmentation;

use std::{borrow::Cow, error::Error as StdError, fmt};

use super::Emojifier;
use crate::BoxedError;

const ZWJ: char = '\u{200d}';
const VARIATION_SELECTOR: char = '\u{fe0f}';

/// Symbols that are emoji only in the emoji presentation (i.e., followed by U+FE0F).
const TEXT_STYLE_SYMBOLS: &[&str] = &["\u{a9}", "\u{ae}", "\u{2122}"];

/// Error extracting an attribute from the emoji markup.
#[derive(Debug)]
pub struct MarkupError(quick_xml::Error);

impl fmt::Display for MarkupError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Cannot parse emoji markup: {}", self.0)
    }
}

impl StdError for MarkupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

/// Returns the [Twemoji] asset name for the emoji, e.g. `1f600` for 😀 or `1f468-200d-1f4bb`
/// for 👨‍💻.
///
/// The variation selector U+FE0F is dropped unless the emoji is a ZWJ sequence.
///
/// [Twemoji]: https://github.com/jdecked/twemoji
pub fn icon_name(emoji: &str) -> String {
    let is_zwj_sequence = emoji.contains(ZWJ);
    let codepoints: Vec<_> = emoji
        .chars()
        .filter(|&ch| is_zwj_sequence || ch != VARIATION_SELECTOR)
        .map(|ch| format!("{:x}", u32::from(ch)))
        .collect();
    codepoints.join("-")
}

fn is_emoji(grapheme: &str) -> bool {
    // Digits, `#` and `*` are emoji components, but not emoji on their own.
    if grapheme.is_ascii() || TEXT_STYLE_SYMBOLS.contains(&grapheme) {
        return false;
    }
    if emojis::get(grapheme).is_some() {
        return true;
    }
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => emojis::get(&format!("{ch}{VARIATION_SELECTOR}")).is_some(),
        _ => emojis::get(grapheme.trim_end_matches(VARIATION_SELECTOR)).is_some(),
    }
}

/// Extracts the `src` attribute of the first `<img>` tag in the `markup` fragment.
///
/// # Errors
///
/// Returns an error if `markup` is not well-formed.
pub fn extract_img_src(markup: &str) -> Result<Option<String>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    loop {
        match reader.read_event().map_err(MarkupError)? {
            Event::Start(tag) | Event::Empty(tag) if tag.name().as_ref() == b"img" => {
                let src = tag
                    .try_get_attribute("src")
                    .map_err(|err| MarkupError(err.into()))?;
                return src
                    .map(|attr| attr.unescape_value().map(Cow::into_owned))
                    .transpose()
                    .map_err(MarkupError);
            }
            Event::Eof => return Ok(None),
            _ => { /* skip other events */ }
        }
    }
}

/// [Twemoji] mapping of emoji to SVG images hosted on a CDN.
///
/// Image URLs have the form `{base_url}svg/{icon_name}.svg`, where `icon_name` is produced
/// by [`icon_name()`].
///
/// # Examples
///
/// ```
/// # use og_image_html::text::{Emojifier, Twemoji};
/// let twemoji = Twemoji::default();
/// let html = twemoji.emojify("<b>Hi</b> 👋").unwrap();
/// assert!(html.starts_with(r#"<b>Hi</b> <img class="emoji" draggable="false" alt="👋""#));
///
/// let url = twemoji.emoji_to_url("😀").unwrap();
/// assert_eq!(
///     url.as_deref(),
///     Some("https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg/1f600.svg")
/// );
/// ```
///
/// [Twemoji]: https://github.com/jdecked/twemoji
#[derive(Debug, Clone)]
pub struct Twemoji {
    base_url: String,
}

impl Default for Twemoji {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

impl Twemoji {
    /// Default base URL of the Twemoji assets.
    pub const DEFAULT_BASE_URL: &'static str =
        "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/";

    const FOLDER: &'static str = "svg";
    const EXTENSION: &'static str = ".svg";

    /// Creates a mapping with the specified base URL of the assets. The URL should end with `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Returns the image URL for the emoji, without checking whether it's an emoji.
    pub fn image_url(&self, emoji: &str) -> String {
        format!(
            "{base}{folder}/{icon}{ext}",
            base = self.base_url,
            folder = Self::FOLDER,
            icon = icon_name(emoji),
            ext = Self::EXTENSION
        )
    }

    fn push_image(&self, emoji: &str, output: &mut String) {
        output.push_str(r#"<img class="emoji" draggable="false" alt=""#);
        output.push_str(&escape(emoji));
        output.push_str(r#"" src=""#);
        output.push_str(&escape(&self.image_url(emoji)));
        output.push_str(r#""/>"#);
    }

    fn push_text(&self, text: &str, escape_text: bool, output: &mut String) {
        for grapheme in text.graphemes(true) {
            if is_emoji(grapheme) {
                self.push_image(grapheme, output);
            } else if escape_text {
                output.push_str(&escape(grapheme));
            } else {
                output.push_str(grapheme);
            }
        }
    }

    /// Converts emoji in text runs of the HTML fragment. Tags are copied verbatim.
    fn parse_html(&self, html: &str) -> String {
        let mut output = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(tag_start) = rest.find('<') {
            let (text, tail) = rest.split_at(tag_start);
            self.push_text(text, false, &mut output);
            let tag_len = tail.find('>').map_or(tail.len(), |pos| pos + 1);
            output.push_str(&tail[..tag_len]);
            rest = &tail[tag_len..];
        }
        self.push_text(rest, false, &mut output);
        output
    }
}

impl Emojifier for Twemoji {
    fn emojify(&self, html: &str) -> Result<String, BoxedError> {
        Ok(self.parse_html(html))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), ret, err)
    )]
    fn emoji_to_url(&self, emoji: &str) -> Result<Option<String>, BoxedError> {
        let mut markup = String::new();
        self.push_text(emoji, true, &mut markup);
        Ok(extract_img_src(&markup)?)
    }
}
