//! Tests for the HTML rendering logic.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use std::{error::Error as StdError, fmt};

use super::*;
use crate::{fonts::FontFace, BoxedError};

const SMILEY_URL: &str = "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg/1f600.svg";

fn test_fonts() -> FontSet {
    FontSet::from_faces(vec![
        FontFace::woff2("Inter", 400, b"regular"),
        FontFace::woff2("Inter", 700, b"font"),
        FontFace::woff2("Noto Sans JP", 300, b"light"),
    ])
}

fn test_renderer() -> Renderer {
    Renderer::new(TemplateOptions::default(), test_fonts())
}

fn smiley_request(text: &str) -> ParsedRequest {
    ParsedRequest::new(text, "2023/04/01").with_emoji("😀")
}

#[derive(Debug)]
struct StubError;

impl fmt::Display for StubError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("stub failure")
    }
}

impl StdError for StubError {}

#[derive(Debug)]
struct Uppercase;

impl MarkdownRenderer for Uppercase {
    fn render_markdown(&self, text: &str) -> Result<String, BoxedError> {
        Ok(format!("<i>{}</i>", text.to_uppercase()))
    }
}

impl Sanitizer for Uppercase {
    fn sanitize(&self, text: &str) -> Result<String, BoxedError> {
        Ok(format!("[{}]", text.to_uppercase()))
    }
}

#[derive(Debug)]
struct Failing;

impl MarkdownRenderer for Failing {
    fn render_markdown(&self, _text: &str) -> Result<String, BoxedError> {
        Err(StubError.into())
    }
}

impl Sanitizer for Failing {
    fn sanitize(&self, _text: &str) -> Result<String, BoxedError> {
        Err(StubError.into())
    }
}

impl Emojifier for Failing {
    fn emojify(&self, html: &str) -> Result<String, BoxedError> {
        Ok(html.to_owned())
    }

    fn emoji_to_url(&self, _emoji: &str) -> Result<Option<String>, BoxedError> {
        Err(StubError.into())
    }
}

#[derive(Debug)]
struct FixedEmoji;

impl Emojifier for FixedEmoji {
    fn emojify(&self, html: &str) -> Result<String, BoxedError> {
        Ok(html.replace(":)", "<img alt=\"smile\"/>"))
    }

    fn emoji_to_url(&self, emoji: &str) -> Result<Option<String>, BoxedError> {
        Ok(Some(format!("https://emoji.test/{}.png", emoji.len())))
    }
}

#[test]
fn rendering_simple_request() {
    let html = test_renderer().render(&smiley_request("Hello, world!")).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>\n"), "{html}");
    assert!(html.trim_end().ends_with("</html>"), "{html}");
    assert_eq!(html.matches("<!DOCTYPE html>").count(), 1);
    assert!(html.contains("<title>Generated Image</title>"), "{html}");
    assert!(
        html.contains(
            r#"<script src="https://cdn.tailwindcss.com?plugins&#x3D;line-clamp"></script>"#
        ),
        "{html}"
    );
    assert!(html.contains("Hello, world!"), "{html}");
    assert!(html.contains("<!-- Created with og-image-html v"), "{html}");
}

#[test]
fn embedding_fonts() {
    let html = test_renderer().render(&smiley_request("Hi")).unwrap();

    assert_eq!(html.matches("@font-face").count(), 3);
    assert!(html.contains("font-family: 'Noto Sans JP';"), "{html}");
    assert!(html.contains("font-weight: 700;"), "{html}");
    assert!(html.contains("font-family: 'Noto Sans JP', sans-serif;"), "{html}");
    let bold_src = "src: url(data:font/woff2;charset=utf-8;base64,Zm9udA==) format('woff2');";
    assert!(html.contains(bold_src), "{html}");
}

#[test]
fn rendering_markdown() {
    let request = smiley_request("**hi**, *there* and `code`").with_markdown(true);
    let html = test_renderer().render(&request).unwrap();

    assert!(html.contains("<strong>hi</strong>"), "{html}");
    assert!(html.contains("<em>there</em>"), "{html}");
    assert!(html.contains("<code>code</code>"), "{html}");
}

#[test]
fn plain_text_is_escaped() {
    let request = smiley_request("<script>alert(1)</script> & more");
    let html = test_renderer().render(&request).unwrap();

    assert!(!html.contains("<script>alert"), "{html}");
    assert!(
        html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt; &amp; more"),
        "{html}"
    );
}

#[test]
fn markdown_does_not_leak_scripts_by_default() {
    let request = smiley_request("Hi <script>alert(1)</script>").with_markdown(true);
    let html = test_renderer().render(&request).unwrap();
    assert!(!html.contains("<script>alert"), "{html}");

    let options = TemplateOptions {
        sanitize_markdown: false,
        ..TemplateOptions::default()
    };
    let html = Renderer::new(options, test_fonts())
        .render(&request)
        .unwrap();
    assert!(html.contains("<script>alert(1)</script>"), "{html}");
}

#[test]
fn emoji_in_text_are_images() {
    let request = smiley_request("Party 🎉 time");
    let html = test_renderer().render(&request).unwrap();

    let party_img = "Party <img class=\"emoji\" draggable=\"false\" alt=\"🎉\" \
        src=\"https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg/1f389.svg\"/> time";
    assert!(html.contains(party_img), "{html}");
}

#[test]
fn emoji_url_is_rendered_once() {
    let html = test_renderer().render(&smiley_request("Hi")).unwrap();

    let emoji_img = format!(r#"<img src="{SMILEY_URL}" class="w-24 h-24">"#);
    assert!(html.contains(&emoji_img), "{html}");
    assert_eq!(html.matches(SMILEY_URL).count(), 1, "{html}");
}

#[test]
fn unresolved_emoji_produces_empty_src() {
    let request = ParsedRequest::new("Hi", "2023/04/01").with_emoji("not an emoji");
    let html = test_renderer().render(&request).unwrap();
    assert!(html.contains(r#"<img src="" class="w-24 h-24">"#), "{html}");
}

#[test]
fn published_at_is_verbatim_by_default() {
    let request = ParsedRequest::new("Hi", "<b>2023</b> & later").with_emoji("😀");
    let html = test_renderer().render(&request).unwrap();
    let footer_date = r#"<div class="text-2xl text-gray-500 font-bold"><b>2023</b> & later</div>"#;
    assert!(html.contains(footer_date), "{html}");

    let options = TemplateOptions {
        escape_published_at: true,
        ..TemplateOptions::default()
    };
    let html = Renderer::new(options, test_fonts())
        .render(&request)
        .unwrap();
    assert!(html.contains("&lt;b&gt;2023&lt;/b&gt; &amp; later"), "{html}");
}

#[test]
fn urls_in_attributes_are_escaped() {
    let html = test_renderer().render(&smiley_request("Hi")).unwrap();
    let avatar = "<img src=\"https://datsukan.me/_next/image?url&#x3D;%2Fimages%2Favatar.jpg\
        &amp;w&#x3D;96&amp;q&#x3D;75\" />";
    assert!(html.contains(avatar), "{html}");
}

#[test]
fn rendering_custom_brand() {
    let options = TemplateOptions {
        title: "<Card>".to_owned(),
        brand: Brand {
            name: "Alice & Bob".to_owned(),
            avatar_url: "https://example.com/avatar.png".to_owned(),
        },
        ..TemplateOptions::default()
    };
    let html = Renderer::new(options, test_fonts())
        .render(&smiley_request("Hi"))
        .unwrap();

    assert!(html.contains("<title>&lt;Card&gt;</title>"), "{html}");
    assert!(html.contains(">Alice &amp; Bob</span>"), "{html}");
    assert!(
        html.contains(r#"<img src="https://example.com/avatar.png" />"#),
        "{html}"
    );
    assert!(!html.contains("datsukan.me"), "{html}");
}

#[test]
fn rendering_is_deterministic() {
    let renderer = test_renderer();
    let request = smiley_request("Same **input** 😀").with_markdown(true);
    let first = renderer.render(&request).unwrap();
    let second = renderer.render(&request).unwrap();
    assert_eq!(first, second);

    let mut buffer = vec![];
    renderer.render_to_write(&request, &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), first);
}

#[test]
fn using_stub_capabilities() {
    let options = TemplateOptions {
        sanitize_markdown: false,
        ..TemplateOptions::default()
    };
    let renderer = Renderer::new(options, test_fonts())
        .with_markdown(Uppercase)
        .with_sanitizer(Uppercase)
        .with_emojifier(FixedEmoji);

    let html = renderer.render(&smiley_request("md :)").with_markdown(true)).unwrap();
    assert!(html.contains(r#"<i>MD <img alt="smile"/></i>"#), "{html}");
    assert!(html.contains(r#"<img src="https://emoji.test/4.png""#), "{html}");

    let html = renderer.render(&smiley_request("plain")).unwrap();
    assert!(html.contains("[PLAIN]"), "{html}");
}

#[test]
fn capability_errors_are_propagated() {
    let renderer = test_renderer().with_markdown(Failing);
    let err = renderer
        .render(&smiley_request("hi").with_markdown(true))
        .unwrap_err();
    assert_matches!(err, RenderError::Markdown(_));
    assert!(err.to_string().contains("stub failure"), "{err}");

    let renderer = test_renderer().with_sanitizer(Failing);
    let err = renderer.render(&smiley_request("hi")).unwrap_err();
    assert_matches!(err, RenderError::Sanitize(_));

    let renderer = test_renderer().with_emojifier(Failing);
    let err = renderer.render(&smiley_request("hi")).unwrap_err();
    assert_matches!(err, RenderError::Emoji(_));
}

#[test]
fn rendering_custom_template() {
    let template =
        HandlebarsTemplate::compile("{{published_at}}|{{emoji_url}}|{{{body_html}}}").unwrap();
    let options = TemplateOptions {
        sanitize_markdown: false,
        ..TemplateOptions::default()
    };
    let renderer = Renderer::custom(template, options, test_fonts());
    let html = renderer.render(&smiley_request("*hi*").with_markdown(true)).unwrap();
    assert_eq!(html, format!("2023/04/01|{SMILEY_URL}|<p><em>hi</em></p>\n"));
}

#[test]
fn custom_template_with_unknown_field() {
    let template = HandlebarsTemplate::compile("{{unknown_field}}").unwrap();
    let renderer = Renderer::custom(template, TemplateOptions::default(), test_fonts());
    let err = renderer.render(&smiley_request("hi")).unwrap_err();
    assert_matches!(err, RenderError::Template(_));
}

#[test]
fn renderer_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let renderer = test_renderer();
    assert_send_sync(&renderer);
    let request = smiley_request("Hi");
    let expected = renderer.render(&request).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| renderer.render(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn deserializing_options_from_toml() {
    let options: TemplateOptions = toml::from_str(
        r#"
        title = "Blog card"
        emoji_base_url = "https://example.com/twemoji/"

        [brand]
        name = "octocat"
        "#,
    )
    .unwrap();

    assert_eq!(options.title, "Blog card");
    assert_eq!(options.brand.name, "octocat");
    assert_eq!(options.brand.avatar_url, Brand::default().avatar_url);
    assert!(options.sanitize_markdown);

    let html = Renderer::new(options, test_fonts())
        .render(&smiley_request("Hi"))
        .unwrap();
    assert!(
        html.contains(r#"<img src="https://example.com/twemoji/svg/1f600.svg""#),
        "{html}"
    );
}
