//! CLI for the `og-image-html` crate.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use og_image_html::{
    fonts::FontSet,
    template::{Renderer, TemplateOptions},
    text::{Emojifier, Twemoji},
    ParsedRequest,
};

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};


/// Renders Open Graph preview cards to self-contained HTML.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Renders a card to HTML and prints it to stdout.
    Render {
        /// Card text.
        text: String,
        /// Interprets the text as Markdown.
        #[arg(long, short = 'm')]
        md: bool,
        /// Emoji displayed above the text.
        #[arg(long, short = 'e')]
        emoji: String,
        /// Pre-formatted publish date displayed in the card footer.
        #[arg(long, short = 'd', value_name = "DATE")]
        published_at: String,
        /// Directory with font files.
        #[arg(long, env = "OG_IMAGE_FONTS", default_value = "fonts", value_name = "DIR")]
        fonts: PathBuf,
        /// Writes the HTML to the specified file instead of stdout.
        #[arg(long, short = 'o', value_name = "PATH")]
        out: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Prints the image URL for an emoji.
    EmojiUrl {
        /// Emoji to resolve.
        emoji: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to the TOML file with template options. Missing options take default values.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    config_path: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<TemplateOptions> {
        let Some(path) = &self.config_path else {
            return Ok(TemplateOptions::default());
        };
        let config = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file `{}`", path.display()))?;
        toml::from_str(&config)
            .with_context(|| format!("cannot parse config file `{}`", path.display()))
    }
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Render {
                text,
                md,
                emoji,
                published_at,
                fonts,
                out,
                config,
            } => {
                let options = config.load()?;
                let fonts = FontSet::load(&fonts)
                    .with_context(|| format!("cannot load fonts from `{}`", fonts.display()))?;
                let request = ParsedRequest::new(text, published_at)
                    .with_markdown(md)
                    .with_emoji(emoji);
                let renderer = Renderer::new(options, fonts);

                if let Some(out) = out {
                    Self::render_to_file(&renderer, &request, &out)?;
                } else {
                    renderer.render_to_write(&request, io::stdout().lock())?;
                }
            }

            Self::EmojiUrl { emoji, config } => {
                let options = config.load()?;
                let url = Twemoji::new(options.emoji_base_url)
                    .emoji_to_url(&emoji)
                    .map_err(|err| anyhow::anyhow!(err))?
                    .with_context(|| format!("`{emoji}` is not a recognized emoji"))?;
                println!("{url}");
            }
        }
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(renderer, request), err)
    )]
    fn render_to_file(
        renderer: &Renderer,
        request: &ParsedRequest,
        out: &Path,
    ) -> anyhow::Result<()> {
        let file = File::create(out)
            .with_context(|| format!("cannot create output file `{}`", out.display()))?;
        let mut writer = BufWriter::new(file);
        renderer.render_to_write(request, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

    FmtSubscriber::builder()
        .with_writer(io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    init_tracing();

    Cli::parse().command.run()
}
