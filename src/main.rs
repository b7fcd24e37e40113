use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ja_wcloud::{Language, LinderaAnalyzer, PosPolicy, Wakati, WordCloud, Workspace};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Draw a word cloud from a Japanese or English text file.
#[derive(Parser)]
#[clap(name = "ja_wcloud", version)]
struct Args {
    /// target text file
    #[clap(value_parser)]
    input_file: PathBuf,

    /// specify if target is written in English
    #[clap(long, action)]
    english: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let language = if args.english {
        Language::English
    } else {
        Language::Japanese
    };

    let workspace = Workspace::from_current_exe().context("Unable to locate program directory")?;
    info!(root = %workspace.root().display(), ?language, "starting");

    let config = workspace.cloud_config(language);
    let wordcloud = WordCloud::from_config(&config)
        .with_context(|| format!("Unable to load font {}", config.font_path.display()))?;

    let files = match language {
        Language::English => workspace.draw_cloud(&args.input_file, None, &wordcloud),
        Language::Japanese => {
            let analyzer = LinderaAnalyzer::new().context("Unable to load dictionary")?;
            let policy = PosPolicy::content_words();
            let wakati = Wakati {
                analyzer: &analyzer,
                policy: &policy,
            };
            workspace.draw_cloud(&args.input_file, Some(&wakati), &wordcloud)
        }
    }
    .with_context(|| format!("Unable to draw {}", args.input_file.display()))?;

    println!("{}", files.image.display());
    Ok(())
}
