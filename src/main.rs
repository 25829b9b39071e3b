use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wordcard",
    version,
    about = "Generate bilingual study cards from English articles"
)]
struct Cli {
    /// Input article (plain text; the file stem becomes the title)
    input: String,

    /// Output directory (one subdirectory per article)
    #[arg(short = 'o', long = "output", default_value = "./output")]
    output: String,

    /// Difficulty label stored with the article
    #[arg(short = 'd', long = "difficulty", default_value = "intermediate")]
    difficulty: String,

    /// Pipeline step: auto, translate or render
    #[arg(long = "step", default_value = "auto")]
    step: String,

    /// Comma separated output formats (md,png,pdf)
    #[arg(long = "formats", default_value = "md,png,pdf")]
    formats: String,

    /// Backend model name (overrides settings)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint (overrides settings)
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// API key (falls back to WORDCARD_API_KEY)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Produce the whole bilingual document in one backend call
    #[arg(long = "one-shot")]
    one_shot: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    wordcard::logging::init(cli.verbose);

    let step = wordcard::Step::parse(&cli.step)?;
    let output = wordcard::run(wordcard::Config {
        input: cli.input,
        output_dir: cli.output,
        difficulty: cli.difficulty,
        step,
        formats: cli.formats,
        model: cli.model,
        base_url: cli.base_url,
        key: cli.key,
        one_shot: cli.one_shot,
        settings_path: cli.read_settings,
    })
    .await?;

    println!("{output}");
    Ok(())
}
