use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::info;

pub mod article;
pub mod extract;
mod fonts;
pub mod layout;
pub mod logging;
mod oneshot;
mod pipeline;
mod prompts;
mod providers;
pub mod render;
pub mod settings;
pub mod transfile;
pub mod wrap;

pub use providers::{Backend, ChatBackend};
pub use render::OutputFormat;

/// Which part of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Translate then render.
    Auto,
    /// Only produce the bilingual flat file.
    Translate,
    /// Only render outputs from an existing bilingual file.
    Render,
}

impl Step {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(Step::Auto),
            "translate" => Ok(Step::Translate),
            "render" => Ok(Step::Render),
            other => Err(anyhow!(
                "unknown step '{other}' (expected auto, translate or render)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: String,
    pub output_dir: String,
    pub difficulty: String,
    pub step: Step,
    pub formats: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub key: Option<String>,
    pub one_shot: bool,
    pub settings_path: Option<String>,
}

pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(url) = &config.base_url {
        settings.backend_base_url = url.clone();
    }
    if let Some(model) = &config.model {
        settings.backend_model = model.clone();
    }

    let input = Path::new(&config.input);
    let out_dir = Path::new(&config.output_dir);

    match config.step {
        Step::Translate => {
            let path = translate(&config, input, out_dir, &settings).await?;
            Ok(format!("bilingual file: {}", path.display()))
        }
        Step::Render => {
            let formats = render::parse_formats(&config.formats)?;
            let produced = pipeline::render_step(input, out_dir, &formats, &settings)?;
            Ok(report(&produced))
        }
        Step::Auto => {
            let formats = render::parse_formats(&config.formats)?;
            translate(&config, input, out_dir, &settings).await?;
            let produced = pipeline::render_step(input, out_dir, &formats, &settings)?;
            Ok(report(&produced))
        }
    }
}

async fn translate(
    config: &Config,
    input: &Path,
    out_dir: &Path,
    settings: &settings::Settings,
) -> Result<PathBuf> {
    let backend = ChatBackend::new(
        &settings.backend_base_url,
        &settings.backend_model,
        config.key.clone(),
    );
    info!(
        "using model '{}' at {}",
        backend.model(),
        settings.backend_base_url
    );
    if config.one_shot {
        pipeline::one_shot_step(&backend, input, out_dir, &config.difficulty, settings).await
    } else {
        pipeline::translate_step(&backend, input, out_dir, &config.difficulty, settings).await
    }
}

fn report(produced: &[PathBuf]) -> String {
    if produced.is_empty() {
        return "no outputs produced".to_string();
    }
    produced
        .iter()
        .map(|path| format!("wrote: {}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_case_insensitively() {
        assert_eq!(Step::parse("AUTO").unwrap(), Step::Auto);
        assert_eq!(Step::parse("translate").unwrap(), Step::Translate);
        assert_eq!(Step::parse(" render ").unwrap(), Step::Render);
        assert!(Step::parse("upload").is_err());
    }

    #[test]
    fn report_lists_every_path() {
        let produced = vec![PathBuf::from("a.md"), PathBuf::from("cards/01_cover.png")];
        let text = report(&produced);
        assert!(text.contains("wrote: a.md"));
        assert!(text.contains("wrote: cards/01_cover.png"));
        assert_eq!(report(&[]), "no outputs produced");
    }
}
