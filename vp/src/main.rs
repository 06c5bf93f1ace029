//! vp - video prompt composer
//!
//! CLI entry point: brief files in, shot-by-shot prompts out.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use colored::*;
use eyre::{Context, Result, eyre};
use rand::rng;
use tracing::{debug, info};

use vidprompt::cli::{
    BriefCommand, Cli, Command, HistoryCommand, brief_to_yaml, build_studio, get_log_path, load_brief,
    open_history, save_brief,
};
use vidprompt::clipboard::SystemClipboard;
use vidprompt::config::Config;
use vidprompt::domain::{AspectRatio, Brief, Language, SuggestionField, SuggestionSink};
use vidprompt::pipeline::SuggestionOutcome;
use vidprompt::studio::OutputView;

fn setup_logging(cli_level: Option<&str>, config_path: Option<&PathBuf>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI flag > config file > INFO
    let level = cli_level
        .map(str::to_string)
        .or_else(|| Config::load_log_level(config_path))
        .and_then(|l| l.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref(), cli.config.as_ref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let language = cli.lang.unwrap_or(config.language);

    info!(
        "vidprompt loaded config: provider={}, model={}, language={}",
        config.llm.provider, config.llm.model, language
    );

    match cli.command {
        Some(Command::Brief {
            command:
                BriefCommand::Init {
                    randomize_angles,
                    duration,
                    aspect_ratio,
                    out,
                },
        }) => cmd_brief_init(randomize_angles, duration, aspect_ratio, out.as_deref()),
        Some(Command::Generate { brief, view, copy }) => cmd_generate(&config, &brief, language, view, copy).await,
        Some(Command::Suggest { field, brief }) => cmd_suggest(&config, field, brief.as_deref(), language).await,
        Some(Command::Refresh { brief, write }) => cmd_refresh(&config, &brief, write, language).await,
        Some(Command::Translate { id, view }) => cmd_translate(&config, &id, view, language).await,
        Some(Command::History { command }) => cmd_history(&config, command, language),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Write a default brief
fn cmd_brief_init(
    randomize_angles: bool,
    duration: Option<u32>,
    aspect_ratio: Option<AspectRatio>,
    out: Option<&Path>,
) -> Result<()> {
    debug!(%randomize_angles, ?duration, ?aspect_ratio, ?out, "cmd_brief_init: called");
    let mut brief = Brief::default();
    if let Some(seconds) = duration {
        brief.set_duration(seconds);
    }
    if let Some(ratio) = aspect_ratio {
        brief.aspect_ratio = ratio;
    }
    if randomize_angles {
        brief.randomize_camera_angles(&mut rng());
    }

    match out {
        Some(path) => {
            save_brief(path, &brief)?;
            println!("{} Wrote brief: {}", "✓".green(), path.display().to_string().cyan());
        }
        None => print!("{}", brief_to_yaml(&brief)?),
    }
    Ok(())
}

/// Generate a shot list and record it in history
async fn cmd_generate(config: &Config, path: &Path, language: Language, view: OutputView, copy: bool) -> Result<()> {
    debug!(?path, %language, %view, %copy, "cmd_generate: called");
    let brief = load_brief(path)?;
    let studio = build_studio(config)?;

    let result = match studio.generate(&brief, language).await {
        Ok(result) => result,
        Err(_) => {
            let message = studio
                .state()
                .error
                .unwrap_or_else(|| language.messages().unknown_error.to_string());
            return Err(eyre!(message));
        }
    };

    print_result_header(&result.title, result.shots.len(), result.total_duration_seconds);
    println!("{}", view.render(&result));

    if copy && studio.copy(view, language, &SystemClipboard).await {
        println!("{}", language.messages().copied.green());
    }
    Ok(())
}

/// Suggest one field, optionally applying it to a brief file
async fn cmd_suggest(config: &Config, field: SuggestionField, path: Option<&Path>, language: Language) -> Result<()> {
    debug!(%field, ?path, %language, "cmd_suggest: called");
    let studio = build_studio(config)?;
    let mut brief = match path {
        Some(p) => load_brief(p)?,
        None => Brief::default(),
    };

    match studio.suggest(field, &mut brief, language).await {
        Ok(SuggestionOutcome::Applied(value)) => println!("{}", value),
        Ok(SuggestionOutcome::Superseded) => return Ok(()),
        Err(e) => {
            debug!(error = %e, "cmd_suggest: suggestion failed");
            return Err(eyre!("{}", language.messages().suggestion_failed));
        }
    }

    if let Some(p) = path {
        save_brief(p, &brief)?;
        println!("{} Updated {} in {}", "✓".green(), field.name().cyan(), p.display());
    }
    Ok(())
}

/// Refresh all seven fields sequentially
async fn cmd_refresh(config: &Config, path: &Path, write: bool, language: Language) -> Result<()> {
    debug!(?path, %write, %language, "cmd_refresh: called");
    let mut brief = load_brief(path)?;
    let studio = build_studio(config)?;

    let report = studio.refresh_all(&mut brief, language).await?;

    for field in SuggestionField::ALL {
        let status = if report.updated.contains(&field) {
            "updated".green()
        } else if report.superseded.contains(&field) {
            "superseded".yellow()
        } else {
            "unchanged".red()
        };
        let value = brief.current(field).to_string();
        let first_line = value.lines().next().unwrap_or_default();
        println!("{:>14} {:>10}  {}", field.name().cyan(), status, first_line.dimmed());
    }

    if write {
        save_brief(path, &brief)?;
        println!("{} Wrote {}", "✓".green(), path.display());
    } else {
        println!();
        print!("{}", brief_to_yaml(&brief)?);
    }
    Ok(())
}

/// Show a remembered result in another language
async fn cmd_translate(config: &Config, id: &str, view: OutputView, language: Language) -> Result<()> {
    debug!(%id, %view, %language, "cmd_translate: called");
    let studio = build_studio(config)?;
    studio.restore(id)?;

    let result = studio
        .view(language)
        .await
        .ok_or_else(|| eyre!("{}", language.messages().unknown_error))?;
    print_result_header(&result.title, result.shots.len(), result.total_duration_seconds);
    println!("{}", view.render(&result));
    Ok(())
}

/// History commands work offline; no backend client is built
fn cmd_history(config: &Config, command: HistoryCommand, language: Language) -> Result<()> {
    let mut history = open_history(config);

    match command {
        HistoryCommand::List => {
            if history.is_empty() {
                println!("{}", language.messages().history_empty.dimmed());
                return Ok(());
            }
            for entry in history.entries() {
                let when = entry
                    .created_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{} {} {} {}",
                    entry.short_id().yellow(),
                    when.dimmed(),
                    entry.language.to_string().dimmed(),
                    entry.result.title
                );
            }
        }
        HistoryCommand::Show { id, view } => {
            let entry = history.find(&id)?;
            print_result_header(&entry.result.title, entry.result.shots.len(), entry.result.total_duration_seconds);
            println!("{}", view.render(&entry.result));
        }
        HistoryCommand::Delete { id } => {
            let full_id = history.find(&id)?.id.clone();
            history.remove(&full_id)?;
            println!("{} Deleted: {}", "✓".green(), full_id);
        }
        HistoryCommand::Clear => {
            let count = history.len();
            history.clear()?;
            println!("{} Cleared {} entries", "✓".green(), count);
        }
    }
    Ok(())
}

fn print_result_header(title: &str, shots: usize, seconds: f64) {
    println!("{} {}", title.bold(), format!("({} shots, {}s)", shots, seconds).dimmed());
    println!();
}
