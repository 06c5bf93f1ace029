//! CLI command definitions and subcommands

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::domain::{AspectRatio, Brief, Language, SuggestionField};
use crate::history::{FileStore, History, StoreHistoryRepository};
use crate::llm::create_client;
use crate::pipeline::Pipeline;
use crate::prompts::PromptComposer;
use crate::studio::{OutputView, Studio};

/// Studio backed by the on-disk history
pub type FileStudio = Studio<StoreHistoryRepository<FileStore>>;

/// vidprompt - shot-by-shot video prompt composer
#[derive(Parser)]
#[command(
    name = "vp",
    about = "Compose shot-by-shot prompts for AI video generators from a structured brief",
    version,
    after_help = "Logs are written to: ~/.local/share/vidprompt/logs/vidprompt.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, global = true, help = "Log level (overrides config)")]
    pub log_level: Option<String>,

    /// Output language (ko, en); defaults to the configured language
    #[arg(short, long, global = true)]
    pub lang: Option<Language>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Create and edit brief files
    Brief {
        #[command(subcommand)]
        command: BriefCommand,
    },

    /// Generate a shot list from a brief file
    Generate {
        /// Brief file (YAML)
        brief: PathBuf,

        /// What to print: the overall prompt or the full JSON
        #[arg(long, default_value = "prompt")]
        view: OutputView,

        /// Also copy the output to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Suggest a value for one field
    Suggest {
        /// Field: subject, style, setting, color-palette, music, sound-effects, dialogue
        field: SuggestionField,

        /// Apply the suggestion to this brief file
        #[arg(short, long)]
        brief: Option<PathBuf>,
    },

    /// Refresh every field of a brief with new suggestions, one after another
    Refresh {
        /// Brief file (YAML)
        brief: PathBuf,

        /// Write the refreshed brief back to the file
        #[arg(short, long)]
        write: bool,
    },

    /// Show a remembered result in another language
    Translate {
        /// History entry id (or unique prefix)
        id: String,

        /// What to print: the overall prompt or the full JSON
        #[arg(long, default_value = "prompt")]
        view: OutputView,
    },

    /// Browse and manage generation history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand)]
pub enum BriefCommand {
    /// Write a default brief
    Init {
        /// Draw every camera angle at random
        #[arg(long)]
        randomize_angles: bool,

        /// Total video length in seconds (clamped to the supported range)
        #[arg(short, long)]
        duration: Option<u32>,

        /// Aspect ratio (9:16, 16:9, 1:1, 4:5)
        #[arg(short, long)]
        aspect_ratio: Option<AspectRatio>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List remembered generations, newest first
    List,

    /// Show one entry
    Show {
        /// Entry id (or unique prefix)
        id: String,

        /// What to print: the overall prompt or the full JSON
        #[arg(long, default_value = "prompt")]
        view: OutputView,
    },

    /// Delete one entry
    Delete {
        /// Entry id (or unique prefix)
        id: String,
    },

    /// Delete all entries
    Clear,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidprompt")
        .join("logs")
        .join("vidprompt.log")
}

/// Read and validate a brief file
pub fn load_brief(path: &Path) -> Result<Brief> {
    debug!(?path, "load_brief: called");
    let content = fs::read_to_string(path).context(format!("Failed to read brief {}", path.display()))?;
    let brief: Brief =
        serde_yaml::from_str(&content).context(format!("Failed to parse brief {}", path.display()))?;
    brief.validate().context(format!("Invalid brief {}", path.display()))?;
    Ok(brief)
}

pub fn brief_to_yaml(brief: &Brief) -> Result<String> {
    serde_yaml::to_string(brief).context("Failed to serialize brief")
}

pub fn save_brief(path: &Path, brief: &Brief) -> Result<()> {
    debug!(?path, "save_brief: called");
    let yaml = brief_to_yaml(brief)?;
    fs::write(path, yaml).context(format!("Failed to write brief {}", path.display()))
}

/// History backed by files under the configured directory
pub fn open_history(config: &Config) -> History<StoreHistoryRepository<FileStore>> {
    let repo = StoreHistoryRepository::new(FileStore::new(config.history.expanded_dir()));
    History::load_with_limit(repo, config.history.max_entries)
}

/// Wire client, composer and history into a studio
pub fn build_studio(config: &Config) -> Result<FileStudio> {
    debug!(provider = %config.llm.provider, "build_studio: called");
    config.validate().context("Configuration is not usable")?;
    let client = create_client(&config.llm)?;
    let composer = PromptComposer::new(config.prompts.expanded_dir());
    let pipeline = Arc::new(Pipeline::new(client, composer));
    Ok(Studio::new(pipeline, open_history(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["vp"]);
        assert!(cli.command.is_none());
        assert!(cli.lang.is_none());
    }

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["vp", "--lang", "en", "generate", "cat.yml", "--view", "json", "--copy"]);
        assert_eq!(cli.lang, Some(Language::En));
        match cli.command {
            Some(Command::Generate { brief, view, copy }) => {
                assert_eq!(brief, PathBuf::from("cat.yml"));
                assert_eq!(view, OutputView::Json);
                assert!(copy);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_suggest() {
        let cli = Cli::parse_from(["vp", "suggest", "color_palette", "-b", "cat.yml"]);
        match cli.command {
            Some(Command::Suggest { field, brief }) => {
                assert_eq!(field, SuggestionField::ColorPalette);
                assert_eq!(brief, Some(PathBuf::from("cat.yml")));
            }
            _ => panic!("Expected Suggest command"),
        }
    }

    #[test]
    fn test_cli_parse_brief_init() {
        let cli = Cli::parse_from(["vp", "brief", "init", "--randomize-angles", "-a", "16:9", "-d", "12"]);
        match cli.command {
            Some(Command::Brief {
                command:
                    BriefCommand::Init {
                        randomize_angles,
                        duration,
                        aspect_ratio,
                        out,
                    },
            }) => {
                assert!(randomize_angles);
                assert_eq!(duration, Some(12));
                assert_eq!(aspect_ratio, Some(AspectRatio::Landscape));
                assert!(out.is_none());
            }
            _ => panic!("Expected Brief Init command"),
        }
    }

    #[test]
    fn test_cli_parse_history() {
        let cli = Cli::parse_from(["vp", "history", "show", "0192", "--view", "json"]);
        assert!(matches!(
            cli.command,
            Some(Command::History {
                command: HistoryCommand::Show { view: OutputView::Json, .. }
            })
        ));

        let cli = Cli::parse_from(["vp", "history", "clear"]);
        assert!(matches!(
            cli.command,
            Some(Command::History {
                command: HistoryCommand::Clear
            })
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_field() {
        assert!(Cli::try_parse_from(["vp", "suggest", "lighting"]).is_err());
        assert!(Cli::try_parse_from(["vp", "--lang", "fr", "history", "list"]).is_err());
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["vp", "-c", "/path/to/config.yml", "history", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_brief_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.yml");
        let brief = Brief {
            subject: "A cat riding a skateboard".to_string(),
            aspect_ratio: AspectRatio::Square,
            ..Brief::default()
        };
        save_brief(&path, &brief).unwrap();
        assert_eq!(load_brief(&path).unwrap(), brief);
    }

    #[test]
    fn test_load_brief_rejects_out_of_range_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.yml");
        let mut yaml = brief_to_yaml(&Brief::default()).unwrap();
        yaml = yaml.replace("duration_seconds: 8", "duration_seconds: 600");
        fs::write(&path, yaml).unwrap();
        assert!(load_brief(&path).is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("vidprompt/logs/vidprompt.log"));
    }
}
