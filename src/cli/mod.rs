//! Command-line interface parsing and handling
//!
//! Every command reads one chat message, either raw text or a serialized
//! message object, from a file or from stdin (`-`).

pub mod blocks;
pub mod input;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::{path_display, Config};
use crate::core::sandbox::{FileTable, SandboxSession};
use crate::ui::mermaid::{self, MermaidConfig};
use crate::ui::suggestions::SuggestionCards;
use crate::ui::theme::Theme;
use crate::utils::logging::init_logging;

#[derive(Parser)]
#[command(name = "fencebox")]
#[command(version)]
#[command(about = "Sandbox files, code blocks and diagrams from chat messages")]
#[command(
    long_about = "fencebox reads a chat message and works with the code inside it.\n\n\
Messages may be plain text or a JSON message object with a \"text\" field\n\
(and optionally \"suggestions\"). Pass '-' to read from stdin.\n\n\
Sandbox files are written as fences that name the file:\n\
  ```js=index.js\n\
  console.log(1)\n\
  ```\n\n\
Environment Variables:\n\
  FENCEBOX_LOG      tracing filter directive (e.g. fencebox=debug)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the sandbox file table for a message as JSON
    Sandbox {
        message: PathBuf,
        /// Print the file updates a fresh preview would load instead
        #[arg(long)]
        updates: bool,
    },
    /// List the code blocks in a message
    Blocks { message: PathBuf },
    /// Render code blocks with their action bars
    Show {
        message: PathBuf,
        /// Only this block (1-based)
        #[arg(short, long)]
        block: Option<usize>,
        /// Render collapsed
        #[arg(long)]
        collapsed: bool,
        /// Show Mermaid blocks as diagrams
        #[arg(long)]
        diagram: bool,
    },
    /// Copy a code block to the clipboard
    Copy {
        message: PathBuf,
        /// Block number (1-based)
        block: usize,
    },
    /// Save a code block to a file
    Download {
        message: PathBuf,
        /// Block number (1-based)
        block: usize,
        /// File name to use; prompts with a suggestion when omitted
        #[arg(short, long)]
        name: Option<String>,
        /// Directory to save into (defaults to config download-dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Export a Mermaid block as a standalone diagram document
    Diagram {
        message: PathBuf,
        /// Block number (1-based)
        block: usize,
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
    },
    /// List the suggestions attached to a message
    Suggestions { message: PathBuf },
    /// Print the current configuration
    Config,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Unset a configuration value
    Unset { key: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let config = Config::load_from_path(&config_path)?;
    init_logging(args.verbose, config.log_filter());
    mermaid::initialize(MermaidConfig::with_settings(&config.mermaid))?;

    run(args.command, &config, &config_path)
}

pub fn run(
    command: Commands,
    config: &Config,
    config_path: &std::path::Path,
) -> Result<(), Box<dyn Error>> {
    let theme = Theme::from_name(config.theme.as_deref().unwrap_or("dark"));

    match command {
        Commands::Sandbox { message, updates } => {
            let message = input::read_message(&message)?;
            let table = FileTable::from_message(&message.text);
            if updates {
                let mut session = SandboxSession::new();
                for update in session.sync(&table) {
                    println!("── {} ──", update.filename);
                    println!("{}", update.contents);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&table)?);
            }
            Ok(())
        }
        Commands::Blocks { message } => {
            let message = input::read_message(&message)?;
            blocks::list_blocks(&message.text, &mut std::io::stdout())?;
            Ok(())
        }
        Commands::Show {
            message,
            block,
            collapsed,
            diagram,
        } => {
            let message = input::read_message(&message)?;
            let options = blocks::ShowOptions {
                only: block,
                collapsed,
                diagram,
                syntax: config.syntax_enabled(),
            };
            blocks::show_blocks(&message.text, &theme, options, &mut std::io::stdout())?;
            Ok(())
        }
        Commands::Copy { message, block } => {
            let message = input::read_message(&message)?;
            blocks::copy_block(&message.text, block, config)
        }
        Commands::Download {
            message,
            block,
            name,
            dir,
            force,
        } => {
            if name.is_none() && input::is_stdin(&message) {
                return Err(Box::new(blocks::BlockError::NameRequired));
            }
            let message = input::read_message(&message)?;
            let dir = dir.unwrap_or_else(|| config.download_dir());
            blocks::download_block(&message.text, block, &dir, name, force)
        }
        Commands::Diagram {
            message,
            block,
            dir,
            force,
        } => {
            let message = input::read_message(&message)?;
            let dir = dir.unwrap_or_else(|| config.download_dir());
            blocks::export_diagram(&message.text, block, &dir, force)
        }
        Commands::Suggestions { message } => {
            let message = input::read_message(&message)?;
            let cards = SuggestionCards::from_message(&message);
            if cards.is_empty() {
                println!("(no suggestions)");
            }
            for (i, suggestion) in cards.iter().enumerate() {
                println!("{}. {}", i + 1, suggestion);
            }
            Ok(())
        }
        Commands::Config => {
            config.print_all(config_path);
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut updated = config.clone();
            if let Err(err) = settings::apply_set(&mut updated, &key, &value) {
                err.print();
                std::process::exit(err.exit_code());
            }
            updated.save_to_path(config_path)?;
            println!("✅ Set {key} to: {value} ({})", path_display(config_path));
            Ok(())
        }
        Commands::Unset { key } => {
            let mut updated = config.clone();
            if let Err(err) = settings::apply_unset(&mut updated, &key) {
                err.print();
                std::process::exit(err.exit_code());
            }
            updated.save_to_path(config_path)?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}
