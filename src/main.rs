//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Auther : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// Policy-driven password generator with a searchable history.

use std::io;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use securepass::configtool::AppConfig;
use securepass::history::{SortKey, ViewState};
use securepass::passgen::PolicyConstraints;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "securepass")]
#[command(about = "Generate passwords under a composition policy and keep a searchable history", long_about = None)]
struct Cli {
    /// Path to an alternative configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a new random password
    Gen(GenArgs),

    /// Show a page of the generation history
    History(ViewArgs),

    /// Delete one history record
    Delete {
        /// Record id as shown by `history`
        #[arg(long, conflicts_with = "index", required_unless_present = "index")]
        id: Option<Uuid>,

        /// Position on the page selected by the view options
        #[arg(long)]
        index: Option<usize>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Remove every history record
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },

    /// Test password strength and properties
    Testpass(TestpassArgs),

    /// Ask the configured external generator for a password
    Ai {
        /// Description of the wanted password
        prompt: String,
    },
}

#[derive(Debug, Args)]
struct GenArgs {
    /// Length of the password
    #[arg(short, long)]
    length: Option<usize>,

    /// Minimum number of uppercase letters
    #[arg(long)]
    min_upper: Option<usize>,

    /// Minimum number of lowercase letters
    #[arg(long)]
    min_lower: Option<usize>,

    /// Minimum number of digits
    #[arg(long)]
    min_digits: Option<usize>,

    /// Minimum number of symbols
    #[arg(long)]
    min_symbols: Option<usize>,

    /// Avoid visually similar characters (I, O, l, 1, 0)
    #[arg(short = 'c', long, default_value_t = false)]
    avoid_similar: bool,

    /// Never use the same character twice
    #[arg(short = 'r', long, default_value_t = false)]
    no_repeat: bool,

    /// Start from the example policy (20 characters, 3 of each class)
    #[arg(long, default_value_t = false)]
    example: bool,

    /// Print the password without recording it
    #[arg(long, default_value_t = false)]
    no_save: bool,
}

impl GenArgs {
    fn policy(&self, base: &PolicyConstraints) -> PolicyConstraints {
        let base = if self.example { PolicyConstraints::example() } else { base.clone() };
        PolicyConstraints {
            length: self.length.unwrap_or(base.length),
            min_upper: self.min_upper.unwrap_or(base.min_upper),
            min_lower: self.min_lower.unwrap_or(base.min_lower),
            min_digits: self.min_digits.unwrap_or(base.min_digits),
            min_symbols: self.min_symbols.unwrap_or(base.min_symbols),
            avoid_similar: self.avoid_similar || base.avoid_similar,
            forbid_repeated: self.no_repeat || base.forbid_repeated,
        }
    }
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Case-insensitive text the password must contain
    #[arg(short, long)]
    search: Option<String>,

    /// newest, oldest, strongest, weakest, longest or shortest [default: from config]
    #[arg(long)]
    sort: Option<SortKey>,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: usize,
}

impl ViewArgs {
    fn view(&self, config: &AppConfig) -> ViewState {
        let mut view = ViewState::with_page_size(config.page_size);
        if let Some(search) = &self.search {
            view.set_search(search.clone());
        }
        view.set_sort(self.sort.unwrap_or(config.default_sort));
        view.page_number = self.page.max(1);
        view
    }
}

#[derive(Debug, Args)]
struct TestpassArgs {
    /// Password to test
    password: String,

    /// Check if password is URL-safe
    #[arg(short = 's', long, default_value_t = false)]
    check_url_safe: bool,

    /// Check for visually confusing characters
    #[arg(short = 'c', long, default_value_t = false)]
    check_confusion: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SECUREPASS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Commands::Gen(args) => {
            let policy = args.policy(&config.default_policy);
            commands::password_gen::generate(&config, &policy, !args.no_save)
        },
        Commands::History(args) => {
            commands::history::show_history(&config, &args.view(&config))
        },
        Commands::Delete { id, index, view } => {
            commands::delete::delete_record(&config, id, index, &view.view(&config))
        },
        Commands::Clear { yes } => {
            commands::clear::clear_history(&config, yes)
        },
        Commands::Testpass(args) => {
            commands::testpass::test_password(&args.password, args.check_url_safe, args.check_confusion);
            Ok(())
        },
        Commands::Ai { prompt } => {
            commands::password_gen::generate_external(&config, &prompt)
        },
    }
}
