use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, interactive, search, show, watched};
use popcorn_config::PathManager;
use std::path::PathBuf;

mod commands;
mod context;
mod logging;
mod output;
mod render;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - Search movies, rate them, and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily-rotated file instead of stderr (default: logs/popcorn.log in the config directory)
    #[arg(long, global = true, value_name = "PATH", require_equals = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search the OMDb database by title. Queries shorter than the configured minimum (3 characters by default) return no results without contacting the API.")]
    Search {
        /// Movie title (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show details for a movie
    Show {
        /// IMDb id, e.g. tt0372784
        id: String,
    },

    /// Rate a movie and add it to your watched list
    #[command(long_about = "Fetch a movie's details and add it to your watched list with your rating. Prompts for the rating when --rating is omitted. A movie can only be added once.")]
    Add {
        /// IMDb id, e.g. tt0372784
        id: String,

        /// Your rating, 1 to 10
        #[arg(short, long)]
        rating: Option<u8>,
    },

    /// Remove a movie from your watched list
    Remove {
        /// IMDb id
        id: String,
    },

    /// Show your watched list with its summary
    List,

    /// Show averages over your watched list
    Summary,

    /// Search, open, and rate movies in one session
    #[command(long_about = "Start a line-driven session. Plain text searches (a new query replaces the running one), and :commands open, rate, and close movies. Type :help inside the session for the full list.")]
    Interactive,

    /// Manage configuration and the OMDb API key
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },

    /// Clear the watched list or stored credentials
    #[command(long_about = "Clear stored data. Use --watched to empty the watched list, --credentials to delete the stored API key, or --all for both.")]
    Clear {
        /// Clear the watched list and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["watched", "credentials"])]
        all: bool,

        /// Empty the watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Delete stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Do not ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Store the OMDb API key
    #[command(long_about = "Store the OMDb API key in the credentials file. Prompts with hidden input when KEY is omitted. The POPCORN_OMDB_API_KEY environment variable overrides the stored key.")]
    ApiKey {
        /// API key (if not provided, will prompt)
        key: Option<String>,
    },

    /// Change settings in config.toml
    Set {
        /// OMDb endpoint
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Shortest query that is sent to the API
        #[arg(long)]
        min_query_len: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .map(|path| path.unwrap_or_else(|| PathManager::default().log_file()));
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref())?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query.join(" "), &output).await,
        Commands::Show { id } => show::run_show(id, &output).await,
        Commands::Add { id, rating } => watched::run_add(id, rating, &output).await,
        Commands::Remove { id } => watched::run_remove(id, &output).await,
        Commands::List => watched::run_list(&output).await,
        Commands::Summary => watched::run_summary(&output).await,
        Commands::Interactive => interactive::run_interactive(&output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output).await
        }
        Commands::Clear {
            all,
            watched,
            credentials,
            yes,
        } => clear::run_clear(all, watched, credentials, yes, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_flag_without_path() {
        let cli = Cli::try_parse_from(["popcorn", "--log-file", "list"]).unwrap();
        assert_eq!(cli.log_file, Some(None));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_log_file_flag_with_path() {
        let cli = Cli::try_parse_from(["popcorn", "list", "--log-file=/tmp/popcorn/run.log"]).unwrap();
        assert_eq!(cli.log_file, Some(Some(PathBuf::from("/tmp/popcorn/run.log"))));

        let cli = Cli::try_parse_from(["popcorn", "summary"]).unwrap();
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_clear_flags_conflict() {
        assert!(Cli::try_parse_from(["popcorn", "clear", "--all", "--watched"]).is_err());
        let cli = Cli::try_parse_from(["popcorn", "clear", "--watched", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { watched: true, yes: true, .. }));
    }
}
