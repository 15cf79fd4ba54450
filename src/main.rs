use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playlist_stats::{
    analyzer::AnalyzeOptions,
    cli::{self, AnalyzeSettings},
    config, error, report, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
  args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Port for HTTP connections (OAuth callback)
    #[clap(long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// File the OAuth token is cached in
    #[clap(long, default_value = config::DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    /// Only report artists appearing at least this often
    #[clap(long, default_value_t = report::DEFAULT_MIN_COUNT)]
    min_count: u64,

    /// Skip foreign, non-collaborative playlists on the first page as well
    #[clap(long)]
    filter_first_page: bool,

    /// Count every track of a playlist, not only the first page
    #[clap(long)]
    all_track_pages: bool,

    /// Print the authorization URL instead of opening a browser
    #[clap(long)]
    no_browser: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Completions(opt)) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
        None => {
            let settings = AnalyzeSettings {
                port: cli.port,
                token_file: cli.token_file,
                min_count: cli.min_count,
                options: AnalyzeOptions {
                    filter_first_page: cli.filter_first_page,
                    all_track_pages: cli.all_track_pages,
                },
                open_browser: !cli.no_browser,
            };

            if let Err(e) = cli::analyze(settings).await {
                error!("{}", e);
            }
        }
    }
}
