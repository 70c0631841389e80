use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub struct Command {
    pub config_path: String,
    pub output_dir: String,
    pub clean: bool,
    pub channels: Vec<String>,
    pub timeout_secs: u64,
    pub cache_file: String,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "ffdl",
    version,
    author = "Nick Guletskii",
    about = "Download the latest Firefox build of every configured release channel, skipping builds whose ETag has not changed"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Channel config file, or a directory with one config file per OS",
        default_value = "configs"
    )]
    config: String,

    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Directory receiving the downloaded builds and the ETag cache",
        default_value = "temp"
    )]
    output_dir: String,

    #[arg(
        long = "clean",
        help = "Deletes the output directory and ETag cache before downloading"
    )]
    clean: bool,

    #[arg(
        long = "channel",
        value_name = "NAME",
        help = "Only downloads the given channels (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    channels: Vec<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help = "Maximum time allowed for a single channel download",
        default_value_t = 600
    )]
    timeout: u64,

    #[arg(
        long = "cache-file",
        value_name = "FILE",
        help = "Name of the ETag cache file inside the output directory",
        default_value = crate::cache::DEFAULT_CACHE_FILE_NAME
    )]
    cache_file: String,
}

fn command_from_cli(cli: Cli) -> Command {
    Command {
        config_path: cli.config,
        output_dir: cli.output_dir,
        clean: cli.clean,
        channels: cli.channels,
        timeout_secs: cli.timeout,
        cache_file: cli.cache_file,
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().unwrap()),
        )
        .init();

    Args {
        command: command_from_cli(cli),
        log_level,
    }
}
