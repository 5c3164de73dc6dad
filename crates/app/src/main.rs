// CLI modules
mod cli;
mod state;

use clap::{Parser, Subcommand};
use cli::{
    args::Args, op::Op, Account, Download, DownloadFolder, Init, Ls, Mkdir, PruneShares, Rm,
    Share, Shared, Unshare, Upload,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use state::{AppConfig, AppState};

command_enum! {
    (Init, Init),
    (Account, Account),
    (Mkdir, Mkdir),
    (Upload, Upload),
    (Rm, Rm),
    (Ls, Ls),
    (Share, Share),
    (Unshare, Unshare),
    (Shared, Shared),
    (Download, Download),
    (DownloadFolder, DownloadFolder),
    (PruneShares, PruneShares),
}

/// Log to stderr so command output on stdout stays clean.
/// The returned guard must be kept alive for the duration of the program.
fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let (stderr_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level().into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    guard
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // state may not exist yet (e.g. before `init`)
    let config = AppState::load(args.config_path.clone())
        .map(|state| state.config)
        .unwrap_or_default();
    let guard = init_logging(&config);

    let ctx = cli::op::OpContext::new(args.config_path, args.user);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered logs before exiting
    drop(guard);
    std::process::exit(code);
}
