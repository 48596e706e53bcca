use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use internship_registry::config::StoreBackend;
use internship_registry::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Internship Portal",
    about = "Run the internship application registry or walk through a demo review cycle",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Open a posting, apply to it and review the application end to end
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured store backend (memory or file)
    #[arg(long, value_parser = parse_backend)]
    pub(crate) store: Option<StoreBackend>,
    /// Override the document path used by the file backend
    #[arg(long)]
    pub(crate) store_path: Option<PathBuf>,
}

pub(crate) fn parse_backend(raw: &str) -> Result<StoreBackend, String> {
    raw.parse::<StoreBackend>().map_err(|err| err.to_string())
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["internship-portal"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_store_overrides() {
        let cli = Cli::try_parse_from([
            "internship-portal",
            "serve",
            "--port",
            "8080",
            "--store",
            "file",
            "--store-path",
            "/tmp/portal.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.store, Some(StoreBackend::File));
                assert_eq!(args.store_path, Some(PathBuf::from("/tmp/portal.json")));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["internship-portal", "serve", "--store", "redis"]).is_err());
    }
}
