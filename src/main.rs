use clap::Parser;
use anyhow::Result;
use ng_migrator::{
    config::Config,
    cli::{Cli, Commands},
    handlers::{
        handle_run, handle_batch, handle_interactive, handle_config,
        install_completions, print_completions,
    },
    logging,
    migration::MigrationMode,
};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일 로드
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Migrate { path, args }) => {
            let config = Config::load(Some(&path))?;
            handle_run(&path, &args, MigrationMode::Migrate, &config).await?;
        }
        Some(Commands::Analyze { path, args }) => {
            let config = Config::load(Some(&path))?;
            handle_run(&path, &args, MigrationMode::Analyze, &config).await?;
        }
        Some(Commands::Batch { projects, path, args }) => {
            let config = Config::load(Some(&path))?;
            handle_batch(projects, &path, &args, &config).await?;
        }
        Some(Commands::Interactive { path }) => {
            let config = Config::load(Some(&path))?;
            handle_interactive(path, &config).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config(action)?;
        }
        Some(Commands::Completion { shell }) => {
            print_completions(shell);
        }
        Some(Commands::Install { shell }) => {
            install_completions(shell)?;
        }
        None => {
            // 서브커맨드가 없으면 현재 디렉토리에서 대화형 모드
            let path = PathBuf::from(".");
            let config = Config::load(Some(&path))?;
            handle_interactive(path, &config).await?;
        }
    }

    Ok(())
}
