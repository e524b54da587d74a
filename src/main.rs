use anyhow::Context;
use clap::Parser;
use meeting_analyst::commands::{analyze, inspect};
use meeting_analyst::config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let default_filter = cli.log_level.to_string().to_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Analyze(args) => {
            let source = args.transcript.clone();
            analyze::run(args)
                .await
                .with_context(|| format!("Failed to analyze {}", source))?;
        }
        Command::Schema => println!("{}", inspect::schema_text()),
        Command::Prompts { task } => print!("{}", inspect::prompts_text(task)),
    }

    Ok(())
}
