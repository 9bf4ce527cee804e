use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use bazaar_browse::cli::{Cli, Commands};
use bazaar_browse::command::Command;
use bazaar_browse::config::BrowseConfig;
use bazaar_browse::error::{BrowseError, Result};
use bazaar_browse::fetch;
use bazaar_browse::script::{apply_command, ScriptRunner};
use bazaar_browse::session::BrowseSession;
use bazaar_browse::snapshot::SessionSnapshot;
use bazaar_browse::tree::{Category, CategoryTree};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger only if BROWSE_LOG environment variable is set
    if let Ok(log_file) = std::env::var("BROWSE_LOG") {
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)
                    .expect("Failed to open log file"),
            )))
            .filter_level(log::LevelFilter::Debug)
            .init();

        log::info!("bazaar-browse starting up");
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BrowseConfig::load_from_file(path)?,
        None => BrowseConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Run {
        categories: None,
        url: None,
    }) {
        Commands::Run { categories, url } => {
            let session = build_session(&config, categories.as_deref(), url.as_deref()).await;
            run_repl(session)
        }
        Commands::Exec {
            categories,
            url,
            command,
            output,
        } => {
            let mut session =
                build_session(&config, categories.as_deref(), url.as_deref()).await;
            let command = Command::from_string(&command).map_err(BrowseError::Generic)?;
            let effect = apply_command(&mut session, &command)?;

            let snapshot = SessionSnapshot::from_session(&session);
            let snapshot_json = serde_json::to_string_pretty(&snapshot)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &snapshot_json)?;
                    println!("Snapshot saved to: {}", path);
                }
                None => println!("{}", snapshot_json),
            }
            if !effect.changed {
                eprintln!("Command left the session unchanged");
            }
            Ok(())
        }
        Commands::Script {
            categories,
            url,
            script,
        } => {
            let mut session =
                build_session(&config, categories.as_deref(), url.as_deref()).await;
            let runner = ScriptRunner::from_file(&script)?;
            let report = runner.run(&mut session);
            report.print_summary();
            if report.success() {
                Ok(())
            } else {
                Err(BrowseError::Script(format!(
                    "{} failures",
                    report.failures.len()
                )))
            }
        }
        Commands::Resolve { categories, url } => {
            let session = build_session(&config, categories.as_deref(), Some(&url)).await;
            let snapshot = SessionSnapshot::from_session(&session);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}

/// Load the category tree (degrading to empty on any failure, like the
/// real category fetch) and restore a session from the given URL.
async fn build_session(
    config: &BrowseConfig,
    categories: Option<&str>,
    url: Option<&str>,
) -> BrowseSession {
    let tree = match categories {
        Some(path) => {
            let path = path.to_string();
            let fetch_future = async move {
                let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    BrowseError::Fetch(format!("cannot read {}: {}", path, e))
                })?;
                let categories: Vec<Category> = serde_json::from_str(&content)
                    .map_err(|e| BrowseError::Fetch(e.to_string()))?;
                Ok::<_, BrowseError>(categories)
            };
            fetch::load_category_tree(
                fetch_future,
                CancellationToken::new(),
                Some(config.fetch_timeout()),
            )
            .await
        }
        None => CategoryTree::empty(),
    };

    let tree = Arc::new(tree);
    match url {
        Some(url) => BrowseSession::from_url(tree, url),
        None => BrowseSession::new(tree),
    }
}

/// Interactive driver: one command per line, state summary after each
fn run_repl(mut session: BrowseSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("bazaar-browse REPL ('state' for a snapshot, 'quit' to exit)");
    print_status(&session);

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::from_string(line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match apply_command(&mut session, &command) {
            Ok(effect) => {
                if let Some(output) = effect.output {
                    println!("{}", output);
                }
                if effect.quit {
                    break;
                }
                if effect.changed {
                    print_status(&session);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}

fn print_status(session: &BrowseSession) {
    let snapshot = SessionSnapshot::from_session(session);
    println!(
        "path={} filters={} url={}",
        snapshot.path_display(),
        snapshot.active_filters,
        snapshot.url
    );
}
