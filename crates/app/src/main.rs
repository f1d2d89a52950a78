use std::io::Write;

use tedai::settings::SettingsStore;
use tedai::shell::{Shell, THINKING_INDICATOR, parse_command};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Runs the campus assistant as a stdin line loop.
///
/// The first view is the chat; without an api key it shows a configuration
/// error while the schedule, events, and tracker views stay available.
#[tokio::main]
async fn main() {
    // Logs go to stderr so they never interleave with view output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = SettingsStore::load();
    tracing::info!(path = ?store.config_path(), "settings loaded");

    let mut shell = Shell::new(store);
    print_lines(&shell.render_view().await);
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        if let Err(error) = std::io::stdout().flush() {
            tracing::warn!(error = %error, "failed to flush prompt");
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!(error = %error, "failed to read stdin");
                break;
            }
        };

        let command = parse_command(&line);
        if shell.submits(&command) {
            println!("{THINKING_INDICATOR}");
        }

        let reply = shell.handle(command).await;
        print_lines(&reply.lines);
        if reply.quit {
            break;
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
