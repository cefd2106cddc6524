// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small CLI used as the target of the workspace specs.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clinch-fixture", version, about = "Target CLI for clinch specs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the arguments joined by spaces
    Echo { words: Vec<String> },
    /// Print a message to stderr
    Warn { message: String },
    /// Exit with the given code
    Fail {
        #[arg(default_value_t = 1)]
        code: u8,
    },
    /// Print a JSON document describing the invocation
    Json {
        #[arg(long)]
        name: Option<String>,
    },
    /// Sleep, printing a line before and after
    Sleep { ms: u64 },
    /// Print an environment variable
    Env { var: String },
    /// Print the working directory
    Pwd,
    /// Print a numbered line many times to both streams
    Flood { lines: usize },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Command::Echo { words } => writeln!(stdout, "{}", words.join(" ")),
        Command::Warn { message } => writeln!(std::io::stderr(), "warning: {}", message),
        Command::Fail { code } => {
            eprintln!("failing with exit code {}", code);
            return ExitCode::from(code);
        }
        Command::Json { name } => {
            let doc = serde_json::json!({
                "name": name.unwrap_or_else(|| "clinch".to_string()),
                "version": env!("CARGO_PKG_VERSION"),
                "ok": true,
            });
            writeln!(stdout, "{}", doc)
        }
        Command::Sleep { ms } => {
            let _ = writeln!(stdout, "sleeping {}ms", ms);
            let _ = stdout.flush();
            std::thread::sleep(std::time::Duration::from_millis(ms));
            writeln!(stdout, "awake")
        }
        Command::Env { var } => match std::env::var(&var) {
            Ok(value) => writeln!(stdout, "{}", value),
            Err(_) => {
                eprintln!("{} is not set", var);
                return ExitCode::from(3);
            }
        },
        Command::Pwd => match std::env::current_dir() {
            Ok(dir) => writeln!(stdout, "{}", dir.display()),
            Err(e) => {
                eprintln!("pwd: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Command::Flood { lines } => (0..lines).try_for_each(|i| {
            writeln!(std::io::stderr(), "err {}", i)?;
            writeln!(stdout, "out {}", i)
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("write failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
