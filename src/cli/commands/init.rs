//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::{Settings, DEEPGRAM_API_KEY_ENV, OPENAI_API_KEY_ENV};
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("voxnote setup");
    println!();

    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let missing = missing_keys(settings);
    if missing.is_empty() {
        Output::success("Deepgram and OpenAI API keys are configured!");
    } else {
        for name in &missing {
            Output::warning(&format!("{} is not set.", name));
        }
        println!();
        println!("  Deepgram transcribes uploaded chunks; OpenAI writes summaries and translations.");
        println!("  Set the keys in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        for name in &missing {
            println!("  {}", style(format!("export {}='...'", name)).green());
        }
        println!();

        if !prompt_continue("Continue without these keys?")? {
            println!();
            Output::info("Setup cancelled. Set your API keys and run 'voxnote init' again.");
            return Ok(());
        }
    }

    println!();

    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    ensure_dir(&settings.data_dir(), "data directory")?;
    if let Some(parent) = settings.sqlite_path().parent() {
        ensure_dir(parent, "database directory")?;
    }

    println!();

    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("voxnote config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("voxnote doctor").cyan());
    println!("  {} Start the HTTP server", style("voxnote serve").cyan());
    println!("  {} Browse recorded sessions", style("voxnote list").cyan());
    println!();
    println!("For more help: {}", style("voxnote --help").cyan());

    Ok(())
}

fn missing_keys(settings: &Settings) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if settings.transcription.resolve_api_key().is_none() {
        missing.push(DEEPGRAM_API_KEY_ENV);
    }
    let openai = settings
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
        .filter(|k| !k.trim().is_empty());
    if openai.is_none() {
        missing.push(OPENAI_API_KEY_ENV);
    }
    missing
}

fn ensure_dir(path: &Path, label: &str) -> io::Result<()> {
    if path.exists() {
        Output::info(&format!("{} exists: {}", capitalize(label), path.display()));
    } else {
        std::fs::create_dir_all(path)?;
        Output::success(&format!("Created {}: {}", label, path.display()));
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
