//! Doctor command - verify API keys, directories and configuration.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::{Settings, StoreProvider, DEEPGRAM_API_KEY_ENV, OPENAI_API_KEY_ENV};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("voxnote doctor");
    println!();
    println!("Checking API keys and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    let key_checks = vec![
        check_api_key(
            DEEPGRAM_API_KEY_ENV,
            settings.transcription.resolve_api_key(),
            "Chunks will not be transcribed. Set with: export DEEPGRAM_API_KEY='...'",
        ),
        check_api_key(
            OPENAI_API_KEY_ENV,
            settings
                .llm
                .api_key
                .clone()
                .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok()),
            "Summaries and translations will fail. Set with: export OPENAI_API_KEY='sk-...'",
        ),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Storage").bold());
    let dir_checks = check_storage(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_prompts_dir(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running the server.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! voxnote is ready to serve.");
    }

    Ok(())
}

/// A missing key degrades the service but does not stop it from starting.
fn check_api_key(name: &str, key: Option<String>, hint: &str) -> CheckResult {
    match key.map(|k| k.trim().to_string()) {
        Some(key) if key.len() > 12 => {
            CheckResult::ok(name, &format!("configured ({})", mask_key(&key)))
        }
        Some(key) if !key.is_empty() => CheckResult::warning(
            name,
            "set but looks too short",
            "Double-check the key in your environment or config file",
        ),
        _ => CheckResult::warning(name, "not set", hint),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.is_dir() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else if data_dir.exists() {
        results.push(CheckResult::error(
            "Data directory",
            &format!("{} is not a directory", data_dir.display()),
            "Point general.data_dir at a directory",
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Run 'voxnote init' to create it now",
        ));
    }

    match settings.store.provider {
        StoreProvider::Memory => results.push(CheckResult::warning(
            "Session store",
            "in-memory",
            "Sessions are lost on restart. Set store.provider = \"sqlite\" to persist them",
        )),
        StoreProvider::Sqlite => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Session store",
                    &format!("sqlite {} ({})", db_path.display(), size),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Session store",
                    &format!("sqlite {} (not created yet)", db_path.display()),
                    "Database will be created when the server starts",
                ));
            }
        }
    }

    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: voxnote init (or voxnote config edit)",
        );
    }

    match Settings::load_from(Some(&config_path)) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error(
            "Config file",
            &format!("{} is invalid: {}", config_path.display(), e),
            "Fix the file or remove it to fall back to defaults",
        ),
    }
}

fn check_prompts_dir(settings: &Settings) -> CheckResult {
    match &settings.prompts.custom_dir {
        None => CheckResult::ok("Prompts", "built-in templates"),
        Some(dir) => {
            let path = Settings::expand_path(dir);
            if path.is_dir() {
                CheckResult::ok("Prompts", &format!("custom templates in {}", path.display()))
            } else {
                CheckResult::warning(
                    "Prompts",
                    &format!("{} not found, using built-in templates", path.display()),
                    "Create the directory with summary.toml / translation.toml overrides",
                )
            }
        }
    }
}
