//! Doctor command - report credentials, files and directories.

use crate::cli::{mask_secret, Output};
use crate::config::Settings;
use crate::store::TranscriptStore;
use console::style;
use std::path::Path;

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

/// Run all diagnostic checks. Only reports; never fails the process.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("tubenotes doctor");
    println!();

    let sections = [
        ("API Keys", check_api_keys(settings)),
        ("YouTube Access", check_youtube_access(settings)),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} problem(s) found. The affected stages will be skipped.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! tubenotes is ready to use.");
    }

    Ok(())
}

fn check_key(name: &str, value: Option<&str>, hint: &str) -> CheckResult {
    match value {
        Some(key) if !key.trim().is_empty() => {
            CheckResult::ok(name, &format!("configured ({})", mask_secret(key)))
        }
        _ => CheckResult::error(name, "not set", hint),
    }
}

fn check_api_keys(settings: &Settings) -> Vec<CheckResult> {
    vec![
        check_key(
            "EXA_API_KEY",
            settings.search.api_key.as_deref(),
            "Needed for --discover. Set with: export EXA_API_KEY='...'",
        ),
        check_key(
            "GROQ_API_KEY",
            settings.llm.api_key.as_deref(),
            "Needed for note generation. Set with: export GROQ_API_KEY='gsk_...'",
        ),
    ]
}

fn check_youtube_access(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(match &settings.youtube.playlist_id {
        Some(id) => CheckResult::ok("YOUTUBE_PLAYLIST_ID", id),
        None => CheckResult::error(
            "YOUTUBE_PLAYLIST_ID",
            "not set",
            "The playlist is the ingestion queue. Set with: export YOUTUBE_PLAYLIST_ID='PL...'",
        ),
    });

    let token = settings.token_path();
    let secrets = settings.client_secrets_path();
    if token.exists() {
        results.push(CheckResult::ok("OAuth token", &token.display().to_string()));
    } else if secrets.exists() {
        results.push(CheckResult::warning(
            "OAuth token",
            "not cached yet",
            "The first run opens the consent flow in your browser",
        ));
    } else if let Some(key) = &settings.youtube.api_key {
        results.push(CheckResult::warning(
            "YouTube auth",
            &format!("API key only ({})", mask_secret(key)),
            "Playlist inserts and removals need OAuth (client_secrets.json)",
        ));
    } else {
        results.push(CheckResult::error(
            "YouTube auth",
            "no token, client secrets or API key",
            &format!(
                "Download OAuth client secrets to {}",
                secrets.display()
            ),
        ));
    }

    results
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let store = TranscriptStore::new(settings.base_dir());
    let mut results = Vec::new();

    let unprocessed = store.unprocessed_dir();
    if unprocessed.is_dir() {
        let staged = store.list_unprocessed().map(|f| f.len()).unwrap_or(0);
        results.push(CheckResult::ok(
            "Staging",
            &format!("{} ({} record(s) waiting)", unprocessed.display(), staged),
        ));
    } else {
        results.push(CheckResult::warning(
            "Staging",
            &format!("{} (will be created)", unprocessed.display()),
            "Directories are created on the next run",
        ));
    }

    let output = settings.output_dir();
    if output.is_dir() {
        results.push(CheckResult::ok("Output", &output.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Output",
            &format!("{} (will be created)", output.display()),
            "Set OUTPUT_DIR or general.output_dir to change it",
        ));
    }

    results
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", config_path.display()),
        )
    }
}
