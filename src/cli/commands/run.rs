//! Default command - run the pipeline.

use crate::cli::{Cli, Output};
use crate::config::{NoteMode, Settings};
use crate::orchestrator::{DiscoverRequest, Pipeline, RunPlan, RunReport};
use crate::store::TranscriptStore;
use anyhow::Result;

/// Build the run plan from flags and configuration.
pub fn plan_from_cli(cli: &Cli, settings: &Settings) -> RunPlan {
    let discover = cli.discover_prompt().map(|prompt| DiscoverRequest {
        prompt,
        count: cli.num.unwrap_or(settings.search.default_count),
        include: cli.include_text(),
        exclude: cli.exclude_text(),
    });

    let mut plan = RunPlan {
        discover,
        latest_channel: cli.latest.clone(),
        mode: cli.mode.unwrap_or(settings.notes.mode),
    };

    if cli.roast_channel {
        match &settings.notes.roast_channel_id {
            Some(channel_id) => {
                plan.latest_channel = Some(channel_id.clone());
                plan.mode = NoteMode::Roast;
            }
            None => Output::warning("--roast-channel needs ROAST_CHANNEL_ID; skipping the channel"),
        }
    }

    plan
}

/// Run the pipeline. Stage failures are reported, never turned into a failing exit.
pub async fn run_pipeline(cli: &Cli, settings: Settings) -> Result<()> {
    if cli.roast {
        if let Err(e) = TranscriptStore::new(settings.base_dir()).ensure_directories() {
            Output::error(&format!("Failed to create directories: {}", e));
            return Ok(());
        }
        println!("Roast mode enabled!");
        return Ok(());
    }

    let plan = plan_from_cli(cli, &settings);

    if let Some(request) = &plan.discover {
        Output::info(&format!("Discovering videos for: {}", request.prompt));
        Output::kv("Number of videos to add", &request.count.to_string());
        if let Some(include) = &request.include {
            Output::kv("Including text", include);
        }
        if let Some(exclude) = &request.exclude {
            Output::kv("Excluding text", exclude);
        }
    }

    let pipeline = match Pipeline::new(settings) {
        Ok(p) => p,
        Err(e) => {
            Output::error(&format!("Failed to set up pipeline: {}", e));
            return Ok(());
        }
    };

    // Logs share stderr with the spinner, so only spin when they're quiet
    let spinner = (cli.verbose == 0).then(|| Output::spinner("Running pipeline..."));
    let result = pipeline.run(&plan).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(report) => print_report(&report),
        Err(e) => Output::error(&format!("Pipeline failed: {}", e)),
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    if !report.added.is_empty() {
        Output::header("Added to playlist");
        for video_id in &report.added {
            Output::list_item(video_id);
        }
    }

    Output::header("Notes");
    for note in &report.notes.notes {
        Output::list_item(&note.display().to_string());
    }
    Output::kv("Transcripts ingested", &report.ingested.to_string());
    Output::kv("Notes written", &report.notes.processed.to_string());

    if report.notes.failed > 0 {
        Output::warning(&format!(
            "{} staged record(s) failed and stay unprocessed",
            report.notes.failed
        ));
    }

    Output::success("Done!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_plan_defaults_from_settings() {
        let mut settings = Settings::default();
        settings.search.default_count = 7;
        settings.notes.mode = NoteMode::Roast;

        let cli = Cli::parse_from(["tubenotes", "--discover", "zig", "comptime"]);
        let plan = plan_from_cli(&cli, &settings);

        assert_eq!(plan.mode, NoteMode::Roast);
        let request = plan.discover.unwrap();
        assert_eq!(request.prompt, "zig comptime");
        assert_eq!(request.count, 7);
        assert_eq!(plan.latest_channel, None);
    }

    #[test]
    fn test_roast_channel_plan() {
        let mut settings = Settings::default();
        settings.notes.roast_channel_id = Some("UCroast".to_string());

        let cli = Cli::parse_from(["tubenotes", "--roast-channel", "--num", "2"]);
        let plan = plan_from_cli(&cli, &settings);

        assert_eq!(plan.latest_channel.as_deref(), Some("UCroast"));
        assert_eq!(plan.mode, NoteMode::Roast);
        assert!(plan.discover.is_none());
    }

    #[tokio::test]
    async fn test_roast_flag_short_circuits() {
        let base = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.base_dir = base.path().display().to_string();

        let cli = Cli::parse_from(["tubenotes", "--roast", "--discover", "anything"]);
        tokio_test::assert_ok!(run_pipeline(&cli, settings).await);

        let unprocessed = base.path().join("experiments/youtube/transcripts/unprocessed");
        assert!(unprocessed.is_dir());
        assert_eq!(std::fs::read_dir(&unprocessed).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_roast_flag_reports_directory_failure() {
        let base = tempfile::tempdir().unwrap();
        let blocker = base.path().join("experiments");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut settings = Settings::default();
        settings.general.base_dir = base.path().display().to_string();

        let cli = Cli::parse_from(["tubenotes", "--roast"]);
        tokio_test::assert_ok!(run_pipeline(&cli, settings).await);
        assert!(blocker.is_file());
    }
}
