//! Runs one analysis cycle for a local photo: analyze, then auto-save to a running server.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use fashion_king::{
    credential::{resolve_api_key, CredentialStore},
    entities::{
        roster::Roster,
        session::{AnalysisState, AutoSaveReport},
        submission::ImageSubmission,
    },
    genai::gemini::GeminiClient,
    imaging::{card::CardOptions, crop::CropOptions},
    repositories::result_sink::HttpResultSink,
    settings::{AppConfig, AppEnvironment},
    telemetry::init_tracing,
    use_cases::{critique::CritiqueHandler, session::AnalysisSession},
};

const DEFAULT_CREDENTIAL_FILE: &str = ".fashion_king_credential";

#[derive(Parser)]
#[command(name = "critique", version, about = "Fashion King critique CLI")]
struct CliArgs {
    /// Photo to analyze
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Display name; results are saved only for roster members
    #[arg(short, long, default_value = "")]
    user: String,

    /// Server receiving the automatic uploads
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Skip the automatic uploads
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Also generate the nodding video
    #[arg(long, default_value_t = false)]
    video: bool,

    /// Where to write the generated video
    #[arg(long, default_value = "fashion_king.mp4")]
    video_out: PathBuf,

    /// Store an API key in the local credential file and exit (empty clears it)
    #[arg(long)]
    store_key: Option<String>,
}

fn save_summary(report: &AutoSaveReport, no_save: bool, roster: &Roster) -> String {
    if no_save {
        return "Results not saved (--no-save).".to_string();
    }
    if report.skipped {
        return format!(
            "Results not saved (name not on the roster). Known names: {}",
            roster.sorted_names().join(", ")
        );
    }
    format!(
        "Saved: score={} portrait={} card={}",
        report.score_saved, report.portrait_saved, report.result_saved
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_tracing(&AppEnvironment::from_env().unwrap_or(AppEnvironment::Development));
    let config = AppConfig::new().context("Failed to load configuration")?;

    let credential_store = CredentialStore::new(
        config.gemini.credential_file.as_deref().unwrap_or(DEFAULT_CREDENTIAL_FILE),
    );

    if let Some(key) = args.store_key.as_deref() {
        credential_store.save(key)?;
        if key.trim().is_empty() {
            println!("Stored credential cleared.");
        } else {
            println!("Credential stored at {}.", credential_store.path().display());
        }
        return Ok(());
    }

    let Some(image_path) = args.image.as_ref() else {
        bail!("--image is required");
    };

    let bytes = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read {}", image_path.display()))?;
    let file_name = image_path.file_name().map(|n| n.to_string_lossy().into_owned());
    let submission = ImageSubmission::from_bytes(bytes, None, file_name)?;

    let api_key = resolve_api_key(&config.gemini.api_key, Some(&credential_store));
    let client = GeminiClient::new(&config.gemini, api_key)?;
    let critique = CritiqueHandler::new(
        client,
        config.gemini.video_models.clone(),
        std::time::Duration::from_secs(config.gemini.poll_interval_secs),
    );

    let mut session = AnalysisSession::new(
        critique,
        HttpResultSink::new(&args.server)?,
        config.roster.clone(),
        CropOptions::from(&config.imaging),
        CardOptions::from(&config.imaging),
    );
    if !args.no_save {
        session.set_user_name(&args.user);
    }
    session.select_image(submission);

    match session.start().await {
        AnalysisState::Success(result) => {
            println!("Total score: {:.0}", result.total_score);
            for (label, score) in result.details_as_list() {
                println!("  {:<12} {:.0}", label, score);
            }
            println!("\n{}\n\n{}\n\n\"{}\"", result.gentle_critique, result.sincere_critique, result.one_liner);
        }
        AnalysisState::Error(message) => bail!("{}", message),
        other => bail!("Unexpected session state: {:?}", other),
    }

    if let Some(report) = session.last_save() {
        println!("\n{}", save_summary(report, args.no_save, &config.roster));
    }

    if args.video {
        println!("Generating video, this can take a few minutes...");
        let video = session.generate_video().await?;
        tokio::fs::write(&args.video_out, &video)
            .await
            .with_context(|| format!("Failed to write {}", args.video_out.display()))?;
        println!("Video written to {}", args.video_out.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fashion_king::entities::roster::RosterEntry;

    fn roster() -> Roster {
        Roster::new(vec![
            RosterEntry { name: "Park".into(), id: 2 },
            RosterEntry { name: "Ahn".into(), id: 1 },
        ])
    }

    fn skipped() -> AutoSaveReport {
        AutoSaveReport { skipped: true, score_saved: false, portrait_saved: false, result_saved: false }
    }

    #[test]
    fn disabled_saving_is_reported_as_such() {
        let summary = save_summary(&skipped(), true, &roster());
        assert_eq!(summary, "Results not saved (--no-save).");
    }

    #[test]
    fn unknown_name_lists_the_roster() {
        let summary = save_summary(&skipped(), false, &roster());
        assert!(summary.contains("not on the roster"));
        assert!(summary.ends_with("Known names: Ahn, Park"));
    }

    #[test]
    fn saved_parts_are_listed() {
        let report = AutoSaveReport { skipped: false, score_saved: true, portrait_saved: true, result_saved: false };
        assert_eq!(save_summary(&report, false, &roster()), "Saved: score=true portrait=true card=false");
    }
}
