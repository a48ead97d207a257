use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::net::TcpStream;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use podtag::{
    DEFAULT_LIST_FILE, EpisodeOutcome, NoopReporter, ProgressEvent, ProgressReporter,
    ReqwestClient, RunConfig, RunMode, SharedProgressReporter, SyncOptions, sync_podcasts,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Host probed before a run to tell "offline" apart from "feed is down"
const CONNECTIVITY_PROBE: &str = "www.google.com:80";
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Download podcast episodes and tag them for your music player
#[derive(Parser, Debug)]
#[command(name = "podtag")]
#[command(about = "Download podcast episodes from RSS feeds and tag them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Record failed feeds and episodes and keep going instead of aborting
    #[arg(short = 'k', long, global = true)]
    keep_going: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Do not probe for network connectivity before starting
    #[arg(long, global = true)]
    skip_connectivity_check: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every episode of a single feed
    Download {
        /// RSS feed URL or path to a local RSS file
        url: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Download every podcast listed in a podcast list file
    DownloadAll {
        /// File with one `name:url` entry per line
        #[arg(short, long, default_value = DEFAULT_LIST_FILE)]
        file: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Library directory that receives one folder per podcast
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Download and tag episodes again even if they already exist
    #[arg(long)]
    overwrite: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let (mode, target) = match &self.command {
            Command::Download { url, target } => (RunMode::Single { url: url.clone() }, target),
            Command::DownloadAll { file, target } => (
                RunMode::Batch {
                    list_file: file.clone(),
                },
                target,
            ),
        };

        RunConfig {
            mode,
            output_root: target.output.clone(),
            overwrite: target.overwrite,
            continue_on_error: self.keep_going,
        }
    }
}

/// Progress reporter using indicatif for terminal output
///
/// The episode bar is sized once all feeds are loaded and advances by one
/// for every feed item, whether it was downloaded, skipped or failed.
struct IndicatifReporter {
    main_bar: ProgressBar,
    episodes_bar: ProgressBar,
    download_bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Result<Self> {
        let multi = MultiProgress::new();

        let main_bar = multi.add(ProgressBar::new_spinner());
        main_bar.set_style(ProgressStyle::default_bar().template("{spinner:.green} {wide_msg}")?);
        main_bar.enable_steady_tick(Duration::from_millis(100));

        let episodes_bar = multi.add(ProgressBar::new(0));
        episodes_bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "  {HEADPHONES}[{{bar:30.green/white}}] {{pos}}/{{len}} episodes {{elapsed}}"
                ))?
                .progress_chars("█▓░"),
        );

        let download_bar = multi.add(ProgressBar::new(0));
        download_bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "  {DOWNLOAD}[{{bar:30.cyan/blue}}] {{bytes}}/{{total_bytes}} {{wide_msg}}"
                ))?
                .progress_chars("█▓░"),
        );

        Ok(Self {
            main_bar,
            episodes_bar,
            download_bar,
        })
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { podcast, .. } => {
                self.main_bar
                    .set_message(format!("{SEARCH}Fetching feed: {}", podcast.cyan()));
            }

            ProgressEvent::SyncPlanReady {
                podcast_count,
                total_episodes,
            } => {
                self.episodes_bar.set_length(total_episodes as u64);
                self.main_bar.set_message(format!(
                    "{} podcasts, {} episodes",
                    podcast_count.to_string().cyan(),
                    total_episodes.to_string().cyan()
                ));
            }

            ProgressEvent::PodcastStarting {
                podcast_title,
                episode_count,
            } => {
                self.main_bar.set_message(format!(
                    "{HEADPHONES}{} • {} episodes",
                    podcast_title.bold().green(),
                    episode_count.to_string().cyan()
                ));
            }

            ProgressEvent::DownloadStarting {
                episode_title,
                content_length,
            } => {
                self.download_bar.set_length(content_length.unwrap_or(0));
                self.download_bar.set_position(0);
                self.download_bar
                    .set_message(truncate_title(&episode_title, 40));
            }

            ProgressEvent::DownloadProgress {
                bytes_downloaded,
                total_bytes,
                ..
            } => {
                if let Some(total) = total_bytes {
                    self.download_bar.set_length(total);
                }
                self.download_bar.set_position(bytes_downloaded);
            }

            ProgressEvent::DownloadCompleted {
                episode_title,
                bytes_downloaded,
            } => {
                self.download_bar.set_position(bytes_downloaded);
                self.download_bar.set_message(format!(
                    "{SUCCESS}{}",
                    truncate_title(&episode_title, 40).green()
                ));
            }

            ProgressEvent::EpisodeProcessed {
                episode_title,
                outcome,
                ..
            } => {
                if outcome == EpisodeOutcome::Failed {
                    self.episodes_bar.println(format!(
                        "  {FAILURE}{}",
                        truncate_title(&episode_title, 60).red()
                    ));
                }
                self.episodes_bar.inc(1);
            }

            ProgressEvent::SyncCompleted {
                downloaded_count,
                skipped_count,
                failed_count,
            } => {
                self.download_bar.finish_and_clear();
                self.episodes_bar.finish_and_clear();
                self.main_bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} downloaded, {} skipped, {} failed",
                    "Sync complete:".bold().green(),
                    downloaded_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

async fn network_reachable() -> bool {
    matches!(
        tokio::time::timeout(CONNECTIVITY_TIMEOUT, TcpStream::connect(CONNECTIVITY_PROBE)).await,
        Ok(Ok(_))
    )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "podtag=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.run_config();
    config.validate().context("Invalid configuration")?;
    let podcasts = config.podcasts().context("Failed to load podcasts")?;

    if !cli.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podtag".bold().magenta(),
            "- Podcast Downloader & Tagger".dimmed()
        );
    }

    if !cli.skip_connectivity_check && !network_reachable().await {
        eprintln!("{FAILURE}{}", "Network is unreachable".red().bold());
        std::process::exit(1);
    }

    let client = ReqwestClient::new().context("Failed to create HTTP client")?;

    let options = SyncOptions {
        overwrite: config.overwrite,
        continue_on_error: config.continue_on_error,
    };

    let reporter: SharedProgressReporter = if cli.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new()?)
    };

    let started = Instant::now();
    let summary = sync_podcasts(&client, &podcasts, &config.output_root, &options, reporter)
        .await
        .context("Failed to sync podcasts")?;

    print!("{}", summary.render_report(started.elapsed()));

    if !summary.failures().is_empty() {
        println!("\n{}", "Failures:".red().bold());
        for failure in summary.failures() {
            let subject = match &failure.episode {
                Some(episode) => format!("{} / {}", failure.podcast, episode),
                None => failure.podcast.clone(),
            };
            println!(
                "  {}{} - {}",
                CROSS,
                subject.yellow(),
                failure.error.dimmed()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_titles() {
        assert_eq!(truncate_title("Short", 10), "Short");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_title("Épisode numéro un", 10), "Épisode...");
    }

    #[test]
    fn download_all_defaults() {
        let cli = Cli::try_parse_from(["podtag", "download-all"]).unwrap();
        let config = cli.run_config();

        assert_eq!(
            config.mode,
            RunMode::Batch {
                list_file: PathBuf::from(DEFAULT_LIST_FILE)
            }
        );
        assert_eq!(config.output_root, PathBuf::from("."));
        assert!(!config.overwrite);
        assert!(!config.continue_on_error);
    }

    #[test]
    fn download_with_flags() {
        let cli = Cli::try_parse_from([
            "podtag",
            "download",
            "https://example.com/feed.xml",
            "--output",
            "/tmp/library",
            "--overwrite",
            "--keep-going",
        ])
        .unwrap();
        let config = cli.run_config();

        assert_eq!(
            config.mode,
            RunMode::Single {
                url: "https://example.com/feed.xml".to_string()
            }
        );
        assert_eq!(config.output_root, PathBuf::from("/tmp/library"));
        assert!(config.overwrite);
        assert!(config.continue_on_error);
    }
}
