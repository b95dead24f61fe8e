use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ytscribe_core::{
    PageClient, PlaylistRef, VideoRef,
    discovery::{self, DiscoverOptions},
    format::format_transcript,
    output, transcript, urls,
};

#[derive(Parser)]
#[command(name = "ytscribe")]
#[command(about = "Scrape YouTube channels and playlists and save caption transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Output directory root
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Seconds to wait between videos, to stay under rate limits
    #[arg(long, default_value_t = 1)]
    delay: u64,

    /// Prefix caption lines with [MM:SS] timestamps
    #[arg(long)]
    timestamps: bool,

    /// Retry through a headless browser when a page yields no results
    #[arg(long)]
    render: bool,

    /// Keep fetched pages in the cache dir for debugging
    #[arg(long)]
    dump_html: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Save the transcript of a single video
    Video { url: String },
    /// Save transcripts for every video in a playlist
    Playlist { url: String },
    /// Save transcripts for every video on a channel
    Channel { url: String },
    /// Save transcripts for every playlist on a channel
    ChannelPlaylists { url: String },
}

struct RunOptions {
    out: PathBuf,
    delay: Duration,
    timestamps: bool,
}

#[derive(Default)]
struct RunStats {
    saved: usize,
    failed: usize,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn dump_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("ytscribe")
        .join("pages")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = PageClient::new()?.with_dump_dir(cli.dump_html.then(dump_dir));
    let opts = DiscoverOptions { render: cli.render };
    let run = RunOptions {
        out: cli.out.clone(),
        delay: Duration::from_secs(cli.delay),
        timestamps: cli.timestamps,
    };

    println!(
        "\n{}  {}\n",
        style("ytscribe").cyan().bold(),
        style("Transcript Scraper").dim()
    );

    match &cli.command {
        Cmd::Video { url } => run_video(&client, url, &run).await,
        Cmd::Playlist { url } => run_playlist(&client, url, opts, &run).await,
        Cmd::Channel { url } => run_channel(&client, url, opts, &run).await,
        Cmd::ChannelPlaylists { url } => run_channel_playlists(&client, url, opts, &run).await,
    }
}

async fn run_video(client: &PageClient, url: &str, run: &RunOptions) -> Result<()> {
    let Some(id) = urls::video_id_from_input(url) else {
        bail!("not a YouTube video URL or id: {url}");
    };
    let video = VideoRef { id, title: None };

    let spinner = create_spinner("Fetching transcript...");
    let saved = save_video(client, &video, &run.out, run.timestamps).await?;
    match saved {
        Some(path) => spinner.finish_with_message(format!(
            "{} Transcript saved to {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        )),
        None => spinner.finish_with_message(format!(
            "{} No captions available for {}",
            style("✗").yellow().bold(),
            video.id
        )),
    }
    Ok(())
}

async fn run_playlist(
    client: &PageClient,
    url: &str,
    opts: DiscoverOptions,
    run: &RunOptions,
) -> Result<()> {
    let Some(id) = urls::playlist_id_from_url(url) else {
        bail!("could not extract a playlist id from: {url}");
    };
    let playlist = PlaylistRef { id, title: None };

    let spinner = create_spinner("Fetching playlist...");
    let name = discovery::display_name(client, &playlist.url())
        .await
        .unwrap_or_else(|| format!("Playlist_{}", playlist.id));
    let watch_url = url.contains("watch?v=").then_some(url);
    let videos = discovery::playlist_videos(client, &playlist, watch_url, opts).await?;
    spinner.finish_with_message(format!(
        "{} Found {} videos in {}",
        style("✓").green().bold(),
        videos.len(),
        style(&name).yellow()
    ));

    if videos.is_empty() {
        println!("No videos found. The playlist may be private, empty or region-locked.");
        return Ok(());
    }

    let dir = run.out.join(output::safe_filename(&name));
    let stats = run_videos(client, &videos, &dir, run).await;
    print_summary(&stats, &dir);
    Ok(())
}

async fn run_channel(
    client: &PageClient,
    url: &str,
    opts: DiscoverOptions,
    run: &RunOptions,
) -> Result<()> {
    let Some(base) = urls::channel_base_url(url) else {
        bail!("not a YouTube channel URL: {url}");
    };

    let spinner = create_spinner("Fetching channel videos...");
    let name = channel_name(client, url, &base).await;
    let videos = discovery::channel_videos(client, &base, opts).await?;
    spinner.finish_with_message(format!(
        "{} Found {} videos on {}",
        style("✓").green().bold(),
        videos.len(),
        style(&name).yellow()
    ));

    if videos.is_empty() {
        println!("No videos found on the channel page.");
        return Ok(());
    }

    let dir = run.out.join(output::safe_filename(&name));
    let stats = run_videos(client, &videos, &dir, run).await;
    print_summary(&stats, &dir);
    Ok(())
}

async fn run_channel_playlists(
    client: &PageClient,
    url: &str,
    opts: DiscoverOptions,
    run: &RunOptions,
) -> Result<()> {
    let Some(base) = urls::channel_base_url(url) else {
        bail!("not a YouTube channel URL: {url}");
    };

    let spinner = create_spinner("Fetching channel playlists...");
    let name = channel_name(client, url, &base).await;
    let playlists = discovery::channel_playlists(client, &base, opts).await?;
    spinner.finish_with_message(format!(
        "{} Found {} playlists on {}",
        style("✓").green().bold(),
        playlists.len(),
        style(&name).yellow()
    ));

    if playlists.is_empty() {
        println!("No playlists found on the channel page.");
        return Ok(());
    }

    let channel_dir = run.out.join(output::safe_filename(&name));
    let mut total = RunStats::default();

    for (i, playlist) in playlists.iter().enumerate() {
        let playlist_name = playlist
            .title
            .clone()
            .unwrap_or_else(|| format!("Playlist_{}", playlist.id));
        println!(
            "\n{} {} ({}/{})",
            style("Playlist:").bold(),
            style(&playlist_name).yellow(),
            i + 1,
            playlists.len()
        );

        let videos = match discovery::playlist_videos(client, playlist, None, opts).await {
            Ok(videos) => videos,
            Err(e) => {
                eprintln!("{} {}", style("✗").red().bold(), e);
                total.failed += 1;
                continue;
            }
        };
        if videos.is_empty() {
            println!("No videos found, skipping.");
            continue;
        }

        let dir = channel_dir.join(output::safe_filename(&playlist_name));
        let stats = run_videos(client, &videos, &dir, run).await;
        total.saved += stats.saved;
        total.failed += stats.failed;

        if i + 1 < playlists.len() {
            tokio::time::sleep(run.delay).await;
        }
    }

    print_summary(&total, &channel_dir);
    Ok(())
}

/// Channel name: from a `/@handle` URL when possible, otherwise scraped from
/// the channel page, otherwise a placeholder.
async fn channel_name(client: &PageClient, url: &str, base: &str) -> String {
    if let Some(handle) = urls::channel_handle(url) {
        return handle;
    }
    discovery::display_name(client, base)
        .await
        .unwrap_or_else(|| "Unknown_Channel".to_string())
}

async fn save_video(
    client: &PageClient,
    video: &VideoRef,
    dir: &Path,
    timestamps: bool,
) -> Result<Option<PathBuf>> {
    let title = match &video.title {
        Some(title) => title.clone(),
        None => client
            .video_title(&video.id)
            .await
            .unwrap_or_else(|| video.id.clone()),
    };

    let Some(found) = transcript::fetch_transcript(client, &video.id).await? else {
        return Ok(None);
    };

    let body = format_transcript(&found, timestamps);
    let path = output::write_transcript(dir, &title, &body).await?;
    Ok(Some(path))
}

/// Sequential download loop: one video at a time, a fixed delay in between,
/// any per-video failure is reported and skipped.
async fn run_videos(
    client: &PageClient,
    videos: &[VideoRef],
    dir: &Path,
    run: &RunOptions,
) -> RunStats {
    let mut stats = RunStats::default();
    let pb = ProgressBar::new(videos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    for (i, video) in videos.iter().enumerate() {
        pb.set_message(video.title.clone().unwrap_or_else(|| video.id.clone()));

        match save_video(client, video, dir, run.timestamps).await {
            Ok(Some(path)) => {
                stats.saved += 1;
                pb.println(format!(
                    "{} {}",
                    style("✓").green().bold(),
                    path.display()
                ));
            }
            Ok(None) => {
                stats.failed += 1;
                pb.println(format!(
                    "{} {} {}",
                    style("✗").yellow().bold(),
                    video.id,
                    style("(no captions)").dim()
                ));
            }
            Err(e) => {
                stats.failed += 1;
                pb.println(format!("{} {}: {}", style("✗").red().bold(), video.id, e));
            }
        }

        pb.inc(1);
        if i + 1 < videos.len() {
            tokio::time::sleep(run.delay).await;
        }
    }

    pb.finish_and_clear();
    stats
}

fn print_summary(stats: &RunStats, dir: &Path) {
    println!("\n{}", style("─".repeat(60)).dim());
    println!(
        "{} Saved: {}   Failed: {}",
        style("Done.").bold(),
        style(stats.saved).green(),
        style(stats.failed).red()
    );
    println!(
        "{} {}",
        style("Transcripts in:").dim(),
        style(dir.display()).cyan()
    );
}
