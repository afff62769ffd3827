//! capsearch-rs CLI application
//!
//! Command-line interface for the capsearch-rs library.

use anyhow::Result;
use capsearch_rs::utils::format_timestamp_ms;
use capsearch_rs::{
    IngestConfig, QueryEngine, ReferencePolicy, SearchConfig, Store, ingest,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "capsearch-rs")]
#[command(about = "Ranked full-text caption search and autocomplete over video transcripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register videos from a JSON metadata file
    IngestVideos {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,

        /// JSON file with an array of {"id", "title"} records
        videos: PathBuf,
    },

    /// Ingest one video's timed-text caption track
    IngestCaptions {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,

        /// Id of the video the track belongs to
        #[arg(short, long)]
        video_id: String,

        /// Timed-text markup file
        track: PathBuf,

        /// Fail instead of tolerating a video id with no video record
        #[arg(long)]
        strict_refs: bool,
    },

    /// Search captions
    Search {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,

        /// Search query (FTS5 syntax)
        query: String,
    },

    /// Show autocomplete suggestions for a prefix
    Autocomplete {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,

        /// Query prefix
        prefix: String,
    },

    /// Rebuild the full-text index from stored captions
    RebuildIndex {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,
    },

    /// Serve the HTTP query API
    Serve {
        /// Caption database file
        #[arg(short, long, default_value = "captions.db")]
        db: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::IngestVideos { db, videos } => {
            ingest_videos_command(db, videos)?;
        }
        Commands::IngestCaptions {
            db,
            video_id,
            track,
            strict_refs,
        } => {
            ingest_captions_command(db, video_id, track, strict_refs)?;
        }
        Commands::Search { db, query } => {
            search_command(db, query)?;
        }
        Commands::Autocomplete { db, prefix } => {
            autocomplete_command(db, prefix)?;
        }
        Commands::RebuildIndex { db } => {
            rebuild_index_command(db)?;
        }
        Commands::Serve { db, port } => {
            serve_command(db, port).await?;
        }
    }

    Ok(())
}

fn ingest_videos_command(db: PathBuf, videos: PathBuf) -> Result<()> {
    println!("📥 Ingesting videos from {}", videos.display());

    let store = Store::open(&db)?;
    let records = ingest::load_video_records(&videos)?;
    let report = ingest::ingest_videos(&store, &records)?;

    println!("✅ Ingestion complete!");
    println!("   📺 Videos added: {}", report.videos_added);
    if report.videos_skipped > 0 {
        println!("   ⏭️  Duplicates skipped: {}", report.videos_skipped);
    }
    Ok(())
}

fn ingest_captions_command(
    db: PathBuf,
    video_id: String,
    track: PathBuf,
    strict_refs: bool,
) -> Result<()> {
    println!("📥 Ingesting caption track {} for video {}", track.display(), video_id);

    let config = IngestConfig {
        reference_policy: if strict_refs {
            ReferencePolicy::Enforce
        } else {
            ReferencePolicy::Tolerate
        },
    };
    let store = Store::open_with(&db, config)?;

    let markup = std::fs::read_to_string(&track)?;
    let cues = ingest::parse_timedtext(&markup)?;
    let report = ingest::ingest_captions(&store, &video_id, cues)?;

    println!("✅ Ingestion complete!");
    println!("   💬 Segments added: {}", report.segments_added);
    if report.segments_rejected > 0 {
        println!("   🚫 Segments rejected: {}", report.segments_rejected);
    }
    Ok(())
}

fn search_command(db: PathBuf, query: String) -> Result<()> {
    println!("🔍 Searching for: \"{}\"", query);

    let store = Store::open(&db)?;
    let engine = QueryEngine::new(store);

    let results = match engine.search(&query) {
        Ok(results) => results,
        Err(capsearch_rs::CapsearchError::InvalidQuery(_)) => {
            println!("❌ Unparseable query");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if results.is_empty() {
        println!("❌ No results found");
        return Ok(());
    }

    println!("📋 Found {} results:", results.len());
    println!();

    for (i, result) in results.iter().enumerate() {
        let title = result.video_title.as_deref().unwrap_or("(unknown video)");
        println!(
            "{}. {} [{} @ {}–{}]",
            i + 1,
            title,
            result.video_id,
            format_timestamp_ms(result.start),
            format_timestamp_ms(result.end),
        );
        println!("   {}", result.text);
        println!();
    }

    Ok(())
}

fn autocomplete_command(db: PathBuf, prefix: String) -> Result<()> {
    let store = Store::open(&db)?;
    let engine = QueryEngine::new(store);

    let suggestions = match engine.autocomplete(&prefix) {
        Ok(suggestions) => suggestions,
        Err(capsearch_rs::CapsearchError::InvalidQuery(_)) => {
            println!("❌ Unparseable prefix");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if suggestions.is_empty() {
        println!("❌ No suggestions");
        return Ok(());
    }

    for suggestion in suggestions {
        println!("{}", suggestion);
    }
    Ok(())
}

fn rebuild_index_command(db: PathBuf) -> Result<()> {
    println!("🔧 Rebuilding caption index...");

    let store = Store::open(&db)?;
    let written = store.rebuild_index()?;

    println!("✅ Rebuilt index with {} entries", written);
    Ok(())
}

async fn serve_command(db: PathBuf, port: u16) -> Result<()> {
    let store = Arc::new(Store::open(&db)?);
    let stats = store.stats()?;
    println!(
        "🚀 Serving {} captions across {} videos",
        stats.caption_count, stats.video_count
    );
    println!("🌐 http://localhost:{}/search?q=", port);

    capsearch_rs::server::serve(store, SearchConfig::default(), port).await?;
    Ok(())
}
