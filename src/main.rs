//! # tgrab CLI
//!
//! Command-line interface for the tgrab library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;

use tgrab::archive::ArchiveClient;
use tgrab::cli::{Args, Command, ExportArgs};
use tgrab::pipeline::{ExportConfig, run_export};
use tgrab::range::DateRange;
use tgrab::session::{Credentials, SessionFile};
use tgrab::target::{Target, parse_peer};
use tgrab::TgrabError;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), TgrabError> {
    let args = <Args as ClapParser>::parse();

    match args.command {
        Command::Auth { session_dir } => auth(&session_dir),
        Command::Channel { export, from, to } => {
            let peer = parse_peer(&export.peer)?;
            let range = DateRange::parse(&from, &to)?;
            export_target(
                Target::Channel { peer },
                Some(range),
                Some((from, to)),
                &export,
            )
        }
        Command::Chat { export, from, to } => {
            let peer = parse_peer(&export.peer)?;
            let range = DateRange::parse(&from, &to)?;
            export_target(Target::Chat { peer }, Some(range), Some((from, to)), &export)
        }
        Command::Comments {
            export,
            post,
            from,
            to,
        } => {
            let peer = parse_peer(&export.peer)?;
            let (range, bounds) = match (from, to) {
                (Some(from), Some(to)) => {
                    (Some(DateRange::parse(&from, &to)?), Some((from, to)))
                }
                (None, None) => (None, None),
                _ => {
                    return Err(TgrabError::config(
                        "--from and --to must be given together",
                    ));
                }
            };
            export_target(
                Target::Post { peer, post_id: post },
                range,
                bounds,
                &export,
            )
        }
    }
}

/// Session bootstrap: validate credentials, create or reuse the artifact.
fn auth(session_dir: &Path) -> Result<(), TgrabError> {
    let creds = Credentials::from_env()?;
    let path = creds.session_path(session_dir);

    let mut session = SessionFile::load_or_create(&path, &creds)?;
    let fresh = !session.authorized;
    session.authorize();
    session.save(&path)?;

    println!("🔐 tgrab auth");
    println!("   Session:  {}", creds.session);
    println!("   Api id:   {}", creds.api_id);
    if fresh {
        println!("[✓] Session artifact created: {}", path.display());
    } else {
        println!("[✓] Session artifact reused: {}", path.display());
    }
    Ok(())
}

fn export_target(
    target: Target,
    range: Option<DateRange>,
    bounds: Option<(String, String)>,
    export: &ExportArgs,
) -> Result<(), TgrabError> {
    let start = Instant::now();

    let mut config = ExportConfig::new(target).with_page_size(export.page_size);
    if let Some(range) = range {
        config = config.with_range(range);
    }
    if let Some(output) = &export.output {
        config = config.with_output(output.clone());
    }

    println!("📦 tgrab v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📖 Target:  {}", target);
    println!("📂 Archive: {}", export.archive.display());
    println!("💾 Output:  {}", config.output_path().display());
    if let Some((from, to)) = &bounds {
        println!("📅 Range:   {} .. {}", from, to);
    }
    println!();

    let mut client = ArchiveClient::open(&export.archive)?;
    let stats = run_export(&mut client, &config)?;

    let elapsed = start.elapsed();
    println!(
        "✅ Done! {} ({} rows, {} pages, {:.2}s)",
        stats.title,
        stats.written,
        stats.pages,
        elapsed.as_secs_f64()
    );
    println!("   Saved to {}", stats.output.display());

    Ok(())
}
