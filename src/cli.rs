//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Export Telegram channel posts, chat messages and post comments to CSV
/// over a date range.
#[derive(Parser, Debug, Clone)]
#[command(name = "tgrab")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    tgrab auth
    tgrab channel --peer -1001271343429 --from 2025-11-01 --to 2025-12-01 --archive news.json
    tgrab chat --peer -1001240453727 --from 2025-11-01 --to 2025-11-02 --archive chat.json
    tgrab comments --peer -1001271343429 --post 158404 --archive discussion.json")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// One export run per invocation, or the session bootstrap.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate credentials and bootstrap the session artifact
    Auth {
        /// Directory the session artifact lives in
        #[arg(long, value_name = "DIR", default_value = ".")]
        session_dir: PathBuf,
    },

    /// Export channel posts over a date range
    Channel {
        #[command(flatten)]
        export: ExportArgs,

        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: String,

        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: String,
    },

    /// Export chat / megagroup messages over a date range
    Chat {
        #[command(flatten)]
        export: ExportArgs,

        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: String,

        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: String,
    },

    /// Export the comments under one channel post
    Comments {
        #[command(flatten)]
        export: ExportArgs,

        /// Post identifier within the channel
        #[arg(long, value_name = "ID")]
        post: u64,

        /// Optional start date, inclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,

        /// Optional end date, exclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
    },
}

/// Options shared by every export subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Numeric peer identifier, e.g. -1001271343429
    #[arg(long, value_name = "PEER", allow_hyphen_values = true)]
    pub peer: String,

    /// History archive to export from (Telegram Desktop JSON export)
    #[arg(long, value_name = "FILE")]
    pub archive: PathBuf,

    /// Output file path (defaults to the per-kind layout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// History page size
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub page_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_args_parse() {
        let args = Args::try_parse_from([
            "tgrab", "channel", "--peer", "-1001271343429", "--from", "2025-11-01", "--to",
            "2025-12-01", "--archive", "news.json",
        ])
        .unwrap();

        match args.command {
            Command::Channel { export, from, to } => {
                assert_eq!(export.peer, "-1001271343429");
                assert_eq!(from, "2025-11-01");
                assert_eq!(to, "2025-12-01");
                assert_eq!(export.page_size, 100);
                assert!(export.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_comments_range_optional() {
        let args = Args::try_parse_from([
            "tgrab",
            "comments",
            "--peer",
            "-1001271343429",
            "--post",
            "158404",
            "--archive",
            "discussion.json",
        ])
        .unwrap();

        match args.command {
            Command::Comments {
                post, from, to, ..
            } => {
                assert_eq!(post, 158404);
                assert!(from.is_none());
                assert!(to.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_channel_requires_range() {
        let result = Args::try_parse_from([
            "tgrab", "channel", "--peer", "-1", "--archive", "a.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_default_session_dir() {
        let args = Args::try_parse_from(["tgrab", "auth"]).unwrap();
        match args.command {
            Command::Auth { session_dir } => assert_eq!(session_dir, PathBuf::from(".")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
