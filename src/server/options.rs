use std::path::PathBuf;

use clap::Parser;

/// Options for the demonstration text-protocol server.
///
/// This is deliberately a thin CLI surface: the interesting behavior lives
/// in the `Board` ADT, not in this binary.
#[derive(Clone, Debug, Parser)]
pub struct ServerOptions {
    /// Board file to load at startup (see the board-file grammar).
    /// Falls back to a small built-in demo board when omitted.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(short, long)]
    pub log_level: Option<String>,
}
