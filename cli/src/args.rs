use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

/// How the statement's result is materialized before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub(crate) enum Shape {
    Rows,
    Row,
    Col,
    Val,
    Stream,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one statement through a sql-bricks pool")]
pub(crate) struct Args {
    /// `postgres://...`, `sqlite://path`, `sqlite::memory:` or a bare SQLite file path
    #[arg(long)]
    pub(crate) url: String,
    #[arg(long)]
    pub(crate) sql: String,
    #[arg(long, value_enum, default_value = "rows")]
    pub(crate) shape: Shape,
    /// Run the statement inside BEGIN/COMMIT
    #[arg(long)]
    pub(crate) transaction: bool,
    #[arg(long, default_value_t = 4)]
    pub(crate) pool_size: u32,
    #[arg(long, default_value_t = 16)]
    pub(crate) stream_capacity: usize,
    /// Also append log output to this file
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(long)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunConfig {
    pub(crate) url: String,
    pub(crate) sql: String,
    pub(crate) shape: Shape,
    pub(crate) transaction: bool,
    pub(crate) pool_size: u32,
    pub(crate) stream_capacity: usize,
    pub(crate) log: Option<PathBuf>,
    pub(crate) verbose: bool,
}

impl RunConfig {
    pub(crate) fn from_args(args: Args) -> Self {
        RunConfig {
            url: args.url,
            sql: args.sql,
            shape: args.shape,
            transaction: args.transaction,
            pool_size: args.pool_size.max(1),
            stream_capacity: args.stream_capacity.max(1),
            log: args.log,
            verbose: args.verbose,
        }
    }

    /// The URL with any password masked, for logging.
    pub(crate) fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                match credentials.split_once(':') {
                    Some((user, _)) => format!(
                        "{}{user}:***{}",
                        &self.url[..scheme_end + 3],
                        &self.url[at..]
                    ),
                    None => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}
