use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::{io::Cursor, path::PathBuf, time::Instant};
use stdf4::read::{parse, ParseOptions};
use tracing::{info, warn};

use super::stdf_files;

#[derive(Args)]
pub struct TimeArgs {
    /// An input STDF file, or a directory to search for them
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Keep the decoded records instead of dropping them
    #[arg(long, default_value_t = false)]
    keep_records: bool,
}

impl TimeArgs {
    pub fn handle(&self) -> Result<()> {
        let options = ParseOptions::builder()
            .discard_records(!self.keep_records)
            .build();

        for path in stdf_files(&self.file)? {
            let start = Instant::now();
            let bytes = std::fs::read(&path)
                .into_diagnostic()
                .context(format!("reading {}", path.display()))?;
            let read = start.elapsed();

            let start = Instant::now();
            let outcome = parse(Cursor::new(&bytes), options);
            let parsed = start.elapsed();

            if !outcome.is_valid {
                warn!(
                    "{} is invalid: {}",
                    path.display(),
                    outcome.invalid_message.as_deref().unwrap_or_default()
                );
            }

            let seconds = parsed.as_secs_f64();
            let throughput = if seconds > 0.0 {
                bytes.len() as f64 / seconds / (1024.0 * 1024.0)
            } else {
                0.0
            };
            info!("{} records in {}", outcome.records_read, path.display());
            println!(
                "{}: read {:?}, parsed {:?} ({:.1} MiB/s)",
                path.display().bold(),
                read.cyan(),
                parsed.green(),
                throughput
            );
        }

        Ok(())
    }
}
