use clap::Args;
use itertools::Itertools;
use miette::{miette, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use stdf4::{
    read::{ParseOptions, Stdf4Parser},
    types::RecordType,
};
use tracing::info;

use super::stdf_files;

#[derive(Args)]
pub struct DumpArgs {
    /// An input STDF file, or a directory to search for them
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Amount of per record logging, from 0 to 3
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    debug: u8,

    /// Stop after the first record of this kind, for example MIR
    #[arg(long, value_name = "KIND")]
    stop_after: Option<RecordType>,

    /// Count PLR, MPR and FTR records as ignored
    #[arg(long, default_value_t = false)]
    unregistered_as_ignored: bool,

    /// Sub-type of WRR records, use 10 for files that tag WRR like WIR
    #[arg(long, value_name = "SUBTYPE", default_value_t = 20)]
    wrr_subtype: u8,

    /// Print the decoded records as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let files = stdf_files(&self.file)?;
        let options = ParseOptions::builder()
            .debug_level(self.debug)
            .maybe_stop_after(self.stop_after)
            .unregistered_as_ignored(self.unregistered_as_ignored)
            .wrr_subtype(self.wrr_subtype)
            .build();

        let mut invalid = 0;
        for path in &files {
            info!("parsing {}", path.display());

            let mut parser = Stdf4Parser::new(options);
            if !parser.parse_file(path)? {
                invalid += 1;
            }

            if self.json {
                let out = serde_json::json!({
                    "file": path.display().to_string(),
                    "valid": parser.is_valid(),
                    "invalid_message": parser.invalid_message(),
                    "records_read": parser.records_read(),
                    "ignored": parser.ignored_type_counts(),
                    "records": parser.records(),
                });
                println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
            } else {
                self.print_summary(path, &parser);
            }
        }

        if invalid > 0 {
            return Err(miette!("{} of {} files are invalid", invalid, files.len()));
        }
        Ok(())
    }

    fn print_summary(&self, path: &std::path::Path, parser: &Stdf4Parser) {
        println!("{}", path.display().bold());

        for (name, count) in parser
            .records()
            .iter()
            .counts_by(|r| r.name())
            .into_iter()
            .sorted()
        {
            println!("  {:<4}{:>10}", name, count);
        }

        for (name, count) in parser.ignored_type_counts() {
            println!("  {:<4}{:>10} {}", name, count, "ignored".dimmed());
        }

        println!("  {} records read", parser.records_read());
        match parser.invalid_message() {
            None => println!("  {}", "valid".green()),
            Some(message) => println!("  {}: {}", "invalid".red(), message),
        }
    }
}
