use super::super::args::{AgreementArgs, OutputFormat};
use crate::exit_codes;
use anyhow::Context;
use evalgrade_core::agreement::{analyze, render::render_report};

pub fn run(args: AgreementArgs) -> anyhow::Result<i32> {
    let report = analyze(&args.base_folder)
        .with_context(|| format!("failed to scan {}", args.base_folder.display()))?;

    match args.format {
        OutputFormat::Text => print!("{}", render_report(&report, args.per_case)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(exit_codes::SUCCESS)
}
