use super::super::args::ExpertScoresArgs;
use crate::exit_codes;
use anyhow::Context;
use evalgrade_core::expert::{CorrectnessTotals, ExpertScores};
use evalgrade_core::pipeline::batch::discover_cases;
use evalgrade_core::pipeline::{DATA_DICT_FILE, TRANSCRIPT_FILE};
use evalgrade_core::transcript::Transcript;

pub fn run(args: ExpertScoresArgs) -> anyhow::Result<i32> {
    let cases = discover_cases(&args.cases_dir)
        .with_context(|| format!("failed to list cases in {}", args.cases_dir.display()))?;

    let mut code = exit_codes::SUCCESS;
    for dir in cases {
        println!("Case: {}", dir.display());
        match Transcript::load(&dir.join(TRANSCRIPT_FILE)) {
            Ok(transcript) => print!("{}", ExpertScores::from_transcript(&transcript).render()),
            Err(e) => {
                eprintln!("error: {e}");
                code = exit_codes::CASE_FAILED;
                continue;
            }
        }
        let data_dict = dir.join(DATA_DICT_FILE);
        if data_dict.is_file() {
            match CorrectnessTotals::load(&data_dict) {
                Ok(totals) => print!("{}", totals.render()),
                Err(e) => {
                    eprintln!("error: {e}");
                    code = exit_codes::CASE_FAILED;
                }
            }
        }
        println!();
    }
    Ok(code)
}
