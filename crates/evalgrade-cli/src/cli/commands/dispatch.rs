use super::super::args::*;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Evaluate(args) => super::evaluate::run(args).await,
        Command::EvaluateAll(args) => super::evaluate_all::run(args).await,
        Command::Agreement(args) => super::agreement::run(args),
        Command::ExpertScores(args) => super::expert::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
