mod plan;

use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::TradePerfArgs;
use crate::error::AppResult;
use plan::{build_plan, execute_plan};

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, &matches))
}

fn parse_args() -> AppResult<(TradePerfArgs, ArgMatches)> {
    let cmd = TradePerfArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    let matches = cmd.get_matches_from(raw_args);
    let args = TradePerfArgs::from_arg_matches(&matches)?;

    Ok((args, matches))
}

async fn run_async(args: TradePerfArgs, matches: &ArgMatches) -> AppResult<()> {
    let plan = build_plan(args, matches)?;
    execute_plan(plan).await
}
