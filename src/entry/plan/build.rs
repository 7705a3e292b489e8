use clap::ArgMatches;

use crate::args::{Command, PoolCommand, TradePerfArgs};
use crate::config::{RunSettings, apply_config, load_config};
use crate::error::AppResult;

use super::types::RunPlan;

/// Resolves the command line and config file into the action to run.
///
/// # Errors
///
/// Returns an error when the config file cannot be loaded or a merged value
/// is invalid.
pub(crate) fn build_plan(mut args: TradePerfArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    let command = args.command.take().unwrap_or(Command::Run);
    if let Command::ChedReference(ched) = command {
        return Ok(RunPlan::ChedReference(ched.notification_id));
    }

    let config = load_config(args.config.as_deref())?;
    if let Some(config) = config.as_ref() {
        apply_config(&mut args, matches, config)?;
    }
    let settings = Box::new(RunSettings::resolve(&args, config.as_ref())?);

    Ok(match command {
        Command::Pool(PoolCommand::Create) => RunPlan::PoolCreate(settings),
        Command::Pool(PoolCommand::Cleanup) => RunPlan::PoolCleanup(settings),
        Command::Run | Command::ChedReference(_) => RunPlan::LoadTest(settings),
    })
}
