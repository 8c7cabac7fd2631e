use crate::cli::{ConfigArgs, FilterArgs};
use crate::config::{ConfigOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::parser;
use tracing::{info, warn};

pub fn run(args: FilterArgs, config_args: &ConfigArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        tolerance: args.tolerance,
        ..Default::default()
    };
    let config = build_config(config_args, &overrides)?;

    let spec = parser::parse_filter(&args.expression)
        .map_err(|e| CliError::Argument(format!("'{}': {}", args.expression, e)))?;

    let mut session = super::open_session(&args.input)?;
    let before = session.rows().len();

    info!(expression = %args.expression, "Filtering solutions.");
    let kept = session.filter(&spec, &config.filter)?;
    if kept == 0 {
        warn!("No solution matched the filter expression.");
    }

    session.serialize(&args.output, &config.output)?;
    println!(
        "Kept {} of {} solution(s) and wrote {}",
        kept,
        before,
        args.output.display()
    );
    Ok(())
}
