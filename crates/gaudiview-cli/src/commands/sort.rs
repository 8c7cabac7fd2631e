use crate::cli::{ConfigArgs, SortArgs};
use crate::config::{ConfigOverrides, build_config};
use crate::error::Result;
use tracing::info;

pub fn run(args: SortArgs, config_args: &ConfigArgs) -> Result<()> {
    let config = build_config(config_args, &ConfigOverrides::default())?;
    let mut session = super::open_session(&args.input)?;

    let column = session.sort_column(&args.by)?;
    info!(column = %args.by, descending = args.descending, "Sorting solutions.");
    session.sort(column, !args.descending)?;

    session.serialize(&args.output, &config.output)?;
    println!(
        "Sorted {} solution(s) by '{}' and wrote {}",
        session.rows().len(),
        args.by,
        args.output.display()
    );
    Ok(())
}
