use crate::cli::{ConfigArgs, MergeArgs};
use crate::config::{ConfigOverrides, build_config};
use crate::error::{CliError, Result};
use gaudiview::engine::error::EngineError;
use tracing::info;

pub fn run(args: MergeArgs, config_args: &ConfigArgs) -> Result<()> {
    let config = build_config(config_args, &ConfigOverrides::default())?;

    let (first, rest) = args
        .inputs
        .split_first()
        .ok_or_else(|| CliError::Argument("merge needs at least one input file".to_string()))?;
    let mut session = super::open_session(first)?;

    for path in rest {
        info!("Merging {:?}", path);
        let added = session.merge_file(path).map_err(|e| match e {
            EngineError::Format(source) => CliError::FileParsing {
                path: path.clone(),
                source: source.into(),
            },
            other => CliError::Core(other),
        })?;
        println!("  + {} solution(s) from {}", added, path.display());
    }

    session.serialize(&args.output, &config.output)?;
    println!(
        "Merged {} file(s) into {} solution(s) and wrote {}",
        args.inputs.len(),
        session.rows().len(),
        args.output.display()
    );
    Ok(())
}
