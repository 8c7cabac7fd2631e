use crate::cli::{ClusterArgs, ConfigArgs, DirectionFlags};
use crate::config::{ConfigOverrides, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use gaudiview::engine::config::Direction;
use gaudiview::engine::progress::{CancellationToken, ProgressReporter};
use gaudiview::workflows::session::{ClusterOutcome, ClusterReport};
use tracing::{info, warn};

fn direction_override(flags: DirectionFlags) -> Option<Direction> {
    match (flags.maximize, flags.minimize) {
        (true, false) => Some(Direction::Maximize),
        (false, true) => Some(Direction::Minimize),
        _ => None,
    }
}

pub fn run(args: ClusterArgs, config_args: &ConfigArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        objective: args.objective.clone(),
        direction: direction_override(args.direction),
        rmsd_cutoff: args.cutoff,
        reduction: args.reduction,
        tolerance: None,
    };
    let config = build_config(config_args, &overrides)?;

    let mut session = super::open_session(&args.input)?;
    let first_objective = session.objectives().first().map(|o| o.name.clone());
    let clustering = config.clustering.resolve(first_objective.as_deref())?;
    info!(
        objective = %clustering.objective,
        direction = %clustering.direction,
        cutoff = clustering.rmsd_cutoff,
        reduction = %clustering.reduction,
        "Resolved clustering parameters."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());
    let cancel = CancellationToken::new();

    println!(
        "Clustering {} solution(s) by '{}' ({}, cutoff {} Å)...",
        session.rows().len(),
        clustering.objective,
        clustering.direction,
        clustering.rmsd_cutoff
    );

    match session.cluster(&clustering, &reporter, &cancel)? {
        ClusterOutcome::Committed(report) => {
            print!("{}", render_report(&report));
            session.serialize(&args.output, &config.output)?;
            println!("Wrote {}", args.output.display());
        }
        ClusterOutcome::Cancelled => {
            warn!("Clustering was cancelled; nothing was written.");
            println!("Clustering cancelled; {} was not written.", args.output.display());
        }
    }
    Ok(())
}

fn render_report(report: &ClusterReport) -> String {
    let mut out = format!(
        "Found {} cluster(s). Representatives: {}\n",
        report.cluster_count,
        report.representatives.join(", ")
    );
    if !report.skipped.is_empty() {
        out.push_str(&format!(
            "{} solution(s) had no usable structures and stand alone:\n",
            report.skipped.len()
        ));
        for skipped in &report.skipped {
            out.push_str(&format!("  - {}: {}\n", skipped.key, skipped.reason));
        }
    }
    out
}
