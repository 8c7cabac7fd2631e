use crate::cli::ExportArgs;
use crate::error::Result;
use tracing::info;

pub fn run(args: ExportArgs) -> Result<()> {
    let session = super::open_session(&args.input)?;

    info!("Exporting {} solution(s) as CSV.", session.rows().len());
    session.export_csv(&args.output)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
