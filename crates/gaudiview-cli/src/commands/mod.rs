pub mod cluster;
pub mod export;
pub mod filter;
pub mod info;
pub mod merge;
pub mod sort;

use crate::error::{CliError, Result};
use gaudiview::engine::error::EngineError;
use gaudiview::workflows::session::Session;
use std::path::Path;
use tracing::info;

pub(crate) fn open_session(path: &Path) -> Result<Session> {
    info!("Loading results file from {:?}", path);
    Session::open(path).map_err(|e| match e {
        EngineError::Format(source) => CliError::FileParsing {
            path: path.to_path_buf(),
            source: source.into(),
        },
        other => CliError::Core(other),
    })
}
