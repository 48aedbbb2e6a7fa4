pub mod check;
pub mod parse;
pub mod play;

use std::path::Path;

use advent_fiction::{ScenarioFile, Session, SessionConfig};

/// Load a scenario file and build a session from it.
fn load_session(path: &Path, config: SessionConfig) -> Result<Session, String> {
    let scenario = ScenarioFile::from_path(path).map_err(|e| format!("{}: {e}", path.display()))?;
    scenario
        .into_session(config)
        .map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a scenario without starting a session, for counting its contents.
fn load_scenario(path: &Path) -> Result<ScenarioFile, String> {
    ScenarioFile::from_path(path).map_err(|e| format!("{}: {e}", path.display()))
}
