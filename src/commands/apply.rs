use eyre::Result;

use super::{exec, report};
use crate::config::Config;

pub fn run(command: &[String], quiet: bool, config: &Config) -> Result<()> {
    let store = config.store();
    let outcome = store.apply();

    report::print(&report::apply_notes(&outcome, store.path()), quiet || !command.is_empty());

    if command.is_empty() {
        return Ok(());
    }
    exec::run(command)
}
