//! Run a command with the environment this process has built up

use eyre::{Context, Result};
use std::process::Command;

/// Replace this process with `argv` (unix) or run it and mirror its exit code.
/// Does not return on success.
pub fn run(argv: &[String]) -> Result<()> {
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => eyre::bail!("No command given"),
    };

    log::info!("Running {} {}", program, args.join(" "));

    let mut command = Command::new(program);
    command.args(args);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // exec only returns on failure
        let err = command.exec();
        Err(err).context(format!("Failed to execute {}", program))
    }

    #[cfg(not(unix))]
    {
        let status = command.status().context(format!("Failed to execute {}", program))?;
        std::process::exit(status.code().unwrap_or(1));
    }
}
