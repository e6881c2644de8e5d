use anyhow::{Result, bail};
use std::io::{self, IsTerminal, Write};

/// Whether both stdin and stderr are attached to a terminal.
pub fn is_interactive() -> bool {
  io::stdin().is_terminal() && io::stderr().is_terminal()
}

pub fn confirm(message: &str, force: bool) -> Result<bool> {
  if force {
    return Ok(true);
  }

  if !is_interactive() {
    bail!("Cannot prompt for confirmation in non-interactive mode. Use --yes to proceed.");
  }

  write!(io::stderr(), "{} [y/N] ", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Like [`confirm`], but answers no instead of failing when nobody can be asked.
pub fn offer(message: &str, force: bool) -> Result<bool> {
  if !force && !is_interactive() {
    return Ok(false);
  }
  confirm(message, force)
}
