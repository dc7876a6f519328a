//! Welcome banner display for chat sessions.

use std::io::Write;

use console::style;

use mindaid_types::chat::SessionId;

/// Write the banner shown when `mindaid chat` starts.
///
/// Displays the endpoint and a shortened session id, plus a hint about
/// slash commands.
pub fn print_welcome_banner(
    out: &mut impl Write,
    endpoint: &str,
    session_id: &SessionId,
) -> std::io::Result<()> {
    let id = session_id.as_str();
    let short = id.rsplit('_').next().unwrap_or(id);

    writeln!(out)?;
    writeln!(out, "  {} {}", "~", style("MindAid").cyan().bold())?;
    writeln!(out, "  {}", style("A quiet place to talk things through").dim())?;
    writeln!(out)?;
    writeln!(out, "  {}  {}", style("Endpoint:").bold(), style(endpoint).dim())?;
    writeln!(out, "  {}   {}", style("Session:").bold(), style(short).dim())?;
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)
}
