//! Running commands through an authenticated session.

use cutercon_net::{RconError, RconSession, RconTransport};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::AppError;

/// Run each command in order, writing its output to `out`.
///
/// Stops at the first failure; the session is then unusable.
pub async fn run_commands<T, W>(
    session: &mut RconSession<T>,
    commands: &[String],
    out: &mut W,
) -> Result<(), AppError>
where
    T: RconTransport,
    W: AsyncWrite + Unpin,
{
    for command in commands {
        run_one(session, command, out).await?;
    }
    Ok(())
}

/// Run one command per non-blank line of `input` until end of input.
///
/// A command the session refuses to send is reported and skipped; any
/// other failure ends the run.
pub async fn run_lines<T, R, W>(
    session: &mut RconSession<T>,
    input: R,
    out: &mut W,
) -> Result<(), AppError>
where
    T: RconTransport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        match run_one(session, command, out).await {
            Err(AppError::Command { source, .. }) if is_recoverable(&source) => {
                tracing::warn!(command, "Skipped: {source}");
            }
            result => result?,
        }
    }
    Ok(())
}

async fn run_one<T, W>(
    session: &mut RconSession<T>,
    command: &str,
    out: &mut W,
) -> Result<(), AppError>
where
    T: RconTransport,
    W: AsyncWrite + Unpin,
{
    tracing::debug!(command, "Running command");
    let output = session
        .send_command(command)
        .await
        .map_err(|source| AppError::Command {
            command: command.to_string(),
            source,
        })?;
    write_output(out, &output).await?;
    Ok(())
}

/// Write command output, newline-terminated. Empty output writes nothing.
async fn write_output<W: AsyncWrite + Unpin>(out: &mut W, output: &str) -> std::io::Result<()> {
    if output.is_empty() {
        return Ok(());
    }
    out.write_all(output.as_bytes()).await?;
    if !output.ends_with('\n') {
        out.write_all(b"\n").await?;
    }
    out.flush().await
}

/// Whether the session is still usable after `error`.
///
/// Only a request rejected before anything was written qualifies.
fn is_recoverable(error: &RconError) -> bool {
    matches!(error, RconError::Encoding(_))
}
