//! Application execution logic.
//!
//! This module contains the main async loop that reads lines from stdin,
//! passes each one through an [`InvocationGate`], and writes the lines the
//! gate lets through to stdout.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use rategate::config::{OutputFormat, ValidatedConfig};
use rategate::gate::{EdgePolicy, InvocationGate};
use rategate::time::TokioClock;
use rategate::timer::{TimerError, TokioScheduler};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Gate over input lines, returning the emission sequence number.
type LineGate = InvocationGate<String, u64, (), TokioClock, TokioScheduler>;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to bind the gate to the runtime's timers.
    #[error("Failed to start gate: {0}")]
    Gate(#[from] TimerError),

    /// Failed to read from the input.
    #[error("Failed to read input: {0}")]
    Input(#[source] io::Error),

    /// Failed to write to the output.
    #[error("Failed to write output: {0}")]
    Output(#[source] io::Error),

    /// Failed to encode an emitted line as JSON.
    #[error("Failed to encode output line: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A line the gate invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Emission {
    seq: u64,
    line: String,
    elapsed: Duration,
}

/// JSON shape of an [`Emission`].
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    seq: u64,
    line: &'a str,
    elapsed_ms: u64,
}

/// Line counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Summary {
    received: u64,
    emitted: u64,
}

/// Executes the main application loop.
///
/// Runs until stdin reaches end of input (the pending line is flushed) or
/// a shutdown signal arrives (the pending line is dropped).
///
/// # Errors
///
/// Returns an error if:
/// - The gate cannot be bound to the tokio runtime
/// - Reading stdin or writing stdout fails
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires real
/// stdin/stdout and signal handling. The loop itself is tested through
/// [`gate_lines`].
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    tracing::debug!("Reading lines from stdin");

    tokio::select! {
        result = gate_lines(config.policy, config.format, input, output) => {
            let summary = result?;
            tracing::info!(
                "Input closed: {} line(s) read, {} emitted",
                summary.received,
                summary.emitted
            );
            Ok(())
        }
        () = shutdown_signal() => {
            // Dropping the loop drops the gate, which cancels its timer
            tracing::info!("Shutdown signal received, discarding pending line");
            Ok(())
        }
    }
}

/// Gates every line of `input` and writes the invoked ones to `output`.
///
/// At end of input the pending line, if any, is flushed before returning.
async fn gate_lines<I, O>(
    policy: EdgePolicy,
    format: OutputFormat,
    input: I,
    mut output: O,
) -> Result<Summary, RunError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let gate = line_gate(policy, tx)?;
    let mut lines = LinesStream::new(input.lines());
    let mut summary = Summary::default();

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(line) => {
                    let line = line.map_err(RunError::Input)?;
                    summary.received += 1;
                    tracing::trace!(received = summary.received, "Read line");
                    gate.call(line);
                }
                None => break,
            },
            Some(emission) = rx.recv() => {
                write_emission(&mut output, format, &emission).await?;
                summary.emitted += 1;
            }
        }
    }

    if gate.is_pending() {
        tracing::debug!("End of input, flushing pending line");
    }
    gate.flush();

    // The gate owns the sender, so the channel closes once it is dropped
    drop(gate);
    while let Some(emission) = rx.recv().await {
        write_emission(&mut output, format, &emission).await?;
        summary.emitted += 1;
    }

    output.flush().await.map_err(RunError::Output)?;
    Ok(summary)
}

/// Builds a gate that forwards each invoked line to `sink`.
fn line_gate(
    policy: EdgePolicy,
    sink: mpsc::UnboundedSender<Emission>,
) -> Result<LineGate, RunError> {
    let scheduler = TokioScheduler::current()?;
    let started = Instant::now();
    let emitted = AtomicU64::new(0);

    tracing::debug!("Gate policy: {policy}");

    Ok(InvocationGate::with_parts(
        policy,
        TokioClock::new(),
        scheduler,
        move |_receiver: Option<()>, line: String| {
            let seq = emitted.fetch_add(1, Ordering::Relaxed) + 1;
            let elapsed = started.elapsed();
            tracing::debug!(seq, elapsed_ms = elapsed.as_millis(), "Emitting line");
            // The receiver outlives the gate unless the loop was aborted
            let _ = sink.send(Emission { seq, line, elapsed });
            seq
        },
    ))
}

async fn write_emission<O>(
    output: &mut O,
    format: OutputFormat,
    emission: &Emission,
) -> Result<(), RunError>
where
    O: AsyncWrite + Unpin,
{
    let rendered = render(format, emission)?;
    output
        .write_all(rendered.as_bytes())
        .await
        .map_err(RunError::Output)?;
    output.flush().await.map_err(RunError::Output)
}

/// Renders an emission as one newline-terminated output line.
fn render(format: OutputFormat, emission: &Emission) -> Result<String, RunError> {
    match format {
        OutputFormat::Text => Ok(format!("{}\n", emission.line)),
        OutputFormat::Json => {
            let json = JsonLine {
                seq: emission.seq,
                line: &emission.line,
                elapsed_ms: u64::try_from(emission.elapsed.as_millis()).unwrap_or(u64::MAX),
            };
            let mut rendered = serde_json::to_string(&json).map_err(RunError::Encode)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
