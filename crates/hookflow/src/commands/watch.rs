//! Follow a poller in the terminal until Ctrl+C or a final state.

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use hookflow_console::{Display, Phase, PollHandle, PollState, Snapshot};

use super::Context;
use super::output;

/// When to stop following.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Return once automatic polling settles on a terminal state.
    pub exit_on_settle: bool,
    /// Return after the first result.
    pub once: bool,
}

/// Print every change to what the view shows.
///
/// Repeated identical results are printed once, so a string of "no data yet"
/// responses reads as a single line until something arrives.
pub async fn watch<S, R>(
    handle: &PollHandle<S>,
    ctx: &Context,
    options: WatchOptions,
    render: R,
) -> Result<()>
where
    S: Snapshot + PartialEq + Serialize,
    R: Fn(&Display<S>) -> Vec<String>,
{
    watch_until(handle, ctx, options, render, tokio::signal::ctrl_c()).await
}

/// [`watch`] that also stops when `shutdown` resolves.
async fn watch_until<S, R, F>(
    handle: &PollHandle<S>,
    ctx: &Context,
    options: WatchOptions,
    render: R,
    shutdown: F,
) -> Result<()>
where
    S: Snapshot + PartialEq + Serialize,
    R: Fn(&Display<S>) -> Vec<String>,
    F: Future,
{
    tokio::pin!(shutdown);
    let mut updates = handle.subscribe();
    let waiting = output::spinner("Waiting for the first response...", ctx.json_output);
    let mut shown: Option<(Display<S>, Option<String>)> = None;
    let mut announced_settle = false;

    loop {
        let state = updates.borrow_and_update().clone();

        if state.fetches > 0 {
            waiting.finish_and_clear();
            let view = (state.display.clone(), state.error.clone());
            if shown.as_ref() != Some(&view) {
                print_state(&state, ctx, &render)?;
                shown = Some(view);
            }
        }

        match state.phase {
            Phase::Closed => break,
            Phase::Settled if options.exit_on_settle => break,
            Phase::Settled if !announced_settle && !ctx.json_output => {
                output::dim("Final state reached; automatic refresh stopped. Ctrl+C to exit.");
                announced_settle = true;
            }
            Phase::Active => announced_settle = false,
            Phase::Settled => {}
        }
        if options.once && state.fetches > 0 {
            break;
        }

        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    waiting.finish_and_clear();
    Ok(())
}

fn print_state<S, R>(state: &PollState<S>, ctx: &Context, render: &R) -> Result<()>
where
    S: Snapshot + Serialize,
    R: Fn(&Display<S>) -> Vec<String>,
{
    if ctx.json_output {
        // One object per line for piping
        let line = json!({
            "fetch": state.fetches,
            "error": state.error,
            "data": state.snapshot(),
        });
        println!("{}", serde_json::to_string(&line)?);
        return Ok(());
    }

    if let Some(error) = &state.error {
        output::banner(error);
    }
    for line in render(&state.display) {
        println!("{}", line);
    }
    println!();
    Ok(())
}
