//! Poll-based wait for externally rendered UI state.
//!
//! The external analysis services expose no structural completion signal;
//! the only observable is whether a DOM marker is still present. This module
//! keeps that as an explicit poll+sleep loop. It is a deliberate
//! approximation: a marker that toggles faster than the poll interval can be
//! missed, and that is accepted behavior, not something to paper over with a
//! push-based wait the services do not offer.

use std::time::Duration;

use tokio::time::Instant;

use crate::browser::Browser;
use crate::error::{ReportError, Result};

/// Re-probes `selector` every `interval` until it no longer matches.
///
/// The marker disappearing is the completion signal. Probe errors
/// propagate; with `timeout = None` the wait is unbounded, otherwise a
/// marker still present at the deadline is a `Timeout` error. The call
/// suspends only the calling stage between probes.
pub async fn wait_while_present(
    browser: &mut dyn Browser,
    selector: &str,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<()> {
    let started = Instant::now();
    let deadline = timeout.map(|t| started + t);

    loop {
        if !browser.find(selector).await? {
            return Ok(());
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(ReportError::Timeout(format!(
                    "'{selector}' still present after {:?}",
                    started.elapsed()
                )));
            }
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::ScriptedBrowser;

    #[tokio::test(start_paused = true)]
    async fn returns_immediately_when_already_absent() {
        let (mut browser, state) = ScriptedBrowser::boxed();
        state.lock().unwrap().find_answers.push_back(false);
        let start = Instant::now();

        wait_while_present(browser.as_mut(), "h1.busy", Duration::from_secs(1), None)
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(state.lock().unwrap().calls, vec!["find:h1.busy"]);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_once_per_present_probe() {
        let (mut browser, state) = ScriptedBrowser::boxed();
        {
            let mut state = state.lock().unwrap();
            state.find_answers.extend([true, true, true, false]);
        }
        let interval = Duration::from_secs(1);
        let start = Instant::now();

        wait_while_present(browser.as_mut(), "h1.busy", interval, None)
            .await
            .unwrap();

        // present, present, present, absent: three sleeps of `interval`.
        assert_eq!(start.elapsed(), interval * 3);
        assert_eq!(state.lock().unwrap().calls.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_marker_never_clears() {
        let (mut browser, _state) = ScriptedBrowser::boxed();
        // The scripted default answers "present" for any selector.
        let interval = Duration::from_secs(1);

        let err = wait_while_present(
            browser.as_mut(),
            "h1.busy",
            interval,
            Some(interval * 2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReportError::Timeout(_)));
        assert!(err.to_string().contains("h1.busy"));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_wait_survives_long_runs() {
        let (mut browser, state) = ScriptedBrowser::boxed();
        {
            let mut state = state.lock().unwrap();
            state.find_answers.extend(std::iter::repeat(true).take(500));
            state.find_answers.push_back(false);
        }

        wait_while_present(
            browser.as_mut(),
            "h1.busy",
            Duration::from_millis(250),
            None,
        )
        .await
        .unwrap();

        assert_eq!(state.lock().unwrap().calls.len(), 501);
    }
}
