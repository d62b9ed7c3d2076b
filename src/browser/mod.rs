//! The headless-browser seam.
//!
//! Stages drive the browser only through the [`Browser`] trait so the
//! pipeline is testable with a scripted double. The concrete CDP-backed
//! session lives behind the `headless-chrome` feature.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "headless-chrome")]
mod cdp;
#[cfg(feature = "headless-chrome")]
pub use cdp::{CdpBrowser, CdpBrowserOptions};

/// One headless browser session, owned by exactly one run.
///
/// Element-addressed calls (`find`, `click`, `type_text`, `press_enter`)
/// fail with `ElementNotFound`/`NotInteractable`; stages convert those into
/// stage-level errors rather than letting them abort the run.
#[async_trait]
pub trait Browser: Send {
    /// Navigates the shared tab. `load_timeout` is an explicit per-call
    /// knob; `None` means no enforced deadline.
    async fn navigate(&mut self, url: &str, load_timeout: Option<Duration>) -> Result<()>;

    /// Whether `selector` currently matches an element. Used by poll waits,
    /// so "absent" is an answer, not an error.
    async fn find(&mut self, selector: &str) -> Result<bool>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Types Enter into the matched element, submitting its form.
    async fn press_enter(&mut self, selector: &str) -> Result<()>;

    async fn run_script(&mut self, code: &str) -> Result<serde_json::Value>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>>;

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    async fn clear_cookies(&mut self) -> Result<()>;

    /// Tears the session down. Idempotent: the pipeline calls it exactly
    /// once, but a second call must not fail.
    async fn close(&mut self) -> Result<()>;
}

pub type BrowserHandle = Box<dyn Browser>;

#[cfg(test)]
pub mod testing {
    //! A scripted [`Browser`] for driving stages without a real session.

    use std::collections::{HashSet, VecDeque};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::{Browser, BrowserHandle};
    use crate::error::{ReportError, Result};

    pub type SharedState = Arc<Mutex<ScriptedState>>;

    /// Everything the double records plus the answers it is scripted to
    /// give. Held behind an `Arc` so tests keep a handle after the
    /// pipeline consumes the browser.
    #[derive(Default)]
    pub struct ScriptedState {
        /// Call log: `"navigate:<url>"`, `"click:<sel>"`, `"type:<sel>:<text>"`, ...
        pub calls: Vec<String>,
        pub close_calls: usize,
        /// Selectors treated as absent: `find` answers false, interaction
        /// calls fail with `ElementNotFound`.
        pub missing: HashSet<String>,
        /// Pre-scripted `find` answers, consumed front-to-back before the
        /// `missing` set is consulted.
        pub find_answers: VecDeque<bool>,
        /// Image returned by `screenshot`; a white 1280x1024 canvas when
        /// unset.
        pub screenshot: Option<RgbaImage>,
    }

    pub struct ScriptedBrowser {
        state: SharedState,
    }

    impl ScriptedBrowser {
        pub fn boxed() -> (BrowserHandle, SharedState) {
            let state = Arc::new(Mutex::new(ScriptedState::default()));
            (Box::new(ScriptedBrowser { state: state.clone() }), state)
        }

        fn record(&self, call: String) {
            self.state.lock().unwrap().calls.push(call);
        }

        fn is_missing(&self, selector: &str) -> bool {
            self.state.lock().unwrap().missing.contains(selector)
        }
    }

    #[async_trait]
    impl Browser for ScriptedBrowser {
        async fn navigate(&mut self, url: &str, _load_timeout: Option<Duration>) -> Result<()> {
            self.record(format!("navigate:{url}"));
            Ok(())
        }

        async fn find(&mut self, selector: &str) -> Result<bool> {
            self.record(format!("find:{selector}"));
            let mut state = self.state.lock().unwrap();
            if let Some(answer) = state.find_answers.pop_front() {
                return Ok(answer);
            }
            Ok(!state.missing.contains(selector))
        }

        async fn click(&mut self, selector: &str) -> Result<()> {
            self.record(format!("click:{selector}"));
            if self.is_missing(selector) {
                return Err(ReportError::ElementNotFound(selector.to_string()));
            }
            Ok(())
        }

        async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
            self.record(format!("type:{selector}:{text}"));
            if self.is_missing(selector) {
                return Err(ReportError::ElementNotFound(selector.to_string()));
            }
            Ok(())
        }

        async fn press_enter(&mut self, selector: &str) -> Result<()> {
            self.record(format!("enter:{selector}"));
            if self.is_missing(selector) {
                return Err(ReportError::ElementNotFound(selector.to_string()));
            }
            Ok(())
        }

        async fn run_script(&mut self, code: &str) -> Result<serde_json::Value> {
            self.record(format!("script:{code}"));
            Ok(serde_json::Value::Null)
        }

        async fn screenshot(&mut self) -> Result<Vec<u8>> {
            self.record("screenshot".to_string());
            let image = self
                .state
                .lock()
                .unwrap()
                .screenshot
                .clone()
                .unwrap_or_else(|| {
                    RgbaImage::from_pixel(1280, 1024, Rgba([255, 255, 255, 255]))
                });
            let mut bytes = Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(image)
                .write_to(&mut bytes, ImageFormat::Png)?;
            Ok(bytes.into_inner())
        }

        async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
            self.record(format!("viewport:{width}x{height}"));
            Ok(())
        }

        async fn clear_cookies(&mut self) -> Result<()> {
            self.record("clear_cookies".to_string());
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.state.lock().unwrap().close_calls += 1;
            Ok(())
        }
    }
}
