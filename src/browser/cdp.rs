//! Chrome DevTools Protocol session via chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpClient, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::Browser;
use crate::error::{ReportError, Result};

/// Launch options for the CDP session.
#[derive(Debug, Clone)]
pub struct CdpBrowserOptions {
    /// Explicit Chrome/Chromium binary; `None` lets chromiumoxide detect one.
    pub browser_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    /// Where file downloads land; `None` means the working directory at
    /// launch, matching [`Config::resolved_download_dir`].
    ///
    /// [`Config::resolved_download_dir`]: crate::config::Config::resolved_download_dir
    pub download_dir: Option<PathBuf>,
}

impl Default for CdpBrowserOptions {
    fn default() -> Self {
        Self {
            browser_path: None,
            window_width: 1280,
            window_height: 1024,
            download_dir: None,
        }
    }
}

/// A headless Chrome session driving one shared tab for the whole run.
pub struct CdpBrowser {
    client: CdpClient,
    page: Page,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl CdpBrowser {
    pub async fn launch(options: CdpBrowserOptions) -> Result<CdpBrowser> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.window_width, options.window_height);
        if let Some(path) = &options.browser_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| ReportError::browser(format!("failed to configure launch: {e}")))?;

        let (client, mut handler) = CdpClient::launch(config)
            .await
            .map_err(|e| ReportError::browser(format!("failed to launch chromium: {e}")))?;

        // The handler must be pumped for the session to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = client
            .new_page("about:blank")
            .await
            .map_err(|e| ReportError::browser(format!("failed to open tab: {e}")))?;

        // Chrome must be told where downloads go, or the archive the
        // optimize stage waits on never reaches the polled directory.
        let download_dir = match &options.download_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        {
            use chromiumoxide::cdp::browser_protocol::browser::{
                SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
            };

            let params = SetDownloadBehaviorParams::builder()
                .behavior(SetDownloadBehaviorBehavior::Allow)
                .download_path(download_dir.to_string_lossy().to_string())
                .build()
                .map_err(ReportError::browser)?;
            page.execute(params)
                .await
                .map_err(|e| map_cdp_error("download dir setup failed", e))?;
        }

        Ok(CdpBrowser {
            client,
            page,
            handler_task,
            closed: false,
        })
    }
}

fn map_cdp_error(context: &str, err: chromiumoxide::error::CdpError) -> ReportError {
    ReportError::browser(format!("{context}: {err}"))
}

#[async_trait]
impl Browser for CdpBrowser {
    async fn navigate(&mut self, url: &str, load_timeout: Option<Duration>) -> Result<()> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| map_cdp_error("navigation failed", e))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| map_cdp_error("page load failed", e))?;
            Ok(())
        };
        match load_timeout {
            Some(limit) => timeout(limit, navigation).await.map_err(|_| {
                ReportError::Timeout(format!("page load exceeded {limit:?}: {url}"))
            })?,
            None => navigation.await,
        }
    }

    async fn find(&mut self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ReportError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|_| ReportError::NotInteractable(selector.to_string()))?;
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ReportError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|_| ReportError::NotInteractable(selector.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|_| ReportError::NotInteractable(selector.to_string()))?;
        Ok(())
    }

    async fn press_enter(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ReportError::ElementNotFound(selector.to_string()))?;
        element
            .press_key("Enter")
            .await
            .map_err(|_| ReportError::NotInteractable(selector.to_string()))?;
        Ok(())
    }

    async fn run_script(&mut self, code: &str) -> Result<serde_json::Value> {
        let evaluation = self
            .page
            .evaluate(code)
            .await
            .map_err(|e| map_cdp_error("script failed", e))?;
        Ok(evaluation.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>> {
        use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
        use chromiumoxide::page::ScreenshotParams;

        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
            )
            .await
            .map_err(|e| map_cdp_error("screenshot failed", e))
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;

        self.page
            .execute(
                SetDeviceMetricsOverrideParams::builder()
                    .width(width as i64)
                    .height(height as i64)
                    .device_scale_factor(1.0)
                    .mobile(false)
                    .build()
                    .map_err(ReportError::browser)?,
            )
            .await
            .map_err(|e| map_cdp_error("viewport change failed", e))?;
        Ok(())
    }

    async fn clear_cookies(&mut self) -> Result<()> {
        use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;

        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| map_cdp_error("cookie clear failed", e))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client
            .close()
            .await
            .map_err(|e| map_cdp_error("browser shutdown failed", e))?;
        let _ = self.client.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}
