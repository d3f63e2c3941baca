use super::{ACCEPT_LANGUAGE, Opts, USER_AGENT};
use anyhow::{Context, Result, anyhow, bail};
use headless_chrome::{Browser, LaunchOptions};
use std::{
    ffi::OsStr,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tracing::{debug, trace, warn};

// --no-sandbox is added by the launcher itself when sandboxing is off
static EXTRA_ARGS: [&str; 2] = ["--disable-setuid-sandbox", "--disable-dev-shm-usage"];

/// Starts a headless browser per page load. Nothing is pooled or reused between calls.
#[derive(Clone, Debug, Default)]
pub struct Launcher {
    timeout: Duration,
    chrome_path: Option<PathBuf>,
}

/// Tells a blocking browser job that nobody waits for its result anymore
#[derive(Clone, Debug, Default)]
struct Abandoned(Arc<AtomicBool>);

impl Abandoned {
    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sets the flag when dropped: on completion, on timeout and when the caller is cancelled
struct AbandonOnDrop(Abandoned);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.0.store(true, Ordering::Release);
    }
}

/// Lets the blocking job stop between steps, dropping the browser along with it
#[derive(Clone, Debug)]
struct Checkpoint {
    abandoned: Abandoned,
    deadline: Instant,
}

impl Checkpoint {
    fn pass(&self, step: &str) -> Result<()> {
        if self.abandoned.is_set() {
            bail!("browser job abandoned before {step}");
        }
        if Instant::now() >= self.deadline {
            bail!("browser deadline passed before {step}");
        }
        Ok(())
    }

    fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl Launcher {
    pub fn new(opts: &Opts) -> Self {
        Self {
            timeout: opts.timeout,
            chrome_path: opts.chrome_path.clone(),
        }
    }

    /// Launch and navigation each get the full timeout, so the whole job gets both
    fn ceiling(&self) -> Duration {
        self.timeout * 2
    }

    pub async fn get_page(&self, url: &str) -> Result<String> {
        let this = self.clone();
        let url = url.to_string();
        let abandoned = Abandoned::default();
        let _guard = AbandonOnDrop(abandoned.clone());
        let check = Checkpoint {
            abandoned,
            deadline: Instant::now() + self.ceiling(),
        };
        // the browser driver is blocking, keep it off the runtime threads
        let job = tokio::task::spawn_blocking(move || this.get_page_blocking(&url, &check));
        match tokio::time::timeout(self.ceiling(), job).await {
            Ok(res) => res.context("browser task failed")?,
            Err(_) => Err(anyhow!("browser timed out after {:?}", self.ceiling())),
        }
    }

    fn launch(&self) -> Result<Browser> {
        let opts = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(self.chrome_path.clone())
            .args(EXTRA_ARGS.iter().map(OsStr::new).collect())
            .launch_timeout(self.timeout)
            .idle_browser_timeout(self.timeout)
            .build()
            .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;
        Browser::new(opts).context("failed to launch browser")
    }

    fn get_page_blocking(&self, url: &str, check: &Checkpoint) -> Result<String> {
        check.pass("launch")?;
        let start = Instant::now();
        // The browser process is killed when this is dropped, which happens on every return path
        let browser = self.launch()?;
        trace!("Browser started in {:?}", start.elapsed());

        check.pass("navigation")?;
        let tab = browser.new_tab().context("failed to open browser tab")?;
        tab.set_default_timeout(self.timeout.min(check.remaining()));
        tab.set_user_agent(USER_AGENT, Some(ACCEPT_LANGUAGE), None)
            .context("failed to set user agent")?;
        tab.navigate_to(url)
            .with_context(|| format!("failed to navigate to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("timed out loading {url}"))?;

        if let Err(err) = check.pass("reading the page") {
            warn!(url, "Page loaded after the caller gave up");
            return Err(err);
        }
        let html = tab.get_content().context("failed to read page content")?;
        debug!(url, bytes = html.len(), "Fetched page in {:?}", start.elapsed());
        Ok(html)
    }
}
