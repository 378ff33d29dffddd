//! Local WebDriver process (chromedriver / geckodriver)
//!
//! Only used when the suite is asked to start its own driver. The process is
//! bound to a loopback port, considered usable once `GET /status` reports
//! `ready`, and terminated when the handle is dropped.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{TripError, TripResult};

/// Handle to a running driver; stopping it takes its browsers down too
pub struct DriverProcess {
    child: Child,
    pub url: String,
    pub port: u16,
    shutdown_grace: Duration,
}

/// Body of the W3C `GET /status` endpoint
#[derive(Debug, Deserialize)]
struct DriverStatus {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    message: String,
}

impl DriverProcess {
    /// Start the driver binary and wait until it accepts new sessions
    pub async fn spawn(config: DriverConfig) -> TripResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{}", port);

        info!("Starting {} on {}", config.binary_path.display(), url);

        let child = Command::new(&config.binary_path)
            .arg(format!("--port={}", port))
            .args(&config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                TripError::DriverStartup(format!("cannot run {}: {}", config.binary_path.display(), e))
            })?;

        let driver = DriverProcess {
            child,
            url,
            port,
            shutdown_grace: config.shutdown_grace,
        };

        driver
            .await_ready(config.startup_timeout, config.poll_interval)
            .await?;
        info!("WebDriver ready at {}", driver.url);
        Ok(driver)
    }

    async fn await_ready(&self, timeout: Duration, poll: Duration) -> TripResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let deadline = Instant::now() + timeout;
        let mut polls = 0;

        loop {
            polls += 1;
            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<DriverStatus>().await {
                        Ok(status) if status.value.ready => return Ok(()),
                        Ok(status) => debug!("WebDriver busy: {}", status.value.message),
                        Err(e) => warn!("Unexpected /status body: {}", e),
                    }
                }
                Ok(resp) => warn!("/status answered {}", resp.status()),
                // Refused connections are normal until the driver binds its port
                Err(e) if e.is_connect() => debug!("WebDriver not listening yet"),
                Err(e) => warn!("/status request failed: {}", e),
            }

            if Instant::now() >= deadline {
                return Err(TripError::DriverHealthCheck(polls));
            }
            sleep(poll).await;
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the driver to exit, then kill it if it outlives the grace period
    pub fn stop(&mut self) -> TripResult<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        info!("Stopping WebDriver (pid {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Err(e) = kill(Pid::from_raw(self.child.id() as i32), Signal::SIGTERM) {
                debug!("SIGTERM not delivered: {}", e);
            }
            let deadline = Instant::now() + self.shutdown_grace;
            while Instant::now() < deadline {
                if self.child.try_wait()?.is_some() {
                    return Ok(());
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            warn!("WebDriver ignored SIGTERM, killing it");
        }

        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop WebDriver: {}", e);
        }
    }
}

/// How to launch a local driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub binary_path: PathBuf,

    /// Fixed port; a free one is picked when unset
    pub port: Option<u16>,

    pub startup_timeout: Duration,
    pub poll_interval: Duration,

    /// Time allowed between SIGTERM and a hard kill
    pub shutdown_grace: Duration,

    pub extra_args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("chromedriver"),
            port: None,
            startup_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            shutdown_grace: Duration::from_secs(2),
            extra_args: Vec::new(),
        }
    }
}

/// Let the OS pick an unused loopback port
fn find_free_port() -> TripResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
