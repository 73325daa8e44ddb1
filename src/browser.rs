use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

use crate::config::BrowserConfig;
use crate::error::{Error, Result};

/// Something that can show a URL to the user.
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens links with the configured browser, `$BROWSER`, or the platform
/// opener, without waiting for it to exit.
pub struct SystemBrowser {
    pub config: BrowserConfig,
}

impl SystemBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Program and leading arguments to run, before the URL itself.
    fn resolve_command(&self) -> Result<(String, Vec<String>)> {
        if let Some(command) = &self.config.command {
            debug!("Using configured browser: {}", command);
            return Ok((command.clone(), self.config.args.clone()));
        }

        if let Ok(browser) = std::env::var("BROWSER") {
            // $BROWSER may be a colon-separated list of candidates
            if let Some(candidate) = browser
                .split(':')
                .map(str::trim)
                .find(|c| !c.is_empty() && self.is_command_available(c))
            {
                debug!("Using $BROWSER: {}", candidate);
                return Ok((candidate.to_string(), self.config.args.clone()));
            }
            warn!("No usable program in $BROWSER ({})", browser);
        }

        self.detect_platform_opener()
    }

    fn detect_platform_opener(&self) -> Result<(String, Vec<String>)> {
        if cfg!(target_os = "macos") {
            return Ok(("open".to_string(), Vec::new()));
        }
        if cfg!(target_os = "windows") {
            return Ok((
                "cmd".to_string(),
                vec!["/C".to_string(), "start".to_string(), String::new()],
            ));
        }

        let openers: [(&str, &[&str]); 3] = [
            ("xdg-open", &[]),
            ("gio", &["open"]),
            ("wslview", &[]),
        ];

        for (cmd, args) in openers {
            if self.is_command_available(cmd) {
                debug!("Detected URL opener: {}", cmd);
                return Ok((cmd.to_string(), args.iter().map(|a| a.to_string()).collect()));
            }
        }

        Err(Error::Browser(
            "No URL opener found. Install xdg-open or set a browser command".to_string(),
        ))
    }

    pub fn is_command_available(&self, command: &str) -> bool {
        which::which(command).is_ok()
    }
}

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let (program, args) = self.resolve_command()?;

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!("Spawning process: {:?}", cmd);
        match cmd.spawn() {
            Ok(_child) => {
                info!("Opened {} with {}", url, program);
                Ok(())
            }
            Err(e) => {
                error!("Failed to launch {}: {}", program, e);
                Err(Error::Browser(format!("Failed to launch '{}': {}", program, e)))
            }
        }
    }
}
