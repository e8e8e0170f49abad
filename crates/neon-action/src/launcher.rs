//! Fire-and-forget access to the browser and local applications.

use std::process::{Command, Stdio};

use crate::error::ActionError;

/// Opens URLs and starts processes without waiting for them.
pub trait Launcher: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), ActionError>;
    fn launch_process(&self, executable: &str, args: &[String]) -> Result<(), ActionError>;
}

impl<T: Launcher + ?Sized> Launcher for std::sync::Arc<T> {
    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        (**self).open_url(url)
    }

    fn launch_process(&self, executable: &str, args: &[String]) -> Result<(), ActionError> {
        (**self).launch_process(executable, args)
    }
}

/// Only `http://` and `https://` URLs are handed to the browser.
pub fn validate_url(url: &str) -> Result<(), ActionError> {
    if url.is_empty() {
        return Err(ActionError::Launch("URL must not be empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ActionError::Launch(format!(
            "Unsupported URL scheme. Only http:// and https:// are allowed, got: {}",
            url
        )));
    }
    Ok(())
}

/// Launcher backed by the platform's URL opener.
pub struct SystemLauncher;

impl SystemLauncher {
    /// Program and arguments that open `url` on `os` (as in
    /// `std::env::consts::OS`). The URL is always a single argument and
    /// never passes through a shell, so `&` in a query string is literal.
    fn url_opener(os: &str, url: &str) -> (&'static str, Vec<String>) {
        match os {
            "windows" => (
                "rundll32",
                vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
            ),
            "macos" => ("open", vec![url.to_string()]),
            _ => ("xdg-open", vec![url.to_string()]),
        }
    }

    fn url_command(url: &str) -> Command {
        let (program, args) = Self::url_opener(std::env::consts::OS, url);
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    }

    fn spawn_detached(mut cmd: Command, what: &str) -> Result<(), ActionError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| ActionError::Launch(format!("Failed to open {}: {}", what, e)))
    }
}

impl Launcher for SystemLauncher {
    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        validate_url(url)?;
        Self::spawn_detached(Self::url_command(url), url)?;
        tracing::info!(url = %url, "Opened URL");
        Ok(())
    }

    fn launch_process(&self, executable: &str, args: &[String]) -> Result<(), ActionError> {
        if executable.trim().is_empty() {
            return Err(ActionError::Launch("Executable must not be empty".to_string()));
        }
        let mut cmd = Command::new(executable);
        cmd.args(args);
        Self::spawn_detached(cmd, executable)?;
        tracing::info!(executable = %executable, "Launched application");
        Ok(())
    }
}
