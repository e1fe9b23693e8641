#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Adapters for child processes whose output is captured and scanned.
pub trait HideWindow {
    /// Keep the child from flashing a console window on Windows.
    fn hide_window(&mut self) -> &mut Self;

    /// Ask the child for uncolored, non-interactive output so that captured
    /// text can be matched reliably.
    fn plain_output(&mut self) -> &mut Self;
}

impl HideWindow for tokio::process::Command {
    #[cfg(windows)]
    fn hide_window(&mut self) -> &mut Self {
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn hide_window(&mut self) -> &mut Self {
        self
    }

    fn plain_output(&mut self) -> &mut Self {
        self.env("TERM", "dumb")
            .env("NO_COLOR", "1")
            .stdin(std::process::Stdio::null())
    }
}
