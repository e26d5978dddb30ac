use crate::error::{AudioLeftError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks Ctrl+C. The running ffmpeg child shares our process group, so it
/// receives the same SIGINT and exits on its own; we only record the request
/// so the resulting failure is reported as a cancellation.
pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
    shutdown_message_shown: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown_message_shown = Arc::new(AtomicBool::new(false));

        let running_clone = running.clone();
        let message_shown_clone = shutdown_message_shown.clone();

        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !message_shown_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(130);
            }
        })
        .map_err(|e| AudioLeftError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self {
            running,
            shutdown_message_shown,
        })
    }

    /// Flag only, no Ctrl+C handler registration.
    pub fn without_handler() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            shutdown_message_shown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(AudioLeftError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Turn a finished operation's outcome into `Cancelled` if Ctrl+C arrived
    /// while it ran, whatever the operation itself returned.
    pub fn settle<R>(&self, outcome: Result<R>) -> Result<R> {
        let result = outcome.map_err(|e| {
            if !self.is_running() {
                AudioLeftError::Cancelled
            } else {
                e
            }
        })?;

        self.check_shutdown()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_state_management() {
        let shutdown = GracefulShutdown::without_handler();

        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(!shutdown.is_running());
        assert!(matches!(
            shutdown.check_shutdown(),
            Err(AudioLeftError::Cancelled)
        ));
    }

    #[test]
    fn test_settle_passes_through_while_running() {
        let shutdown = GracefulShutdown::without_handler();

        assert_eq!(shutdown.settle(Ok(7)).unwrap(), 7);

        let err = shutdown
            .settle::<()>(Err(AudioLeftError::ToolNotFound {
                tool: "ffmpeg".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, AudioLeftError::ToolNotFound { .. }));
    }

    #[test]
    fn test_settle_prioritizes_cancellation() {
        let shutdown = GracefulShutdown::without_handler();
        shutdown.request_shutdown();

        let err = shutdown
            .settle::<()>(Err(AudioLeftError::ToolExecution {
                tool: "ffmpeg".to_string(),
                exit_code: Some(255),
                stderr: "Exiting normally, received signal 2.".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, AudioLeftError::Cancelled));

        assert!(matches!(
            shutdown.settle(Ok(())),
            Err(AudioLeftError::Cancelled)
        ));
    }
}
