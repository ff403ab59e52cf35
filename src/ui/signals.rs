use crate::error::{Result, SplitError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts Ctrl+C presses. The batch stops before the next file after the
/// first one; the second exits immediately.
pub struct GracefulShutdown {
    interrupts: Arc<AtomicUsize>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let handler_interrupts = Arc::clone(&interrupts);

        ctrlc::set_handler(move || {
            if handler_interrupts.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\n🛑 Finishing the current file, then stopping (Ctrl+C again to abort)");
            } else {
                eprintln!("\nAborted while splitting; check the directory for leftover halves");
                std::process::exit(130);
            }
        })
        .map_err(|e| SplitError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self { interrupts })
    }

    /// No signal handler is installed; only `request_shutdown` stops the batch.
    pub fn new_for_test() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if self.interrupts.load(Ordering::SeqCst) > 0 {
            return Err(SplitError::Cancelled);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn request_shutdown(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_stops_the_batch() {
        let shutdown = GracefulShutdown::new_for_test();
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(matches!(
            shutdown.check_shutdown(),
            Err(SplitError::Cancelled)
        ));
    }
}
