use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Enabled/disabled state of the controls and the plot's click target.
///
/// Disabled for the whole duration of a backend call. Clones share state,
/// so an input source can hold one and drop events while a call is running.
#[derive(Debug, Clone)]
pub struct InputSurface {
    enabled: Arc<AtomicBool>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Disable the surface until the returned guard drops.
    ///
    /// Returns `None` when the surface is already disabled.
    pub fn disable(&self) -> Option<SurfaceGuard> {
        self.enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SurfaceGuard {
                enabled: Arc::clone(&self.enabled),
            })
    }
}

impl Default for InputSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-enables the surface on drop, on success and failure paths alike.
#[derive(Debug)]
pub struct SurfaceGuard {
    enabled: Arc<AtomicBool>,
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.enabled.store(true, Ordering::Release);
    }
}
