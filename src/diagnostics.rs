// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Injectable diagnostics.
//!
//! Components never log through ad-hoc prints; they receive a
//! [`Diagnostics`] handle and report through it. The default handle
//! forwards to the `log` facade.

use std::sync::Arc;

/// Leveled diagnostic sink.
pub trait Diagnostics: Send + Sync {
    fn debug(&self, component: &str, message: &str);
    fn info(&self, component: &str, message: &str);
    fn warn(&self, component: &str, message: &str);
}

/// Shared diagnostics handle held by each component.
pub type SharedDiagnostics = Arc<dyn Diagnostics>;

/// Forwards to the `log` facade under the `frigo_analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn debug(&self, component: &str, message: &str) {
        log::debug!(target: "frigo_analytics", "[{}] {}", component, message);
    }

    fn info(&self, component: &str, message: &str) {
        log::info!(target: "frigo_analytics", "[{}] {}", component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        log::warn!(target: "frigo_analytics", "[{}] {}", component, message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn debug(&self, _component: &str, _message: &str) {}
    fn info(&self, _component: &str, _message: &str) {}
    fn warn(&self, _component: &str, _message: &str) {}
}

/// Handle used when none is injected.
pub fn default_diagnostics() -> SharedDiagnostics {
    Arc::new(LogDiagnostics)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Diagnostics;
    use std::sync::Mutex;

    /// Records every message as `LEVEL component: message`.
    #[derive(Debug, Default)]
    pub struct RecordingDiagnostics {
        pub entries: Mutex<Vec<String>>,
    }

    impl RecordingDiagnostics {
        pub fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }

        fn record(&self, level: &str, component: &str, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(format!("{level} {component}: {message}"));
        }
    }

    impl Diagnostics for RecordingDiagnostics {
        fn debug(&self, component: &str, message: &str) {
            self.record("DEBUG", component, message);
        }

        fn info(&self, component: &str, message: &str) {
            self.record("INFO", component, message);
        }

        fn warn(&self, component: &str, message: &str) {
            self.record("WARN", component, message);
        }
    }
}
