use std::sync::Mutex;

/// Concurrent append-only accumulator of failed URLs, scoped to one cycle.
///
/// Exported at cycle end for inspection or manual reprocessing; nothing here
/// survives a restart.
#[derive(Debug, Default)]
pub struct ErrorReport {
    urls: Mutex<Vec<String>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: &str) {
        self.urls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the accumulated URLs.
    pub fn export(&self) -> Vec<String> {
        std::mem::take(&mut *self.urls.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
