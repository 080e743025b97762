use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Normalize a discovered DNS name or IP literal.
///
/// Surrounding whitespace and every trailing dot are removed. Returns `None`
/// when nothing is left.
pub fn normalize_host(raw: &str) -> Option<String> {
    let host = raw.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Deduplicated set of every host discovered during a run.
///
/// Shared by all collectors; the only read is the final sorted snapshot.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: Mutex<FxHashSet<String>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and records `raw`. Returns `true` if the host was new.
    pub fn insert(&self, raw: &str) -> bool {
        match normalize_host(raw) {
            Some(host) => self.hosts.lock().insert(host),
            None => false,
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        normalize_host(raw).is_some_and(|host| self.hosts.lock().contains(&host))
    }

    pub fn len(&self) -> usize {
        self.hosts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lexicographically sorted copy of the registry.
    pub fn sorted(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.hosts.lock().iter().cloned().collect();
        hosts.sort_unstable();
        hosts
    }
}
