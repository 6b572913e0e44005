//! Date- and size-based rotation of dated log files.
//!
//! Files for a day are named (oldest first):
//!   events_log_<date>.txt → events_log_<date>_1.txt → events_log_<date>_2.txt → …
//!
//! A new name is only ever chosen by scanning the directory, so restarting the
//! process picks up where the previous one left off.

use std::io;
use std::path::Path;

use chrono::NaiveDate;
use eventlog_core::{LogError, LogFileHandle, LoggerConfig, ProbeFailurePolicy};

use crate::store::FileStore;

/// Highest suffix the collision search will try before giving up.
pub const MAX_SUFFIX: u32 = 100_000;

/// Outcome of [`RotationPolicy::decide`].
#[derive(Debug)]
pub struct Decision {
    /// The file the next line must go to.
    pub handle: LogFileHandle,
    /// `true` if `handle` replaces the previous one.
    pub rotated: bool,
    /// Candidates that could not be stat'ed and were treated as absent.
    pub probe_failures: Vec<LogError>,
}

/// Chooses the active log file.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    max_file_bytes: u64,
    on_probe_failure: ProbeFailurePolicy,
    max_suffix: u32,
}

impl RotationPolicy {
    pub fn new(max_file_bytes: u64, on_probe_failure: ProbeFailurePolicy) -> Self {
        Self {
            max_file_bytes,
            on_probe_failure,
            max_suffix: MAX_SUFFIX,
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(config.max_file_bytes, config.probe_failure)
    }

    /// Lower the suffix search cap.
    pub fn with_max_suffix(mut self, max_suffix: u32) -> Self {
        self.max_suffix = max_suffix;
        self
    }

    /// Pick the file for a write happening on `today`.
    ///
    /// With no `current` handle this is the initial acquisition. Otherwise
    /// `current` is kept unless `today` is a later day or the file has grown
    /// past the threshold, in which case a fresh name is searched for. A
    /// `today` earlier than `current.date` is read as `current.date`.
    ///
    /// # Errors
    /// `RotationProbe` when a stat fails under [`ProbeFailurePolicy::KeepCurrent`],
    /// `SuffixExhausted` when every suffix up to the cap is taken.
    pub fn decide(
        &self,
        store: &dyn FileStore,
        directory: &Path,
        current: Option<&LogFileHandle>,
        today: NaiveDate,
    ) -> Result<Decision, LogError> {
        // Never reopen a day the active file has already moved past.
        let today = current.map_or(today, |c| today.max(c.date));
        if let Some(current) = current {
            if !self.needs_rotation(current, today) {
                return Ok(Decision {
                    handle: current.clone(),
                    rotated: false,
                    probe_failures: Vec::new(),
                });
            }
        }

        let mut probe_failures = Vec::new();
        let handle = self.acquire(store, directory, today, &mut probe_failures)?;
        Ok(Decision {
            rotated: current.map_or(true, |c| c.path() != handle.path()),
            handle,
            probe_failures,
        })
    }

    /// True if `current` may no longer be appended to on `today`.
    pub fn needs_rotation(&self, current: &LogFileHandle, today: NaiveDate) -> bool {
        !current.is_for(today) || current.size_bytes > self.max_file_bytes
    }

    fn acquire(
        &self,
        store: &dyn FileStore,
        directory: &Path,
        today: NaiveDate,
        probe_failures: &mut Vec<LogError>,
    ) -> Result<LogFileHandle, LogError> {
        let mut plain = LogFileHandle::new(directory, today, None);
        match self.probe(store, &plain, probe_failures)? {
            Some(len) if len > self.max_file_bytes => {}
            Some(len) => {
                plain.size_bytes = len;
                return Ok(plain);
            }
            None => return Ok(plain),
        }

        // Smallest suffix with no file behind it wins.
        for n in 1..=self.max_suffix {
            let candidate = LogFileHandle::new(directory, today, Some(n));
            if self.probe(store, &candidate, probe_failures)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(LogError::SuffixExhausted {
            date: today,
            limit: self.max_suffix,
        })
    }

    fn probe(
        &self,
        store: &dyn FileStore,
        handle: &LogFileHandle,
        probe_failures: &mut Vec<LogError>,
    ) -> Result<Option<u64>, LogError> {
        let path = handle.path();
        match store.probe(&path) {
            Ok(len) => Ok(len),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => {
                let err = LogError::RotationProbe { path, source };
                match self.on_probe_failure {
                    ProbeFailurePolicy::TreatAsAbsent => {
                        probe_failures.push(err);
                        Ok(None)
                    }
                    ProbeFailurePolicy::KeepCurrent => Err(err),
                }
            }
        }
    }
}

/// Every log file in `directory`, with sizes, ordered by (date, suffix).
///
/// Unrelated files are ignored. A missing directory yields an empty list.
pub fn list_log_files(
    store: &dyn FileStore,
    directory: &Path,
) -> io::Result<Vec<LogFileHandle>> {
    let names = match store.list(directory) {
        Ok(names) => names,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(err),
    };

    let mut files = Vec::new();
    for name in names {
        let Some(mut handle) = LogFileHandle::parse(directory, &name) else {
            continue;
        };
        match store.probe(&handle.path())? {
            Some(len) => handle.size_bytes = len,
            // Removed between listing and probing.
            None => continue,
        }
        files.push(handle);
    }
    files.sort_by_key(|h| (h.date, h.sequence));
    Ok(files)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsStore, MemoryStore};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MAX: u64 = 1024 * 1024;

    fn jan1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn dir() -> PathBuf {
        PathBuf::from("/logs")
    }

    fn policy() -> RotationPolicy {
        RotationPolicy::new(MAX, ProbeFailurePolicy::TreatAsAbsent)
    }

    fn name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn initial_acquisition_uses_plain_name_when_absent() {
        let store = MemoryStore::new();
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert!(decision.rotated);
        assert_eq!(decision.handle.file_name(), "events_log_2024-01-01.txt");
        assert_eq!(decision.handle.size_bytes, 0);
    }

    #[test]
    fn initial_acquisition_reuses_small_plain_file() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 10);
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(decision.handle.sequence, None);
        assert_eq!(decision.handle.size_bytes, 10);
    }

    #[test]
    fn plain_file_exactly_at_threshold_is_still_used() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), MAX as usize);
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(decision.handle.sequence, None);
    }

    #[test]
    fn oversized_plain_file_selects_first_suffix() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(decision.handle.file_name(), "events_log_2024-01-01_1.txt");
    }

    #[test]
    fn suffix_search_skips_existing_files() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        store.fill(dir().join("events_log_2024-01-01_1.txt"), 2 * MAX as usize);
        store.fill(dir().join("events_log_2024-01-01_2.txt"), 5);
        store.fill(dir().join("events_log_2024-01-01_4.txt"), 5);
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(name(&decision.handle.path()), "events_log_2024-01-01_3.txt");
    }

    #[test]
    fn current_under_threshold_same_day_is_kept() {
        let store = MemoryStore::new();
        let mut current = LogFileHandle::new(dir(), jan1(), None);
        current.size_bytes = MAX;
        let decision = policy()
            .decide(&store, &dir(), Some(&current), jan1())
            .unwrap();
        assert!(!decision.rotated);
        assert_eq!(decision.handle, current);
    }

    #[test]
    fn oversized_current_rotates() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), MAX as usize + 1);
        let mut current = LogFileHandle::new(dir(), jan1(), None);
        current.size_bytes = MAX + 1;
        let decision = policy()
            .decide(&store, &dir(), Some(&current), jan1())
            .unwrap();
        assert!(decision.rotated);
        assert_eq!(decision.handle.sequence, Some(1));
    }

    #[test]
    fn new_day_rotates_small_file() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 3);
        let mut current = LogFileHandle::new(dir(), jan1(), None);
        current.size_bytes = 3;
        let jan2 = jan1().succ_opt().unwrap();
        let decision = policy()
            .decide(&store, &dir(), Some(&current), jan2)
            .unwrap();
        assert!(decision.rotated);
        assert_eq!(decision.handle.file_name(), "events_log_2024-01-02.txt");
    }

    #[test]
    fn earlier_day_keeps_current_file() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        let jan2 = jan1().succ_opt().unwrap();
        let mut current = LogFileHandle::new(dir(), jan2, None);
        current.size_bytes = 40;

        let decision = policy()
            .decide(&store, &dir(), Some(&current), jan1())
            .unwrap();
        assert!(!decision.rotated);
        assert_eq!(decision.handle, current);
    }

    #[test]
    fn earlier_day_with_oversized_current_rotates_within_current_day() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        store.fill(dir().join("events_log_2024-01-02.txt"), MAX as usize + 1);
        let jan2 = jan1().succ_opt().unwrap();
        let mut current = LogFileHandle::new(dir(), jan2, None);
        current.size_bytes = MAX + 1;

        let decision = policy()
            .decide(&store, &dir(), Some(&current), jan1())
            .unwrap();
        assert_eq!(decision.handle.file_name(), "events_log_2024-01-02_1.txt");
    }

    #[test]
    fn deciding_twice_without_writes_is_idempotent() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        let mut current = LogFileHandle::new(dir(), jan1(), None);
        current.size_bytes = 2 * MAX;

        let first = policy()
            .decide(&store, &dir(), Some(&current), jan1())
            .unwrap();
        let second = policy()
            .decide(&store, &dir(), Some(&first.handle), jan1())
            .unwrap();
        assert!(first.rotated);
        assert!(!second.rotated);
        assert_eq!(first.handle, second.handle);

        let fresh_a = policy().decide(&store, &dir(), None, jan1()).unwrap();
        let fresh_b = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(fresh_a.handle, fresh_b.handle);
    }

    #[test]
    fn probe_failure_treated_as_absent_is_reported() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        store.fail_probe(dir().join("events_log_2024-01-01_1.txt"));
        let decision = policy().decide(&store, &dir(), None, jan1()).unwrap();
        assert_eq!(decision.handle.sequence, Some(1));
        assert_eq!(decision.probe_failures.len(), 1);
        assert!(matches!(
            decision.probe_failures[0],
            LogError::RotationProbe { .. }
        ));
    }

    #[test]
    fn probe_failure_with_keep_current_fails_rotation() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        store.fail_probe(dir().join("events_log_2024-01-01_1.txt"));
        let hardened = RotationPolicy::new(MAX, ProbeFailurePolicy::KeepCurrent);
        let err = hardened.decide(&store, &dir(), None, jan1()).unwrap_err();
        assert!(matches!(err, LogError::RotationProbe { .. }), "got: {err}");
    }

    #[test]
    fn suffix_search_terminates_at_cap() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-01.txt"), 2 * MAX as usize);
        for n in 1..=3 {
            store.fill(dir().join(format!("events_log_2024-01-01_{n}.txt")), 1);
        }
        let capped = policy().with_max_suffix(3);
        let err = capped.decide(&store, &dir(), None, jan1()).unwrap_err();
        assert!(matches!(err, LogError::SuffixExhausted { limit: 3, .. }), "got: {err}");
    }

    #[test]
    fn real_directory_oversized_file_selects_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("events_log_2024-01-01.txt"),
            vec![b'x'; 2 * MAX as usize],
        )
        .unwrap();
        let decision = policy().decide(&FsStore, tmp.path(), None, jan1()).unwrap();
        assert_eq!(decision.handle.path(), tmp.path().join("events_log_2024-01-01_1.txt"));
        assert!(!decision.handle.path().exists(), "decide must not create files");
    }

    #[test]
    fn list_orders_by_date_then_suffix() {
        let store = MemoryStore::new();
        store.fill(dir().join("events_log_2024-01-02.txt"), 1);
        store.fill(dir().join("events_log_2024-01-01_10.txt"), 2);
        store.fill(dir().join("events_log_2024-01-01_2.txt"), 3);
        store.fill(dir().join("events_log_2024-01-01.txt"), 4);
        store.fill(dir().join("daemon.log"), 5);

        let names: Vec<String> = list_log_files(&store, &dir())
            .unwrap()
            .iter()
            .map(|h| h.file_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "events_log_2024-01-01.txt",
                "events_log_2024-01-01_2.txt",
                "events_log_2024-01-01_10.txt",
                "events_log_2024-01-02.txt",
            ]
        );
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let files = list_log_files(&FsStore, &tmp.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }
}
