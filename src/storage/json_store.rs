//! JSON-based scan history.
//!
//! Stores each report as a separate JSON file named by its scan ID.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::report::ScanReport;
use crate::types::ScanId;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// JSON file-based report storage.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store in the default data directory.
    pub fn new() -> StorageResult<Self> {
        let paths = Paths::get()?;
        Self::open(paths.scans_dir())
    }

    /// Open the store in a specific directory, creating it if needed.
    pub fn open(scans_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = scans_dir.into();
        fs::create_dir_all(&scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { scans_dir })
    }

    /// Save a report.
    pub fn save(&self, report: &ScanReport) -> StorageResult<PathBuf> {
        let file = self.scan_file(&report.id());
        let content = serde_json::to_string_pretty(report)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        debug!(path = %file.display(), "saved scan");
        Ok(file)
    }

    /// Load a report by ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanReport> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a report by ID prefix, such as the short form printed after a scan.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ScanReport> {
        let prefix = prefix.trim().to_ascii_lowercase();
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(prefix)),
            [id] => self.load(id),
            _ => Err(StorageError::AmbiguousPrefix {
                prefix,
                matches: matches.len(),
            }),
        }
    }

    /// List all stored scan IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let path = entry
                .map_err(|e| StorageError::DirectoryError(e.to_string()))?
                .path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_string_lossy().parse::<ScanId>().ok())
                {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    /// The most recent `count` reports, newest first. Unreadable files are skipped.
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanReport>> {
        let mut reports: Vec<ScanReport> = self
            .list_ids()?
            .iter()
            .filter_map(|id| match self.load(id) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(%id, error = %e, "skipping unreadable scan");
                    None
                }
            })
            .collect();

        reports.sort_by(|a, b| b.started_at().cmp(&a.started_at()));
        reports.truncate(count);
        Ok(reports)
    }

    fn scan_file(&self, id: &ScanId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;
    use crate::scanner::{PortResult, PortState};
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn report(ports: &[u16]) -> ScanReport {
        let target = ScanTarget::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let mut builder = ReportBuilder::new(target, ports.len());
        for &p in ports {
            builder.record(PortResult::new(
                Port::new(p).unwrap(),
                PortState::Closed,
                Duration::from_millis(1),
            ));
        }
        builder.finish(false)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path().join("scans")).unwrap();
        let report = report(&[22, 80]);

        store.save(&report).unwrap();
        let loaded = store.load(&report.id()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.target(), report.target());
    }

    #[test]
    fn test_find_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        let report = report(&[443]);
        store.save(&report).unwrap();

        let found = store.find_by_prefix(&report.id().short()).unwrap();
        assert_eq!(found.id(), report.id());
        assert!(matches!(
            store.find_by_prefix("zzzz"),
            Err(StorageError::ScanNotFound(_))
        ));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        store.save(&report(&[1])).unwrap();
        store.save(&report(&[2])).unwrap();

        assert!(matches!(
            store.find_by_prefix(""),
            Err(StorageError::AmbiguousPrefix { matches: 2, .. })
        ));
    }

    #[test]
    fn test_list_recent_skips_junk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        let first = report(&[1]);
        store.save(&first).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let second = report(&[2]);
        store.save(&second).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join(format!("{}.json", ScanId::new())), "{").unwrap();

        let recent = store.list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id(), second.id());

        assert_eq!(store.list_recent(1).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load(&ScanId::new()),
            Err(StorageError::ScanNotFound(_))
        ));
    }
}
