use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::loader::load_dataset;
use super::model::{AdmissionDetailRecord, AdmissionRecord, AssessmentRecord, Dataset, Record};
use crate::config::AppConfig;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Cached source
// ---------------------------------------------------------------------------

/// One backing file, loaded at most once.
///
/// The outcome is memoized, a failure included: a file that appears on disk
/// later is only picked up after [`DataStore::reload`].
pub struct Cached<T> {
    path: PathBuf,
    cell: OnceLock<Result<Arc<Dataset<T>>, LoadError>>,
}

impl<T: Record> Cached<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<Arc<Dataset<T>>, LoadError> {
        self.cell
            .get_or_init(|| {
                load_dataset::<T>(&self.path)
                    .map(Arc::new)
                    .inspect_err(|e| log::error!("{e}"))
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

// ---------------------------------------------------------------------------
// DataStore – the three read-only sources
// ---------------------------------------------------------------------------

/// Read-only handle over every data file the pages use.
///
/// Owned by the app and passed by reference; nothing in here changes after a
/// source is first loaded.
pub struct DataStore {
    data_dir: PathBuf,
    /// General track, multi-year, one row per group.
    pub trend: Cached<AdmissionRecord>,
    /// General track, latest year, one row per major.
    pub detail: Cached<AdmissionDetailRecord>,
    /// Comprehensive-assessment track, one row per major.
    pub assessment: Cached<AssessmentRecord>,
}

impl DataStore {
    pub fn new(config: &AppConfig) -> Self {
        let dir = &config.data_dir;
        Self {
            data_dir: dir.clone(),
            trend: Cached::new(dir.join(&config.trend_file)),
            detail: Cached::new(dir.join(&config.detail_file)),
            assessment: Cached::new(dir.join(&config.assessment_file)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Drop every memoized outcome; the next access reads from disk again.
    pub fn reload(&mut self) {
        log::info!("Invalidating cached data under {}", self.data_dir.display());
        self.trend = Cached::new(self.trend.path.clone());
        self.detail = Cached::new(self.detail.path.clone());
        self.assessment = Cached::new(self.assessment.path.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn missing_source_is_memoized_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DataStore::new(&config(dir.path()));

        assert!(!store.trend.is_loaded());
        assert!(store.trend.get().unwrap_err().is_not_found());
        assert!(store.trend.is_loaded());

        std::fs::write(
            store.trend.path(),
            "year,university_name,group_code,group_name,major_list,admission_score,admission_rank\n\
             2024,A,01,A01,x,600,100\n",
        )
        .unwrap();
        // Still the memoized failure.
        assert!(store.trend.get().is_err());

        store.reload();
        assert_eq!(store.trend.get().unwrap().len(), 1);
    }

    #[test]
    fn successive_gets_share_one_load() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        std::fs::write(
            dir.path().join(&cfg.assessment_file),
            "year,university_name,major_name,lowest_rank\n2024,A,m,10\n",
        )
        .unwrap();
        let store = DataStore::new(&cfg);
        let a = store.assessment.get().unwrap();
        let b = store.assessment.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
