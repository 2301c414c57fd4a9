//! Persistence of trial and aggregated results as JSON files.
//!
//! Layout: `<root>/<results_key>/<algorithm_slug>/rep_<i>.json` for trials and
//! `<root>/<results_key>/<algorithm_slug>/results.json` once aggregated.
use crate::errors::{Result, RunnerError};
use crate::results::{AggregatedResult, TrialResult};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const AGGREGATED_FILENAME: &str = "results.json";

/// File system friendly version of an algorithm name: `SBO(y-dist)` gives `SBO_y-dist`
pub fn algorithm_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    slug.trim_matches('_').to_string()
}

/// Results folder of one experiment run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsStore {
    root: PathBuf,
    results_key: String,
}

impl ResultsStore {
    /// Results of `results_key` stored under `root`
    pub fn new<P: AsRef<Path>>(root: P, results_key: &str) -> Self {
        ResultsStore {
            root: root.as_ref().to_path_buf(),
            results_key: results_key.to_string(),
        }
    }

    /// Results key
    pub fn results_key(&self) -> &str {
        &self.results_key
    }

    /// Folder holding all the results of the run
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.results_key)
    }

    /// Folder holding the results of an algorithm
    pub fn algorithm_dir(&self, algorithm_name: &str) -> PathBuf {
        self.dir().join(algorithm_slug(algorithm_name))
    }

    /// Path of the trial artifact of a repetition
    pub fn trial_path(&self, algorithm_name: &str, repeat_idx: usize) -> PathBuf {
        self.algorithm_dir(algorithm_name)
            .join(format!("rep_{repeat_idx}.json"))
    }

    /// Path of the aggregated artifact of an algorithm
    pub fn aggregated_path(&self, algorithm_name: &str) -> PathBuf {
        self.algorithm_dir(algorithm_name).join(AGGREGATED_FILENAME)
    }

    /// Removes previous artifacts of an algorithm
    pub fn reset(&self, algorithm_name: &str) -> Result<()> {
        let dir = self.algorithm_dir(algorithm_name);
        if dir.exists() {
            debug!("Remove previous results in {dir:?}");
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Saves a trial result in its own file
    pub fn save_trial(&self, trial: &TrialResult) -> Result<PathBuf> {
        let path = self.trial_path(&trial.algorithm_name, trial.repeat_idx);
        save_json(&path, trial)?;
        Ok(path)
    }

    /// Loads a trial result
    pub fn load_trial(&self, algorithm_name: &str, repeat_idx: usize) -> Result<TrialResult> {
        load_json(algorithm_name, &self.trial_path(algorithm_name, repeat_idx))
    }

    /// Loads all the trial results of an algorithm ordered by repetition index
    pub fn load_trials(&self, algorithm_name: &str) -> Result<Vec<TrialResult>> {
        let mut trials = Vec::new();
        while self.trial_path(algorithm_name, trials.len()).exists() {
            trials.push(self.load_trial(algorithm_name, trials.len())?);
        }
        if trials.is_empty() {
            return Err(RunnerError::MissingResults {
                name: algorithm_name.to_string(),
                path: self.trial_path(algorithm_name, 0),
            });
        }
        Ok(trials)
    }

    /// Saves the aggregated results of an algorithm
    pub fn save_aggregated(&self, result: &AggregatedResult) -> Result<PathBuf> {
        let path = self.aggregated_path(&result.algorithm_name);
        save_json(&path, result)?;
        Ok(path)
    }

    /// Loads the aggregated results of an algorithm
    pub fn load_aggregated(&self, algorithm_name: &str) -> Result<AggregatedResult> {
        load_json(algorithm_name, &self.aggregated_path(algorithm_name))
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let out_json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, out_json)?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(name: &str, path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(RunnerError::MissingResults {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Snapshot;
    use serial_test::serial;

    const TEST_DIR: &str = "target/test_storage";

    fn trial(repeat_idx: usize) -> TrialResult {
        TrialResult {
            algorithm_name: "SBO(y-dist)".to_string(),
            repeat_idx,
            seed: repeat_idx as u64,
            snapshots: vec![Snapshot {
                n_eval: 5,
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_algorithm_slug() {
        assert_eq!(algorithm_slug("SBO(y-dist)"), "SBO_y-dist");
        assert_eq!(algorithm_slug("DOE"), "DOE");
    }

    #[test]
    #[serial]
    fn test_save_load() {
        let store = ResultsStore::new(TEST_DIR, "save_load");
        assert_eq!(store.results_key(), "save_load");
        store.reset("SBO(y-dist)").unwrap();
        let path = store.save_trial(&trial(0)).unwrap();
        assert!(path.ends_with("save_load/SBO_y-dist/rep_0.json"));
        store.save_trial(&trial(1)).unwrap();
        let trials = store.load_trials("SBO(y-dist)").unwrap();
        assert_eq!(trials, vec![trial(0), trial(1)]);

        let agg = AggregatedResult::from_trials(&trials).unwrap();
        store.save_aggregated(&agg).unwrap();
        assert_eq!(store.load_aggregated("SBO(y-dist)").unwrap(), agg);
    }

    #[test]
    #[serial]
    fn test_missing_results() {
        let store = ResultsStore::new(TEST_DIR, "missing");
        store.reset("DOE").unwrap();
        assert!(matches!(
            store.load_aggregated("DOE"),
            Err(RunnerError::MissingResults { .. })
        ));
        assert!(matches!(
            store.load_trials("DOE"),
            Err(RunnerError::MissingResults { .. })
        ));
    }
}
