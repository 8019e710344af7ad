//! Directory-driven intake run: read bundles, link patients, write bundles

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use linkage_core::{Bundle, LinkOptions, Salt, link_bundle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::report::{BundleIssue, BundleReport, BundleStatus, RunReport};

/// Run the pipeline over every bundle file in `config.input_dir`.
///
/// Bundle-level problems (unreadable file, invalid JSON, rejected bundle)
/// are recorded in the report and do not stop the run. Only errors that
/// affect the whole run, such as an unreadable input directory, are
/// returned as `Err`.
pub async fn run(config: &Config) -> Result<RunReport, AppError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let span = tracing::info_span!("run", run_id = %run_id);

    let bundles = async {
        let files = list_bundle_files(&config.input_dir).await?;
        tracing::info!(
            input_dir = %config.input_dir.display(),
            files = files.len(),
            workers = config.workers,
            "Starting linkage run"
        );

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|e| AppError::io(&config.output_dir, e))?;
        let removed = remove_stale_temp_files(&config.output_dir).await?;
        if removed > 0 {
            tracing::warn!(removed, "Removed temporary files left by an interrupted run");
        }

        let permits = Arc::new(Semaphore::new(config.workers));
        let mut tasks = JoinSet::new();

        for path in files {
            let permits = Arc::clone(&permits);
            let salt = config.salt.clone();
            let options = config.link_options;
            let output_dir = config.output_dir.clone();

            tasks.spawn(
                async move {
                    let _permit = permits.acquire_owned().await;
                    process_bundle(&path, &output_dir, &salt, &options).await
                }
                .in_current_span(),
            );
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            reports.push(joined?);
        }
        reports.sort_by(|a, b| a.file.cmp(&b.file));
        Ok::<_, AppError>(reports)
    }
    .instrument(span.clone())
    .await?;

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        bundles,
    };

    span.in_scope(|| {
        tracing::info!(
            bundles = report.bundles.len(),
            linked = report.count(BundleStatus::Linked),
            partial = report.count(BundleStatus::Partial),
            failed = report.count(BundleStatus::Failed),
            patients_linked = report.patients_linked(),
            "Linkage run complete"
        );
    });

    if let Some(path) = &config.report_path {
        write_atomic(path, &serde_json::to_vec_pretty(&report)?).await?;
    }

    Ok(report)
}

/// List `*.json` files in a directory, sorted by file name
pub async fn list_bundle_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::io(dir, e))? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| AppError::io(&path, e))?
            .is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete `*.json.tmp` files that a previous run left behind when it was
/// stopped between write and rename.
async fn remove_stale_temp_files(dir: &Path) -> Result<usize, AppError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::io(dir, e))?;

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::io(dir, e))? {
        let path = entry.path();
        let is_temp = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".json.tmp"));
        if is_temp {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::io(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Link one bundle file and write the result under `output_dir`.
async fn process_bundle(
    path: &Path,
    output_dir: &Path,
    salt: &Salt,
    options: &LinkOptions,
) -> BundleReport {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match link_file(path, &output_dir.join(&file), salt, options).await {
        Ok(report) => {
            let status = if report.is_clean() {
                BundleStatus::Linked
            } else {
                BundleStatus::Partial
            };
            for failure in &report.failures {
                tracing::warn!(
                    file = %file,
                    entry_index = failure.entry_index,
                    error = %failure.error,
                    "Patient skipped"
                );
            }
            tracing::info!(
                file = %file,
                patients_linked = report.linked,
                skipped = report.failures.len(),
                "Bundle linked"
            );
            BundleReport {
                file,
                status,
                patients_linked: report.linked,
                issues: report.failures.iter().map(BundleIssue::from).collect(),
            }
        }
        Err(e) => {
            tracing::warn!(
                file = %file,
                entry_index = e.entry_index(),
                error = %e,
                "Bundle rejected"
            );
            BundleReport::failed(file, e.entry_index(), e.to_outcome())
        }
    }
}

async fn link_file(
    input: &Path,
    output: &Path,
    salt: &Salt,
    options: &LinkOptions,
) -> Result<linkage_core::LinkReport, AppError> {
    let bytes = tokio::fs::read(input)
        .await
        .map_err(|e| AppError::io(input, e))?;
    let mut bundle: Bundle = serde_json::from_slice(&bytes)?;

    let report = link_bundle(&mut bundle, salt, options)?;

    write_atomic(output, &serde_json::to_vec_pretty(&bundle)?).await?;
    Ok(report)
}

/// Write to a sibling temporary file, then rename into place.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| AppError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("linkage-pipeline-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn lists_only_json_files_sorted() {
        let dir = scratch_dir();
        for name in ["b.json", "a.json", "notes.txt"] {
            std::fs::write(dir.join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.join("nested.json")).unwrap();

        let files = list_bundle_files(&dir).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn missing_input_dir_is_an_error() {
        let dir = std::env::temp_dir().join(format!("linkage-missing-{}", Uuid::new_v4()));
        assert!(matches!(
            list_bundle_files(&dir).await,
            Err(AppError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_file() {
        let dir = scratch_dir();
        let target = dir.join("out.json");
        write_atomic(&target, b"{}").await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
        assert!(!dir.join("out.json.tmp").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn stale_temp_files_are_removed() {
        let dir = scratch_dir();
        std::fs::write(dir.join("a.json.tmp"), "{").unwrap();
        std::fs::write(dir.join("b.json"), "{}").unwrap();
        std::fs::write(dir.join("notes.tmp"), "keep").unwrap();

        assert_eq!(remove_stale_temp_files(&dir).await.unwrap(), 1);
        assert!(!dir.join("a.json.tmp").exists());
        assert!(dir.join("b.json").exists());
        assert!(dir.join("notes.tmp").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
