use crate::errors::{FriskError, FriskResult};
use crate::file::scan_file;
use crate::report::FileReport;
use crate::utils::config::Config;
use crate::walk::spawn_senders;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Entry point called by the CLI: scan `path` and print the report as JSON.
pub fn handle(path: &Path, config: &Config) -> FriskResult<()> {
    let now = Instant::now();
    let report = scan_directory(path, config)?;

    println!("{}", report.to_json()?);
    tracing::info!(
        files_with_findings = report.len(),
        "Finished in {:.3}s",
        now.elapsed().as_secs_f32()
    );
    Ok(())
}

// --------------------------------------------------------------------------------------------
// Scanning helpers
// --------------------------------------------------------------------------------------------

/// Walk `root`, scan every source file and build the sparse report.
pub fn scan_directory(root: &Path, cfg: &Config) -> FriskResult<FileReport> {
    if !root.exists() {
        return Err(FriskError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        // a file root has no children to glob, so nothing is scanned
        tracing::debug!("{} is not a directory", root.display());
        return Ok(FileReport::new());
    }
    // an unlistable root is fatal; unlistable subdirectories are only skipped
    std::fs::read_dir(root)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.performance.workers())
        .build()?;

    let rx = spawn_senders(root, cfg);
    let scanned: Vec<_> = pool.install(|| {
        rx.into_iter()
            .flatten()
            .par_bridge()
            .map(|path| {
                let findings = scan_file(&path);
                (path.to_string_lossy().into_owned(), findings)
            })
            .collect()
    });

    // single writer
    let total = scanned.len();
    let mut report = FileReport::new();
    for (path, findings) in scanned {
        report.record(path, findings);
    }
    tracing::debug!("scanned {total} files, {} with findings", report.len());
    Ok(report)
}

#[cfg(test)]
fn write(root: &Path, rel: &str, body: &str) -> String {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn only_the_offending_file_is_reported() {
    use crate::report::Finding;

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "clean.py", "import os\nprint(os.name)\n");
    let bad = write(dir.path(), "bad.py", "x = input()\neval(x)\n");

    let report = scan_directory(dir.path(), &Config::default()).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(
        report.get(&bad),
        Some(&[Finding::new(2, "Use of dangerous call: eval()")][..])
    );
}

#[test]
fn broken_files_do_not_stop_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(dir.path(), "a/broken.py", "def f(:\n");
    let bad = write(dir.path(), "b/bad.py", "exec(code)\n");

    let report = scan_directory(dir.path(), &Config::default()).unwrap();
    assert_eq!(report.len(), 2);

    let broken = report.get(&broken).unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].line(), -1);
    assert!(broken[0].message().starts_with("Parse error: "));

    assert_eq!(report.get(&bad).unwrap()[0].message(), "Use of dangerous call: exec()");
}

#[test]
fn clean_tree_gives_an_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.py", "a = 1\n");
    write(dir.path(), "two/three.py", "def f():\n    return 2\n");
    write(dir.path(), "notes.txt", "eval(x)\n");

    let report = scan_directory(dir.path(), &Config::default()).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.to_json().unwrap(), "{}");
}

#[test]
fn scanning_twice_gives_the_same_report() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        write(dir.path(), &format!("m{i}/mod.py"), "token = 'x'\nq = 'a' + b\n");
    }
    write(dir.path(), "broken.py", "if True\n");

    let first = scan_directory(dir.path(), &Config::default()).unwrap();
    let second = scan_directory(dir.path(), &Config::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 13);
}

#[test]
fn keys_keep_the_root_as_given() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pkg/app.py", "eval(x)\n");

    let report = scan_directory(dir.path(), &Config::default()).unwrap();
    let expected = dir.path().join("pkg").join("app.py");
    assert_eq!(report.paths().collect::<Vec<_>>(), vec![expected.to_str().unwrap()]);
}

#[test]
fn file_root_yields_an_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "only.py", "api_token = 'abc'\n");

    let report = scan_directory(Path::new(&file), &Config::default()).unwrap();
    assert!(report.is_empty());
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = scan_directory(&dir.path().join("nope"), &Config::default()).unwrap_err();
    assert!(matches!(err, FriskError::RootNotFound(_)));
}
