use crossbeam_channel::{bounded, Receiver, Sender};
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::{
    mem,
    path::{Path, PathBuf},
    thread,
};

use crate::utils::{has_source_ext, Config};

pub type Batch = Vec<PathBuf>;

struct Batcher {
    tx:    Sender<Batch>,
    batch: Batch,
    limit: usize,
}
impl Batcher {
    fn push(&mut self, p: PathBuf) {
        self.batch.push(p);
        if self.batch.len() >= self.limit {
            self.flush();
        }
    }
    fn flush(&mut self) {
        if !self.batch.is_empty() {
            let _ = self.tx.send(mem::take(&mut self.batch));
        }
    }
}
impl Drop for Batcher {
    fn drop(&mut self) { self.flush(); }
}

// ---------------------------------------------------------------------------
/// Walk `root` on a background thread and send *batches* of source-file
/// paths through the returned channel. The channel closes when the walk ends.
pub fn spawn_senders(root: &Path, cfg: &Config) -> Receiver<Batch> {
    // ----- 1  channel & thread pool parameters -----------------------------
    let workers     = cfg.performance.workers();
    let batch_size  = cfg.performance.batch_size.max(1);
    let (tx, rx)    = bounded::<Batch>(workers * cfg.performance.channel_multiplier.max(1));

    let root        = root.to_path_buf();
    let extensions  = cfg.scanner.extensions.clone();
    let scan_hidden = cfg.scanner.scan_hidden_files;
    let follow      = cfg.scanner.follow_symlinks;

    // ----- 2  the background walker thread ---------------------------------
    thread::spawn(move || {
        WalkBuilder::new(root)
          .standard_filters(false)
          .hidden(!scan_hidden)
          .follow_links(follow)
          .threads(workers)
          .build_parallel()
          .run(move || {
              let mut b = Batcher {
                  tx:    tx.clone(),
                  batch: Vec::with_capacity(batch_size),
                  limit: batch_size,
              };
              let extensions = extensions.clone();

              Box::new(move |entry| {
                  let entry = match entry {
                      Ok(e) => e,
                      Err(e) => {
                          tracing::warn!("skipping unreadable entry: {e}");
                          return WalkState::Continue;
                      }
                  };
                  if !is_regular_file(&entry) || !has_source_ext(entry.path(), &extensions) {
                      return WalkState::Continue;
                  }

                  tracing::trace!("sending {:?}", entry.path());
                  b.push(entry.into_path());
                  WalkState::Continue
              })
          });
    });

    rx
}

/// Regular files, plus links that resolve to one. Linked directories are
/// reported as links and never descended into.
fn is_regular_file(entry: &DirEntry) -> bool {
    if entry.path_is_symlink() {
        return match std::fs::metadata(entry.path()) {
            Ok(m) => m.is_file(),
            Err(e) => {
                tracing::debug!("dangling link {:?}: {e}", entry.path());
                false
            }
        };
    }
    entry.file_type().is_some_and(|ft| ft.is_file())
}

#[cfg(test)]
fn collect(root: &Path, cfg: &Config) -> Vec<PathBuf> {
    let mut all: Vec<_> = spawn_senders(root, cfg).into_iter().flatten().collect();
    all.sort();
    all
}

#[test]
fn finds_nested_and_hidden_sources_only() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("pkg/sub")).unwrap();
    std::fs::create_dir_all(root.join(".hidden")).unwrap();
    for f in ["a.py", "pkg/b.py", "pkg/sub/c.py", ".hidden/d.py", "readme.md", "pkg/e.pyc"] {
        std::fs::write(root.join(f), "x = 1\n").unwrap();
    }

    let found = collect(root, &Config::default());
    let mut expected = vec![
        root.join(".hidden/d.py"),
        root.join("a.py"),
        root.join("pkg/b.py"),
        root.join("pkg/sub/c.py"),
    ];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn gitignore_is_not_honoured_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir(root.join(".git")).unwrap();
    std::fs::write(root.join(".gitignore"), "ignored.py\n").unwrap();
    std::fs::write(root.join("ignored.py"), "x = 1\n").unwrap();

    assert_eq!(collect(root, &Config::default()), vec![root.join("ignored.py")]);
}

#[cfg(unix)]
#[test]
fn linked_files_are_found_but_linked_dirs_are_not_entered() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir(root.join("real")).unwrap();
    std::fs::write(root.join("real/bad.py"), "eval(x)\n").unwrap();
    std::fs::write(outside.path().join("target.py"), "exec(y)\n").unwrap();
    std::fs::create_dir(outside.path().join("pkg")).unwrap();
    std::fs::write(outside.path().join("pkg/inner.py"), "x = 1\n").unwrap();

    symlink(outside.path().join("target.py"), root.join("linked.py")).unwrap();
    symlink(outside.path().join("pkg"), root.join("linked_pkg")).unwrap();
    symlink(outside.path().join("missing.py"), root.join("dangling.py")).unwrap();

    assert_eq!(
        collect(root, &Config::default()),
        vec![root.join("linked.py"), root.join("real/bad.py")]
    );
}

#[test]
fn many_files_arrive_in_several_batches() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..20 {
        std::fs::write(dir.path().join(format!("m{i}.py")), "").unwrap();
    }
    let mut cfg = Config::default();
    cfg.performance.batch_size = 3;

    let batches: Vec<Batch> = spawn_senders(dir.path(), &cfg).into_iter().collect();
    assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= 3));
    assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 20);
}
