/// Which files the walker hands to the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// File extensions treated as source files, compared case-sensitively.
    pub extensions: Vec<String>,

    /// Whether to follow symlinks or not.
    pub follow_symlinks: bool,

    /// Whether to scan hidden files or not.
    pub scan_hidden_files: bool,
}
impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_owned()],
            follow_symlinks: false,
            scan_hidden_files: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceConfig {
    /// The maximum number of worker threads to use, or `None` to auto-detect.
    pub worker_threads: Option<usize>,

    /// Paths per message sent from the walker.
    pub batch_size: usize,

    /// capacity = threads × this
    pub channel_multiplier: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            batch_size: 8,
            channel_multiplier: 4,
        }
    }
}

impl PerformanceConfig {
    pub fn workers(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub performance: PerformanceConfig,
}

#[test]
fn defaults_behave_like_a_plain_recursive_glob() {
    let cfg = Config::default();
    assert_eq!(cfg.scanner.extensions, vec!["py"]);
    assert!(cfg.scanner.scan_hidden_files);
    assert!(!cfg.scanner.follow_symlinks);
    assert!(cfg.performance.workers() >= 1);
}

#[test]
fn explicit_worker_count_wins_and_zero_is_clamped() {
    let mut perf = PerformanceConfig::default();
    perf.worker_threads = Some(2);
    assert_eq!(perf.workers(), 2);
    perf.worker_threads = Some(0);
    assert_eq!(perf.workers(), 1);
}
