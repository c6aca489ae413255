//! Source tree scanner
//!
//! Walks the configured roots and feeds every qualifying file through the
//! nugget parser into one shared [`Aggregator`]:
//! - Black-listed directory prefixes are pruned (case-insensitive)
//! - White-list rules match exact file names or `*.ext` wildcards
//! - Over-long paths and unreadable files are logged and skipped
//! - Files are parsed in parallel; only the catalog is shared

use crate::catalog::{Aggregator, Catalog};
use crate::config::Settings;
use crate::error::{FileError, FileResult, ScanError, ScanResult};
use crate::file_handler::io::read_source_file;
use crate::nugget::NuggetParser;
use crate::utils::{path, text};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::{DirEntry, WalkDir};

/// A white-list rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeRule {
    /// Exact file name, e.g. `Web.config`
    FileName(String),
    /// Extension without the dot, from `*.cshtml`
    Extension(String),
}

impl IncludeRule {
    pub fn parse(rule: &str) -> Self {
        match rule.strip_prefix("*.") {
            Some(ext) => IncludeRule::Extension(ext.to_string()),
            None => IncludeRule::FileName(rule.to_string()),
        }
    }

    /// Case-sensitive match against the file name or its final extension
    pub fn matches(&self, file: &Path) -> bool {
        match self {
            IncludeRule::FileName(name) => file
                .file_name()
                .is_some_and(|n| n.to_string_lossy() == name.as_str()),
            // Text after the last dot, so `.gitignore` has extension `gitignore`.
            IncludeRule::Extension(ext) => file.file_name().is_some_and(|n| {
                n.to_string_lossy()
                    .rsplit_once('.')
                    .is_some_and(|(_, e)| e == ext.as_str())
            }),
        }
    }
}

/// A black-list rule: an absolute directory prefix. A rule ending in a
/// separator only matches that directory and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeRule(String);

impl ExcludeRule {
    pub fn new(dir: &Path) -> Self {
        Self(dir.to_string_lossy().into_owned())
    }

    /// Whether `dir` starts with this prefix, ignoring ASCII case
    pub fn matches(&self, dir: &Path) -> bool {
        let dir = path::with_trailing_separator(dir.to_path_buf());
        text::starts_with_ignore_case(&dir.to_string_lossy(), &self.0)
    }
}

/// Counters for a finished scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files enumerated under the roots, excluded directories not counted
    pub files_seen: usize,
    /// Files that matched the white list and were parsed
    pub files_parsed: usize,
    /// Files skipped for length, size or read errors
    pub files_skipped: usize,
    /// Directories pruned by the black list
    pub dirs_excluded: usize,
    /// Nuggets handed to the aggregator
    pub nuggets_found: usize,
    /// Total scan time in milliseconds
    pub scan_time_ms: u64,
}

/// Result of a complete scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub catalog: Catalog,
    pub stats: ScanStats,
}

/// Scanner over a resolved set of settings
#[derive(Debug)]
pub struct SourceScanner {
    parser: NuggetParser,
    roots: Vec<PathBuf>,
    include: Vec<IncludeRule>,
    exclude: Vec<ExcludeRule>,
    project_dir: Option<PathBuf>,
    context_from_comment: bool,
    index_empty_msgids: bool,
    max_path_len: usize,
    max_file_size: u64,
}

impl SourceScanner {
    /// Build a scanner; invalid tokens are reported here, before any I/O.
    pub fn new(settings: &Settings) -> ScanResult<Self> {
        let tokens = settings.tokens()?;
        let settings = settings.resolved();

        let mut roots = settings.directories_to_scan;
        roots.dedup();

        Ok(Self {
            parser: NuggetParser::new(tokens),
            roots,
            include: settings.white_list.iter().map(|r| IncludeRule::parse(r)).collect(),
            exclude: settings.black_list.iter().map(|d| ExcludeRule::new(d)).collect(),
            project_dir: settings.project_dir,
            context_from_comment: settings.message_context_enabled_from_comment,
            index_empty_msgids: settings.index_empty_msgids,
            max_path_len: settings.max_path_len,
            max_file_size: settings.max_file_size,
        })
    }

    pub fn parser(&self) -> &NuggetParser {
        &self.parser
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Scan every root and build the catalog
    pub fn scan(&self) -> ScanResult<ScanOutcome> {
        let start = std::time::Instant::now();

        if let Some(missing) = self.roots.iter().find(|r| !r.is_dir()) {
            return Err(ScanError::RootNotFound(missing.clone()));
        }

        let mut stats = ScanStats::default();
        let files = self.collect_files(&mut stats);

        let aggregator =
            Aggregator::new(self.context_from_comment).with_empty_msgids(self.index_empty_msgids);
        let parsed = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let nuggets = AtomicUsize::new(0);

        files
            .par_iter()
            .for_each(|file| match self.parse_file(file, &aggregator) {
                Ok(count) => {
                    parsed.fetch_add(1, Ordering::Relaxed);
                    nuggets.fetch_add(count, Ordering::Relaxed);
                }
                Err(e) => {
                    log::warn!("Skipping file: {}", e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
            });

        stats.files_parsed = parsed.into_inner();
        stats.files_skipped += skipped.into_inner();
        stats.nuggets_found = nuggets.into_inner();
        stats.scan_time_ms = start.elapsed().as_millis() as u64;

        let catalog = aggregator.into_catalog();
        log::info!(
            "Scanned {} file(s), parsed {}, skipped {}: {} nugget(s) in {} catalog entries ({} ms)",
            stats.files_seen,
            stats.files_parsed,
            stats.files_skipped,
            stats.nuggets_found,
            catalog.len(),
            stats.scan_time_ms
        );

        Ok(ScanOutcome { catalog, stats })
    }

    /// Enumerate the files to parse, applying path length, black list and
    /// white list rules. Files reachable from several roots appear once.
    fn collect_files(&self, stats: &mut ScanStats) -> Vec<PathBuf> {
        let mut files = BTreeSet::new();
        let mut dirs_excluded = 0;

        for root in &self.roots {
            let walker = WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| {
                    let keep = self.should_enter(e);
                    if !keep {
                        log::debug!("Excluded directory {}", e.path().display());
                        dirs_excluded += 1;
                    }
                    keep
                });

            for entry in walker {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        let err = FileError::WalkError {
                            root: root.clone(),
                            message: e.to_string(),
                        };
                        log::warn!("{}", err);
                        stats.files_skipped += 1;
                        continue;
                    }
                };

                if entry.file_type().is_dir() {
                    continue;
                }
                stats.files_seen += 1;

                let file = entry.path();
                if let Err(e) = self.check_path_len(file) {
                    log::warn!("{}", e);
                    stats.files_skipped += 1;
                    continue;
                }
                if self.is_excluded(file) {
                    continue;
                }
                if self.include.iter().any(|rule| rule.matches(file)) {
                    files.insert(file.to_path_buf());
                }
            }
        }

        stats.dirs_excluded = dirs_excluded;
        files.into_iter().collect()
    }

    /// Directory filter for the walker; files always pass
    fn should_enter(&self, entry: &DirEntry) -> bool {
        !entry.file_type().is_dir() || !self.exclude.iter().any(|rule| rule.matches(entry.path()))
    }

    /// Whether the file's containing directory is black-listed
    pub fn is_excluded(&self, file: &Path) -> bool {
        match path::absolute(file).parent() {
            Some(dir) => self.exclude.iter().any(|rule| rule.matches(dir)),
            None => true,
        }
    }

    fn check_path_len(&self, file: &Path) -> FileResult<()> {
        let len = file.as_os_str().len();
        if len > self.max_path_len {
            return Err(FileError::PathTooLong {
                path: file.to_path_buf(),
                len,
                max: self.max_path_len,
            });
        }
        Ok(())
    }

    /// Read and parse one file, returning the number of nuggets recorded
    pub fn parse_file(&self, file: &Path, aggregator: &Aggregator) -> FileResult<usize> {
        let source = read_source_file(file, self.max_file_size)?;
        let reference = path::reference_path(file, self.project_dir.as_deref());
        log::debug!("Parsing {}", file.display());
        Ok(self.parse_content(&reference, &source.content, aggregator))
    }

    /// Parse text already in memory, recording each nugget under `reference`
    pub fn parse_content(&self, reference: &str, content: &str, aggregator: &Aggregator) -> usize {
        let mut recorded = 0;
        for (nugget, offset) in self.parser.parse(content) {
            let line = text::line_from_pos(content, offset);
            if aggregator.add_occurrence(reference, line, &nugget) {
                recorded += 1;
            }
        }
        recorded
    }
}

/// Scan with the given settings on the calling thread
pub fn scan(settings: &Settings) -> ScanResult<ScanOutcome> {
    SourceScanner::new(settings)?.scan()
}

/// Scan on a blocking worker thread
pub async fn scan_async(settings: Settings) -> ScanResult<ScanOutcome> {
    tokio::task::spawn_blocking(move || scan(&settings))
        .await
        .map_err(|e| ScanError::TaskFailed(e.to_string()))?
}
