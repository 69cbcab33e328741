// ============================================================================
// resolver.rs — Source logo discovery
// ============================================================================
//
// A resolver either yields a path inside the workspace root or nothing.
// Strategies are chained: listed file names first (priority order), then
// the most recently modified file matching a pattern such as `*.png`.
// ============================================================================

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use glob::{MatchOptions, Pattern};

use crate::config::GeneratorConfig;
use crate::error::{IconError, IconResult};

/// How the source was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    Listed,
    Newest,
}

#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub discovery: Discovery,
    pub modified: Option<SystemTime>,
}

impl ResolvedSource {
    fn at(path: PathBuf, discovery: Discovery) -> Self {
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            path,
            discovery,
            modified,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Local modification time, e.g. `2024-05-01 12:30:00`.
    pub fn modified_display(&self) -> Option<String> {
        self.modified
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

pub trait SourceResolver {
    /// Returns a source under `root`, or `None` when this strategy finds nothing.
    fn resolve(&self, root: &Path) -> Option<ResolvedSource>;

    /// Human-readable description of what this strategy accepts.
    fn accepted(&self) -> Vec<String>;
}

/// First listed name that exists as a regular file wins.
pub struct CandidateList {
    names: Vec<String>,
}

impl CandidateList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceResolver for CandidateList {
    fn resolve(&self, root: &Path) -> Option<ResolvedSource> {
        self.names
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .map(|path| ResolvedSource::at(path, Discovery::Listed))
    }

    fn accepted(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// Most recently modified file directly in `root` whose name matches the
/// pattern (case-insensitive). Ties go to the lexically smallest name.
pub struct NewestMatching {
    pattern: Pattern,
}

impl NewestMatching {
    pub fn new(pattern: &str) -> IconResult<Self> {
        let pattern = Pattern::new(pattern).map_err(|source| IconError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }
}

impl SourceResolver for NewestMatching {
    fn resolve(&self, root: &Path) -> Option<ResolvedSource> {
        let options = Self::match_options();

        let mut matches: Vec<(SystemTime, String, PathBuf)> = fs::read_dir(root)
            .ok()?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !self.pattern.matches_with(&name, options) {
                    return None;
                }
                let path = entry.path();
                let meta = fs::metadata(&path).ok()?;
                if !meta.is_file() {
                    return None;
                }
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some((modified, name, path))
            })
            .collect();

        matches.sort_by(|a, b| match b.0.cmp(&a.0) {
            Ordering::Equal => a.1.cmp(&b.1),
            other => other,
        });

        matches
            .into_iter()
            .next()
            .map(|(_, _, path)| ResolvedSource::at(path, Discovery::Newest))
    }

    fn accepted(&self) -> Vec<String> {
        vec![format!("any {} file (most recent wins)", self.pattern.as_str())]
    }
}

/// Tries each strategy in order.
#[derive(Default)]
pub struct ChainResolver {
    strategies: Vec<Box<dyn SourceResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl SourceResolver + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn from_config(config: &GeneratorConfig) -> IconResult<Self> {
        let mut chain = Self::new().with(CandidateList::new(config.candidates.iter().cloned()));
        if config.fallback_to_newest {
            chain = chain.with(NewestMatching::new(&config.fallback_pattern)?);
        }
        Ok(chain)
    }
}

impl SourceResolver for ChainResolver {
    fn resolve(&self, root: &Path) -> Option<ResolvedSource> {
        self.strategies.iter().find_map(|s| s.resolve(root))
    }

    fn accepted(&self) -> Vec<String> {
        self.strategies.iter().flat_map(|s| s.accepted()).collect()
    }
}

/// Resolves the source logo for `config`, or fails with `SourceNotFound`
/// listing every accepted name. A malformed fallback pattern is reported as
/// `InvalidPattern` rather than treated as "no match".
pub fn resolve_source(config: &GeneratorConfig) -> IconResult<ResolvedSource> {
    let chain = ChainResolver::from_config(config)?;
    chain
        .resolve(&config.workspace_root)
        .ok_or_else(|| IconError::SourceNotFound {
            root: config.workspace_root.clone(),
            accepted: chain.accepted(),
        })
}
