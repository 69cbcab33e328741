// ============================================================================
// controller.rs — Run pipeline: resolve → prepare output → render → report
// ============================================================================
//
// Discovery failures abort the run. Render/write failures are recorded per
// icon and the loop keeps going. Icons render on a rayon pool but results
// are collected (and printed) in the configured order.
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::{GeneratorConfig, IconSpec, SourceMode};
use crate::error::{IconError, IconResult};
use crate::options::Verbosity;
use crate::placeholder::PlaceholderRenderer;
use crate::renderer::{write_png, IconOutput, IconRenderer, ResizeRenderer};
use crate::resolver::{resolve_source, Discovery, ResolvedSource};
use crate::utils::{ensure_directory_exists, format_duration, format_size};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct IconGenerationResult {
    pub spec: IconSpec,
    pub path: PathBuf,
    pub outcome: IconResult<IconOutput>,
}

impl IconGenerationResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Size of the written file, when generation succeeded.
    pub fn bytes(&self) -> Option<u64> {
        self.outcome.as_ref().ok().map(|o| o.bytes)
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// `None` in placeholder mode.
    pub source: Option<ResolvedSource>,
    pub output_dir: PathBuf,
    pub results: Vec<IconGenerationResult>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------
pub struct RunController<'a> {
    config: &'a GeneratorConfig,
    verbosity: Verbosity,
}

impl<'a> RunController<'a> {
    pub fn new(config: &'a GeneratorConfig, verbosity: Verbosity) -> Self {
        Self { config, verbosity }
    }

    /// Runs the whole pipeline. `Err` only for failures that leave nothing
    /// to render: no source image, or an output directory that cannot be
    /// created. The output directory is not touched when discovery fails.
    pub fn generate(&self) -> IconResult<RunReport> {
        let started = Instant::now();
        let config = self.config;

        let source = match config.mode {
            SourceMode::Resize => Some(resolve_source(config)?),
            SourceMode::Placeholder => None,
        };
        let renderer: Box<dyn IconRenderer> = match &source {
            Some(source) => Box::new(ResizeRenderer::new(source.path.clone())),
            None => Box::new(PlaceholderRenderer::new(config.placeholder.clone())),
        };
        self.print_source(source.as_ref(), renderer.as_ref());

        let output_dir = config.output_path();
        ensure_directory_exists(&output_dir).map_err(|source| IconError::WriteFailure {
            path: output_dir.clone(),
            source,
        })?;
        if !self.verbosity.is_quiet() {
            println!("📂 Output: {}\n", output_dir.display());
        }

        let results = self.render_all(renderer.as_ref(), &output_dir);
        let report = RunReport {
            source,
            output_dir,
            results,
            elapsed: started.elapsed(),
        };
        self.print_report(&report);
        Ok(report)
    }

    fn render_all(&self, renderer: &dyn IconRenderer, output_dir: &Path) -> Vec<IconGenerationResult> {
        let specs = &self.config.icons;
        let progress = self.progress_bar(specs.len() as u64);
        let jobs = self.config.jobs.unwrap_or_else(num_cpus::get).max(1);

        let render_one = |spec: &IconSpec| {
            let result = generate_icon(renderer, spec, output_dir);
            progress.inc(1);
            result
        };

        let results = match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(|| specs.par_iter().map(render_one).collect()),
            Err(_) => specs.iter().map(render_one).collect(),
        };
        progress.finish_and_clear();
        results
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if self.verbosity.is_quiet() {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        progress
    }

    fn print_source(&self, source: Option<&ResolvedSource>, renderer: &dyn IconRenderer) {
        if self.verbosity.is_quiet() {
            return;
        }
        println!("{}", "🎨 Generating PWA icons...".cyan().bold());
        match source {
            Some(source) => {
                let how = match source.discovery {
                    Discovery::Listed => "",
                    Discovery::Newest => " (most recent image)",
                };
                println!("{} {}{}", "✓ Using image:".green(), source.file_name(), how);
                if self.verbosity.is_verbose() {
                    println!("  path: {}", source.path.display());
                    if let Some(modified) = source.modified_display() {
                        println!("  modified: {}", modified);
                    }
                }
            }
            None => println!("{} {}", "✓ Mode:".green(), renderer.describe()),
        }
    }

    fn print_report(&self, report: &RunReport) {
        for result in &report.results {
            match &result.outcome {
                Ok(output) => {
                    if self.verbosity.is_quiet() {
                        continue;
                    }
                    println!(
                        "{} {} ({}x{}px, {})",
                        "✓".green(),
                        result.spec.name,
                        result.spec.width,
                        result.spec.height,
                        format_size(output.bytes)
                    );
                    if self.verbosity.is_verbose() {
                        println!("    path: {}", result.path.display());
                        println!("    sha256: {}", output.sha256);
                    }
                }
                Err(e) => eprintln!("{} {}: {}", "✗".red(), result.spec.name, e),
            }
        }

        let line = format!(
            "--- {} icons, {} generated, {} failed in {} ({}) ---",
            report.total(),
            report.succeeded(),
            report.failed(),
            report.output_dir.display(),
            format_duration(report.elapsed.as_secs_f64())
        );
        println!();
        if report.failed() == 0 {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line.yellow().bold());
        }
    }
}

/// Renders one icon and writes it to `output_dir/spec.name`.
pub fn generate_icon(renderer: &dyn IconRenderer, spec: &IconSpec, output_dir: &Path) -> IconGenerationResult {
    let path = output_dir.join(&spec.name);
    let outcome = renderer.render(spec).and_then(|image| write_png(&image, &path));
    IconGenerationResult {
        spec: spec.clone(),
        path,
        outcome,
    }
}

/// Prints a fatal error; for a missing source also lists what is accepted.
pub fn print_fatal(error: &IconError) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);
    if let IconError::SourceNotFound { root, accepted } = error {
        eprintln!("  Put the logo in {} using one of these names:", root.display());
        for name in accepted {
            eprintln!("    - {}", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs;

    fn workspace_with_logo() -> (tempfile::TempDir, GeneratorConfig) {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(300, 300, Rgba([40, 90, 160, 255]))
            .save(dir.path().join("logo.png"))
            .unwrap();
        let config = GeneratorConfig {
            workspace_root: dir.path().to_path_buf(),
            output_dir: PathBuf::from("public"),
            ..GeneratorConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn test_end_to_end_three_icons() {
        let (dir, config) = workspace_with_logo();
        let report = RunController::new(&config, Verbosity::Quiet).generate().unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.source.as_ref().unwrap().discovery, Discovery::Listed);
        for (name, size) in [("pwa-192x192.png", 192), ("pwa-512x512.png", 512), ("apple-touch-icon.png", 180)] {
            let path = dir.path().join("public").join(name);
            assert_eq!(image::image_dimensions(&path).unwrap(), (size, size));
            assert!(image::open(&path).is_ok());
        }
        assert_eq!(report.output_dir, dir.path().join("public"));
        for result in &report.results {
            assert_eq!(result.path, report.output_dir.join(&result.spec.name));
            assert!(result.path.is_file());
        }
        let sizes: Vec<_> = report.results.iter().map(|r| r.bytes().unwrap()).collect();
        assert!(sizes.iter().all(|&b| b > 0));
    }

    #[test]
    fn test_results_follow_spec_order() {
        let (_dir, mut config) = workspace_with_logo();
        config.jobs = Some(4);
        config.icons = (1..=8).map(|i| IconSpec::square(format!("icon-{i}.png"), i * 16)).collect();

        let report = RunController::new(&config, Verbosity::Quiet).generate().unwrap();
        let names: Vec<_> = report.results.iter().map(|r| r.spec.name.clone()).collect();
        let expected: Vec<_> = (1..=8).map(|i| format!("icon-{i}.png")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let (dir, config) = workspace_with_logo();
        let controller = RunController::new(&config, Verbosity::Quiet);

        let first = controller.generate().unwrap();
        let bytes_before = fs::read(dir.path().join("public/pwa-192x192.png")).unwrap();
        let second = controller.generate().unwrap();
        let bytes_after = fs::read(dir.path().join("public/pwa-192x192.png")).unwrap();

        assert_eq!(bytes_before, bytes_after);
        for (a, b) in first.results.iter().zip(&second.results) {
            assert_eq!(a.outcome.as_ref().unwrap().sha256, b.outcome.as_ref().unwrap().sha256);
        }
    }

    #[test]
    fn test_one_write_failure_does_not_stop_the_rest() {
        let (dir, config) = workspace_with_logo();
        // A directory sitting at the output path makes that one write fail.
        fs::create_dir_all(dir.path().join("public").join("pwa-512x512.png")).unwrap();

        let report = RunController::new(&config, Verbosity::Quiet).generate().unwrap();
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.exit_code(), 1);
        assert!(matches!(
            report.results[1].outcome,
            Err(IconError::WriteFailure { .. })
        ));
        assert!(dir.path().join("public/pwa-192x192.png").is_file());
        assert!(dir.path().join("public/apple-touch-icon.png").is_file());
    }

    #[test]
    fn test_corrupt_source_fails_every_icon() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), b"garbage").unwrap();
        let config = GeneratorConfig {
            workspace_root: dir.path().to_path_buf(),
            ..GeneratorConfig::default()
        };

        let report = RunController::new(&config, Verbosity::Quiet).generate().unwrap();
        assert_eq!(report.failed(), 3);
        assert_eq!(report.exit_code(), 1);
        assert!(report
            .results
            .iter()
            .all(|r| matches!(r.outcome, Err(IconError::DecodeFailure { .. }))));
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            workspace_root: dir.path().to_path_buf(),
            ..GeneratorConfig::default()
        };

        let err = RunController::new(&config, Verbosity::Quiet).generate().unwrap_err();
        assert!(matches!(err, IconError::SourceNotFound { .. }));
        assert!(!config.output_path().exists());
    }

    #[test]
    fn test_uncreatable_output_dir_is_fatal() {
        let (dir, mut config) = workspace_with_logo();
        fs::write(dir.path().join("blocker"), b"file").unwrap();
        config.output_dir = PathBuf::from("blocker").join("icons");

        let err = RunController::new(&config, Verbosity::Quiet).generate().unwrap_err();
        assert!(matches!(err, IconError::WriteFailure { .. }));
    }

    #[test]
    fn test_placeholder_mode_needs_no_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            workspace_root: dir.path().to_path_buf(),
            mode: SourceMode::Placeholder,
            ..GeneratorConfig::default()
        };

        let report = RunController::new(&config, Verbosity::Quiet).generate().unwrap();
        assert!(report.source.is_none());
        assert_eq!(report.exit_code(), 0);
        let path = config.output_path().join("apple-touch-icon.png");
        assert_eq!(image::image_dimensions(path).unwrap(), (180, 180));
    }
}
