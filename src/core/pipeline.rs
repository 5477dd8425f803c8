//! Release pipeline
//!
//! Composes the stages in order:
//!
//! 1. build + archive every target on the bounded scheduler
//! 2. join, then build native packages for Linux archives one by one
//! 3. collect loose packages and write the checksum manifest
//!
//! Each target gets its own scratch prefix, so concurrent workers never
//! share a binary path. Only directory setup failures abort a run.
//! [`PackagingStage`] covers steps 2 and 3 and runs on its own for
//! archives left by an earlier run.

use std::sync::Arc;

use indicatif::ProgressBar;

use crate::config::defaults::CHECKSUM_FILE;
use crate::config::ReleaseConfig;
use crate::core::archive::{Archive, ArtifactPackager};
use crate::core::checksum;
use crate::core::collector;
use crate::core::compiler::{scratch_prefix, Compiler, CompilerInvoker};
use crate::core::native::{ExternalPackager, NativePackageBuilder, PackageResult, PackageSpec};
use crate::core::report::ReleaseReport;
use crate::core::scheduler::{Scheduler, TargetOutcomes};
use crate::core::target::{Target, TargetCatalog};
use crate::error::{NativePackageError, PackagingError, ReleaseError, TargetFailure};
use crate::infra::filesystem;

/// Native packaging, collection and checksums over existing archives
pub struct PackagingStage<P> {
    config: ReleaseConfig,
    archiver: Arc<ArtifactPackager>,
    native: Arc<NativePackageBuilder<P>>,
}

impl<P> PackagingStage<P>
where
    P: ExternalPackager + 'static,
{
    /// Wire up the post-build stages for `config`
    pub fn new(config: ReleaseConfig, packager: P) -> Self {
        let archiver = ArtifactPackager::new(&config.product, &config.out_dir);
        let native = NativePackageBuilder::new(
            packager,
            &config.product,
            &config.out_dir,
            config.formats.clone(),
        );
        Self {
            config,
            archiver: Arc::new(archiver),
            native: Arc::new(native),
        }
    }

    /// The configuration this stage runs with
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Build native packages from archives left by an earlier run
    pub async fn run_native_only(
        &self,
        catalog: &TargetCatalog,
    ) -> Result<ReleaseReport, ReleaseError> {
        filesystem::create_dir_all(&self.config.out_dir)?;

        let entries = catalog
            .targets()
            .iter()
            .filter(|target| self.native.is_applicable(target))
            .map(|target| {
                let path = self.archiver.archive_path(&self.config.version, target);
                let outcome = if path.is_file() {
                    Ok(Archive {
                        target: target.clone(),
                        version: self.config.version.clone(),
                        path,
                    })
                } else {
                    Err(TargetFailure::Packaging(PackagingError::MissingArchive { path }))
                };
                (target.clone(), outcome)
            })
            .collect();
        let outcomes = TargetOutcomes::from_entries(entries);

        let packages = self
            .build_native(outcomes.successes().cloned().collect())
            .await;
        Ok(self.finish(&outcomes, &packages))
    }

    /// Build native packages one archive at a time
    pub async fn build_native(&self, archives: Vec<Archive>) -> Vec<PackageResult> {
        let mut results = Vec::new();
        for archive in archives {
            if !self.native.is_applicable(&archive.target) {
                continue;
            }
            let native = Arc::clone(&self.native);
            let target = archive.target.clone();
            match tokio::task::spawn_blocking(move || native.build_native_packages(&archive)).await
            {
                Ok(mut built) => results.append(&mut built),
                Err(e) => results.extend(self.aborted(&target, &e.to_string())),
            }
        }
        results
    }

    fn aborted(&self, target: &Target, error: &str) -> Vec<PackageResult> {
        self.config
            .formats
            .iter()
            .filter_map(|format| PackageSpec::lookup(target, *format))
            .map(|spec| PackageResult {
                target: spec.target,
                format: spec.format,
                outcome: Err(NativePackageError::Aborted {
                    target: target.to_string(),
                    error: error.to_string(),
                }),
            })
            .collect()
    }

    /// Collect stragglers, write checksums, and build the report
    fn finish(&self, outcomes: &TargetOutcomes<Archive>, packages: &[PackageResult]) -> ReleaseReport {
        let mut report =
            ReleaseReport::new(&self.config.version, &self.config.out_dir, outcomes, packages);

        match collector::collect(&self.config.project_dir, &self.config.out_dir) {
            Ok(collected) => report.collected = collected,
            Err(e) => tracing::warn!("Failed to collect packages: {e}"),
        }

        match checksum::write_checksums(&self.config.out_dir, CHECKSUM_FILE) {
            Ok(path) => report.checksums = Some(path),
            Err(e) => tracing::warn!("Failed to write checksums: {e}"),
        }

        tracing::info!(
            "Release {}: {} archives, {} packages, {} failed targets",
            self.config.version,
            report.archive_count(),
            report.package_count(),
            report.failed_count()
        );
        report
    }
}

/// The full release pipeline for one configuration
pub struct Pipeline<C, P> {
    invoker: Arc<CompilerInvoker<C>>,
    scheduler: Scheduler,
    packaging: PackagingStage<P>,
}

impl<C, P> Pipeline<C, P>
where
    C: Compiler + 'static,
    P: ExternalPackager + 'static,
{
    /// Wire up the stages for `config`
    pub fn new(config: ReleaseConfig, compiler: C, packager: P) -> Self {
        let invoker = CompilerInvoker::new(
            compiler,
            &config.product,
            &config.restricted_target,
            config.settle,
        );
        let scheduler = Scheduler::new(config.jobs);

        Self {
            invoker: Arc::new(invoker),
            scheduler,
            packaging: PackagingStage::new(config, packager),
        }
    }

    /// Report build progress on a progress bar
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.scheduler = self.scheduler.with_progress(progress);
        self
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &ReleaseConfig {
        self.packaging.config()
    }

    /// Run every stage for the catalog
    pub async fn run(&self, catalog: &TargetCatalog) -> Result<ReleaseReport, ReleaseError> {
        let config = self.config();
        filesystem::create_dir_all(&config.out_dir)?;
        filesystem::create_dir_all(&config.scratch_dir)?;

        let outcomes = self.build_archives(catalog.targets()).await;

        if let Err(e) = filesystem::remove_dir_all(&config.scratch_dir) {
            tracing::warn!("{e}");
        }

        let packages = if config.skip_native {
            tracing::info!("Skipping native packages");
            Vec::new()
        } else {
            self.packaging
                .build_native(outcomes.successes().cloned().collect())
                .await
        };

        Ok(self.packaging.finish(&outcomes, &packages))
    }

    /// Build and archive every target concurrently
    pub async fn build_archives(&self, targets: &[Target]) -> TargetOutcomes<Archive> {
        let invoker = Arc::clone(&self.invoker);
        let archiver = Arc::clone(&self.packaging.archiver);
        let scratch_root = self.config().scratch_dir.clone();
        let version = self.config().version.clone();

        self.scheduler
            .run(targets, move |target| {
                let result = invoker.build(target, &scratch_root);
                let archived = match &result.outcome {
                    Ok(_) => archiver
                        .package(&result, &version)
                        .map_err(TargetFailure::from),
                    Err(e) => Err(TargetFailure::from(e.clone())),
                };
                if let Ok(scratch) = scratch_prefix(&scratch_root, target) {
                    if let Err(e) = filesystem::remove_dir_all(&scratch) {
                        tracing::debug!("{e}");
                    }
                }
                archived
            })
            .await
    }
}
