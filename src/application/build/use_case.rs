//! Build Use Case
//!
//! Runs the pipeline in strict phase order:
//! 1. Reset the output root
//! 2. Resolve images
//! 3. Global and per-service `setup` hooks
//! 4. Resolve service inheritance
//! 5. Plan addresses
//! 6. Substitute variables over the whole project
//! 7. Map the topology (diagnostics and DOT export only)
//! 8. Global and per-service `modify` hooks
//! 9. Generate every service on the worker pool; the barrier between the
//!    two generation phases runs the trust-chain pass exactly once
//! 10. Global and per-service `restrict` hooks
//! 11. Write the manifest
//!
//! The first fatal error aborts the build and no manifest is written.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::application::build::automation::HookRunner;
use crate::application::build::context::BuildContext;
use crate::application::build::layout::WorkspaceLayout;
use crate::application::build::manifest::Manifest;
use crate::application::build::pool::WorkerPool;
use crate::application::build::service::{ServiceArtifactGenerator, ServiceArtifacts};
use crate::application::build::trust_chain::{TrustChainBuilder, TrustChainReport};
use crate::domain::entities::ProjectConfig;
use crate::domain::ports::{Automation, Storage, ZoneSigner};
use crate::domain::services::{
    resolve_images, ConfigResolver, NameServerRegistry, NetworkPlanner, Topology,
    VariableSubstitutor,
};
use crate::error::DnsbResult;
use crate::infrastructure::automation::NoopAutomation;
use crate::resources::TemplateCatalog;

use super::options::BuildOptions;
use super::result::{BuildResult, PreparedBuild};

/// Build use case - compiles a testbed declaration into artifacts
pub struct BuildUseCase {
    storage: Arc<dyn Storage>,
    signer: Option<Arc<dyn ZoneSigner>>,
    automation: Arc<dyn Automation>,
    catalog: Option<TemplateCatalog>,
}

impl BuildUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            signer: None,
            automation: Arc::new(NoopAutomation),
            catalog: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn ZoneSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_automation(mut self, automation: Arc<dyn Automation>) -> Self {
        self.automation = automation;
        self
    }

    /// Replace the embedded template catalog
    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    fn catalog(&self) -> DnsbResult<TemplateCatalog> {
        match &self.catalog {
            Some(catalog) => Ok(catalog.clone()),
            None => TemplateCatalog::builtin(),
        }
    }

    /// Resolve, plan and substitute without writing anything
    pub fn prepare(&self, project: ProjectConfig, options: &BuildOptions) -> DnsbResult<PreparedBuild> {
        let pool = WorkerPool::new(options.jobs);
        let hooks = HookRunner::new(self.automation.as_ref(), pool);
        let catalog = self.catalog()?;

        let images = resolve_images(&project.images)?;
        debug!(images = images.len(), "images resolved");
        let ctx = BuildContext::new(project, self.storage.clone(), WorkspaceLayout::new(&options.output))
            .with_images(images);

        let project = hooks.setup((*ctx.project).clone())?;
        let ctx = ctx.with_project(project);

        let resolved = ConfigResolver::new(&ctx.services, &ctx.images, &catalog).resolve_all()?;
        let mut project = (*ctx.project).clone();
        project.builds = resolved;
        let ctx = ctx.with_project(project);
        info!(services = ctx.services.len(), "service configs resolved");

        let mut planner = NetworkPlanner::new(ctx.project.subnet()?);
        if let Some(source) = &options.source {
            planner = planner.with_source(source);
        }
        let addresses = planner.plan(&ctx.services)?;
        let ctx = ctx.with_addresses(addresses);
        info!(addresses = ctx.addresses.len(), subnet = %ctx.project.inet, "addresses planned");

        let substituted = VariableSubstitutor::new(&ctx.project, &ctx.services, &ctx.addresses, &ctx.images)
            .substitute_project(&ctx.project)?;
        let ctx = ctx.with_project(substituted);

        let topology = Topology::from_services(&ctx.services);
        debug!(edges = topology.edges.len(), "topology mapped");

        let modified = hooks.modify((*ctx.project).clone())?;
        let context = ctx.with_project(modified);
        Ok(PreparedBuild { context, topology })
    }

    /// Run the whole pipeline
    pub fn execute(&self, project: ProjectConfig, options: &BuildOptions) -> DnsbResult<BuildResult> {
        info!(project = %project.name, output = %options.output.display(), "starting build");
        self.storage.remove_dir_all(&options.output)?;
        self.storage.create_dir_all(&options.output)?;

        let prepared = self.prepare(project, options)?;
        let ctx = &prepared.context;

        let graph = match &options.graph {
            Some(path) => {
                self.storage.write_text(path, &prepared.topology.to_dot())?;
                info!(path = %path.display(), "topology graph written");
                Some(path.clone())
            }
            None => None,
        };

        let services = prepared.services();
        let (artifacts, trust_chain) = self.generate(ctx, &services, options)?;

        HookRunner::new(self.automation.as_ref(), WorkerPool::new(options.jobs)).restrict(&ctx.project)?;

        let mut manifest = Manifest::new(ctx.project.name.clone(), ctx.project.inet.clone());
        let mut signed_zones = Vec::new();
        for artifact in artifacts {
            for zone in &artifact.signed_zones {
                signed_zones.push((artifact.service.clone(), zone.origin().to_string()));
            }
            manifest = manifest.with_service(artifact.service, artifact.fragment);
        }
        let path = ctx.layout.manifest();
        self.storage.write_text(&path, &manifest.to_yaml()?)?;
        info!(path = %path.display(), services = services.len(), "build finished");

        Ok(BuildResult {
            manifest: path,
            services,
            addresses: (*ctx.addresses).clone(),
            signed_zones,
            trust_chain,
            graph,
        })
    }

    fn generate(
        &self,
        ctx: &BuildContext,
        services: &[String],
        options: &BuildOptions,
    ) -> DnsbResult<(Vec<ServiceArtifacts>, Option<TrustChainReport>)> {
        let names = NameServerRegistry::new();
        let mut generator = ServiceArtifactGenerator::new(ctx, &names, options.effective_serial())
            .with_base_dir(&options.base_dir)
            .with_dnssec(options.dnssec);
        if let Some(signer) = &self.signer {
            generator = generator.with_signer(signer.as_ref());
        }

        let report: Mutex<Option<TrustChainReport>> = Mutex::new(None);
        let outcomes = WorkerPool::new(options.jobs).run_phased(
            services,
            |service| generator.generate(service),
            |all_ok| {
                if !all_ok {
                    warn!("service generation failed; skipping the trust chain");
                    return;
                }
                let Some(signer) = &self.signer else {
                    debug!("no signer configured; trust chain skipped");
                    return;
                };
                if !ctx.storage.exists(&ctx.layout.keys_root()) {
                    debug!("no key material; trust chain skipped");
                    return;
                }
                let pass = TrustChainBuilder::new(ctx.storage.as_ref(), &ctx.layout, signer.as_ref()).run();
                *report.lock().unwrap_or_else(PoisonError::into_inner) = Some(pass);
            },
            |_, artifacts| generator.finalize(artifacts),
        );

        let artifacts = outcomes.into_iter().collect::<DnsbResult<Vec<_>>>()?;
        let report = report.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok((artifacts, report))
    }
}
