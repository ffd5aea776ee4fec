//! Automation hook runner
//!
//! Drives the three extension points over the build context. The global
//! hook sees the whole project tree and runs first; per-service hooks see
//! one service config each and run on the worker pool.

use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, info};

use crate::application::build::pool::WorkerPool;
use crate::domain::entities::{AutoHooks, ProjectConfig, ServiceMap};
use crate::domain::ports::{Automation, AutomationPhase, PASS_VERDICT};
use crate::error::{DnsbError, DnsbResult};

pub const GLOBAL_SCOPE: &str = "global";

pub struct HookRunner<'a> {
    automation: &'a dyn Automation,
    pool: WorkerPool,
}

impl<'a> HookRunner<'a> {
    pub fn new(automation: &'a dyn Automation, pool: WorkerPool) -> Self {
        Self { automation, pool }
    }

    /// Global then per-service `setup`; runs before resolution
    pub fn setup(&self, project: ProjectConfig) -> DnsbResult<ProjectConfig> {
        self.transform(AutomationPhase::Setup, project)
    }

    /// Global then per-service `modify`; runs on the resolved tree
    pub fn modify(&self, project: ProjectConfig) -> DnsbResult<ProjectConfig> {
        if !has_hook(&project, AutomationPhase::Modify)? {
            return Ok(project);
        }
        if project.include.is_some() {
            return Err(DnsbError::UnsupportedFeature(
                "a global 'include' is not allowed when a modify hook is present".to_string(),
            ));
        }
        if let Some(name) = project.builds.iter().find(|(_, conf)| conf.contains_key("ref")).map(|(n, _)| n) {
            return Err(DnsbError::UnsupportedFeature(format!(
                "service '{}' still has a 'ref' while a modify hook is present",
                name
            )));
        }
        self.transform(AutomationPhase::Modify, project)
    }

    /// Every `restrict` hook must answer the pass verdict
    pub fn restrict(&self, project: &ProjectConfig) -> DnsbResult<()> {
        if let Some(script) = &project.auto.restrict {
            let verdict = self
                .automation
                .verdict(GLOBAL_SCOPE, script, &project.to_value()?)?;
            check_verdict(GLOBAL_SCOPE, &verdict)?;
        }

        let hooked = hooked_services(&project.builds, AutomationPhase::Restrict)?;
        let outcomes = self.pool.map(&hooked, |(name, script)| {
            let conf = &project.builds[name.as_str()];
            let verdict = self
                .automation
                .verdict(name, script, &Value::Mapping(conf.clone()))?;
            check_verdict(name, &verdict)
        });
        outcomes.into_iter().collect::<DnsbResult<Vec<()>>>()?;
        info!(checked = hooked.len(), "restrict hooks passed");
        Ok(())
    }

    fn transform(&self, phase: AutomationPhase, project: ProjectConfig) -> DnsbResult<ProjectConfig> {
        let global = project.auto.hook(phase).cloned();
        let mut project = match global {
            Some(script) => {
                debug!(%phase, scope = GLOBAL_SCOPE, "running hook");
                let tree = self
                    .automation
                    .transform(phase, GLOBAL_SCOPE, &script, &project.to_value()?)?;
                ProjectConfig::from_value(tree).map_err(|e| {
                    DnsbError::BuildDefinition(format!(
                        "global {} hook produced an invalid project: {}",
                        phase, e
                    ))
                })?
            }
            None => project,
        };

        let hooked = hooked_services(&project.builds, phase)?;
        if hooked.is_empty() {
            return Ok(project);
        }
        let builds = &project.builds;
        let outcomes = self.pool.map(&hooked, |(name, script)| {
            debug!(%phase, scope = %name, "running hook");
            let tree = self.automation.transform(
                phase,
                name,
                script,
                &Value::Mapping(builds[name.as_str()].clone()),
            )?;
            into_service(name, phase, tree)
        });

        let mut replaced = Vec::with_capacity(hooked.len());
        for ((name, _), outcome) in hooked.iter().zip(outcomes) {
            replaced.push((name.clone(), outcome?));
        }
        for (name, conf) in replaced {
            project.builds.insert(name, conf);
        }
        info!(%phase, services = hooked.len(), "service hooks applied");
        Ok(project)
    }
}

fn hooked_services(builds: &ServiceMap, phase: AutomationPhase) -> DnsbResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for (name, conf) in builds {
        if let Some(script) = AutoHooks::from_service(name, conf)?.hook(phase) {
            out.push((name.clone(), script.clone()));
        }
    }
    Ok(out)
}

fn has_hook(project: &ProjectConfig, phase: AutomationPhase) -> DnsbResult<bool> {
    Ok(project.auto.hook(phase).is_some() || !hooked_services(&project.builds, phase)?.is_empty())
}

fn into_service(name: &str, phase: AutomationPhase, tree: Value) -> DnsbResult<Mapping> {
    match tree {
        Value::Mapping(conf) => Ok(conf),
        other => Err(DnsbError::BuildDefinition(format!(
            "{} hook of service '{}' returned a {} instead of a mapping",
            phase,
            name,
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn check_verdict(scope: &str, verdict: &str) -> DnsbResult<()> {
    if verdict.trim() == PASS_VERDICT {
        return Ok(());
    }
    Err(DnsbError::Build(format!(
        "restrict hook rejected '{}': {}",
        scope,
        verdict.trim()
    )))
}
