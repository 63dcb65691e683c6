//! Dependency-ordered plugin execution. Topological sort by
//! `dependencies` using a parallel-group Kahn's-algorithm: a plugin whose
//! dependency failed (or was itself skipped) is skipped rather than the
//! run aborting -- failure of one plugin does not abort the pipeline.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::{Plugin, PluginContext, PluginMetadata, PluginResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed,
    /// Skipped because a (transitive) dependency did not succeed.
    SkippedDependencyFailed,
}

#[derive(Debug, Clone)]
pub struct PluginRunReport {
    /// Identifies this particular execution of the plugin with a fresh
    /// `Uuid::new_v4()` job id -- useful for correlating this report with
    /// its log lines, never for graph identity (that's always the
    /// deterministic semantic id).
    pub run_id: uuid::Uuid,
    pub name: String,
    pub outcome: RunOutcome,
    pub metadata: Map<String, Value>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<PluginRunReport>,
}

impl RunSummary {
    pub fn succeeded(&self, name: &str) -> bool {
        self.reports
            .iter()
            .any(|r| r.name == name && r.outcome == RunOutcome::Success)
    }
}

/// Kahn's algorithm grouped into parallel-eligible batches. A genuine
/// cycle is surfaced as an error since it indicates a misconfigured plugin
/// set -- there is no sensible order to run in.
fn topological_groups(plugins: &[Box<dyn Plugin>]) -> Result<Vec<Vec<usize>>, String> {
    let metas: Vec<PluginMetadata> = plugins.iter().map(|p| p.metadata()).collect();
    let name_to_idx: HashMap<&str, usize> = metas.iter().enumerate().map(|(i, m)| (m.name.as_str(), i)).collect();

    for meta in &metas {
        for dep in &meta.dependencies {
            if !name_to_idx.contains_key(dep.as_str()) {
                return Err(format!("plugin `{}` depends on unknown plugin `{}`", meta.name, dep));
            }
        }
    }

    let mut in_degree: Vec<usize> = metas.iter().map(|m| m.dependencies.len()).collect();
    let mut processed: HashSet<usize> = HashSet::new();
    let mut groups = Vec::new();

    while processed.len() < metas.len() {
        let ready: Vec<usize> = (0..metas.len())
            .filter(|i| !processed.contains(i) && in_degree[*i] == 0)
            .collect();

        if ready.is_empty() {
            return Err("cyclic plugin dependency detected".to_string());
        }

        for &i in &ready {
            processed.insert(i);
            for (j, meta) in metas.iter().enumerate() {
                if meta.dependencies.iter().any(|d| name_to_idx[d.as_str()] == i) {
                    in_degree[j] -= 1;
                }
            }
        }
        groups.push(ready);
    }

    Ok(groups)
}

/// Execute every plugin in `plugins` in dependency order against `ctx`,
/// skipping a plugin (and transitively its dependents) whose dependency
/// did not succeed. Plugins within one topological group have no ordering
/// requirement between them; this runner still executes them sequentially
/// since the enrichment phase runs single-threaded: it read-modify-writes
/// cross-file state, and serializing it prevents data races without a
/// second locking tier.
pub async fn run_all(plugins: &[Box<dyn Plugin>], ctx: &PluginContext) -> Result<RunSummary, String> {
    let groups = topological_groups(plugins)?;
    let metas: Vec<PluginMetadata> = plugins.iter().map(|p| p.metadata()).collect();
    let mut succeeded: HashSet<String> = HashSet::new();
    let mut reports = Vec::new();

    for group in groups {
        for idx in group {
            let meta = &metas[idx];
            let deps_ok = meta.dependencies.iter().all(|d| succeeded.contains(d));

            if !deps_ok {
                tracing::warn!(plugin = %meta.name, "skipping plugin: dependency did not succeed");
                reports.push(PluginRunReport {
                    run_id: uuid::Uuid::new_v4(),
                    name: meta.name.clone(),
                    outcome: RunOutcome::SkippedDependencyFailed,
                    metadata: Map::new(),
                    errors: vec!["skipped: a declared dependency did not succeed".to_string()],
                });
                continue;
            }

            let run_id = uuid::Uuid::new_v4();
            tracing::info!(plugin = %meta.name, %run_id, "running plugin");
            let result: PluginResult = plugins[idx].execute(ctx).await;
            if result.success {
                succeeded.insert(meta.name.clone());
            } else {
                tracing::error!(plugin = %meta.name, %run_id, errors = ?result.errors, "plugin failed");
            }
            reports.push(PluginRunReport {
                run_id,
                name: meta.name.clone(),
                outcome: if result.success { RunOutcome::Success } else { RunOutcome::Failed },
                metadata: result.metadata,
                errors: result.errors,
            });
        }
    }

    Ok(RunSummary { reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{Phase, PluginContext};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AlwaysOk(&'static str, Vec<&'static str>);
    #[async_trait]
    impl Plugin for AlwaysOk {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new(self.0, Phase::Enrichment).depends_on(self.1.clone())
        }
        async fn execute(&self, _ctx: &PluginContext) -> PluginResult {
            PluginResult::ok(Map::new())
        }
    }

    struct AlwaysFails(&'static str);
    #[async_trait]
    impl Plugin for AlwaysFails {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new(self.0, Phase::Enrichment)
        }
        async fn execute(&self, _ctx: &PluginContext) -> PluginResult {
            PluginResult::failure("boom")
        }
    }

    fn fake_ctx() -> PluginContext {
        PluginContext::new(Arc::new(crate::testing::InMemoryTestStore::new()), "proj")
    }

    #[tokio::test]
    async fn independent_plugin_runs_regardless_of_sibling_failure() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(AlwaysFails("a")), Box::new(AlwaysOk("b", vec![]))];
        let summary = run_all(&plugins, &fake_ctx()).await.unwrap();
        assert!(summary.succeeded("b"));
        assert!(!summary.succeeded("a"));
    }

    #[tokio::test]
    async fn dependent_of_failed_plugin_is_skipped() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(AlwaysFails("a")), Box::new(AlwaysOk("b", vec!["a"]))];
        let summary = run_all(&plugins, &fake_ctx()).await.unwrap();
        let b = summary.reports.iter().find(|r| r.name == "b").unwrap();
        assert_eq!(b.outcome, RunOutcome::SkippedDependencyFailed);
    }

    #[tokio::test]
    async fn unknown_dependency_is_reported_as_error() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(AlwaysOk("b", vec!["ghost"]))];
        assert!(run_all(&plugins, &fake_ctx()).await.is_err());
    }

    #[tokio::test]
    async fn diamond_dependency_runs_in_valid_order() {
        let plugins: Vec<Box<dyn Plugin>> = vec![
            Box::new(AlwaysOk("a", vec![])),
            Box::new(AlwaysOk("b", vec!["a"])),
            Box::new(AlwaysOk("c", vec!["a"])),
            Box::new(AlwaysOk("d", vec!["b", "c"])),
        ];
        let summary = run_all(&plugins, &fake_ctx()).await.unwrap();
        assert!(summary.succeeded("d"));
    }
}
