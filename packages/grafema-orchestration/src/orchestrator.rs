//! The top-level `Orchestrator`: discover files -> run ANALYSIS plugins
//! (which includes the AST visitor/builder) -> flush store -> run
//! ENRICHMENT plugins in topological order -> flush -> finalize. Owns the
//! store, the stage list, and emits progress over a discover-then-two-phase
//! run across this domain's visitor/builder and enrichment plugins.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use grafema_ir::builder::GraphBuilder;
use grafema_ir::domain::{AstParser, GraphStore};
use grafema_ir::enrichment::runner::{run_all, PluginRunReport};
use grafema_ir::enrichment::{OnProgress, Plugin, PluginContext, ProgressEvent};
use grafema_ir::visitor::analyze_file;

use crate::discovery::{FileDiscovery, FilesystemDiscovery};
use crate::error::{GrafemaOrchestrationError, Result};
use crate::lock::AnalysisLock;

/// The result of one `analyze` call: either the existing graph (a
/// non-force call that found `isAnalyzed` already true) or the outcome of
/// a fresh run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub already_analyzed: bool,
    pub files_processed: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub plugin_reports: Vec<PluginRunReport>,
    /// Identifiers the builder could not resolve across every file in this
    /// run, surfaced for diagnostics rather than silently
    /// dropped at the top level.
    pub unresolved: Vec<String>,
}

pub struct Orchestrator {
    graph: Arc<dyn GraphStore>,
    parser: Arc<dyn AstParser>,
    discovery: Arc<dyn FileDiscovery>,
    plugins: Vec<Box<dyn Plugin>>,
    lock: AnalysisLock,
    project_path: String,
    on_progress: Option<OnProgress>,
}

impl Orchestrator {
    /// Defaults: filesystem discovery, and the two archetypal ENRICHMENT
    /// plugins. Override either with
    /// [`Self::with_discovery`] / [`Self::with_plugins`].
    pub fn new(graph: Arc<dyn GraphStore>, parser: Arc<dyn AstParser>, project_path: impl Into<String>) -> Self {
        Self {
            graph,
            parser,
            discovery: Arc::new(FilesystemDiscovery::new()),
            plugins: vec![
                Box::new(grafema_ir::enrichment::external_call_resolver::ExternalCallResolver::new()),
                Box::new(grafema_ir::enrichment::cardinality::CardinalityEnricher::default()),
            ],
            lock: AnalysisLock::new(),
            project_path: project_path.into(),
            on_progress: None,
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn FileDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<Box<dyn Plugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    fn report_progress(&self, phase: &str, label: &str, message: &str, total: usize, processed: usize) {
        if processed % 10 != 0 && processed != total {
            return;
        }
        if let Some(cb) = &self.on_progress {
            cb(ProgressEvent {
                phase: phase.to_string(),
                current_plugin: label.to_string(),
                message: message.to_string(),
                total_files: total,
                processed_files: processed,
            });
        }
    }

    /// Drive one full analysis. `force = true` clears the
    /// store under the lock and rebuilds unconditionally; otherwise a call
    /// against an already-analyzed project returns the existing graph
    /// without touching it.
    pub async fn analyze(&self, force: bool) -> Result<AnalysisOutcome> {
        let _guard = self.lock.acquire(force).await?;

        if force {
            info!("forced re-analysis requested for {}: clearing existing graph", self.project_path);
            self.graph
                .clear()
                .await
                .map_err(|e| GrafemaOrchestrationError::StoreUnavailable(e.to_string()))?;
            self.lock.mark_unanalyzed();
        } else if self.lock.is_analyzed() {
            info!("{} already analyzed, returning existing graph", self.project_path);
            return Ok(AnalysisOutcome {
                already_analyzed: true,
                files_processed: 0,
                node_count: self.graph.node_count().await?,
                edge_count: self.graph.edge_count().await?,
                plugin_reports: Vec::new(),
                unresolved: Vec::new(),
            });
        }

        let files = self.discovery.discover(&self.project_path).await?;
        let total = files.len();
        info!("found {} files to analyze in {}", total, self.project_path);
        let mut unresolved = Vec::new();

        for (i, file) in files.iter().enumerate() {
            self.report_progress("ANALYSIS", "visitor+builder", file, total, i + 1);

            let full_path = Path::new(&self.project_path).join(file);
            let content = tokio::fs::read_to_string(&full_path)
                .await
                .map_err(|e| GrafemaOrchestrationError::Discovery(format!("{file}: {e}")))?;

            let collections = analyze_file(self.parser.as_ref(), file, &content)?;
            let build = GraphBuilder::build(file, &collections)?;

            for node in build.nodes {
                self.graph.add_node(node).await?;
            }
            for edge in build.edges {
                self.graph.add_edge(edge).await?;
            }
            if !build.unresolved.is_empty() {
                warn!("{}: {} unresolved reference(s)", file, build.unresolved.len());
            }
            unresolved.extend(build.unresolved);
        }

        self.graph
            .flush()
            .await
            .map_err(|e| GrafemaOrchestrationError::StoreUnavailable(e.to_string()))?;

        let mut ctx = PluginContext::new(self.graph.clone(), self.project_path.clone());
        if let Some(cb) = &self.on_progress {
            ctx = ctx.with_progress(cb.clone());
        }

        let summary = run_all(&self.plugins, &ctx)
            .await
            .map_err(GrafemaOrchestrationError::PluginFailure)?;

        self.graph
            .flush()
            .await
            .map_err(|e| GrafemaOrchestrationError::StoreUnavailable(e.to_string()))?;
        self.lock.mark_analyzed();
        info!("analysis complete for {}: {} files processed", self.project_path, total);

        Ok(AnalysisOutcome {
            already_analyzed: false,
            files_processed: total,
            node_count: self.graph.node_count().await?,
            edge_count: self.graph.edge_count().await?,
            plugin_reports: summary.reports,
            unresolved,
        })
    }
}
