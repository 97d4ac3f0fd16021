//! Main Miner struct and public API.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QuarryError, Result};
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::insight::{rank, DetectOptions, Insight, InsightKind, RankOptions, DEFAULT_INSIGHT_THRESHOLD};
use crate::model::{DataModel, SiblingGroup, SiblingGroupContainer, DEFAULT_GROUP_THRESHOLD};
use crate::schema::{Column, Measure};

/// Configuration for a mining run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Parser configuration.
    #[serde(skip_serializing)]
    pub parser: ParserConfig,
    /// Minimum impact for a sibling group to be evaluated.
    pub group_threshold: f64,
    /// Minimum score and significance for an insight.
    pub insight_threshold: f64,
    /// Minimum score in the final ranking.
    pub min_score: f64,
    /// Keep at most this many insights (None = all).
    pub top_n: Option<usize>,
    /// Detectors to run.
    pub kinds: Vec<InsightKind>,
    /// Evaluate groups on the rayon thread pool.
    pub parallel: bool,
    /// Skip detector applicability checks.
    pub debug: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            group_threshold: DEFAULT_GROUP_THRESHOLD,
            insight_threshold: DEFAULT_INSIGHT_THRESHOLD,
            min_score: 0.0,
            top_n: None,
            kinds: InsightKind::ALL.to_vec(),
            parallel: true,
            debug: false,
        }
    }
}

impl MinerConfig {
    /// Load a configuration from a JSON file. Missing fields keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| QuarryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| QuarryError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.kinds.is_empty() {
            return Err(QuarryError::Config("no insight kinds selected".to_string()));
        }
        for (name, value) in [
            ("group_threshold", self.group_threshold),
            ("insight_threshold", self.insight_threshold),
            ("min_score", self.min_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QuarryError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            threshold: self.insight_threshold,
            debug: self.debug,
        }
    }
}

/// Request-scoped state threaded through one mining run.
#[derive(Debug, Clone)]
pub struct MiningContext {
    /// Identifier attached to logs and the report.
    pub request_id: String,
    /// Stop scheduling groups once this instant has passed.
    pub deadline: Option<Instant>,
}

impl Default for MiningContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MiningContext {
    /// Context with a fresh request id and no deadline.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            deadline: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Result of mining one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub request_id: String,
    /// Metadata about the source file, when mined from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub measure: Measure,
    /// Dimensions that were analyzed.
    pub columns: Vec<Column>,
    /// Ranked insights.
    pub insights: Vec<Insight>,
    pub summary: MiningSummary,
    /// Whether the deadline cut the run short.
    pub truncated: bool,
}

/// Summary of a mining run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningSummary {
    /// Rows in the data model.
    pub rows: usize,
    /// Analyzable columns.
    pub columns: usize,
    /// Sibling groups above the group threshold.
    pub groups: usize,
    /// Detector evaluations performed.
    pub evaluations: usize,
    /// Insights passing the detector thresholds, before ranking.
    pub insights_found: usize,
    /// Insights passing the detector thresholds, by type.
    pub insights_by_type: BTreeMap<String, usize>,
    /// Best score in the report.
    pub top_score: Option<f64>,
}

/// The main insight mining engine.
pub struct Miner {
    config: MinerConfig,
    parser: Parser,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    /// Create a new Miner with default configuration.
    pub fn new() -> Self {
        Self::with_config(MinerConfig::default())
    }

    /// Create a Miner with custom configuration.
    pub fn with_config(config: MinerConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self { config, parser }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Read the parser's input file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Parse a file and mine it.
    pub fn mine_file(
        &self,
        path: impl AsRef<Path>,
        measure: Measure,
        columns: Option<&[String]>,
        ctx: &MiningContext,
    ) -> Result<MiningReport> {
        let (table, source) = self.load(path)?;
        let mut report = self.mine_table(table, measure, columns, ctx)?;
        report.source = Some(source);
        Ok(report)
    }

    /// Build a data model from a table and mine it.
    pub fn mine_table(
        &self,
        table: DataTable,
        measure: Measure,
        columns: Option<&[String]>,
        ctx: &MiningContext,
    ) -> Result<MiningReport> {
        let model = DataModel::with_columns(table, measure, columns)?;
        Ok(self.mine_model(Arc::new(model), ctx))
    }

    /// Every sibling group of a model above the group threshold.
    pub fn groups(&self, model: Arc<DataModel>) -> SiblingGroupContainer {
        SiblingGroupContainer::construct_from_data_model(model, self.config.group_threshold)
    }

    /// Run every configured detector over every sibling group.
    pub fn mine_model(&self, model: Arc<DataModel>, ctx: &MiningContext) -> MiningReport {
        let span = tracing::info_span!("mine", request_id = %ctx.request_id);
        let _enter = span.enter();

        let container = self.groups(model.clone());
        let options = self.config.detect_options();
        let kinds = &self.config.kinds;

        let evaluate = |group: &SiblingGroup| -> Option<Vec<Insight>> {
            if ctx.is_expired() {
                return None;
            }
            Some(
                kinds
                    .iter()
                    .filter_map(|kind| kind.evaluate(group, &options))
                    .collect(),
            )
        };

        let per_group: Vec<Option<Vec<Insight>>> = if self.config.parallel {
            container.as_slice().par_iter().map(evaluate).collect()
        } else {
            let mut out = Vec::with_capacity(container.len());
            for group in container.iter() {
                match evaluate(group) {
                    Some(found) => out.push(Some(found)),
                    None => break,
                }
            }
            out
        };

        let evaluated = per_group.iter().filter(|g| g.is_some()).count();
        let truncated = evaluated < container.len();
        if truncated {
            tracing::warn!(
                evaluated,
                skipped = container.len() - evaluated,
                "deadline passed, remaining groups skipped"
            );
        }

        let found: Vec<Insight> = per_group.into_iter().flatten().flatten().collect();

        let mut insights_by_type = BTreeMap::new();
        for insight in &found {
            *insights_by_type
                .entry(insight.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        let insights_found = found.len();

        let insights = rank(
            found,
            &RankOptions {
                min_score: self.config.min_score,
                top_n: self.config.top_n,
            },
        );

        let summary = MiningSummary {
            rows: model.len(),
            columns: model.columns().len(),
            groups: container.len(),
            evaluations: evaluated * kinds.len(),
            insights_found,
            insights_by_type,
            top_score: insights.first().map(Insight::score),
        };

        tracing::info!(
            measure = %model.measure(),
            groups = summary.groups,
            evaluations = summary.evaluations,
            insights = summary.insights_found,
            "mining complete"
        );

        MiningReport {
            request_id: ctx.request_id.clone(),
            source: None,
            measure: model.measure().clone(),
            columns: model.columns().to_vec(),
            insights,
            summary,
            truncated,
        }
    }

    /// Run one detector on one unfiltered breakdown.
    ///
    /// Series detectors read the breakdown as period labels (`2014`,
    /// `2014-03`, ...) first. Returns `Ok(None)` when nothing qualifies.
    pub fn analyze(
        &self,
        mut table: DataTable,
        breakdown: &str,
        measure: Measure,
        kind: InsightKind,
    ) -> Result<Option<Insight>> {
        if matches!(kind, InsightKind::Trend | InsightKind::ChangePoint) {
            table.force_series(breakdown)?;
        }

        let model = Arc::new(DataModel::new(table, measure)?);
        let column = model
            .column(breakdown)
            .cloned()
            .ok_or_else(|| QuarryError::UnknownColumn(breakdown.to_string()))?;

        let group = SiblingGroup::new(model, column);
        Ok(kind.evaluate(&group, &self.config.detect_options()))
    }
}
