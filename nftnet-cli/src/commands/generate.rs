//! Generate command - Build the holder-overlap network and save it
//!
//! Loads the top collections by 30-day volume, resolves every collection's
//! holders, links collections sharing enough holders, and writes the
//! network document as JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use nftnet_core::ErrorDocument;
use nftnet_sources::{run_generation, NetworkContext};

use crate::config::NftnetConfig;
use crate::output::{JsonOutput, Output, OutputConfig, OutputFormat, TableDisplay};

/// Collections requested when `--limit` is not given.
pub const DEFAULT_LIMIT: usize = 1000;

/// Edge threshold when `--min-shared-holders` is not given.
pub const DEFAULT_MIN_SHARED_HOLDERS: usize = 5;

/// Result of a generation run
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub output_path: String,
    pub collections_analyzed: usize,
    pub failed_collections: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_connections_per_collection: f64,
    pub density_percent: f64,
    pub duration_ms: u64,
}

impl TableDisplay for GenerateResult {
    fn to_table(&self) -> String {
        let mut output = format!(
            "{} Network generated in {}\n",
            "SUCCESS:".green().bold(),
            format_duration(self.duration_ms).yellow()
        );

        output.push_str(&format!("\n{}\n", "Network".cyan().bold()));
        output.push_str(&format!(
            "  Collections analyzed: {}\n",
            self.collections_analyzed
        ));
        output.push_str(&format!(
            "  Nodes:                {}\n",
            self.node_count.to_string().green()
        ));
        output.push_str(&format!(
            "  Edges:                {}\n",
            self.edge_count.to_string().green()
        ));
        output.push_str(&format!(
            "  Avg connections:      {:.1}\n",
            self.avg_connections_per_collection
        ));
        output.push_str(&format!(
            "  Density:              {:.2}%\n",
            self.density_percent
        ));
        if self.failed_collections > 0 {
            output.push_str(&format!(
                "  Unresolved:           {}\n",
                self.failed_collections.to_string().yellow()
            ));
        }

        output.push_str(&format!("\n{}\n", "Files".cyan().bold()));
        output.push_str(&format!("  {}\n", self.output_path));
        output.push_str(&format!(
            "\nRun {} for rankings.",
            format!("nftnet summary {}", self.output_path).cyan()
        ));
        output
    }
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}.{:01}s", secs, (ms % 1000) / 100)
    }
}

/// Timestamped file name used when `--output` is not given.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "nftnet_network_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn create_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn report_failure(err: &ErrorDocument, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!(
            "{}",
            JsonOutput::format(err, &OutputConfig::new(OutputFormat::Json))
        );
    }
}

/// Run the generate command
pub async fn run(
    limit: usize,
    min_shared_holders: usize,
    output: Option<&str>,
    config: &NftnetConfig,
    quiet: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if limit == 0 {
        anyhow::bail!("--limit must be at least 1");
    }

    let output_path = output.map(PathBuf::from).unwrap_or_else(default_output_path);
    ensure_parent_exists(&output_path)?;

    let mut ctx = NetworkContext::from_config(&config.source_config())
        .context("Failed to set up data sources")?;

    let spinner = create_spinner(quiet);
    spinner.set_message(format!(
        "Analyzing top {} collections (min {} shared holders)...",
        limit, min_shared_holders
    ));

    let result = run_generation(&mut ctx, limit, min_shared_holders).await;
    spinner.finish_and_clear();

    let generated = match result {
        Ok(generated) => generated,
        Err(err) => {
            report_failure(&err, format);
            return Err(err).context("Network generation failed");
        }
    };

    let doc = &generated.document;
    doc.save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    tracing::info!("Saved network document to {}", output_path.display());

    let summary = GenerateResult {
        output_path: output_path.display().to_string(),
        collections_analyzed: doc.metadata.collections_analyzed,
        failed_collections: generated.failed_collections,
        node_count: doc.graph.nodes.len(),
        edge_count: doc.graph.edges.len(),
        avg_connections_per_collection: doc.graph.stats.avg_connections_per_collection,
        density_percent: doc.graph.density() * 100.0,
        duration_ms: generated.duration.as_millis() as u64,
    };

    Output::new(summary, format).render()
}

fn ensure_parent_exists(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            anyhow::bail!("Output directory does not exist: {}", parent.display())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1_500), "1.5s");
        assert_eq!(format_duration(59_999), "59.9s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path();
        let name = path.to_string_lossy();
        assert!(name.starts_with("nftnet_network_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_ensure_parent_exists() {
        let dir = tempdir().unwrap();
        assert!(ensure_parent_exists(Path::new("network.json")).is_ok());
        assert!(ensure_parent_exists(&dir.path().join("network.json")).is_ok());
        assert!(ensure_parent_exists(&dir.path().join("missing/network.json")).is_err());
    }

    #[test]
    fn test_result_table_mentions_unresolved() {
        let result = GenerateResult {
            output_path: "out.json".to_string(),
            collections_analyzed: 3,
            failed_collections: 1,
            node_count: 2,
            edge_count: 1,
            avg_connections_per_collection: 1.0,
            density_percent: 100.0,
            duration_ms: 2_000,
        };
        let table = result.to_table();
        assert!(table.contains("Unresolved"));
        assert!(table.contains("out.json"));
    }
}
