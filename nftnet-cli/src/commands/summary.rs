//! Summary command - Condensed report of a saved network document

use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use nftnet_core::{NetworkDocument, NetworkSummary};

use crate::output::{Output, OutputConfig, OutputFormat, Outputter, TableOutput};

/// Rankings shown when `--top` is not given.
pub const DEFAULT_TOP: usize = 10;

/// Renderable wrapper around [`NetworkSummary`].
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SummaryReport(pub NetworkSummary);

impl Outputter for SummaryReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let s = &self.0;
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Network Overview".cyan().bold()));
        output.push_str(&TableOutput::key_value(
            &[
                ("Collections analyzed", s.collections_analyzed.to_string()),
                ("Nodes", s.total_nodes.to_string()),
                ("Edges", s.total_edges.to_string()),
                ("Min shared holders", s.min_shared_holders.to_string()),
                (
                    "Avg connections",
                    format!("{:.2}", s.avg_connections_per_collection),
                ),
                ("Density", format!("{:.2}%", s.network_density_percent)),
            ],
            config,
        ));

        let h = &s.holder_stats;
        output.push_str(&format!("\n\n{}\n", "Holders".cyan().bold()));
        output.push_str(&TableOutput::key_value(
            &[
                (
                    "Collections with holders",
                    h.total_collections_with_holders.to_string(),
                ),
                ("Average", format!("{:.1}", h.average_holders_per_collection)),
                ("Max", h.max_holders.to_string()),
                ("Min", h.min_holders.to_string()),
            ],
            config,
        ));

        output.push_str(&format!("\n\n{}\n", "Top Collections by Holders".cyan().bold()));
        let rows: Vec<Vec<String>> = s
            .top_by_holders
            .iter()
            .map(|c| {
                vec![
                    c.rank.to_string(),
                    verified_name(&c.name, c.verified),
                    c.holders.to_string(),
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["#", "Collection", "Holders"],
            &rows,
            &[0, 2],
            config,
        ));

        output.push_str(&format!(
            "\n\n{}\n",
            "Most Influential Collections".cyan().bold()
        ));
        let rows: Vec<Vec<String>> = s
            .top_by_influence
            .iter()
            .map(|c| {
                vec![
                    c.rank.to_string(),
                    verified_name(&c.name, c.verified),
                    c.influence.to_string(),
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["#", "Collection", "Influence"],
            &rows,
            &[0, 2],
            config,
        ));

        output.push_str(&format!("\n\n{}\n", "Strongest Connections".cyan().bold()));
        let rows: Vec<Vec<String>> = s
            .strongest_connections
            .iter()
            .map(|c| {
                vec![
                    c.rank.to_string(),
                    c.source_name.clone(),
                    c.target_name.clone(),
                    c.shared_holders.to_string(),
                    format!("{:.1}%", c.overlap_percentage),
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["#", "Collection", "Collection", "Shared", "Overlap"],
            &rows,
            &[0, 3, 4],
            config,
        ));

        output
    }
}

fn verified_name(name: &str, verified: bool) -> String {
    if verified {
        format!("{} {}", name, "✓".green())
    } else {
        name.to_string()
    }
}

/// Load and summarize a document file.
pub fn load_summary(path: &Path, top: usize) -> anyhow::Result<NetworkSummary> {
    let doc = NetworkDocument::load(path)
        .with_context(|| format!("Failed to load network document {}", path.display()))?;
    Ok(NetworkSummary::from_document(&doc, top))
}

/// Run the summary command
pub fn run(path: &str, top: usize, format: OutputFormat) -> anyhow::Result<()> {
    let summary = load_summary(Path::new(path), top)?;
    Output::new(SummaryReport(summary), format).render()
}
