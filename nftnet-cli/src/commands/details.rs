//! Details command - Expanded view of one collection

use colored::Colorize;
use serde::Serialize;

use nftnet_core::CollectionDetails;
use nftnet_sources::NetworkContext;

use crate::config::NftnetConfig;
use crate::output::{Output, OutputConfig, OutputFormat, Outputter, TableOutput};

/// Renderable wrapper around [`CollectionDetails`].
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct DetailsView(pub CollectionDetails);

impl Outputter for DetailsView {
    fn to_table(&self, config: &OutputConfig) -> String {
        let d = &self.0;
        let title = if d.verified {
            format!("{} {}", d.name.cyan().bold(), "(verified)".green())
        } else {
            d.name.cyan().bold().to_string()
        };

        let mut pairs = vec![
            ("ID", d.id.clone()),
            ("Symbol", d.symbol.clone()),
            ("Floor price", format!("{:.4}", d.floor_price)),
            ("Market cap", format!("{:.2}", d.market_cap)),
            ("Volume 1d", format!("{:.2}", d.volume.one_day)),
            ("Volume 7d", format!("{:.2}", d.volume.seven_day)),
            ("Volume 30d", format!("{:.2}", d.volume.thirty_day)),
            ("Volume all time", format!("{:.2}", d.volume.all_time)),
            ("Tokens", d.token_count.to_string()),
            ("Owners", d.owner_count.to_string()),
            ("Listed", d.listed_count.to_string()),
        ];
        if let Some(created) = &d.created_at {
            pairs.push(("Created", created.clone()));
        }
        pairs.push(("Magic Eden", d.magic_eden_url.clone()));

        let mut output = format!("{}\n", title);
        if !d.description.is_empty() {
            output.push_str(&format!("{}\n", d.description.dimmed()));
        }
        output.push_str(&TableOutput::key_value(&pairs, config));
        output
    }
}

/// Run the details command
pub async fn run(id: &str, config: &NftnetConfig, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = NetworkContext::from_config(&config.source_config())?;

    match ctx.catalog.collection_details(id).await {
        Some(details) => Output::new(DetailsView(details), format).render(),
        None => anyhow::bail!("Collection not found or unavailable: {}", id),
    }
}
