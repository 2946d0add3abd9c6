use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use awardgraph_common::{AwardFilters, Config, SearchCriteria};
use awardgraph_graph::{AwardReader, AwardWriter, GraphClient};
use awardgraph_ingest::FeedPipeline;

#[derive(Parser)]
#[command(name = "awardgraph", about = "FPDS award feed ingestion into Neo4j")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the award feed and upsert awards into the graph.
    Ingest {
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        agency_code: Option<String>,
        #[arg(long)]
        agency_name: Option<String>,
        #[arg(long)]
        award_status: Option<String>,
        #[arg(long)]
        contract_type: Option<String>,
        #[arg(long)]
        piid: Option<String>,
        #[arg(long)]
        vendor_uei: Option<String>,
        #[arg(long)]
        cage_code: Option<String>,
        #[arg(long)]
        naics_code: Option<String>,
        /// Keep polling, paced by FPDS_RATE_LIMIT.
        #[arg(long)]
        watch: bool,
    },
    /// Search persisted awards.
    Search {
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        agency_code: Option<String>,
        #[arg(long)]
        vendor_uei: Option<String>,
    },
    /// Summarize a vendor's awards by UEI.
    Vendor { uei: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("awardgraph=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let client = GraphClient::connect(&config).await?;

    match cli.command {
        Command::Ingest {
            start_date,
            end_date,
            agency_code,
            agency_name,
            award_status,
            contract_type,
            piid,
            vendor_uei,
            cage_code,
            naics_code,
            watch,
        } => {
            let criteria = SearchCriteria {
                last_mod_date: match (start_date, end_date) {
                    (Some(start), Some(end)) => Some((start, end)),
                    (None, None) => None,
                    _ => anyhow::bail!("--start-date and --end-date must be given together"),
                },
                agency_code,
                agency_name,
                award_status,
                contract_type,
                piid,
                vendor_uei,
                cage_code,
                naics_code,
            };

            let writer = AwardWriter::new(client);
            let pipeline =
                FeedPipeline::new(writer, &config.fpds_base_url, config.fpds_batch_size);

            let poll_delay = Duration::from_secs_f64((1.0 / config.fpds_rate_limit).max(1.0));

            loop {
                match pipeline.process_feed(&criteria).await {
                    Ok(report) => {
                        info!(
                            processed = report.processed_count,
                            failed = report.failures.len(),
                            "Feed poll complete"
                        );
                        if !watch {
                            println!("{}", serde_json::to_string_pretty(&report)?);
                        }
                    }
                    Err(e) => {
                        if !watch {
                            return Err(e.into());
                        }
                        warn!(error = %e, "Feed poll failed");
                    }
                }
                if !watch {
                    break;
                }
                tokio::time::sleep(poll_delay).await;
            }
        }
        Command::Search {
            start_date,
            end_date,
            agency_code,
            vendor_uei,
        } => {
            let filters = AwardFilters {
                start_date,
                end_date,
                agency_code,
                vendor_uei,
            };
            let reader = AwardReader::new(client);
            let awards = reader.search_awards(&filters).await?;
            println!("{}", serde_json::to_string_pretty(&awards)?);
        }
        Command::Vendor { uei } => {
            let reader = AwardReader::new(client);
            match reader.vendor_summary(&uei).await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => anyhow::bail!("vendor {uei} has no associated awards"),
            }
        }
    }

    Ok(())
}
