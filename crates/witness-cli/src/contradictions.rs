//! # Contradictions Subcommand
//!
//! Loads one snapshot, then prints a summary and the contradictory pairs
//! for each case in the catalog (or just the requested one).

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use witness_core::{CaseId, CASE_CATALOG};
use witness_testimony::{LoadSnapshot, TestimonyRepository};

use crate::config::WitnessConfig;
use crate::testimony::resolve_case;

/// Arguments for `witness contradictions`.
#[derive(Args, Debug)]
pub struct ContradictionsArgs {
    /// Only report this case.
    #[arg(long)]
    pub case: Option<String>,
}

pub async fn run_contradictions(args: &ContradictionsArgs, config: &WitnessConfig) -> Result<u8> {
    let cases: Vec<CaseId> = match args.case.as_deref() {
        Some(raw) => vec![resolve_case(raw)?],
        None => CASE_CATALOG.iter().map(|c| c.case_id()).collect(),
    };

    let analyzer = config.analyzer();
    let repo = TestimonyRepository::new(Arc::new(config.store()));
    let snapshot = repo.snapshot(&analyzer).await;

    for case_id in &cases {
        let summary = analyzer.summarize(case_id, snapshot.testimonies(), snapshot.contradictions());
        println!(
            "{}: {} testimonies, average credibility {:.1}, {} contradictions (tolerance {})",
            case_id,
            summary.testimony_count,
            summary.average_credibility,
            summary.contradiction_count,
            analyzer.tolerance(),
        );
        for pair in snapshot.contradictions_for_case(case_id) {
            println!(
                "  {} <-> {}",
                describe(&snapshot, pair.first()),
                describe(&snapshot, pair.second())
            );
        }
    }
    Ok(0)
}

fn describe(snapshot: &LoadSnapshot, id: &witness_core::TestimonyId) -> String {
    match snapshot.find(id) {
        Some(t) => format!("{} ({})", t.id, t.witness),
        None => id.to_string(),
    }
}
