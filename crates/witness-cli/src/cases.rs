//! # Cases Subcommand
//!
//! Prints the fixed case catalog.

use anyhow::Result;
use witness_core::CASE_CATALOG;

pub fn run_cases() -> Result<u8> {
    for case in &CASE_CATALOG {
        println!("{}  {}", case.id, case.title);
        println!("    {}", case.description);
    }
    Ok(0)
}
