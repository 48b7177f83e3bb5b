//! Search command implementation.

use super::{open_roster, print_people};
use std::path::Path;

/// Runs the search command.
pub fn run(path: &Path, query: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let roster = open_roster(path)?;
    let people = roster.search(query)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&people)?);
        }
        _ => {
            if people.is_empty() {
                println!("No matches for '{}'", query.trim());
            } else {
                print_people(&people);
                println!();
                println!("{} match(es)", people.len());
            }
        }
    }

    Ok(())
}
