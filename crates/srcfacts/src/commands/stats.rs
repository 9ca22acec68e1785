use std::path::Path;

use libsrcfacts_core::SrcFactsError;

use crate::cli::Cli;
use crate::commands::open_existing_store;
use crate::output::report;

pub fn run(cli: &Cli, db: &Path) -> Result<(), SrcFactsError> {
    let store = open_existing_store(db)?;
    let stats = store.stats()?;

    report(cli, &stats, |stats| {
        let mut lines = vec![
            format!("Database: {}", stats.path),
            format!("Size: {} bytes", stats.size_bytes),
        ];
        lines.extend(
            stats
                .relations
                .iter()
                .map(|(relation, count)| format!("{:<22}{}", relation, count)),
        );
        lines.push(format!("{:<22}{}", "total", stats.tuple_count));
        lines
    })
}
