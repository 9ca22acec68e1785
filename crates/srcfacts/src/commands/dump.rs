use std::path::Path;

use libsrcfacts_core::{Relation, SrcFactsError, Tuple};

use crate::cli::Cli;
use crate::commands::open_existing_store;
use crate::output::report;

pub fn run(cli: &Cli, db: &Path, relation: Option<&str>) -> Result<(), SrcFactsError> {
    let relation = relation
        .map(|name| {
            Relation::from_str(name).ok_or_else(|| {
                SrcFactsError::InvalidArgs(format!("Unknown relation '{}'", name))
            })
        })
        .transpose()?;

    let store = open_existing_store(db)?;
    let tuples = match relation {
        Some(relation) => store.tuples(relation)?,
        None => store.all_tuples()?,
    };

    report(cli, &tuples, |tuples| tuples.iter().map(tuple_row).collect())
}

/// Tab-separated row: the relation name, then its columns in order
fn tuple_row(tuple: &Tuple) -> String {
    let columns = match tuple {
        Tuple::Files {
            file,
            display_path,
            name,
            extension,
        } => vec![
            file.to_string(),
            display_path.clone(),
            name.clone(),
            extension.clone(),
        ],
        Tuple::Folders {
            folder,
            display_path,
            name,
        } => vec![folder.to_string(), display_path.clone(), name.clone()],
        Tuple::ContainerParent { parent, child } => vec![parent.to_string(), child.to_string()],
        Tuple::NumLines { file, counts } => vec![
            file.to_string(),
            counts.total.to_string(),
            counts.code.to_string(),
            counts.comment.to_string(),
        ],
        Tuple::FileExtractionMode { file, mode } => {
            vec![file.to_string(), mode.as_flag().to_string()]
        }
    };
    format!("{}\t{}", tuple.relation().as_str(), columns.join("\t"))
}
