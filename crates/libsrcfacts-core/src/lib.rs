pub mod archive;
pub mod cache;
pub mod compilation;
pub mod config;
pub mod context;
pub mod entities;
pub mod error;
pub mod line_counter;
pub mod paths;
pub mod sink;
pub mod store;
pub mod types;

pub use compilation::{Compilation, SourceEncoding, SyntaxUnit};
pub use config::{load_config, save_config, ExtractorConfig};
pub use context::{Context, PopulationStats};
pub use entities::{Entity, File, FileOrigin, Folder};
pub use error::SrcFactsError;
pub use sink::{MemorySink, TupleSink};
pub use store::{FactStore, LockedFactStore};
pub use types::{ExtractionMode, Key, Relation, Tuple};
