pub mod key;
pub mod tuple;

pub use key::{Key, GENERATED_FILE_KEY};
pub use tuple::{ExtractionMode, Relation, Tuple};
