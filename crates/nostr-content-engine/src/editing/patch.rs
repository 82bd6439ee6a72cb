use crate::document::Doc;

use super::{ChangedRange, Transform};

/// Result of applying a batch of operations
#[derive(Debug)]
pub struct Patch {
    /// The new snapshot, version bumped once for the batch.
    pub doc: Doc,
    pub transform: Transform,
}

impl Patch {
    pub fn version(&self) -> u64 {
        self.doc.version
    }

    pub fn changed(&self) -> Vec<ChangedRange> {
        self.transform.changed_ranges()
    }
}
