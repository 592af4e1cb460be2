//! Result carriers returned by the collection facade.

use crate::store::EntryId;
use bson::Bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOneResult {
    /// Row id assigned by the store.
    pub eid: EntryId,
    pub inserted_id: Bson,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertManyResult {
    pub eids: Vec<EntryId>,
    pub inserted_ids: Vec<Bson>,
}

/// `raw_result` is `None` when the store rejected the update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub raw_result: Option<Vec<EntryId>>,
}

impl UpdateResult {
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.raw_result.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub const fn acknowledged(&self) -> bool {
        self.raw_result.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub raw_result: Vec<EntryId>,
}

impl DeleteResult {
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.raw_result.len()
    }
}
