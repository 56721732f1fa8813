pub mod audit;
pub mod edit;
pub mod intake;
pub mod list;
pub mod show;
pub mod transfer;
pub mod verify;

use evidence_store::{EvidenceStore, JsonFileBackend};

pub type Store = EvidenceStore<JsonFileBackend>;
