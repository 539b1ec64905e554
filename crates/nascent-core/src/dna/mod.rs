//! DNA repository: records of born AI children and their avatars.
//!
//! Independent of the scoring core; callers snapshot a child with
//! [`DnaDraft::from_snapshot`] and hand it to [`DnaRepository::create`].

mod record;
mod repository;

pub use record::{DnaDraft, DnaRecord, DNA_VERSION};
pub use repository::{CollectiveStats, DnaChange, DnaRepository, RecordError, LIST_CAP, MAX_AVATAR_BYTES};
