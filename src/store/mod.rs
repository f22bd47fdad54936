//! Persistence gateway for pets. One backend per process, chosen at startup.

mod disabled;
mod sql;
#[cfg(test)]
pub(crate) mod memory;

pub use disabled::DisabledStore;
pub use sql::SqlPetStore;

use crate::error::StoreError;
use crate::model::{NewPet, Pet};
use async_trait::async_trait;

/// Related collections to load together with a pet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Includes {
    pub category: bool,
    pub images: bool,
    pub tags: bool,
}

impl Includes {
    pub const ALL: Includes = Includes {
        category: true,
        images: true,
        tags: true,
    };
    pub const NONE: Includes = Includes {
        category: false,
        images: false,
        tags: false,
    };
}

/// Key for a single-pet lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PetLookup {
    Id(i64),
    Category(i64),
    /// Exact match; `None` matches pets without a status.
    Status(Option<String>),
    /// Matches when any tag name of the pet is in the list.
    Tags(Vec<String>),
}

#[async_trait]
pub trait PetStore: Send + Sync {
    /// First pet (lowest id) matching the lookup, with the requested relations loaded.
    async fn find_pet(&self, lookup: &PetLookup, includes: Includes) -> Result<Option<Pet>, StoreError>;

    /// Insert the pet with its category, images and tags atomically. Returns the stored pet.
    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError>;

    /// Lowest and highest tag id currently stored.
    async fn tag_id_range(&self) -> Result<(Option<i64>, Option<i64>), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}
