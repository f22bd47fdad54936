use super::{Includes, PetLookup, PetStore};
use crate::error::StoreError;
use crate::model::{NewPet, Pet};
use async_trait::async_trait;

/// Store used with `Database=None`: every call reports that persistence is off.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledStore;

#[async_trait]
impl PetStore for DisabledStore {
    async fn find_pet(&self, _lookup: &PetLookup, _includes: Includes) -> Result<Option<Pet>, StoreError> {
        Err(StoreError::Disabled)
    }

    async fn insert_pet(&self, _pet: &NewPet) -> Result<Pet, StoreError> {
        Err(StoreError::Disabled)
    }

    async fn tag_id_range(&self) -> Result<(Option<i64>, Option<i64>), StoreError> {
        Err(StoreError::Disabled)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Disabled)
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}
