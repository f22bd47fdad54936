//! In-memory `PetStore` for service and router tests. Counts calls and can be told to fail inserts.

use super::{Includes, PetLookup, PetStore};
use crate::error::{ConstraintViolation, StoreError};
use crate::model::{Category, Image, NewPet, Pet, Tag};
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertMode {
    Store,
    ViolateConstraint,
    Fail,
}

pub struct MemoryStore {
    pets: Mutex<Vec<Pet>>,
    next_id: AtomicI64,
    mode: Mutex<InsertMode>,
    insert_calls: AtomicUsize,
    range_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            pets: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            mode: Mutex::new(InsertMode::Store),
            insert_calls: AtomicUsize::new(0),
            range_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_pets(pets: Vec<Pet>) -> Self {
        let store = MemoryStore::new();
        let max = pets.iter().map(|p| p.id).max().unwrap_or(0);
        store.next_id.store(max + 1, Ordering::SeqCst);
        *store.pets.lock().unwrap() = pets;
        store
    }

    pub fn set_mode(&self, mode: InsertMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn inserts(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn range_queries(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }
}

fn matches(lookup: &PetLookup, pet: &Pet) -> bool {
    match lookup {
        PetLookup::Id(id) => pet.id == *id,
        PetLookup::Category(id) => pet.category.as_ref().map(|c| c.id) == Some(*id),
        PetLookup::Status(status) => pet.status == *status,
        PetLookup::Tags(names) => pet.tags.iter().any(|t| names.contains(&t.name)),
    }
}

#[async_trait]
impl PetStore for MemoryStore {
    async fn find_pet(&self, lookup: &PetLookup, includes: Includes) -> Result<Option<Pet>, StoreError> {
        let pets = self.pets.lock().unwrap();
        let mut found = pets
            .iter()
            .filter(|p| matches(lookup, p))
            .min_by_key(|p| p.id)
            .cloned();
        if let Some(pet) = found.as_mut() {
            if !includes.category {
                pet.category = None;
            }
            if !includes.images {
                pet.images.clear();
            }
            if !includes.tags {
                pet.tags.clear();
            }
        }
        Ok(found)
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock().unwrap();
        match mode {
            InsertMode::ViolateConstraint => {
                return Err(StoreError::Constraint(ConstraintViolation {
                    kind: "unique",
                    code: Some("23505".into()),
                    message: "duplicate key value violates unique constraint \"tags_pkey\"".into(),
                    table: Some("tags".into()),
                    constraint: Some("tags_pkey".into()),
                    statement: Some("INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING id".into()),
                    ..ConstraintViolation::default()
                }))
            }
            InsertMode::Fail => return Err(StoreError::Db(sqlx::Error::PoolTimedOut)),
            InsertMode::Store => {}
        }

        let next = || self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Pet {
            id: pet.id.unwrap_or_else(next),
            name: pet.name.clone(),
            status: pet.status.clone(),
            category: pet.category.as_ref().map(|c| Category {
                id: c.id.unwrap_or_else(next),
                name: c.name.clone(),
            }),
            images: pet
                .images
                .iter()
                .map(|i| Image {
                    id: i.id.unwrap_or_else(next),
                    url: i.url.clone(),
                })
                .collect(),
            tags: pet
                .tags
                .iter()
                .map(|t| Tag {
                    id: t.id.unwrap_or_else(next),
                    name: t.name.clone(),
                })
                .collect(),
        };
        self.pets.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn tag_id_range(&self) -> Result<(Option<i64>, Option<i64>), StoreError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        let pets = self.pets.lock().unwrap();
        let ids: Vec<i64> = pets.iter().flat_map(|p| p.tags.iter().map(|t| t.id)).collect();
        Ok((ids.iter().min().copied(), ids.iter().max().copied()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
