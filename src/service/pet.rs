//! Find and create pets on top of the configured store.

use super::diagnostics::ConstraintDiagnostics;
use crate::error::{AppError, StoreError};
use crate::model::{NewPet, Pet};
use crate::store::{Includes, PetLookup, PetStore};
use std::sync::Arc;

/// Outcome of a create. `persisted` is false when a constraint violation was swallowed
/// and `pet` is the submitted representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Created {
    pub pet: Pet,
    pub persisted: bool,
}

impl Created {
    pub fn location(&self) -> String {
        format!("/pet/{}", self.pet.id)
    }
}

pub struct PetService {
    store: Arc<dyn PetStore>,
    diagnostics: ConstraintDiagnostics,
}

impl PetService {
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self::with_diagnostics(store, ConstraintDiagnostics::default())
    }

    pub fn with_diagnostics(store: Arc<dyn PetStore>, diagnostics: ConstraintDiagnostics) -> Self {
        PetService { store, diagnostics }
    }

    pub fn store(&self) -> &dyn PetStore {
        self.store.as_ref()
    }

    /// First matching pet with category, images and tags loaded.
    pub async fn find(&self, lookup: PetLookup) -> Result<Pet, AppError> {
        if matches!(&lookup, PetLookup::Tags(tags) if tags.is_empty()) {
            return Err(not_found(&lookup));
        }
        self.store
            .find_pet(&lookup, Includes::ALL)
            .await?
            .ok_or_else(|| not_found(&lookup))
    }

    /// Insert the pet. Constraint violations are not errors for the caller: the first one
    /// is captured for diagnosis and every one answers with the submitted pet.
    pub async fn create(&self, pet: NewPet) -> Result<Created, AppError> {
        match self.store.insert_pet(&pet).await {
            Ok(stored) => {
                tracing::debug!(pet_id = stored.id, "pet created");
                Ok(Created {
                    pet: stored,
                    persisted: true,
                })
            }
            Err(StoreError::Constraint(violation)) => {
                let submitted = pet.as_submitted();
                self.diagnostics
                    .observe(self.store.as_ref(), pet.id, submitted.id, &violation)
                    .await;
                Ok(Created {
                    pet: submitted,
                    persisted: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn not_found(lookup: &PetLookup) -> AppError {
    AppError::NotFound(match lookup {
        PetLookup::Id(id) => format!("pet {}", id),
        PetLookup::Category(id) => format!("pet in category {}", id),
        PetLookup::Status(Some(s)) => format!("pet with status {}", s),
        PetLookup::Status(None) => "pet without status".to_string(),
        PetLookup::Tags(tags) => format!("pet tagged {}", tags.join(",")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, NewTag, Tag};
    use crate::store::memory::{InsertMode, MemoryStore};
    use std::time::Duration;

    fn pet(id: i64, name: &str, status: Option<&str>, category: i64, tags: &[(i64, &str)]) -> Pet {
        Pet {
            id,
            name: name.into(),
            status: status.map(String::from),
            category: Some(Category {
                id: category,
                name: format!("cat-{}", category),
            }),
            images: vec![],
            tags: tags
                .iter()
                .map(|(id, name)| Tag {
                    id: *id,
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    fn service(store: Arc<MemoryStore>) -> PetService {
        PetService::with_diagnostics(store, ConstraintDiagnostics::with_pauses(Duration::ZERO, Duration::ZERO))
    }

    fn new_pet(id: Option<i64>, name: &str) -> NewPet {
        NewPet {
            id,
            name: name.into(),
            status: Some("available".into()),
            category: None,
            images: vec![],
            tags: vec![NewTag {
                id: Some(1),
                name: "friendly".into(),
            }],
        }
    }

    fn seeded() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_pets(vec![
            pet(2, "Whiskers", Some("pending"), 2, &[(3, "indoor")]),
            pet(1, "Rex", Some("available"), 1, &[(1, "friendly"), (2, "trained")]),
            pet(3, "Ghost", None, 1, &[(4, "friendly")]),
        ]))
    }

    #[tokio::test]
    async fn find_by_id_hit_and_miss() {
        let svc = service(seeded());
        assert_eq!(svc.find(PetLookup::Id(2)).await.unwrap().name, "Whiskers");
        assert!(matches!(svc.find(PetLookup::Id(99)).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn lowest_id_wins_when_several_match() {
        let svc = service(seeded());
        assert_eq!(svc.find(PetLookup::Category(1)).await.unwrap().id, 1);
        let tagged = svc.find(PetLookup::Tags(vec!["friendly".into()])).await.unwrap();
        assert_eq!(tagged.id, 1);
    }

    #[tokio::test]
    async fn status_lookup_is_exact_and_none_matches_absent_status() {
        let svc = service(seeded());
        assert_eq!(svc.find(PetLookup::Status(Some("available".into()))).await.unwrap().id, 1);
        assert!(svc.find(PetLookup::Status(Some("sold".into()))).await.is_err());
        assert!(svc.find(PetLookup::Status(Some("Available".into()))).await.is_err());
        assert_eq!(svc.find(PetLookup::Status(None)).await.unwrap().name, "Ghost");
    }

    #[tokio::test]
    async fn tag_lookup_matches_any_name() {
        let svc = service(seeded());
        let found = svc
            .find(PetLookup::Tags(vec!["nope".into(), "indoor".into()]))
            .await
            .unwrap();
        assert_eq!(found.id, 2);
        assert!(svc.find(PetLookup::Tags(vec![])).await.is_err());
        assert!(svc.find(PetLookup::Tags(vec!["nope".into()])).await.is_err());
    }

    #[tokio::test]
    async fn created_pet_can_be_found_by_returned_id() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let created = svc.create(new_pet(None, "Tom")).await.unwrap();
        assert!(created.persisted);
        assert_eq!(created.location(), format!("/pet/{}", created.pet.id));

        let found = svc.find(PetLookup::Id(created.pet.id)).await.unwrap();
        assert_eq!(found, created.pet);
    }

    #[tokio::test]
    async fn constraint_violation_returns_submitted_pet() {
        let store = Arc::new(MemoryStore::new());
        store.set_mode(InsertMode::ViolateConstraint);
        let svc = service(store.clone());

        let created = svc.create(new_pet(Some(17), "Tom")).await.unwrap();
        assert!(!created.persisted);
        assert_eq!(created.pet.id, 17);
        assert_eq!(created.pet.tags[0].name, "friendly");
        assert_eq!(created.location(), "/pet/17");
        assert_eq!(store.range_queries(), 1);

        let anonymous = svc.create(new_pet(None, "Jerry")).await.unwrap();
        assert_eq!(anonymous.location(), "/pet/0");
        assert_eq!(store.range_queries(), 1);
    }

    #[tokio::test]
    async fn concurrent_violations_capture_once() {
        let store = Arc::new(MemoryStore::new());
        store.set_mode(InsertMode::ViolateConstraint);
        let svc = Arc::new(service(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.create(new_pet(Some(i + 1), "Tom")).await })
            })
            .collect();
        for h in handles {
            assert!(!h.await.unwrap().unwrap().persisted);
        }
        assert_eq!(store.inserts(), 8);
        assert_eq!(store.range_queries(), 1);
    }

    #[tokio::test]
    async fn other_store_failures_propagate() {
        let store = Arc::new(MemoryStore::new());
        store.set_mode(InsertMode::Fail);
        let svc = service(store.clone());
        let err = svc.create(new_pet(None, "Tom")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Db(_))));
        assert_eq!(store.range_queries(), 0);
    }
}
