//! Builds parameterized statements for the pet schema. Identifiers are constants, values are parameters.

use crate::model::{NewImage, NewPet, NewTag};
use crate::sql::BindValue;
use crate::store::PetLookup;

pub const PETS: &str = "pets";
pub const CATEGORIES: &str = "categories";
pub const IMAGES: &str = "images";
pub const TAGS: &str = "tags";
pub const PET_TAGS: &str = "pet_tags";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<BindValue>) -> u32 {
        self.params.push(v.into());
        self.params.len() as u32
    }
}

/// SELECT the first pet matching the lookup (lowest id wins). None when the lookup cannot match anything.
pub fn select_pet(lookup: &PetLookup) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let predicate = match lookup {
        PetLookup::Id(id) => format!("id = ${}", q.push_param(*id)),
        PetLookup::Category(category_id) => format!("category_id = ${}", q.push_param(*category_id)),
        PetLookup::Status(Some(status)) => format!("status = ${}", q.push_param(status.as_str())),
        PetLookup::Status(None) => "status IS NULL".to_string(),
        PetLookup::Tags(names) => {
            if names.is_empty() {
                return None;
            }
            let placeholders: Vec<String> = names
                .iter()
                .map(|n| format!("${}", q.push_param(n.as_str())))
                .collect();
            format!(
                "id IN (SELECT pt.pet_id FROM {} pt JOIN {} t ON t.id = pt.tag_id WHERE t.name IN ({}))",
                PET_TAGS,
                TAGS,
                placeholders.join(", ")
            )
        }
    };
    q.sql = format!(
        "SELECT id, name, status, category_id FROM {} WHERE {} ORDER BY id LIMIT 1",
        PETS, predicate
    );
    Some(q)
}

pub fn select_category(category_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(category_id);
    q.sql = format!("SELECT id, name FROM {} WHERE id = ${}", CATEGORIES, n);
    q
}

pub fn select_images(pet_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(pet_id);
    q.sql = format!("SELECT id, url FROM {} WHERE pet_id = ${} ORDER BY id", IMAGES, n);
    q
}

pub fn select_tags(pet_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(pet_id);
    q.sql = format!(
        "SELECT t.id, t.name FROM {} t JOIN {} pt ON pt.tag_id = t.id WHERE pt.pet_id = ${} ORDER BY t.id",
        TAGS, PET_TAGS, n
    );
    q
}

/// INSERT with only the columns that carry a value, so absent optionals fall back to column defaults.
fn insert(table: &str, columns: &[(&str, Option<BindValue>)], returning_id: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut names = Vec::new();
    let mut placeholders = Vec::new();
    for (name, value) in columns {
        if let Some(v) = value {
            names.push(*name);
            placeholders.push(format!("${}", q.push_param(v.clone())));
        }
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    );
    if returning_id {
        q.sql.push_str(" RETURNING id");
    }
    q
}

pub fn insert_category(name: &str) -> QueryBuf {
    insert(CATEGORIES, &[("name", Some(name.into()))], true)
}

pub fn insert_pet(pet: &NewPet, category_id: Option<i64>) -> QueryBuf {
    insert(
        PETS,
        &[
            ("id", pet.id.map(BindValue::from)),
            ("name", Some(pet.name.as_str().into())),
            ("status", pet.status.as_deref().map(BindValue::from)),
            ("category_id", category_id.map(BindValue::from)),
        ],
        true,
    )
}

pub fn insert_image(pet_id: i64, image: &NewImage) -> QueryBuf {
    insert(
        IMAGES,
        &[
            ("id", image.id.map(BindValue::from)),
            ("pet_id", Some(pet_id.into())),
            ("url", Some(image.url.as_str().into())),
        ],
        true,
    )
}

pub fn insert_tag(tag: &NewTag) -> QueryBuf {
    insert(
        TAGS,
        &[
            ("id", tag.id.map(BindValue::from)),
            ("name", Some(tag.name.as_str().into())),
        ],
        true,
    )
}

pub fn insert_pet_tag(pet_id: i64, tag_id: i64) -> QueryBuf {
    insert(
        PET_TAGS,
        &[("pet_id", Some(pet_id.into())), ("tag_id", Some(tag_id.into()))],
        false,
    )
}

pub fn tag_id_range() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT MIN(id) AS min_id, MAX(id) AS max_id FROM {}", TAGS);
    q
}

pub fn count_pets() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) AS n FROM {}", PETS);
    q
}
