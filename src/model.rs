//! Pet store entities as stored and as returned to clients (camelCase JSON).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
    pub category: Option<Category>,
    pub images: Vec<Image>,
    pub tags: Vec<Tag>,
}

/// Category on a create request. With an id it references an existing row; without one it is inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewImage {
    pub id: Option<i64>,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTag {
    pub id: Option<i64>,
    pub name: String,
}

/// Validated create payload. Ids are `None` when the client left them for the store to assign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPet {
    pub id: Option<i64>,
    pub name: String,
    pub status: Option<String>,
    pub category: Option<NewCategory>,
    pub images: Vec<NewImage>,
    pub tags: Vec<NewTag>,
}

impl NewPet {
    /// The pet exactly as the client submitted it; unassigned ids read as 0.
    pub fn as_submitted(&self) -> Pet {
        Pet {
            id: self.id.unwrap_or(0),
            name: self.name.clone(),
            status: self.status.clone(),
            category: self.category.as_ref().map(|c| Category {
                id: c.id.unwrap_or(0),
                name: c.name.clone(),
            }),
            images: self
                .images
                .iter()
                .map(|i| Image {
                    id: i.id.unwrap_or(0),
                    url: i.url.clone(),
                })
                .collect(),
            tags: self
                .tags
                .iter()
                .map(|t| Tag {
                    id: t.id.unwrap_or(0),
                    name: t.name.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_serializes_camel_case_with_nested_relations() {
        let pet = Pet {
            id: 1,
            name: "Rex".into(),
            status: Some("available".into()),
            category: Some(Category { id: 2, name: "Dogs".into() }),
            images: vec![Image { id: 3, url: "https://img/rex.jpg".into() }],
            tags: vec![Tag { id: 4, name: "friendly".into() }],
        };
        let v = serde_json::to_value(&pet).unwrap();
        assert_eq!(v["category"]["name"], "Dogs");
        assert_eq!(v["images"][0]["url"], "https://img/rex.jpg");
        assert_eq!(v["tags"][0]["id"], 4);
    }

    #[test]
    fn as_submitted_keeps_client_values_and_zeroes_missing_ids() {
        let new = NewPet {
            id: None,
            name: "Rex".into(),
            status: None,
            category: Some(NewCategory { id: Some(7), name: String::new() }),
            images: vec![],
            tags: vec![NewTag { id: None, name: "friendly".into() }],
        };
        let pet = new.as_submitted();
        assert_eq!(pet.id, 0);
        assert_eq!(pet.category.unwrap().id, 7);
        assert_eq!(pet.tags[0], Tag { id: 0, name: "friendly".into() });
    }
}
