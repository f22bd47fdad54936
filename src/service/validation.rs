//! Create payload validation. Collects every failing field before rejecting.

use crate::error::{AppError, ValidationErrors};
use crate::model::{NewCategory, NewImage, NewPet, NewTag};
use serde_json::{Map, Value};

pub struct PetValidator;

impl PetValidator {
    /// Parse and check a create body. The result is only produced when every field passes.
    pub fn validate(body: &[u8]) -> Result<NewPet, AppError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
        let Value::Object(obj) = value else {
            return Err(AppError::BadRequest("body must be a JSON object".into()));
        };

        let mut errors = ValidationErrors::default();
        let id = optional_id(&obj, "id", "id", &mut errors);
        let name = required_text(&obj, "name", "name", &mut errors);
        let status = match obj.get("status") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                errors.push("status", "must be a string");
                None
            }
        };
        let category = match obj.get("category") {
            None | Some(Value::Null) => None,
            Some(Value::Object(c)) => category(c, &mut errors),
            Some(_) => {
                errors.push("category", "must be an object");
                None
            }
        };
        let images = items(&obj, "images", &mut errors, |i, o, errors| {
            let path = format!("images[{}]", i);
            let id = optional_id(o, "id", &format!("{}.id", path), errors);
            let url = required_text(o, "url", &format!("{}.url", path), errors)?;
            Some(NewImage { id, url })
        });
        let tags = items(&obj, "tags", &mut errors, |i, o, errors| {
            let path = format!("tags[{}]", i);
            let id = optional_id(o, "id", &format!("{}.id", path), errors);
            let name = required_text(o, "name", &format!("{}.name", path), errors)?;
            Some(NewTag { id, name })
        });

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(NewPet {
            id,
            name: name.unwrap_or_default(),
            status,
            category,
            images,
            tags,
        })
    }
}

fn category(obj: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<NewCategory> {
    let id = optional_id(obj, "id", "category.id", errors);
    let name = match (id, obj.get("name")) {
        // a reference to an existing category may omit the name
        (Some(_), None | Some(Value::Null)) => Some(String::new()),
        (Some(_), Some(Value::String(s))) => Some(s.clone()),
        (Some(_), Some(_)) => {
            errors.push("category.name", "must be a string");
            None
        }
        (None, _) => required_text(obj, "name", "category.name", errors),
    }?;
    Some(NewCategory { id, name })
}

/// Integer id; absent, null and 0 all mean "assigned by the store".
fn optional_id(obj: &Map<String, Value>, key: &str, path: &str, errors: &mut ValidationErrors) -> Option<i64> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_i64() {
            Some(0) => None,
            Some(n) => Some(n),
            None => {
                errors.push(path, "must be an integer");
                None
            }
        },
    }
}

fn required_text(obj: &Map<String, Value>, key: &str, path: &str, errors: &mut ValidationErrors) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.push(path, "must not be blank");
            None
        }
        None | Some(Value::Null) => {
            errors.push(path, "is required");
            None
        }
        Some(_) => {
            errors.push(path, "must be a string");
            None
        }
    }
}

/// Optional array of objects under `key`, each converted by `item`.
fn items<T>(
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
    item: impl Fn(usize, &Map<String, Value>, &mut ValidationErrors) -> Option<T>,
) -> Vec<T> {
    let arr = match obj.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(arr)) => arr,
        Some(_) => {
            errors.push(key, "must be an array");
            return Vec::new();
        }
    };
    let mut out = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().enumerate() {
        match v {
            Value::Object(o) => out.extend(item(i, o, errors)),
            _ => errors.push(format!("{}[{}]", key, i), "must be an object"),
        }
    }
    out
}
