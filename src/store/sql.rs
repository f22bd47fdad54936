//! Pet persistence over sqlx's `Any` driver (SQLite or PostgreSQL).

use super::{Includes, PetLookup, PetStore};
use crate::error::{ConstraintViolation, StoreError};
use crate::model::{Category, Image, NewCategory, NewPet, Pet, Tag};
use crate::sql::{
    bind_params, insert_category, insert_image, insert_pet, insert_pet_tag, insert_tag, select_category,
    select_images, select_pet, select_tags, tag_id_range, QueryBuf,
};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgDatabaseError;
use sqlx::{AnyConnection, AnyPool, Row};

pub struct SqlPetStore {
    pool: AnyPool,
    backend: &'static str,
}

impl SqlPetStore {
    pub fn new(pool: AnyPool, backend: &'static str) -> Self {
        SqlPetStore { pool, backend }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    async fn fetch_optional(conn: &mut AnyConnection, q: &QueryBuf) -> Result<Option<AnyRow>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await
    }

    async fn fetch_all(conn: &mut AnyConnection, q: &QueryBuf) -> Result<Vec<AnyRow>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_all(&mut *conn)
            .await
    }

    /// Run an INSERT ... RETURNING id inside a transaction; constraint failures keep the statement text.
    async fn insert_returning_id(conn: &mut AnyConnection, q: &QueryBuf) -> Result<i64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let row = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| classify(e, &q.sql))?;
        Ok(row.try_get::<i64, _>("id")?)
    }

    async fn execute(conn: &mut AnyConnection, q: &QueryBuf) -> Result<(), StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        bind_params(sqlx::query(&q.sql), &q.params)
            .execute(&mut *conn)
            .await
            .map_err(|e| classify(e, &q.sql))?;
        Ok(())
    }

    async fn load_pet(
        conn: &mut AnyConnection,
        lookup: &PetLookup,
        includes: Includes,
    ) -> Result<Option<Pet>, StoreError> {
        let Some(q) = select_pet(lookup) else {
            return Ok(None);
        };
        let Some(row) = Self::fetch_optional(conn, &q).await? else {
            return Ok(None);
        };
        let category_id: Option<i64> = row.try_get("category_id")?;
        let mut pet = Pet {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            status: row.try_get("status")?,
            category: None,
            images: Vec::new(),
            tags: Vec::new(),
        };

        if includes.category {
            if let Some(category_id) = category_id {
                if let Some(row) = Self::fetch_optional(conn, &select_category(category_id)).await? {
                    pet.category = Some(Category {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                    });
                }
            }
        }
        if includes.images {
            for row in Self::fetch_all(conn, &select_images(pet.id)).await? {
                pet.images.push(Image {
                    id: row.try_get("id")?,
                    url: row.try_get("url")?,
                });
            }
        }
        if includes.tags {
            for row in Self::fetch_all(conn, &select_tags(pet.id)).await? {
                pet.tags.push(Tag {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                });
            }
        }
        Ok(Some(pet))
    }
}

#[async_trait]
impl PetStore for SqlPetStore {
    async fn find_pet(&self, lookup: &PetLookup, includes: Includes) -> Result<Option<Pet>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::load_pet(&mut conn, lookup, includes).await
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        let mut tx = self.pool.begin().await?;

        let category_id = match &pet.category {
            Some(NewCategory { id: Some(id), .. }) => Some(*id),
            Some(category) => Some(Self::insert_returning_id(&mut tx, &insert_category(&category.name)).await?),
            None => None,
        };
        let pet_id = Self::insert_returning_id(&mut tx, &insert_pet(pet, category_id)).await?;
        for image in &pet.images {
            Self::insert_returning_id(&mut tx, &insert_image(pet_id, image)).await?;
        }
        for tag in &pet.tags {
            let tag_id = Self::insert_returning_id(&mut tx, &insert_tag(tag)).await?;
            Self::execute(&mut tx, &insert_pet_tag(pet_id, tag_id)).await?;
        }

        let stored = Self::load_pet(&mut tx, &PetLookup::Id(pet_id), Includes::ALL)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await.map_err(|e| classify(e, "COMMIT"))?;
        Ok(stored)
    }

    async fn tag_id_range(&self) -> Result<(Option<i64>, Option<i64>), StoreError> {
        let mut conn = self.pool.acquire().await?;
        let q = tag_id_range();
        let row = Self::fetch_optional(&mut conn, &q).await?;
        match row {
            Some(row) => Ok((row.try_get("min_id")?, row.try_get("max_id")?)),
            None => Ok((None, None)),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        self.backend
    }
}

/// Split backend constraint rejections from every other database failure.
fn classify(err: sqlx::Error, statement: &str) -> StoreError {
    let sqlx::Error::Database(db_err) = &err else {
        return StoreError::Db(err);
    };
    let kind = match db_err.kind() {
        ErrorKind::UniqueViolation => "unique",
        ErrorKind::ForeignKeyViolation => "foreign key",
        ErrorKind::NotNullViolation => "not null",
        ErrorKind::CheckViolation => "check",
        _ => return StoreError::Db(err),
    };

    let mut violation = ConstraintViolation {
        kind,
        code: db_err.code().map(|c| c.into_owned()),
        message: db_err.message().to_string(),
        constraint: db_err.constraint().map(str::to_string),
        table: db_err.table().map(str::to_string),
        statement: Some(statement.to_string()),
        ..ConstraintViolation::default()
    };
    if let Some(pg) = db_err.try_downcast_ref::<PgDatabaseError>() {
        violation.detail = pg.detail().map(str::to_string);
        violation.hint = pg.hint().map(str::to_string);
        violation.schema = pg.schema().map(str::to_string);
        violation.column = pg.column().map(str::to_string);
        violation.data_type = pg.data_type().map(str::to_string);
        violation.where_ = pg.r#where().map(str::to_string);
    }
    StoreError::Constraint(violation)
}
