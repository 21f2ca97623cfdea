//! `locations` table DDL and typed queries. One short-lived pool acquisition
//! per call; multi-statement writes (seeding) run in a caller-owned
//! transaction.

use crate::error::AppError;
use crate::location::{Location, LocationPatch, NewLocation};
use sqlx::SqlitePool;

// `desc` is an SQL keyword, so the column stays quoted in every statement.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        loca TEXT NOT NULL,
        img TEXT NOT NULL,
        "desc" TEXT NOT NULL,
        facilities TEXT,
        layout_info TEXT
    )
"#;

const CREATE_NAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_locations_name ON locations (name)";
const CREATE_LOCA_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_locations_loca ON locations (loca)";

const SELECT_BY_ID: &str = "SELECT * FROM locations WHERE id = ?";
const INSERT: &str = r#"
    INSERT INTO locations (name, loca, img, "desc", facilities, layout_info)
    VALUES (?, ?, ?, ?, ?, ?)
"#;
const DELETE_BY_ID: &str = "DELETE FROM locations WHERE id = ?";
const DELETE_ALL: &str = "DELETE FROM locations";
const COUNT: &str = "SELECT COUNT(*) FROM locations";

/// Create the table and indexes if missing. Called once at startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_NAME_INDEX).execute(pool).await?;
    sqlx::query(CREATE_LOCA_INDEX).execute(pool).await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, AppError> {
    let (n,): (i64,) = sqlx::query_as(COUNT).fetch_one(pool).await?;
    Ok(n)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
}

impl SortKey {
    /// Unrecognized keys are silently ignored (store order), per the lenient
    /// listing contract.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `desc` flips the order; anything else sorts
    /// ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated listing parameters. `search` matches `name` OR `desc`, `loca`
/// matches the `loca` column, both case-insensitive substrings combined with
/// AND when present.
#[derive(Clone, Debug)]
pub struct ListQuery {
    pub search: Option<String>,
    pub loca: Option<String>,
    pub sort: Option<SortKey>,
    pub order: SortOrder,
    pub limit: u32,
}

fn build_list_sql(query: &ListQuery) -> (String, Vec<String>) {
    let mut sql = String::from("SELECT * FROM locations");
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(loca) = &query.loca {
        clauses.push("LOWER(loca) LIKE ?");
        params.push(format!("%{}%", loca.to_lowercase()));
    }
    if let Some(search) = &query.search {
        clauses.push(r#"(LOWER(name) LIKE ? OR LOWER("desc") LIKE ?)"#);
        let pattern = format!("%{}%", search.to_lowercase());
        params.push(pattern.clone());
        params.push(pattern);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    if let Some(sort) = query.sort {
        sql.push_str(" ORDER BY ");
        sql.push_str(sort.column());
        sql.push(' ');
        sql.push_str(query.order.keyword());
    }
    sql.push_str(" LIMIT ?");
    (sql, params)
}

pub async fn list(pool: &SqlitePool, query: &ListQuery) -> Result<Vec<Location>, AppError> {
    let (sql, params) = build_list_sql(query);
    tracing::debug!(sql = %sql, params = ?params, limit = query.limit, "list query");
    let mut q = sqlx::query_as::<_, Location>(&sql);
    for param in &params {
        q = q.bind(param);
    }
    Ok(q.bind(query.limit).fetch_all(pool).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Location>, AppError> {
    Ok(sqlx::query_as(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Insert one record and return it with its assigned id.
pub async fn insert(pool: &SqlitePool, new: &NewLocation) -> Result<Location, AppError> {
    let result = sqlx::query(INSERT)
        .bind(&new.name)
        .bind(&new.loca)
        .bind(&new.img)
        .bind(&new.desc)
        .bind(&new.facilities)
        .bind(&new.layout_info)
        .execute(pool)
        .await
        .map_err(constraint_to_conflict)?;
    let id = result.last_insert_rowid();
    get(pool, id)
        .await?
        .ok_or(AppError::Db(sqlx::Error::RowNotFound))
}

/// Insert within a caller-owned transaction (bulk seeding).
pub async fn insert_tx(
    conn: &mut sqlx::SqliteConnection,
    new: &NewLocation,
) -> Result<(), AppError> {
    sqlx::query(INSERT)
        .bind(&new.name)
        .bind(&new.loca)
        .bind(&new.img)
        .bind(&new.desc)
        .bind(&new.facilities)
        .bind(&new.layout_info)
        .execute(conn)
        .await
        .map_err(constraint_to_conflict)?;
    Ok(())
}

/// Apply a sparse update. Only fields present in the patch are assigned;
/// returns `None` when no row matched the id.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    patch: &LocationPatch,
) -> Result<Option<Location>, AppError> {
    let mut sets: Vec<&'static str> = Vec::new();
    let mut values: Vec<Option<String>> = Vec::new();
    if let Some(value) = &patch.name {
        sets.push("name = ?");
        values.push(value.clone());
    }
    if let Some(value) = &patch.loca {
        sets.push("loca = ?");
        values.push(value.clone());
    }
    if let Some(value) = &patch.img {
        sets.push("img = ?");
        values.push(value.clone());
    }
    if let Some(value) = &patch.desc {
        sets.push(r#""desc" = ?"#);
        values.push(value.clone());
    }
    if let Some(value) = &patch.facilities {
        sets.push("facilities = ?");
        values.push(value.clone());
    }
    if let Some(value) = &patch.layout_info {
        sets.push("layout_info = ?");
        values.push(value.clone());
    }
    if sets.is_empty() {
        return Err(AppError::BadRequest("no fields to update".into()));
    }

    let sql = format!("UPDATE locations SET {} WHERE id = ?", sets.join(", "));
    tracing::debug!(sql = %sql, id, "update query");
    let mut q = sqlx::query(&sql);
    for value in &values {
        q = q.bind(value);
    }
    let result = q
        .bind(id)
        .execute(pool)
        .await
        .map_err(constraint_to_conflict)?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

/// Delete one record. Returns false when no row matched.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(DELETE_BY_ID).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Delete all records and return how many were removed.
pub async fn delete_all(pool: &SqlitePool) -> Result<u64, AppError> {
    let result = sqlx::query(DELETE_ALL).execute(pool).await?;
    Ok(result.rows_affected())
}

fn constraint_to_conflict(err: sqlx::Error) -> AppError {
    use sqlx::error::ErrorKind;
    match &err {
        sqlx::Error::Database(db)
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ) =>
        {
            AppError::Conflict("location data is invalid or already exists".into())
        }
        _ => AppError::Db(err),
    }
}
