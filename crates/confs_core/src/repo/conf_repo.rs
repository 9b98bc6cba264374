//! Conference repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `confs` table.
//! - Project persisted rows into `PublicConf` before returning them.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Identifiers are assigned by the store; `RawConf::id` is ignored on insert.
//! - `id`, `added_by` and `created_at` are never rewritten by an edit.
//! - Reads do not filter on `deleted`; removal is a hard delete.
//! - A single undecodable row fails the whole read, no partial results.
//! - Write paths report rows-affected instead of treating zero as an error.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::conf::{ConfId, PublicConf, RawConf};
use crate::model::property_bag::PropertyError;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONF_TABLE: &str = "confs";

const CONF_COLUMNS: [&str; 23] = [
    "id",
    "title",
    "added_by",
    "start_date",
    "end_date",
    "description",
    "picture",
    "country",
    "city",
    "address",
    "category",
    "tickets_available",
    "discount_program",
    "min_price",
    "max_price",
    "facebook",
    "youtube",
    "twitter",
    "details",
    "verified",
    "deleted",
    "created_at",
    "updated_at",
];

const CONF_SELECT_SQL: &str = "SELECT
    id,
    title,
    added_by,
    start_date,
    end_date,
    description,
    picture,
    country,
    city,
    address,
    category,
    tickets_available,
    discount_program,
    min_price,
    max_price,
    facebook,
    youtube,
    twitter,
    details,
    verified,
    deleted,
    created_at,
    updated_at
FROM confs";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for conference persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Property bag could not be encoded for a write.
    Encoding(PropertyError),
    /// Stored property bag could not be decoded on a read.
    Decoding(PropertyError),
    /// No conference row matches the identifier.
    NotFound(ConfId),
    /// Connectivity, constraint or query failure from the store.
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) | Self::Decoding(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "conference not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted conference data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) | Self::Decoding(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<PropertyError> for RepoError {
    fn from(value: PropertyError) -> Self {
        if value.is_encoding() {
            Self::Encoding(value)
        } else {
            Self::Decoding(value)
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        // Codec failures raised inside the ToSql/FromSql hooks come back
        // wrapped by rusqlite; unwrap them so callers see the codec kind.
        match value {
            rusqlite::Error::ToSqlConversionFailure(source) => {
                match source.downcast::<PropertyError>() {
                    Ok(err) => (*err).into(),
                    Err(source) => {
                        Self::Db(DbError::Sqlite(rusqlite::Error::ToSqlConversionFailure(source)))
                    }
                }
            }
            rusqlite::Error::FromSqlConversionFailure(index, kind, source) => {
                match source.downcast::<PropertyError>() {
                    Ok(err) => (*err).into(),
                    Err(source) => Self::Db(DbError::Sqlite(
                        rusqlite::Error::FromSqlConversionFailure(index, kind, source),
                    )),
                }
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Repository interface for conference CRUD operations.
pub trait ConfRepository {
    /// Lists every conference ordered by id ascending.
    fn read_all(&self) -> RepoResult<Vec<PublicConf>>;
    /// Gets one conference, or `NotFound` when the id has no row.
    fn read_one(&self, id: ConfId) -> RepoResult<PublicConf>;
    /// Inserts a new conference and returns the store-assigned id.
    fn insert(&self, conf: &RawConf) -> RepoResult<ConfId>;
    /// Overwrites the mutable fields of `conf.id` and returns rows-affected.
    fn edit_one(&self, conf: &RawConf) -> RepoResult<usize>;
    /// Hard-deletes one conference and returns rows-affected.
    fn remove_one(&self, id: ConfId) -> RepoResult<usize>;
}

/// SQLite-backed conference repository.
///
/// Borrows an already opened connection; the caller owns its lifecycle.
pub struct SqliteConfRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema
    ///   does not carry every conference column.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_conf_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ConfRepository for SqliteConfRepository<'_> {
    fn read_all(&self) -> RepoResult<Vec<PublicConf>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONF_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut confs = Vec::new();

        while let Some(row) = rows.next()? {
            confs.push(PublicConf::from(parse_conf_row(row)?));
        }

        Ok(confs)
    }

    fn read_one(&self, id: ConfId) -> RepoResult<PublicConf> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONF_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => Ok(PublicConf::from(parse_conf_row(row)?)),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn insert(&self, conf: &RawConf) -> RepoResult<ConfId> {
        self.conn.execute(
            "INSERT INTO confs (
                title,
                added_by,
                start_date,
                end_date,
                description,
                picture,
                country,
                city,
                address,
                category,
                tickets_available,
                discount_program,
                min_price,
                max_price,
                facebook,
                youtube,
                twitter,
                details,
                verified,
                deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                      ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);",
            params![
                conf.title.as_str(),
                conf.added_by,
                conf.start_date,
                conf.end_date,
                conf.description.as_str(),
                conf.picture.as_deref(),
                conf.country.as_str(),
                conf.city.as_str(),
                conf.address.as_str(),
                conf.category.as_str(),
                conf.tickets_available,
                conf.discount_program,
                conf.min_price,
                conf.max_price,
                conf.facebook.as_deref(),
                conf.youtube.as_deref(),
                conf.twitter.as_deref(),
                conf.details,
                conf.verified,
                conf.deleted,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=conf_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn edit_one(&self, conf: &RawConf) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE confs
             SET
                title = ?1,
                start_date = ?2,
                end_date = ?3,
                description = ?4,
                picture = ?5,
                country = ?6,
                city = ?7,
                address = ?8,
                category = ?9,
                tickets_available = ?10,
                discount_program = ?11,
                min_price = ?12,
                max_price = ?13,
                facebook = ?14,
                youtube = ?15,
                twitter = ?16,
                details = ?17,
                verified = ?18,
                deleted = ?19,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?20;",
            params![
                conf.title.as_str(),
                conf.start_date,
                conf.end_date,
                conf.description.as_str(),
                conf.picture.as_deref(),
                conf.country.as_str(),
                conf.city.as_str(),
                conf.address.as_str(),
                conf.category.as_str(),
                conf.tickets_available,
                conf.discount_program,
                conf.min_price,
                conf.max_price,
                conf.facebook.as_deref(),
                conf.youtube.as_deref(),
                conf.twitter.as_deref(),
                conf.details,
                conf.verified,
                conf.deleted,
                conf.id,
            ],
        )?;

        debug!(
            "event=conf_edit module=repo status=ok id={} rows_affected={}",
            conf.id, changed
        );
        Ok(changed)
    }

    fn remove_one(&self, id: ConfId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM confs WHERE id = ?1;", [id])?;

        debug!("event=conf_remove module=repo status=ok id={id} rows_affected={changed}");
        Ok(changed)
    }
}

fn parse_conf_row(row: &Row<'_>) -> RepoResult<RawConf> {
    Ok(RawConf {
        id: row.get("id")?,
        title: row.get("title")?,
        added_by: row.get("added_by")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        description: row.get("description")?,
        picture: row.get("picture")?,
        country: row.get("country")?,
        city: row.get("city")?,
        address: row.get("address")?,
        category: row.get("category")?,
        tickets_available: parse_flag(row, "tickets_available")?,
        discount_program: parse_flag(row, "discount_program")?,
        min_price: row.get("min_price")?,
        max_price: row.get("max_price")?,
        facebook: row.get("facebook")?,
        youtube: row.get("youtube")?,
        twitter: row.get("twitter")?,
        details: row.get("details")?,
        verified: parse_flag(row, "verified")?,
        deleted: parse_flag(row, "deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in confs.{column}"
        ))),
    }
}

fn ensure_conf_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, CONF_TABLE)? {
        return Err(RepoError::MissingRequiredTable(CONF_TABLE));
    }

    let present = table_columns(conn, CONF_TABLE)?;
    if let Some(column) = CONF_COLUMNS
        .into_iter()
        .find(|column| !present.iter().any(|name| name.as_str() == *column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: CONF_TABLE,
            column,
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
