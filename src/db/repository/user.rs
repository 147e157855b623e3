use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use uuid::Uuid;

use super::report::{format_timestamp, parse_timestamp};
use crate::auth::Credential;
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const USER_COLUMNS: &str =
    "id, name, email, phone, role, status, expertise, address, created_at";

pub fn insert_user(
    conn: &Connection,
    user: &User,
    credential: &Credential,
) -> Result<(), DatabaseError> {
    let result = conn.execute(
        &format!(
            "INSERT INTO users ({USER_COLUMNS}, credential_salt, credential_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            user.id.to_string(),
            user.name,
            user.email.to_lowercase(),
            user.phone,
            user.role.as_str(),
            user.status.as_str(),
            user.expertise,
            user.address,
            format_timestamp(&user.created_at),
            credential.salt,
            credential.hash,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(DatabaseError::Conflict {
                entity_type: "User".into(),
                id: user.email.to_lowercase(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    let result = stmt.query_row(params![id.to_string()], user_row_from_rusqlite);

    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Look up a user and their stored credential by (case-insensitive) email.
pub fn get_user_with_credential(
    conn: &Connection,
    email: &str,
) -> Result<Option<(User, Credential)>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}, credential_salt, credential_hash FROM users WHERE email = ?1"
    ))?;
    let result = stmt.query_row(params![email.trim().to_lowercase()], |row| {
        Ok((
            user_row_from_rusqlite(row)?,
            Credential {
                salt: row.get(9)?,
                hash: row.get(10)?,
            },
        ))
    });

    match result {
        Ok((row, credential)) => Ok(Some((user_from_row(row)?, credential))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(conn: &Connection, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<&str> = Vec::new();
    if let Some(role) = &filter.role {
        clauses.push("role = ?");
        values.push(role.as_str());
    }
    if let Some(status) = &filter.status {
        clauses.push("status = ?");
        values.push(status.as_str());
    }

    let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), user_row_from_rusqlite)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn update_user_status(
    conn: &Connection,
    id: &Uuid,
    status: UserStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

struct UserRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    role: String,
    status: String,
    expertise: Option<String>,
    address: Option<String>,
    created_at: String,
}

fn user_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        role: row.get(4)?,
        status: row.get(5)?,
        expertise: row.get(6)?,
        address: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidValue {
            field: "users.id".into(),
            value: row.id.clone(),
        })?,
        name: row.name,
        email: row.email,
        phone: row.phone,
        role: Role::from_str(&row.role)?,
        status: UserStatus::from_str(&row.status)?,
        expertise: row.expertise,
        address: row.address,
        created_at: parse_timestamp("users.created_at", &row.created_at)?,
    })
}
