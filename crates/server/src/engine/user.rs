use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateUserRequest, UpdateUserRequest},
        response_errors::UserError,
    },
    model::{is_unique_violation, Chronotype, Gender, Model, User},
};

pub const DEFAULT_WEIGHT: i64 = 60;

fn invalid(message: impl Into<String>) -> UserError {
    UserError::Invalid {
        message: message.into(),
    }
}

fn validate_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("name is required"));
    }
    Ok(name.to_string())
}

fn validate_age(age: i64) -> Result<i64, UserError> {
    if !(1..=150).contains(&age) {
        return Err(invalid("age must be between 1 and 150"));
    }
    Ok(age)
}

fn validate_weight(weight: i64) -> Result<i64, UserError> {
    if !(1..=500).contains(&weight) {
        return Err(invalid("weight must be between 1 and 500"));
    }
    Ok(weight)
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, UserError> {
    value
        .parse()
        .map_err(|_| invalid(format!("{value:?} is not a valid {field}")))
}

pub fn create_me(
    conn: &mut Connection,
    uid: &str,
    request: CreateUserRequest,
    now: DateTime<Utc>,
) -> Result<User, ServerError> {
    let user = User {
        id: uid.to_string(),
        name: validate_name(&request.name)?,
        age: validate_age(request.age)?,
        gender: match request.gender.as_deref() {
            None | Some("") => Gender::default(),
            Some(g) => parse_field("gender", g)?,
        },
        weight: validate_weight(request.weight.unwrap_or(DEFAULT_WEIGHT))?,
        chronotype: match request.chronotype.as_deref() {
            None | Some("") => Chronotype::default(),
            Some(c) => parse_field("chronotype", c)?,
        },
        avatar_url: String::new(),
        created_at: now,
        updated_at: now,
    };

    if User::exists(conn, uid)? {
        Err(UserError::AlreadyRegistered)?;
    }
    user.create(conn).map_err(|e| -> ServerError {
        if is_unique_violation(&e) {
            UserError::AlreadyRegistered.into()
        } else {
            e.into()
        }
    })?;

    Ok(user)
}

pub fn get_me(conn: &Connection, uid: &str) -> Result<User, ServerError> {
    Ok(User::fetch_maybe(conn, uid)?.ok_or(UserError::NotFound)?)
}

pub fn update_me(
    conn: &mut Connection,
    uid: &str,
    request: UpdateUserRequest,
    now: DateTime<Utc>,
) -> Result<User, ServerError> {
    let mut user = User::fetch_maybe(conn, uid)?.ok_or(UserError::NotFound)?;

    if let Some(name) = request.name {
        user.name = validate_name(&name)?;
    }
    if let Some(age) = request.age {
        user.age = validate_age(age)?;
    }
    if let Some(gender) = request.gender {
        user.gender = parse_field("gender", &gender)?;
    }
    if let Some(weight) = request.weight {
        user.weight = validate_weight(weight)?;
    }
    if let Some(chronotype) = request.chronotype {
        user.chronotype = parse_field("chronotype", &chronotype)?;
    }
    user.updated_at = now;
    user.update(conn)?;

    Ok(user)
}
