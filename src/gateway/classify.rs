//! Request classification
//!
//! Turns (method, path, query parameters, body) into a [`Classified`]
//! request. Pure: no I/O, no state. The dispatcher calls the store only for
//! the `Insert*` and `QueryDirect` outcomes.

use std::collections::HashMap;

use axum::http::Method;
use chrono::NaiveDate;
use serde_json::Value;

use super::errors::{GatewayError, GatewayResult};
use super::policy::StatementPolicy;
use crate::store::PatientRow;

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// The two supported routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST /insert`
    Insert,
    /// `GET /query`
    Query,
}

impl Route {
    /// Exact method and path match; anything else is not a route.
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        match (method, path) {
            (&Method::POST, "/insert") => Some(Route::Insert),
            (&Method::GET, "/query") => Some(Route::Query),
            _ => None,
        }
    }
}

/// A classified inbound request
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// `OPTIONS` on any path
    Preflight,
    /// `POST /insert` with `{"query": "INSERT ..."}`
    InsertDirect(String),
    /// `POST /insert` with `{"data": [[name, birth_date], ...]}`
    InsertBulk(Vec<PatientRow>),
    /// `GET /query?sql=...`
    QueryDirect(String),
    /// No route, or an `/insert` body of neither shape
    Unrecognized,
}

/// Classify a request and validate it against the statement allow-list.
pub fn classify(
    method: &Method,
    path: &str,
    params: &HashMap<String, String>,
    body: &[u8],
) -> GatewayResult<Classified> {
    if *method == Method::OPTIONS {
        return Ok(Classified::Preflight);
    }

    match Route::resolve(method, path) {
        Some(Route::Insert) => {
            let parsed: Value = serde_json::from_slice(body).map_err(|_| GatewayError::Parse)?;
            classify_insert(&parsed)
        }
        Some(Route::Query) => classify_query(params),
        None => Ok(Classified::Unrecognized),
    }
}

fn classify_insert(body: &Value) -> GatewayResult<Classified> {
    let Some(object) = body.as_object() else {
        return Ok(Classified::Unrecognized);
    };

    // An explicit null counts as an absent key
    let field = |key: &str| object.get(key).filter(|value| !value.is_null());

    if let Some(query) = field("query") {
        let statement = query
            .as_str()
            .ok_or_else(|| GatewayError::validation("query must be a string"))?;
        StatementPolicy::InsertOnly.check(statement)?;
        return Ok(Classified::InsertDirect(statement.to_string()));
    }

    if let Some(data) = field("data") {
        let rows = data.as_array().ok_or_else(|| {
            GatewayError::validation("data must be an array of [name, birth_date] rows")
        })?;
        return rows
            .iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect::<GatewayResult<Vec<_>>>()
            .map(Classified::InsertBulk);
    }

    Ok(Classified::Unrecognized)
}

fn classify_query(params: &HashMap<String, String>) -> GatewayResult<Classified> {
    let policy = StatementPolicy::SelectOrInsert;

    let statement = params
        .get("sql")
        .filter(|sql| !sql.trim().is_empty())
        .ok_or_else(|| GatewayError::validation(policy.rejection_message()))?;

    policy.check(statement)?;
    Ok(Classified::QueryDirect(statement.clone()))
}

/// Destructure one `[name, birth_date]` element
fn parse_row(index: usize, row: &Value) -> GatewayResult<PatientRow> {
    let fields = match row.as_array() {
        Some(fields) if fields.len() == 2 => fields,
        _ => {
            return Err(GatewayError::validation(format!(
                "row {}: expected [name, birth_date]",
                index
            )))
        }
    };

    let name = fields[0]
        .as_str()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            GatewayError::validation(format!("row {}: name must be a non-empty string", index))
        })?;

    let birth_date = fields[1]
        .as_str()
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), BIRTH_DATE_FORMAT).ok())
        .ok_or_else(|| {
            GatewayError::validation(format!(
                "row {}: birth_date must be a YYYY-MM-DD date",
                index
            ))
        })?;

    Ok(PatientRow::new(name, birth_date))
}
