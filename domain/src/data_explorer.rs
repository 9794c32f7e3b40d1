//! Validation and coercion for data explorer requests.
//!
//! Requests arrive as loosely typed JSON. Everything is checked against the
//! table registry in `entity_api::data_explorer` before a query is built, so
//! only registered columns, supported operators and correctly typed values
//! ever reach SQL.

use crate::error::Error;
use crate::Id;
use chrono::DateTime;
use entity_api::data_explorer::{
    self as explorer, ExplorerQuery, FieldSchema, FieldType, Predicate, TableSchema,
};
use log::*;
use sea_orm::sea_query::Order;
use sea_orm::{DatabaseConnection, JsonValue, Value};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use entity_api::data_explorer::Operator;

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 500;

const ALL_OPERATORS: [Operator; 12] = [
    Operator::Eq,
    Operator::Neq,
    Operator::Contains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
    Operator::In,
    Operator::IsNull,
    Operator::IsNotNull,
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldDescription {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    pub operators: Vec<Operator>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableDescription {
    pub name: String,
    pub label: String,
    pub default_sort: String,
    pub fields: Vec<FieldDescription>,
}

impl From<&FieldSchema> for FieldDescription {
    fn from(field: &FieldSchema) -> Self {
        Self {
            name: field.name.to_string(),
            label: field.label.to_string(),
            field_type: field.field_type.name().to_string(),
            allowed_values: field
                .field_type
                .allowed_values()
                .map(|values| values.iter().map(|value| value.to_string()).collect()),
            operators: ALL_OPERATORS
                .into_iter()
                .filter(|operator| operator.supports(field.field_type))
                .collect(),
        }
    }
}

impl From<&TableSchema> for TableDescription {
    fn from(table: &TableSchema) -> Self {
        Self {
            name: table.name.to_string(),
            label: table.label.to_string(),
            default_sort: table.default_sort.to_string(),
            fields: table.fields.iter().map(FieldDescription::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FilterRequest {
    pub field: String,
    /// One of `eq`, `neq`, `contains`, `starts_with`, `ends_with`, `gt`,
    /// `gte`, `lt`, `lte`, `in`, `is_null`, `is_not_null`.
    pub operator: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: Vec<FilterRequest>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortDirection>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueryResult {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<JsonValue>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

pub fn list_tables() -> Vec<TableDescription> {
    explorer::TABLES.iter().map(TableDescription::from).collect()
}

fn find_table(name: &str) -> Result<&'static TableSchema, Error> {
    explorer::find_table(name).ok_or_else(|| {
        debug!("Unknown data explorer table {name}");
        Error::not_found()
    })
}

pub fn describe_table(name: &str) -> Result<TableDescription, Error> {
    Ok(find_table(name)?.into())
}

fn find_field(table: &'static TableSchema, name: &str) -> Result<&'static FieldSchema, Error> {
    table
        .field(name)
        .ok_or_else(|| Error::validation(format!("unknown field {name} on {}", table.name)))
}

fn parse_operator(name: &str) -> Result<Operator, Error> {
    serde_json::from_value(JsonValue::String(name.to_string()))
        .map_err(|_| Error::validation(format!("unknown operator {name}")))
}

/// Converts a JSON value into a database value of the field's type.
pub fn coerce(field: &FieldSchema, value: &JsonValue) -> Result<Value, Error> {
    let mismatch = || {
        Error::validation(format!(
            "{} expects a {} value, got {value}",
            field.name,
            field.field_type.name()
        ))
    };

    match field.field_type {
        FieldType::Uuid => value
            .as_str()
            .and_then(|text| Id::parse_str(text).ok())
            .map(|id| Value::Uuid(Some(Box::new(id))))
            .ok_or_else(mismatch),
        FieldType::Text => value
            .as_str()
            .map(|text| Value::String(Some(Box::new(text.to_string()))))
            .ok_or_else(mismatch),
        FieldType::Enum(allowed) => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if allowed.contains(&text) {
                Ok(Value::String(Some(Box::new(text.to_string()))))
            } else {
                Err(Error::validation(format!(
                    "{} must be one of {}",
                    field.name,
                    allowed.join(", ")
                )))
            }
        }
        FieldType::Integer => value
            .as_i64()
            .map(|number| Value::BigInt(Some(number)))
            .ok_or_else(mismatch),
        FieldType::Float => value
            .as_f64()
            .map(|number| Value::Double(Some(number)))
            .ok_or_else(mismatch),
        FieldType::Boolean => value
            .as_bool()
            .map(|flag| Value::Bool(Some(flag)))
            .ok_or_else(mismatch),
        FieldType::Timestamp => value
            .as_str()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|timestamp| Value::ChronoDateTimeWithTimeZone(Some(Box::new(timestamp))))
            .ok_or_else(mismatch),
    }
}

fn to_predicate(table: &'static TableSchema, filter: &FilterRequest) -> Result<Predicate, Error> {
    let field = find_field(table, &filter.field)?;
    let operator = parse_operator(&filter.operator)?;

    if !operator.supports(field.field_type) {
        return Err(Error::validation(format!(
            "operator {operator} cannot be used on {} field {}",
            field.field_type.name(),
            field.name
        )));
    }

    let value = filter.value.as_ref().filter(|value| !value.is_null());
    let values = match (operator, value) {
        (operator, None) if !operator.takes_value() => Vec::new(),
        (operator, Some(_)) if !operator.takes_value() => {
            return Err(Error::validation(format!("operator {operator} takes no value")));
        }
        (_, None) => {
            return Err(Error::validation(format!(
                "operator {operator} on {} needs a value",
                field.name
            )));
        }
        (Operator::In, Some(JsonValue::Array(items))) if !items.is_empty() => items
            .iter()
            .map(|item| coerce(field, item))
            .collect::<Result<Vec<_>, _>>()?,
        (Operator::In, Some(_)) => {
            return Err(Error::validation(
                "operator in needs a non-empty array value",
            ));
        }
        (Operator::Contains | Operator::StartsWith | Operator::EndsWith, Some(value)) => {
            let text = value.as_str().ok_or_else(|| {
                Error::validation(format!("operator {operator} needs a text value"))
            })?;
            vec![Value::String(Some(Box::new(text.to_string())))]
        }
        (_, Some(value)) => vec![coerce(field, value)?],
    };

    Ok(Predicate {
        field,
        operator,
        values,
    })
}

/// Validates `request` against the named table and builds a query scoped to
/// the organization.
pub fn build_query(
    table_name: &str,
    organization_id: Id,
    request: &QueryRequest,
) -> Result<ExplorerQuery, Error> {
    let table = find_table(table_name)?;

    let predicates = request
        .filters
        .iter()
        .map(|filter| to_predicate(table, filter))
        .collect::<Result<Vec<_>, _>>()?;

    let sort_field = find_field(
        table,
        request.sort_by.as_deref().unwrap_or(table.default_sort),
    )?;
    let sort_order = match request.sort_order {
        Some(SortDirection::Desc) => Order::Desc,
        _ => Order::Asc,
    };

    let limit = match request.limit {
        Some(0) => return Err(Error::validation("limit must be at least 1")),
        Some(limit) => limit.min(MAX_LIMIT),
        None => DEFAULT_LIMIT,
    };

    // Postgres binds OFFSET as a signed 64-bit integer
    let offset = request.offset.unwrap_or(0);
    if i64::try_from(offset).is_err() {
        return Err(Error::validation(format!(
            "offset must not exceed {}",
            i64::MAX
        )));
    }

    Ok(ExplorerQuery {
        table,
        organization_id,
        predicates,
        sort_field,
        sort_order,
        limit,
        offset,
    })
}

pub async fn query(
    db: &DatabaseConnection,
    organization_id: Id,
    table_name: &str,
    request: &QueryRequest,
) -> Result<QueryResult, Error> {
    let query = build_query(table_name, organization_id, request)?;
    let (rows, total) = explorer::execute(db, &query).await?;

    Ok(QueryResult {
        rows,
        total,
        limit: query.limit,
        offset: query.offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use serde_json::json;

    fn request(filters: JsonValue) -> QueryRequest {
        serde_json::from_value(json!({ "filters": filters })).unwrap()
    }

    fn validation_message(err: Error) -> String {
        match err.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tables_are_not_found() {
        let err = build_query("users", Id::new_v4(), &QueryRequest::default()).unwrap_err();
        assert_eq!(err.error_kind, Error::not_found().error_kind);
        assert!(describe_table("user_roles").is_err());
    }

    #[test]
    fn defaults_apply_when_the_request_is_empty() {
        let query = build_query("customers", Id::new_v4(), &QueryRequest::default()).unwrap();

        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort_field.name, "name");
        assert!(query.predicates.is_empty());
    }

    #[test]
    fn limits_are_capped() {
        let mut request = QueryRequest::default();
        request.limit = Some(10_000);
        let query = build_query("tickets", Id::new_v4(), &request).unwrap();
        assert_eq!(query.limit, MAX_LIMIT);

        request.limit = Some(0);
        assert!(build_query("tickets", Id::new_v4(), &request).is_err());
    }

    #[test]
    fn offsets_beyond_a_signed_bigint_are_rejected() {
        let mut request = QueryRequest::default();
        request.offset = Some(u64::MAX);
        let message = validation_message(
            build_query("customers", Id::new_v4(), &request).unwrap_err(),
        );
        assert!(message.starts_with("offset"));

        request.offset = Some(i64::MAX as u64);
        let query = build_query("customers", Id::new_v4(), &request).unwrap();
        assert_eq!(query.offset, i64::MAX as u64);
    }

    #[test]
    fn unknown_fields_and_operators_are_rejected() {
        let err = build_query(
            "customers",
            Id::new_v4(),
            &request(json!([{"field": "password", "operator": "eq", "value": "x"}])),
        )
        .unwrap_err();
        assert_eq!(validation_message(err), "unknown field password on customers");

        let err = build_query(
            "customers",
            Id::new_v4(),
            &request(json!([{"field": "name", "operator": "like", "value": "x"}])),
        )
        .unwrap_err();
        assert_eq!(validation_message(err), "unknown operator like");
    }

    #[test]
    fn operators_must_suit_the_field_type() {
        let err = build_query(
            "customers",
            Id::new_v4(),
            &request(json!([{"field": "name", "operator": "gt", "value": "M"}])),
        )
        .unwrap_err();
        assert!(validation_message(err).contains("cannot be used on text field name"));

        let err = build_query(
            "bookable_task_types",
            Id::new_v4(),
            &request(json!([{"field": "duration_minutes", "operator": "contains", "value": "3"}])),
        )
        .unwrap_err();
        assert!(validation_message(err).contains("cannot be used on integer"));
    }

    #[test]
    fn values_are_coerced_to_the_field_type() {
        let assignee = Id::new_v4();
        let query = build_query(
            "tickets",
            Id::new_v4(),
            &request(json!([
                {"field": "assignee_id", "operator": "eq", "value": assignee.to_string()},
                {"field": "status", "operator": "in", "value": ["open", "pending"]},
                {"field": "created_at", "operator": "gte", "value": "2026-10-01T00:00:00Z"},
                {"field": "resolved_at", "operator": "is_null"}
            ])),
        )
        .unwrap();

        assert_eq!(
            query.predicates[0].values,
            vec![Value::Uuid(Some(Box::new(assignee)))]
        );
        assert_eq!(query.predicates[1].values.len(), 2);
        assert!(matches!(
            query.predicates[2].values[0],
            Value::ChronoDateTimeWithTimeZone(Some(_))
        ));
        assert!(query.predicates[3].values.is_empty());
    }

    #[test]
    fn bad_values_are_rejected() {
        for filter in [
            json!({"field": "id", "operator": "eq", "value": "not-a-uuid"}),
            json!({"field": "status", "operator": "eq", "value": "escalated"}),
            json!({"field": "created_at", "operator": "lt", "value": "yesterday"}),
            json!({"field": "status", "operator": "in", "value": []}),
            json!({"field": "status", "operator": "in", "value": "open"}),
            json!({"field": "title", "operator": "eq"}),
            json!({"field": "title", "operator": "is_null", "value": "x"}),
        ] {
            let result = build_query("tickets", Id::new_v4(), &request(json!([filter.clone()])));
            assert!(result.is_err(), "expected {filter} to be rejected");
        }
    }

    #[test]
    fn enum_pattern_filters_accept_partial_values() {
        let query = build_query(
            "tickets",
            Id::new_v4(),
            &request(json!([{"field": "status", "operator": "starts_with", "value": "in_"}])),
        )
        .unwrap();
        assert_eq!(
            query.predicates[0].values,
            vec![Value::String(Some(Box::new("in_".to_string())))]
        );
    }

    #[test]
    fn sort_fields_must_be_registered() {
        let mut request = QueryRequest::default();
        request.sort_by = Some("organization_id".to_string());
        assert!(build_query("customers", Id::new_v4(), &request).is_err());

        request.sort_by = Some("created_at".to_string());
        request.sort_order = Some(SortDirection::Desc);
        let query = build_query("customers", Id::new_v4(), &request).unwrap();
        assert_eq!(query.sort_field.name, "created_at");
        assert!(matches!(query.sort_order, Order::Desc));
    }

    #[test]
    fn table_descriptions_list_usable_operators() {
        let tables = list_tables();
        assert_eq!(tables.len(), explorer::TABLES.len());

        let tickets = describe_table("tickets").unwrap();
        let priority = tickets
            .fields
            .iter()
            .find(|field| field.name == "priority")
            .unwrap();
        assert_eq!(priority.field_type, "enum");
        assert_eq!(
            priority.allowed_values.as_deref(),
            Some(&["low", "medium", "high", "urgent"].map(String::from)[..])
        );
        assert!(!priority.operators.contains(&Operator::Gt));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn query_returns_rows_and_total() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let row = BTreeMap::from([
            ("name".to_string(), Value::String(Some(Box::new("Harbour Cafe".to_string())))),
        ]);
        let total = BTreeMap::from([("total".to_string(), Value::BigInt(Some(1)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .append_query_results([vec![total]])
            .into_connection();

        let result = query(&db, organization_id, "customers", &QueryRequest::default()).await?;

        assert_eq!(result.total, 1);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.limit, DEFAULT_LIMIT);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&organization_id.to_string()));
        Ok(())
    }
}
