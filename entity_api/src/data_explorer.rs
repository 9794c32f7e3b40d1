//! Read-only, tenant-scoped queries over a fixed registry of tables.
//!
//! The registry describes which tables and columns may be explored and how
//! each column is typed. Callers validate a request against it and hand over
//! typed [`Predicate`]s; this module turns them into SQL and runs it.

use crate::error::Error;
use entity::{Id, SCHEMA};
use sea_orm::sea_query::{
    extension::postgres::PgExpr, Alias, Cond, Expr, Order, Query, SelectStatement,
    SimpleExpr,
};
use sea_orm::{ConnectionTrait, FromQueryResult, JsonValue, Value};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use log::*;

const ORGANIZATION_ID: &str = "organization_id";
const ID: &str = "id";
const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Uuid,
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Enum(&'static [&'static str]),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Uuid => "uuid",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Enum(_) => "enum",
        }
    }

    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self {
            FieldType::Enum(values) => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub default_sort: &'static str,
    pub fields: &'static [FieldSchema],
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

const fn field(name: &'static str, label: &'static str, field_type: FieldType) -> FieldSchema {
    FieldSchema {
        name,
        label,
        field_type,
    }
}

pub const CUSTOMER_STATUSES: &[&str] = &["lead", "active", "inactive", "churned"];
pub const TICKET_STATUSES: &[&str] = &["open", "in_progress", "pending", "resolved", "closed"];
pub const TICKET_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];
pub const OKR_STATUSES: &[&str] = &[
    "not_started",
    "on_track",
    "at_risk",
    "off_track",
    "completed",
];
pub const ARTICLE_STATUSES: &[&str] = &["draft", "published", "archived"];

/// Every table that can be explored. Each one has an `organization_id` column.
pub static TABLES: &[TableSchema] = &[
    TableSchema {
        name: "customers",
        label: "Customers",
        default_sort: "name",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("name", "Name", FieldType::Text),
            field("email", "Email", FieldType::Text),
            field("phone", "Phone", FieldType::Text),
            field("company", "Company", FieldType::Text),
            field("external_ref", "External reference", FieldType::Text),
            field("status", "Status", FieldType::Enum(CUSTOMER_STATUSES)),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
    TableSchema {
        name: "tickets",
        label: "Tickets",
        default_sort: "created_at",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("title", "Title", FieldType::Text),
            field("description", "Description", FieldType::Text),
            field("status", "Status", FieldType::Enum(TICKET_STATUSES)),
            field("priority", "Priority", FieldType::Enum(TICKET_PRIORITIES)),
            field("customer_id", "Customer", FieldType::Uuid),
            field("team_id", "Team", FieldType::Uuid),
            field("assignee_id", "Assignee", FieldType::Uuid),
            field("reporter_id", "Reporter", FieldType::Uuid),
            field("due_at", "Due", FieldType::Timestamp),
            field("resolved_at", "Resolved", FieldType::Timestamp),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
    TableSchema {
        name: "objectives",
        label: "Objectives",
        default_sort: "created_at",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("title", "Title", FieldType::Text),
            field("description", "Description", FieldType::Text),
            field("period", "Period", FieldType::Text),
            field("status", "Status", FieldType::Enum(OKR_STATUSES)),
            field("owner_id", "Owner", FieldType::Uuid),
            field("team_id", "Team", FieldType::Uuid),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
    TableSchema {
        name: "kb_articles",
        label: "Knowledge base articles",
        default_sort: "title",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("title", "Title", FieldType::Text),
            field("slug", "Slug", FieldType::Text),
            field("category", "Category", FieldType::Text),
            field("status", "Status", FieldType::Enum(ARTICLE_STATUSES)),
            field("author_id", "Author", FieldType::Uuid),
            field("published_at", "Published", FieldType::Timestamp),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
    TableSchema {
        name: "bookable_task_types",
        label: "Bookable task types",
        default_sort: "name",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("name", "Name", FieldType::Text),
            field("description", "Description", FieldType::Text),
            field("duration_minutes", "Duration (minutes)", FieldType::Integer),
            field("buffer_minutes", "Buffer (minutes)", FieldType::Integer),
            field("color", "Color", FieldType::Text),
            field("active", "Active", FieldType::Boolean),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
    TableSchema {
        name: "teams",
        label: "Teams",
        default_sort: "name",
        fields: &[
            field("id", "ID", FieldType::Uuid),
            field("name", "Name", FieldType::Text),
            field("description", "Description", FieldType::Text),
            field("lead_id", "Lead", FieldType::Uuid),
            field("created_at", "Created", FieldType::Timestamp),
            field("updated_at", "Updated", FieldType::Timestamp),
        ],
    },
];

pub fn find_table(name: &str) -> Option<&'static TableSchema> {
    TABLES.iter().find(|table| table.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Contains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Whether the operator can be applied to a column of `field_type`.
    pub fn supports(&self, field_type: FieldType) -> bool {
        match self {
            Operator::Eq | Operator::Neq | Operator::In | Operator::IsNull | Operator::IsNotNull => {
                true
            }
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                matches!(field_type, FieldType::Text | FieldType::Enum(_))
            }
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => matches!(
                field_type,
                FieldType::Integer | FieldType::Float | FieldType::Timestamp
            ),
        }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
        };
        write!(f, "{name}")
    }
}

/// A validated filter: a registered field, an operator it supports and values
/// already coerced to the field's type. `In` carries any number of values,
/// null checks none, every other operator exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static FieldSchema,
    pub operator: Operator,
    pub values: Vec<Value>,
}

/// A validated query against one registered table.
#[derive(Debug, Clone)]
pub struct ExplorerQuery {
    pub table: &'static TableSchema,
    pub organization_id: Id,
    pub predicates: Vec<Predicate>,
    pub sort_field: &'static FieldSchema,
    pub sort_order: Order,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, FromQueryResult)]
struct Total {
    total: i64,
}

/// Escapes `LIKE` wildcards so user text only ever matches literally.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn like_pattern(predicate: &Predicate) -> Option<String> {
    let text = match predicate.values.first() {
        Some(Value::String(Some(text))) => escape_like(text),
        _ => return None,
    };
    match predicate.operator {
        Operator::Contains => Some(format!("%{text}%")),
        Operator::StartsWith => Some(format!("{text}%")),
        Operator::EndsWith => Some(format!("%{text}")),
        _ => None,
    }
}

fn to_condition(predicate: &Predicate) -> SimpleExpr {
    let column = Expr::col(Alias::new(predicate.field.name));
    let first = predicate
        .values
        .first()
        .cloned()
        .unwrap_or(Value::String(None));

    match predicate.operator {
        Operator::Eq => column.eq(first),
        Operator::Neq => column.ne(first),
        Operator::Gt => column.gt(first),
        Operator::Gte => column.gte(first),
        Operator::Lt => column.lt(first),
        Operator::Lte => column.lte(first),
        Operator::In => column.is_in(predicate.values.clone()),
        Operator::IsNull => column.is_null(),
        Operator::IsNotNull => column.is_not_null(),
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            // Backslash is the default ILIKE escape in Postgres
            let pattern = like_pattern(predicate).unwrap_or_default();
            column.ilike(pattern)
        }
    }
}

fn where_clause(query: &ExplorerQuery) -> Cond {
    query.predicates.iter().map(to_condition).fold(
        Cond::all().add(Expr::col(Alias::new(ORGANIZATION_ID)).eq(query.organization_id)),
        |condition, expr| condition.add(expr),
    )
}

fn table_ref(table: &TableSchema) -> (Alias, Alias) {
    (Alias::new(SCHEMA), Alias::new(table.name))
}

/// The page of rows: registered columns only, filtered and ordered, with `id`
/// as a tie breaker so pagination is stable.
pub fn select_statement(query: &ExplorerQuery) -> SelectStatement {
    let mut select = Query::select();
    select
        .columns(query.table.fields.iter().map(|field| Alias::new(field.name)))
        .from(table_ref(query.table))
        .cond_where(where_clause(query))
        .order_by(Alias::new(query.sort_field.name), query.sort_order.clone());

    if query.sort_field.name != ID {
        select.order_by(Alias::new(ID), Order::Asc);
    }

    select.limit(query.limit).offset(query.offset).to_owned()
}

/// Counts every row matching the same filters, ignoring pagination.
pub fn count_statement(query: &ExplorerQuery) -> SelectStatement {
    Query::select()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"))
        .from(table_ref(query.table))
        .cond_where(where_clause(query))
        .to_owned()
}

/// Runs the query, returning the page of rows as JSON objects and the total
/// number of matching rows.
pub async fn execute(
    db: &impl ConnectionTrait,
    query: &ExplorerQuery,
) -> Result<(Vec<JsonValue>, u64), Error> {
    let backend = db.get_database_backend();

    let rows = JsonValue::find_by_statement(backend.build(&select_statement(query)))
        .all(db)
        .await?;

    let total = Total::find_by_statement(backend.build(&count_statement(query)))
        .one(db)
        .await?
        .map(|row| row.total.max(0) as u64)
        .unwrap_or_default();

    debug!(
        "Data explorer query on {} returned {} of {total} rows",
        query.table.name,
        rows.len()
    );

    Ok((rows, total))
}
