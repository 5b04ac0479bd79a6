//! Renders composed member queries as PostgreSQL statements
//!
//! Members are aliased `m`, the joined team `t` and a subquery's independent
//! member scan `s`. Every literal goes through `push_bind`; only identifiers
//! and keywords are pushed as text. Text that is ordered or range-compared is
//! collated `"C"`, which matches the in-memory engine's byte order.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::search::{Direction, NullHandling};
use crate::query::composer::{JoinKind, MemberQuery};
use crate::query::path::{Field, Value};
use crate::query::predicate::{AgeSubquery, CmpOp, Operand, Predicate};
use crate::query::projection::{CellType, Expr};

pub(crate) type Sql = QueryBuilder<'static, Postgres>;

pub(crate) const MEMBER_ALIAS: &str = "m";
const SUBQUERY_ALIAS: &str = "s";

const ROW_COLUMNS: &str = "SELECT m.id AS member_id, m.username, m.age, m.team_id AS member_team_id";

fn column(field: Field, member_alias: &str) -> String {
    match field {
        Field::MemberId => format!("{}.id", member_alias),
        Field::Username => format!("{}.username", member_alias),
        Field::Age => format!("{}.age", member_alias),
        Field::TeamId => "t.id".to_string(),
        Field::TeamName => "t.name".to_string(),
    }
}

/// Column with byte-order collation when it holds text
fn ordered_column(field: Field, member_alias: &str) -> String {
    if field.is_text() {
        format!("{} COLLATE \"C\"", column(field, member_alias))
    } else {
        column(field, member_alias)
    }
}

fn push_value(sql: &mut Sql, value: &Value) {
    match value {
        Value::Int(v) => sql.push_bind(*v),
        Value::Long(v) => sql.push_bind(*v),
        Value::Text(v) => sql.push_bind(v.clone()),
    };
}

fn push_joined(sql: &mut Sql, parts: &[Predicate], separator: &str, empty: &str, alias: &str) {
    if parts.is_empty() {
        sql.push(empty);
        return;
    }
    sql.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            sql.push(separator);
        }
        push_predicate(sql, part, alias);
    }
    sql.push(")");
}

fn push_subquery(sql: &mut Sql, subquery: &AgeSubquery) {
    let selected = match subquery.aggregate {
        Some(aggregate) => format!("{}({}.age)", aggregate.as_sql(), SUBQUERY_ALIAS),
        None => format!("{}.age", SUBQUERY_ALIAS),
    };
    sql.push(format!("(SELECT {} FROM members AS {}", selected, SUBQUERY_ALIAS));
    push_where(sql, &subquery.filters, SUBQUERY_ALIAS);
    sql.push(")");
}

pub(crate) fn push_predicate(sql: &mut Sql, predicate: &Predicate, alias: &str) {
    match predicate {
        Predicate::Compare { field, op, rhs } => {
            let lhs = match op {
                CmpOp::Eq | CmpOp::Ne => column(*field, alias),
                _ => ordered_column(*field, alias),
            };
            sql.push(format!("{} {} ", lhs, op.as_sql()));
            match rhs {
                Operand::Value(value) => push_value(sql, value),
                Operand::Field(other) => {
                    sql.push(column(*other, alias));
                }
                Operand::Subquery(subquery) => push_subquery(sql, subquery),
            }
        }
        Predicate::Between { field, low, high } => {
            sql.push(format!("{} BETWEEN ", ordered_column(*field, alias)));
            push_value(sql, low);
            sql.push(" AND ");
            push_value(sql, high);
        }
        Predicate::In { field, values } => {
            if values.is_empty() {
                sql.push("FALSE");
                return;
            }
            sql.push(format!("{} IN (", column(*field, alias)));
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                push_value(sql, value);
            }
            sql.push(")");
        }
        Predicate::InSubquery { field, subquery } => {
            sql.push(format!("{} IN ", column(*field, alias)));
            push_subquery(sql, subquery);
        }
        Predicate::IsNull(field) => {
            sql.push(format!("{} IS NULL", column(*field, alias)));
        }
        Predicate::IsNotNull(field) => {
            sql.push(format!("{} IS NOT NULL", column(*field, alias)));
        }
        Predicate::And(parts) => push_joined(sql, parts, " AND ", "TRUE", alias),
        Predicate::Or(parts) => push_joined(sql, parts, " OR ", "FALSE", alias),
        Predicate::Not(inner) => {
            sql.push("NOT (");
            push_predicate(sql, inner, alias);
            sql.push(")");
        }
    }
}

/// ` WHERE a AND b ...`, or nothing for an empty filter list
pub(crate) fn push_where(sql: &mut Sql, filters: &[Predicate], alias: &str) {
    for (i, predicate) in filters.iter().enumerate() {
        sql.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(sql, predicate, alias);
    }
}

/// ` FROM members AS m [JOIN teams AS t [ON ...]]`
pub(crate) fn push_from(sql: &mut Sql, query: &MemberQuery) {
    sql.push(" FROM members AS m");
    let Some(kind) = query.join_kind() else {
        return;
    };
    sql.push(format!(" {} teams AS t", kind.as_sql()));
    if kind == JoinKind::Cross {
        return;
    }

    let mut conditions = query.join_on().iter();
    if query.joins_by_relation() {
        sql.push(" ON t.id = m.team_id");
    } else {
        sql.push(" ON ");
        match conditions.next() {
            Some(first) => push_predicate(sql, first, MEMBER_ALIAS),
            None => {
                sql.push("TRUE");
            }
        }
    }
    for predicate in conditions {
        sql.push(" AND ");
        push_predicate(sql, predicate, MEMBER_ALIAS);
    }
}

/// Explicit orders, then `m.id` and the joined `t.id`
fn push_order(sql: &mut Sql, query: &MemberQuery) {
    sql.push(" ORDER BY ");
    for order in query.orders() {
        let direction = match order.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        let nulls = match order.nulls {
            NullHandling::Native => "",
            NullHandling::NullsFirst => " NULLS FIRST",
            NullHandling::NullsLast => " NULLS LAST",
        };
        sql.push(format!(
            "{} {}{}, ",
            ordered_column(order.field, MEMBER_ALIAS),
            direction,
            nulls
        ));
    }
    sql.push("m.id ASC");
    if query.join_kind().is_some() {
        sql.push(", t.id ASC");
    }
}

fn push_window(sql: &mut Sql, query: &MemberQuery) {
    if let Some(offset) = query.row_offset() {
        sql.push(" OFFSET ");
        sql.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
    }
    if let Some(limit) = query.row_limit() {
        sql.push(" LIMIT ");
        sql.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
}

fn push_row_columns(sql: &mut Sql, query: &MemberQuery) {
    sql.push(ROW_COLUMNS);
    if query.join_kind().is_some() {
        sql.push(", t.id AS team_id, t.name AS team_name");
    } else {
        sql.push(", NULL::int8 AS team_id, NULL::text AS team_name");
    }
}

/// Row select with ordering and paging; `with_total` adds a window count
pub(crate) fn select_rows(query: &MemberQuery, with_total: bool) -> Sql {
    let mut sql = Sql::new("");
    push_row_columns(&mut sql, query);
    if with_total {
        sql.push(", COUNT(*) OVER () AS total_count");
    }
    push_from(&mut sql, query);
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    push_order(&mut sql, query);
    push_window(&mut sql, query);
    sql
}

pub(crate) fn select_count(query: &MemberQuery) -> Sql {
    let mut sql = Sql::new("SELECT COUNT(*)");
    push_from(&mut sql, query);
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    sql
}

pub(crate) fn select_age_stats(query: &MemberQuery) -> Sql {
    let mut sql = Sql::new(
        "SELECT COUNT(*) AS count, SUM(m.age)::int8 AS sum, AVG(m.age)::float8 AS avg, \
         MAX(m.age) AS max, MIN(m.age) AS min",
    );
    push_from(&mut sql, query);
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    sql
}

pub(crate) fn select_average_age_by_team(query: &MemberQuery) -> Sql {
    let mut sql = Sql::new("SELECT t.name AS team_name, AVG(m.age)::float8 AS average_age");
    push_from(&mut sql, query);
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    sql.push(" GROUP BY t.name ORDER BY t.name COLLATE \"C\" ASC NULLS LAST");
    sql
}

fn push_expr(sql: &mut Sql, expr: &Expr) {
    match expr {
        Expr::Field(field) => {
            sql.push(column(*field, MEMBER_ALIAS));
        }
        Expr::Constant(value) => push_value(sql, value),
        Expr::Concat(parts) => {
            sql.push("CONCAT(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                push_expr(sql, part);
            }
            sql.push(")");
        }
        Expr::Case {
            branches,
            otherwise,
        } => {
            sql.push("CASE");
            for (condition, result) in branches {
                sql.push(" WHEN ");
                push_predicate(sql, condition, MEMBER_ALIAS);
                sql.push(" THEN ");
                push_expr(sql, result);
            }
            sql.push(" ELSE ");
            push_expr(sql, otherwise);
            sql.push(" END");
        }
        Expr::Subquery(subquery) => push_subquery(sql, subquery),
    }
}

fn cast(cell_type: CellType) -> &'static str {
    match cell_type {
        CellType::Long => "int8",
        CellType::Double => "float8",
        CellType::Text => "text",
    }
}

/// Projected columns `c0, c1, ...`, each cast to its static type
pub(crate) fn select_projection(query: &MemberQuery, columns: &[Expr], types: &[CellType]) -> Sql {
    let mut sql = Sql::new("SELECT ");
    for (i, (column, cell_type)) in columns.iter().zip(types).enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push("(");
        push_expr(&mut sql, column);
        sql.push(format!(")::{} AS c{}", cast(*cell_type), i));
    }
    push_from(&mut sql, query);
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    push_order(&mut sql, query);
    push_window(&mut sql, query);
    sql
}

pub(crate) fn delete_members(query: &MemberQuery) -> Sql {
    let mut sql = Sql::new("DELETE FROM members AS m");
    push_where(&mut sql, query.filters(), MEMBER_ALIAS);
    sql
}
