//! Translation of filters into joined, ordered `SELECT` statements.
//!
//! Outside `feed_info`, the tables form a tree:
//!
//! ```text
//! Agency - Route - Trip - Calendar - CalendarDate
//!                    |
//!                 StopTime - Stop
//! ```
//!
//! A filter naming a table reaches it along the unique tree path from the
//! queried table; `feed_info` joins on `feed_id` alone. Each table is joined
//! at most once, so every filter touching it constrains the same joined row.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Column, Comparison, Filter, FilterError, Table, Value};

use super::mapping::{key_order, projection};

/// Tree edges and the local column each hop matches on, besides `feed_id`.
const LINKS: [(Table, Table, &str); 6] = [
    (Table::Agency, Table::Route, "agency_id"),
    (Table::Route, Table::Trip, "route_id"),
    (Table::Trip, Table::Calendar, "service_id"),
    (Table::Calendar, Table::CalendarDate, "service_id"),
    (Table::Trip, Table::StopTime, "trip_id"),
    (Table::StopTime, Table::Stop, "stop_id"),
];

/// One `JOIN` from an already-joined table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hop {
    from: Table,
    to: Table,
    link: Option<&'static str>,
}

impl Hop {
    fn render(self, sql: &mut String) {
        let (from, to) = (self.from.sql_name(), self.to.sql_name());
        sql.push_str(&format!(" JOIN {to} ON {to}.feed_id = {from}.feed_id"));
        if let Some(link) = self.link {
            sql.push_str(&format!(" AND {to}.{link} = {from}.{link}"));
        }
    }
}

fn neighbours(table: Table) -> impl Iterator<Item = (Table, &'static str)> {
    LINKS.into_iter().filter_map(move |(a, b, link)| {
        if a == table {
            Some((b, link))
        } else if b == table {
            Some((a, link))
        } else {
            None
        }
    })
}

/// Hops leading from `root` to `target`, nearest first.
fn path(root: Table, target: Table) -> Vec<Hop> {
    if root == target {
        return Vec::new();
    }
    if root == Table::FeedInfo || target == Table::FeedInfo {
        return vec![Hop {
            from: root,
            to: target,
            link: None,
        }];
    }

    let mut came_from: BTreeMap<Table, Hop> = BTreeMap::new();
    let mut queue = VecDeque::from([root]);
    while let Some(table) = queue.pop_front() {
        if table == target {
            break;
        }
        for (next, link) in neighbours(table) {
            if next != root && !came_from.contains_key(&next) {
                came_from.insert(
                    next,
                    Hop {
                        from: table,
                        to: next,
                        link: Some(link),
                    },
                );
                queue.push_back(next);
            }
        }
    }

    let mut hops = Vec::new();
    let mut cursor = target;
    while let Some(hop) = came_from.get(&cursor) {
        hops.push(*hop);
        cursor = hop.from;
    }
    hops.reverse();
    hops
}

/// Bounds of one page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub limit: usize,
    pub offset: usize,
}

/// A `SELECT` over one root table, restricted by validated filters.
#[derive(Debug, Clone)]
pub(crate) struct Select {
    root: Table,
    tables: BTreeSet<Table>,
    predicates: Vec<String>,
    params: Vec<Value>,
    distinct: bool,
}

impl Select {
    pub(crate) fn new(root: Table) -> Self {
        Self {
            root,
            tables: BTreeSet::new(),
            predicates: Vec::new(),
            params: Vec::new(),
            distinct: false,
        }
    }

    /// Select distinct rows even without joins.
    pub(crate) const fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub(crate) const fn root(&self) -> Table {
        self.root
    }

    /// Conjoin `filter`, rejecting it unless every table it names is in `scope`.
    pub(crate) fn filter(
        &mut self,
        axis: &'static str,
        filter: Option<&Filter>,
        scope: &[Table],
    ) -> Result<&mut Self, FilterError> {
        let Some(filter) = filter else {
            return Ok(self);
        };
        filter.validate_scope(axis, scope)?;
        self.tables.extend(filter.tables());
        let mut predicate = String::new();
        render(filter, &mut predicate, &mut self.params);
        self.predicates.push(predicate);
        Ok(self)
    }

    fn joins(&self) -> Vec<Hop> {
        let mut joined = BTreeSet::from([self.root]);
        let mut hops = Vec::new();
        for target in &self.tables {
            for hop in path(self.root, *target) {
                if joined.insert(hop.to) {
                    hops.push(hop);
                }
            }
        }
        hops
    }

    /// Render with the root's stored columns and key order.
    pub(crate) fn sql(&self, window: Option<Window>) -> String {
        self.sql_with(&projection(self.root), &key_order(self.root), window)
    }

    /// Render with a custom projection and ordering.
    pub(crate) fn sql_with(
        &self,
        projection: &str,
        order_by: &str,
        window: Option<Window>,
    ) -> String {
        let joins = self.joins();
        let mut sql = String::from("SELECT ");
        if self.distinct || !joins.is_empty() {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(projection);
        sql.push_str(" FROM ");
        sql.push_str(self.root.sql_name());
        for hop in joins {
            hop.render(&mut sql);
        }
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
        if let Some(Window { limit, offset }) = window {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }
        sql
    }

    /// Bound values, in placeholder order.
    pub(crate) fn params(&self) -> &[Value] {
        &self.params
    }
}

fn column_ref(column: &Column) -> String {
    format!("{}.{}", column.table().sql_name(), column.name())
}

fn render(filter: &Filter, sql: &mut String, params: &mut Vec<Value>) {
    match filter {
        Filter::Compare {
            column,
            op,
            value: Value::Null,
        } if matches!(op, Comparison::Eq | Comparison::Ne) => {
            let test = if *op == Comparison::Eq {
                "IS NULL"
            } else {
                "IS NOT NULL"
            };
            sql.push_str(&format!("{} {test}", column_ref(column)));
        }
        Filter::Compare { column, op, value } => {
            sql.push_str(&format!("{} {} ?", column_ref(column), op.as_sql()));
            params.push(value.clone());
        }
        Filter::Between { column, low, high } => {
            sql.push_str(&format!("{} BETWEEN ? AND ?", column_ref(column)));
            params.push(low.clone());
            params.push(high.clone());
        }
        Filter::OneOf { values, .. } if values.is_empty() => sql.push('0'),
        Filter::OneOf { column, values } => {
            let placeholders = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!("{} IN ({placeholders})", column_ref(column)));
            params.extend(values.iter().cloned());
        }
        Filter::IsNull(column) => {
            sql.push_str(&column_ref(column));
            sql.push_str(" IS NULL");
        }
        Filter::And(filters) => render_all(filters, " AND ", '1', sql, params),
        Filter::Or(filters) => render_all(filters, " OR ", '0', sql, params),
        Filter::Not(inner) => {
            sql.push_str("NOT (");
            render(inner, sql, params);
            sql.push(')');
        }
    }
}

fn render_all(
    filters: &[Filter],
    separator: &str,
    identity: char,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if filters.is_empty() {
        sql.push(identity);
        return;
    }
    sql.push('(');
    for (index, filter) in filters.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        render(filter, sql, params);
    }
    sql.push(')');
}
