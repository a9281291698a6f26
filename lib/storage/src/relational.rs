//! Relational materialization
//!
//! Realizes a SQL-routed cluster as one parent table plus zero or more
//! child tables, one per array keypath directly under the record root.
//! Every table carries a `raw_json` column holding the full original
//! payload, so a record is always recoverable regardless of which scalar
//! columns were populated.
//!
//! Table creation is idempotent but, by default, does not reconcile columns
//! for fields absent from the schema snapshot used at creation time.
//! Whether that drift should be healed is surfaced as
//! [`RelationalOptions::evolve_schema`] rather than decided silently.

use crate::error::Result;
use crate::ident::{column_type, sanitize_ident};
use jsonshard_core::SchemaDescriptor;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Transaction};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Tunables for the relational path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationalOptions {
    /// When true, newly observed scalar fields are added to an existing
    /// table with `ALTER TABLE ... ADD COLUMN` before inserting. When
    /// false (the default) the table keeps the columns it was created
    /// with and later fields land only in `raw_json`.
    pub evolve_schema: bool,
}

/// Counts from one materialization call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeOutcome {
    pub table: String,
    pub inserted: usize,
    pub failed: usize,
    pub child_rows: usize,
}

/// A scoped handle on the relational database.
///
/// Opened per materialization call and dropped at scope exit; there is no
/// ambient connection. Single-writer access for the duration of a batch is
/// assumed - concurrent batches against the same database must be
/// serialized by the caller.
pub struct RelationalStore {
    conn: Connection,
    options: RelationalOptions,
}

impl RelationalStore {
    pub fn open(path: impl AsRef<Path>, options: RelationalOptions) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn, options)
    }

    /// In-memory database, for tests.
    pub fn in_memory(options: RelationalOptions) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, options)
    }

    fn init(conn: Connection, options: RelationalOptions) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;\n\
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(Self { conn, options })
    }

    /// The underlying connection, for inspection and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Materialize one cluster's records under `entity`.
    ///
    /// The parent row is inserted first, capturing its generated id; one
    /// child row per array element follows, referencing that id. A record
    /// that fails to insert is logged and skipped - one malformed record
    /// never aborts the cluster's persistence.
    pub fn materialize(
        &mut self,
        entity: &str,
        schema: &SchemaDescriptor,
        records: &[&Value],
    ) -> Result<MaterializeOutcome> {
        let plan = TablePlan::new(entity, schema);
        self.create_tables(&plan)?;
        if self.options.evolve_schema {
            self.evolve_tables(&plan)?;
        }

        let mut outcome = MaterializeOutcome {
            table: plan.parent.clone(),
            ..MaterializeOutcome::default()
        };
        for record in records {
            match self.insert_record(&plan, record) {
                Ok(children) => {
                    outcome.inserted += 1;
                    outcome.child_rows += children;
                }
                Err(e) => {
                    warn!(table = %plan.parent, error = %e, "record insert failed, skipping");
                    outcome.failed += 1;
                }
            }
        }
        debug!(
            table = %outcome.table,
            inserted = outcome.inserted,
            failed = outcome.failed,
            child_rows = outcome.child_rows,
            "relational materialization finished"
        );
        Ok(outcome)
    }

    fn create_tables(&self, plan: &TablePlan) -> Result<()> {
        // identifiers are sanitized but still quoted: "order" and friends
        // are valid entity names and reserved SQL words at the same time
        let mut cols = vec![
            "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            "raw_json TEXT".to_string(),
        ];
        for col in &plan.parent_cols {
            cols.push(format!("\"{}\" {}", col.name, col.sql_type));
        }
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n  {}\n)",
            plan.parent,
            cols.join(",\n  ")
        );
        self.conn.execute(&ddl, [])?;

        for child in &plan.children {
            let mut cols = vec![
                "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
                format!(
                    "\"{}\" INTEGER REFERENCES \"{}\"(id)",
                    child.fk_col, plan.parent
                ),
                "raw_json TEXT".to_string(),
            ];
            for col in &child.cols {
                cols.push(format!("\"{}\" {}", col.name, col.sql_type));
            }
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (\n  {}\n)",
                child.table,
                cols.join(",\n  ")
            );
            self.conn.execute(&ddl, [])?;
        }
        Ok(())
    }

    /// Add any planned columns missing from already-existing tables.
    fn evolve_tables(&self, plan: &TablePlan) -> Result<()> {
        let targets = std::iter::once((&plan.parent, &plan.parent_cols))
            .chain(plan.children.iter().map(|c| (&c.table, &c.cols)));
        for (table, cols) in targets {
            let existing = self.existing_columns(table)?;
            for col in cols {
                if !existing.contains(&col.name) {
                    let ddl = format!(
                        "ALTER TABLE \"{}\" ADD COLUMN \"{}\" {}",
                        table, col.name, col.sql_type
                    );
                    self.conn.execute(&ddl, [])?;
                    debug!(table = %table, column = %col.name, "added column for evolved schema");
                }
            }
        }
        Ok(())
    }

    fn existing_columns(&self, table: &str) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    fn insert_record(&mut self, plan: &TablePlan, record: &Value) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let parent_id = insert_parent(&tx, plan, record)?;
        let mut child_rows = 0;
        for child in &plan.children {
            child_rows += insert_children(&tx, child, record, parent_id)?;
        }
        tx.commit()?;
        Ok(child_rows)
    }
}

fn insert_parent(tx: &Transaction<'_>, plan: &TablePlan, record: &Value) -> Result<i64> {
    let mut cols: Vec<String> = vec!["\"raw_json\"".to_string()];
    let mut values: Vec<SqlValue> = vec![SqlValue::Text(serde_json::to_string(record)?)];
    for col in &plan.parent_cols {
        if let Some(v) = value_at(record, &col.keypath) {
            if !v.is_object() && !v.is_array() {
                cols.push(format!("\"{}\"", col.name));
                values.push(to_sql_value(v));
            }
        }
    }
    let sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        plan.parent,
        cols.join(","),
        placeholders(values.len())
    );
    tx.execute(&sql, params_from_iter(values))?;
    Ok(tx.last_insert_rowid())
}

fn insert_children(
    tx: &Transaction<'_>,
    child: &ChildPlan,
    record: &Value,
    parent_id: i64,
) -> Result<usize> {
    let Some(elements) = value_at(record, &child.base).and_then(Value::as_array) else {
        return Ok(0);
    };
    let mut inserted = 0;
    for element in elements {
        let mut cols: Vec<String> =
            vec![format!("\"{}\"", child.fk_col), "\"raw_json\"".to_string()];
        let mut values: Vec<SqlValue> = vec![
            SqlValue::Integer(parent_id),
            SqlValue::Text(serde_json::to_string(element)?),
        ];
        for col in &child.cols {
            if let Some(v) = value_at(element, &col.keypath) {
                if !v.is_object() && !v.is_array() {
                    cols.push(format!("\"{}\"", col.name));
                    values.push(to_sql_value(v));
                }
            }
        }
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            child.table,
            cols.join(","),
            placeholders(values.len())
        );
        tx.execute(&sql, params_from_iter(values))?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Plain dotted-key descent; no array markers, containers allowed.
fn value_at<'a>(record: &'a Value, keypath: &str) -> Option<&'a Value> {
    let mut cur = record;
    for part in keypath.split('.') {
        cur = cur.as_object()?.get(part)?;
    }
    Some(cur)
}

fn to_sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .unwrap_or(SqlValue::Null),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Null,
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// One planned scalar column.
#[derive(Debug, Clone)]
struct ColumnPlan {
    /// Keypath relative to the table's row value (record or array element).
    keypath: String,
    name: String,
    sql_type: &'static str,
}

#[derive(Debug, Clone)]
struct ChildPlan {
    table: String,
    /// Root key holding the array (array marker stripped).
    base: String,
    fk_col: String,
    cols: Vec<ColumnPlan>,
}

/// Column layout derived from one schema snapshot.
///
/// Built identically for DDL and inserts so both sides agree on names.
/// Generated names are deduplicated against the reserved `id`, `raw_json`,
/// and foreign-key columns; a keypath that would collide gets a numeric
/// suffix instead of corrupting the table definition.
#[derive(Debug, Clone)]
struct TablePlan {
    parent: String,
    parent_cols: Vec<ColumnPlan>,
    children: Vec<ChildPlan>,
}

impl TablePlan {
    fn new(entity: &str, schema: &SchemaDescriptor) -> Self {
        let parent = sanitize_ident(if entity.is_empty() { "entity" } else { entity });

        let mut used: HashSet<String> =
            ["id".to_string(), "raw_json".to_string()].into_iter().collect();
        let mut parent_cols = Vec::new();
        for (keypath, stats) in schema {
            if keypath.contains("[]") {
                continue;
            }
            let name = unique_ident(&sanitize_ident(&keypath.replace('.', "_")), &mut used);
            let sql_type = stats.types.top().map_or("TEXT", column_type);
            parent_cols.push(ColumnPlan {
                keypath: keypath.clone(),
                name,
                sql_type,
            });
        }

        // one child table per array keypath directly under the root
        let mut children = Vec::new();
        for array_key in schema.keys().filter(|k| k.ends_with("[]") && !k.contains('.')) {
            let base = array_key.trim_end_matches("[]").to_string();
            let table = sanitize_ident(&format!("{parent}_{base}"));
            let fk_col = format!("{parent}_id");
            let prefix = format!("{array_key}.");

            let mut used: HashSet<String> =
                ["id".to_string(), "raw_json".to_string(), fk_col.clone()]
                    .into_iter()
                    .collect();
            let mut cols = Vec::new();
            for (keypath, stats) in schema {
                let Some(sub) = keypath.strip_prefix(&prefix) else {
                    continue;
                };
                // nested arrays inside elements stay in the raw payload
                if sub.contains("[]") {
                    continue;
                }
                let name = unique_ident(&sanitize_ident(&sub.replace('.', "_")), &mut used);
                let sql_type = stats.types.top().map_or("TEXT", column_type);
                cols.push(ColumnPlan {
                    keypath: sub.to_string(),
                    name,
                    sql_type,
                });
            }
            children.push(ChildPlan {
                table,
                base,
                fk_col,
                cols,
            });
        }

        Self {
            parent,
            parent_cols,
            children,
        }
    }
}

fn unique_ident(candidate: &str, used: &mut HashSet<String>) -> String {
    if used.insert(candidate.to_string()) {
        return candidate.to_string();
    }
    let mut n = 2;
    loop {
        let numbered = format!("{candidate}_{n}");
        if used.insert(numbered.clone()) {
            return numbered;
        }
        n += 1;
    }
}
