use crate::name::{write_string, Ident, QualifiedName};
use crate::select::SelectStatement;
use std::fmt;

/// CREATE TABLE in its three source forms: a column list, `(LIKE other)`,
/// or `AS (SELECT …)` with optional cast and index refinements.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub atomic: bool,
    pub batch: Option<String>,
    pub if_not_exists: bool,
    pub table: QualifiedName,
    pub source: CreateTableSource,
    pub timestamp: Option<String>,
    /// Partition unit as written, upper-cased: `DAY`, `HOUR`, `NONE`, …
    pub partition_by: Option<String>,
    pub ttl: Option<Ttl>,
    /// `Some(true)` for WAL, `Some(false)` for BYPASS WAL.
    pub wal: Option<bool>,
    pub with_params: Vec<WithParam>,
    pub volume: Option<String>,
    pub dedup_keys: Vec<String>,
    pub owned_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateTableSource {
    Columns(Vec<ColumnDef>),
    Like(QualifiedName),
    AsSelect {
        select: Box<SelectStatement>,
        casts: Vec<CastDef>,
        indexes: Vec<IndexDef>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnDef {
    pub name: String,
    /// Rendered type, parameters and array brackets included: `SYMBOL`,
    /// `GEOHASH(8c)`, `DOUBLE[]`.
    pub type_name: String,
    pub capacity: Option<String>,
    pub cache: Option<bool>,
    pub index: bool,
    pub index_capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastDef {
    pub column: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub column: String,
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithParam {
    pub name: String,
    pub value: String,
}

/// A TTL: raw value plus an optional unit word (`30` + `DAYS`, or a bare
/// duration literal like `4w` with no unit).
#[derive(Debug, Clone, PartialEq)]
pub struct Ttl {
    pub value: String,
    pub unit: Option<String>,
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(unit) = &self.unit {
            write!(f, " {unit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Ident(&self.name), self.type_name)?;
        if let Some(capacity) = &self.capacity {
            write!(f, " CAPACITY {capacity}")?;
        }
        match self.cache {
            Some(true) => write!(f, " CACHE")?,
            Some(false) => write!(f, " NOCACHE")?,
            None => {}
        }
        if self.index {
            write!(f, " INDEX")?;
            if let Some(capacity) = &self.index_capacity {
                write!(f, " CAPACITY {capacity}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.atomic {
            write!(f, "ATOMIC ")?;
        }
        if let Some(batch) = &self.batch {
            write!(f, "BATCH {batch} ")?;
        }
        write!(f, "TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.table)?;
        match &self.source {
            CreateTableSource::Columns(columns) => {
                write!(f, " (")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}")?;
                }
                write!(f, ")")?;
            }
            CreateTableSource::Like(other) => write!(f, " (LIKE {other})")?,
            CreateTableSource::AsSelect {
                select,
                casts,
                indexes,
            } => {
                write!(f, " AS ({select})")?;
                for cast in casts {
                    write!(f, ", CAST({} AS {})", Ident(&cast.column), cast.type_name)?;
                }
                for index in indexes {
                    write!(f, ", INDEX({}", Ident(&index.column))?;
                    if let Some(capacity) = &index.capacity {
                        write!(f, " CAPACITY {capacity}")?;
                    }
                    write!(f, ")")?;
                }
            }
        }
        if let Some(timestamp) = &self.timestamp {
            write!(f, " TIMESTAMP({})", Ident(timestamp))?;
        }
        if let Some(partition_by) = &self.partition_by {
            write!(f, " PARTITION BY {partition_by}")?;
        }
        if let Some(ttl) = &self.ttl {
            write!(f, " TTL {ttl}")?;
        }
        match self.wal {
            Some(true) => write!(f, " WAL")?,
            Some(false) => write!(f, " BYPASS WAL")?,
            None => {}
        }
        if !self.with_params.is_empty() {
            write!(f, " WITH ")?;
            for (i, param) in self.with_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} = {}", param.name, param.value)?;
            }
        }
        if !self.dedup_keys.is_empty() {
            write!(f, " DEDUP UPSERT KEYS(")?;
            for (i, key) in self.dedup_keys.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", Ident(key))?;
            }
            write!(f, ")")?;
        }
        if let Some(volume) = &self.volume {
            write!(f, " IN VOLUME ")?;
            write_string(f, volume)?;
        }
        if let Some(owner) = &self.owned_by {
            write!(f, " OWNED BY {}", Ident(owner))?;
        }
        Ok(())
    }
}

/// CREATE VIEW.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub if_not_exists: bool,
    pub view: QualifiedName,
    pub select: Box<SelectStatement>,
    pub owned_by: Option<String>,
}

impl fmt::Display for CreateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE VIEW ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{} AS ({})", self.view, self.select)?;
        if let Some(owner) = &self.owned_by {
            write!(f, " OWNED BY {}", Ident(owner))?;
        }
        Ok(())
    }
}

/// CREATE MATERIALIZED VIEW with its refresh policy.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMaterializedView {
    pub if_not_exists: bool,
    pub view: QualifiedName,
    pub base: Option<String>,
    pub refresh: Option<RefreshSpec>,
    pub select: Box<SelectStatement>,
    pub partition_by: Option<String>,
    pub ttl: Option<Ttl>,
    pub volume: Option<String>,
    pub owned_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshSpec {
    /// Bare `REFRESH` with no mode.
    Default,
    Immediate,
    Manual,
    Incremental,
    Every(String),
    Period {
        length: String,
        time_zone: Option<String>,
        delay: Option<String>,
    },
}

impl fmt::Display for RefreshSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFRESH")?;
        match self {
            RefreshSpec::Default => Ok(()),
            RefreshSpec::Immediate => write!(f, " IMMEDIATE"),
            RefreshSpec::Manual => write!(f, " MANUAL"),
            RefreshSpec::Incremental => write!(f, " INCREMENTAL"),
            RefreshSpec::Every(interval) => write!(f, " EVERY {interval}"),
            RefreshSpec::Period {
                length,
                time_zone,
                delay,
            } => {
                write!(f, " PERIOD(LENGTH {length}")?;
                if let Some(tz) = time_zone {
                    write!(f, " TIME ZONE ")?;
                    write_string(f, tz)?;
                }
                if let Some(delay) = delay {
                    write!(f, " DELAY {delay}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for CreateMaterializedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE MATERIALIZED VIEW ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.view)?;
        if let Some(base) = &self.base {
            write!(f, " WITH BASE {}", Ident(base))?;
        }
        if let Some(refresh) = &self.refresh {
            write!(f, " {refresh}")?;
        }
        write!(f, " AS ({})", self.select)?;
        if let Some(partition_by) = &self.partition_by {
            write!(f, " PARTITION BY {partition_by}")?;
        }
        if let Some(ttl) = &self.ttl {
            write!(f, " TTL {ttl}")?;
        }
        if let Some(volume) = &self.volume {
            write!(f, " IN VOLUME ")?;
            write_string(f, volume)?;
        }
        if let Some(owner) = &self.owned_by {
            write!(f, " OWNED BY {}", Ident(owner))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_create_table_with_wal_and_dedup() {
        let create = CreateTable {
            atomic: false,
            batch: None,
            if_not_exists: false,
            table: QualifiedName::single("t"),
            source: CreateTableSource::Columns(vec![
                ColumnDef {
                    name: "ts".into(),
                    type_name: "TIMESTAMP".into(),
                    ..Default::default()
                },
                ColumnDef {
                    name: "p".into(),
                    type_name: "DOUBLE".into(),
                    ..Default::default()
                },
            ]),
            timestamp: Some("ts".into()),
            partition_by: Some("DAY".into()),
            ttl: Some(Ttl {
                value: "30".into(),
                unit: Some("DAYS".into()),
            }),
            wal: Some(true),
            with_params: vec![],
            volume: None,
            dedup_keys: vec!["ts".into()],
            owned_by: None,
        };
        assert_eq!(
            create.to_string(),
            "CREATE TABLE t (ts TIMESTAMP, p DOUBLE) TIMESTAMP(ts) PARTITION BY DAY TTL 30 DAYS WAL DEDUP UPSERT KEYS(ts)"
        );
    }

    #[test]
    fn it_encodes_symbol_columns_with_index() {
        let column = ColumnDef {
            name: "sym".into(),
            type_name: "SYMBOL".into(),
            capacity: Some("256".into()),
            cache: Some(true),
            index: true,
            index_capacity: None,
        };
        assert_eq!(column.to_string(), "sym SYMBOL CAPACITY 256 CACHE INDEX");
    }
}
