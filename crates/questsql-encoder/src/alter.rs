use crate::create::{ColumnDef, Ttl};
use crate::expr::Expression;
use crate::name::{write_string, Ident, QualifiedName};
use std::fmt;

/// ALTER TABLE with one action; every action serializes totally.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: QualifiedName,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumns(Vec<ColumnDef>),
    DropColumns(Vec<String>),
    RenameColumn { from: String, to: String },
    AlterColumn { column: String, action: AlterColumnAction },
    DropPartition(PartitionSelector),
    AttachPartitionList(Vec<String>),
    DetachPartition(PartitionSelector),
    ConvertPartition {
        format: String,
        selector: PartitionSelector,
    },
    SquashPartitions,
    SetParam { name: String, value: String },
    SetTtl(Ttl),
    /// `SET TYPE WAL` / `SET TYPE BYPASS WAL`.
    SetType { wal: bool },
    DedupDisable,
    DedupEnable(Vec<String>),
    SuspendWal,
    ResumeWal(Option<ResumeFrom>),
}

/// `RESUME WAL FROM TXN n` — both the `TXN` and `TRANSACTION` spellings are
/// admitted and re-emitted exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFrom {
    pub spelling: TxnSpelling,
    pub txn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnSpelling {
    Txn,
    Transaction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterColumnAction {
    AddIndex { capacity: Option<String> },
    DropIndex,
    Type(String),
    Cache,
    Nocache,
    SymbolCapacity(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSelector {
    List(Vec<String>),
    Where(Expression),
}

impl fmt::Display for PartitionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionSelector::List(items) => {
                write!(f, "LIST ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_string(f, item)?;
                }
                Ok(())
            }
            PartitionSelector::Where(expr) => write!(f, "WHERE {expr}"),
        }
    }
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} ", self.table)?;
        match &self.action {
            AlterTableAction::AddColumns(columns) => {
                write!(f, "ADD COLUMN ")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}")?;
                }
                Ok(())
            }
            AlterTableAction::DropColumns(columns) => {
                write!(f, "DROP COLUMN ")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Ident(column))?;
                }
                Ok(())
            }
            AlterTableAction::RenameColumn { from, to } => {
                write!(f, "RENAME COLUMN {} TO {}", Ident(from), Ident(to))
            }
            AlterTableAction::AlterColumn { column, action } => {
                write!(f, "ALTER COLUMN {} {action}", Ident(column))
            }
            AlterTableAction::DropPartition(selector) => {
                write!(f, "DROP PARTITION {selector}")
            }
            AlterTableAction::AttachPartitionList(items) => {
                write!(f, "ATTACH PARTITION LIST ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_string(f, item)?;
                }
                Ok(())
            }
            AlterTableAction::DetachPartition(selector) => {
                write!(f, "DETACH PARTITION {selector}")
            }
            AlterTableAction::ConvertPartition { format, selector } => {
                write!(f, "CONVERT PARTITION TO {format} {selector}")
            }
            AlterTableAction::SquashPartitions => write!(f, "SQUASH PARTITIONS"),
            AlterTableAction::SetParam { name, value } => {
                write!(f, "SET PARAM {name} = {value}")
            }
            AlterTableAction::SetTtl(ttl) => write!(f, "SET TTL {ttl}"),
            AlterTableAction::SetType { wal: true } => write!(f, "SET TYPE WAL"),
            AlterTableAction::SetType { wal: false } => write!(f, "SET TYPE BYPASS WAL"),
            AlterTableAction::DedupDisable => write!(f, "DEDUP DISABLE"),
            AlterTableAction::DedupEnable(keys) => {
                write!(f, "DEDUP ENABLE UPSERT KEYS(")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Ident(key))?;
                }
                write!(f, ")")
            }
            AlterTableAction::SuspendWal => write!(f, "SUSPEND WAL"),
            AlterTableAction::ResumeWal(from) => {
                write!(f, "RESUME WAL")?;
                if let Some(from) = from {
                    let spelling = match from.spelling {
                        TxnSpelling::Txn => "TXN",
                        TxnSpelling::Transaction => "TRANSACTION",
                    };
                    write!(f, " FROM {spelling} {}", from.txn)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for AlterColumnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterColumnAction::AddIndex { capacity } => {
                write!(f, "ADD INDEX")?;
                if let Some(capacity) = capacity {
                    write!(f, " CAPACITY {capacity}")?;
                }
                Ok(())
            }
            AlterColumnAction::DropIndex => write!(f, "DROP INDEX"),
            AlterColumnAction::Type(type_name) => write!(f, "TYPE {type_name}"),
            AlterColumnAction::Cache => write!(f, "CACHE"),
            AlterColumnAction::Nocache => write!(f, "NOCACHE"),
            AlterColumnAction::SymbolCapacity(capacity) => {
                write!(f, "SYMBOL CAPACITY {capacity}")
            }
        }
    }
}

/// ALTER VIEW; ownership transfer is the only supported action.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterView {
    pub view: QualifiedName,
    pub owned_by: String,
}

impl fmt::Display for AlterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER VIEW {} OWNED BY {}", self.view, Ident(&self.owned_by))
    }
}

/// ALTER MATERIALIZED VIEW with one action.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterMaterializedView {
    pub view: QualifiedName,
    pub action: MatViewAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatViewAction {
    SetRefresh(SetRefreshMode),
    SetTtl(Ttl),
    SuspendWal,
    ResumeWal(Option<ResumeFrom>),
    OwnedBy(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetRefreshMode {
    Immediate,
    Manual,
    Incremental,
    Every(String),
    Limit(Ttl),
}

impl fmt::Display for AlterMaterializedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER MATERIALIZED VIEW {} ", self.view)?;
        match &self.action {
            MatViewAction::SetRefresh(mode) => {
                write!(f, "SET REFRESH ")?;
                match mode {
                    SetRefreshMode::Immediate => write!(f, "IMMEDIATE"),
                    SetRefreshMode::Manual => write!(f, "MANUAL"),
                    SetRefreshMode::Incremental => write!(f, "INCREMENTAL"),
                    SetRefreshMode::Every(interval) => write!(f, "EVERY {interval}"),
                    SetRefreshMode::Limit(ttl) => write!(f, "LIMIT {ttl}"),
                }
            }
            MatViewAction::SetTtl(ttl) => write!(f, "SET TTL {ttl}"),
            MatViewAction::SuspendWal => write!(f, "SUSPEND WAL"),
            MatViewAction::ResumeWal(from) => {
                write!(f, "RESUME WAL")?;
                if let Some(from) = from {
                    let spelling = match from.spelling {
                        TxnSpelling::Txn => "TXN",
                        TxnSpelling::Transaction => "TRANSACTION",
                    };
                    write!(f, " FROM {spelling} {}", from.txn)?;
                }
                Ok(())
            }
            MatViewAction::OwnedBy(owner) => write!(f, "OWNED BY {}", Ident(owner)),
        }
    }
}

/// DROP TABLE, including `DROP ALL TABLES`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub all_tables: bool,
    pub if_exists: bool,
    pub table: Option<QualifiedName>,
}

impl fmt::Display for DropTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_tables {
            return write!(f, "DROP ALL TABLES");
        }
        write!(f, "DROP TABLE ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        match &self.table {
            Some(table) => write!(f, "{table}"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropView {
    pub materialized: bool,
    pub if_exists: bool,
    pub view: QualifiedName,
}

impl fmt::Display for DropView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP ")?;
        if self.materialized {
            write!(f, "MATERIALIZED ")?;
        }
        write!(f, "VIEW ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{}", self.view)
    }
}

/// REFRESH MATERIALIZED VIEW.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshMaterializedView {
    pub view: QualifiedName,
    pub range: Option<RefreshRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshRange {
    Full,
    Incremental,
    Interval { from: String, to: String },
}

impl fmt::Display for RefreshMaterializedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFRESH MATERIALIZED VIEW {}", self.view)?;
        match &self.range {
            None => Ok(()),
            Some(RefreshRange::Full) => write!(f, " FULL"),
            Some(RefreshRange::Incremental) => write!(f, " INCREMENTAL"),
            Some(RefreshRange::Interval { from, to }) => {
                write!(f, " INTERVAL FROM ")?;
                write_string(f, from)?;
                write!(f, " TO ")?;
                write_string(f, to)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruncateTable {
    pub table: QualifiedName,
}

impl fmt::Display for TruncateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRUNCATE TABLE {}", self.table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameTable {
    pub table: QualifiedName,
    pub to: QualifiedName,
}

impl fmt::Display for RenameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RENAME TABLE {} TO {}", self.table, self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VacuumTable {
    pub table: QualifiedName,
}

impl fmt::Display for VacuumTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VACUUM TABLE {}", self.table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReindexTable {
    pub table: QualifiedName,
    pub column: Option<String>,
    pub partition: Option<String>,
}

impl fmt::Display for ReindexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REINDEX TABLE {}", self.table)?;
        if let Some(column) = &self.column {
            write!(f, " COLUMN {}", Ident(column))?;
        }
        if let Some(partition) = &self.partition {
            write!(f, " PARTITION ")?;
            write_string(f, partition)?;
        }
        write!(f, " LOCK EXCLUSIVE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_alter_table_actions() {
        let alter = AlterTable {
            table: QualifiedName::single("trades"),
            action: AlterTableAction::ResumeWal(Some(ResumeFrom {
                spelling: TxnSpelling::Transaction,
                txn: "42".into(),
            })),
        };
        assert_eq!(
            alter.to_string(),
            "ALTER TABLE trades RESUME WAL FROM TRANSACTION 42"
        );

        let alter = AlterTable {
            table: QualifiedName::single("trades"),
            action: AlterTableAction::DedupEnable(vec!["ts".into(), "symbol".into()]),
        };
        assert_eq!(
            alter.to_string(),
            "ALTER TABLE trades DEDUP ENABLE UPSERT KEYS(ts, symbol)"
        );
    }

    #[test]
    fn it_encodes_partition_selectors() {
        let alter = AlterTable {
            table: QualifiedName::single("trades"),
            action: AlterTableAction::DropPartition(PartitionSelector::List(vec![
                "2024-01".into(),
                "2024-02".into(),
            ])),
        };
        assert_eq!(
            alter.to_string(),
            "ALTER TABLE trades DROP PARTITION LIST '2024-01', '2024-02'"
        );
    }
}
