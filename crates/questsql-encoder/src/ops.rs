use crate::name::{Ident, QualifiedName};
use std::fmt;

/// SHOW in all its variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Show {
    Tables,
    Columns { table: QualifiedName },
    Partitions { table: QualifiedName },
    CreateTable { table: QualifiedName },
    CreateView { view: QualifiedName },
    CreateMaterializedView { view: QualifiedName },
    ServerVersion,
    Parameters,
    User { name: Option<String> },
    Users,
    Groups { user: Option<String> },
    ServiceAccounts { user: Option<String> },
    ServiceAccount { name: String },
    Permissions { entity: Option<String> },
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHOW ")?;
        match self {
            Show::Tables => write!(f, "TABLES"),
            Show::Columns { table } => write!(f, "COLUMNS FROM {table}"),
            Show::Partitions { table } => write!(f, "PARTITIONS FROM {table}"),
            Show::CreateTable { table } => write!(f, "CREATE TABLE {table}"),
            Show::CreateView { view } => write!(f, "CREATE VIEW {view}"),
            Show::CreateMaterializedView { view } => {
                write!(f, "CREATE MATERIALIZED VIEW {view}")
            }
            Show::ServerVersion => write!(f, "SERVER_VERSION"),
            Show::Parameters => write!(f, "PARAMETERS"),
            Show::User { name } => {
                write!(f, "USER")?;
                if let Some(name) = name {
                    write!(f, " {}", Ident(name))?;
                }
                Ok(())
            }
            Show::Users => write!(f, "USERS"),
            Show::Groups { user } => {
                write!(f, "GROUPS")?;
                if let Some(user) = user {
                    write!(f, " {}", Ident(user))?;
                }
                Ok(())
            }
            Show::ServiceAccounts { user } => {
                write!(f, "SERVICE ACCOUNTS")?;
                if let Some(user) = user {
                    write!(f, " {}", Ident(user))?;
                }
                Ok(())
            }
            Show::ServiceAccount { name } => {
                write!(f, "SERVICE ACCOUNT {}", Ident(name))
            }
            Show::Permissions { entity } => {
                write!(f, "PERMISSIONS")?;
                if let Some(entity) = entity {
                    write!(f, " {}", Ident(entity))?;
                }
                Ok(())
            }
        }
    }
}

/// COPY options, shared by the import and export directions.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOption {
    Header(bool),
    /// Designated timestamp column, as written (quoted or bare).
    Timestamp(String),
    Delimiter(String),
    Format(String),
    /// `ON ERROR SKIP_ROW | SKIP_COLUMN | ABORT`, stored upper-cased.
    OnError(String),
    /// `PARTITION BY DAY` — a partition unit.
    PartitionByUnit(String),
    /// `PARTITION_BY column` — the export form.
    PartitionByTarget(String),
    CompressionCodec(String),
}

impl fmt::Display for CopyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyOption::Header(on) => {
                write!(f, "HEADER {}", if *on { "true" } else { "false" })
            }
            CopyOption::Timestamp(column) => write!(f, "TIMESTAMP '{column}'"),
            CopyOption::Delimiter(delim) => {
                write!(f, "DELIMITER '{}'", delim.replace('\'', "''"))
            }
            CopyOption::Format(format) => write!(f, "FORMAT {format}"),
            CopyOption::OnError(mode) => write!(f, "ON ERROR {mode}"),
            CopyOption::PartitionByUnit(unit) => write!(f, "PARTITION BY {unit}"),
            CopyOption::PartitionByTarget(target) => write!(f, "PARTITION_BY {target}"),
            CopyOption::CompressionCodec(codec) => {
                write!(f, "COMPRESSION_CODEC {codec}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyFrom {
    pub table: String,
    pub path: String,
    pub options: Vec<CopyOption>,
}

impl fmt::Display for CopyFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "COPY {} FROM '{}'",
            Ident(&self.table),
            self.path.replace('\'', "''")
        )?;
        write_options(f, &self.options)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyTo {
    pub table: String,
    pub path: String,
    pub options: Vec<CopyOption>,
}

impl fmt::Display for CopyTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "COPY {} TO '{}'",
            Ident(&self.table),
            self.path.replace('\'', "''")
        )?;
        write_options(f, &self.options)
    }
}

fn write_options(f: &mut fmt::Formatter<'_>, options: &[CopyOption]) -> fmt::Result {
    for (i, option) in options.iter().enumerate() {
        if i == 0 {
            write!(f, " WITH")?;
        }
        write!(f, " {option}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyCancel {
    pub id: String,
}

impl fmt::Display for CopyCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COPY {} CANCEL", Ident(&self.id))
    }
}

/// CANCEL QUERY; the id is kept exactly as written (`29` or `'29'`).
#[derive(Debug, Clone, PartialEq)]
pub struct CancelQuery {
    pub id: String,
}

impl fmt::Display for CancelQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CANCEL QUERY {}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Create,
    Release,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Create => write!(f, "CHECKPOINT CREATE"),
            Checkpoint::Release => write!(f, "CHECKPOINT RELEASE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Prepare,
    Complete,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Prepare => write!(f, "SNAPSHOT PREPARE"),
            Snapshot::Complete => write!(f, "SNAPSHOT COMPLETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backup {
    Tables(Vec<QualifiedName>),
    Database,
}

impl fmt::Display for Backup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backup::Tables(tables) => {
                write!(f, "BACKUP TABLE ")?;
                for (i, table) in tables.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{table}")?;
                }
                Ok(())
            }
            Backup::Database => write!(f, "BACKUP DATABASE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileView {
    pub materialized: bool,
    pub view: QualifiedName,
}

impl fmt::Display for CompileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COMPILE ")?;
        if self.materialized {
            write!(f, "MATERIALIZED ")?;
        }
        write!(f, "VIEW {}", self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_show_variants() {
        assert_eq!(Show::Tables.to_string(), "SHOW TABLES");
        assert_eq!(
            Show::Columns {
                table: QualifiedName::single("trades")
            }
            .to_string(),
            "SHOW COLUMNS FROM trades"
        );
        assert_eq!(Show::ServerVersion.to_string(), "SHOW SERVER_VERSION");
    }

    #[test]
    fn it_encodes_copy_with_options() {
        let copy = CopyFrom {
            table: "trades".into(),
            path: "trades.csv".into(),
            options: vec![
                CopyOption::Header(true),
                CopyOption::OnError("SKIP_ROW".into()),
            ],
        };
        assert_eq!(
            copy.to_string(),
            "COPY trades FROM 'trades.csv' WITH HEADER true ON ERROR SKIP_ROW"
        );
    }
}
