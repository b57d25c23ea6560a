use crate::acl::{
    AddUser, AlterServiceAccount, AlterUser, CreateGroup, CreateServiceAccount, CreateUser,
    DropPrincipal, Grant, GrantAssume, RemoveUser, Revoke, RevokeAssume,
};
use crate::alter::{
    AlterMaterializedView, AlterTable, AlterView, DropTable, DropView, RefreshMaterializedView,
    ReindexTable, RenameTable, TruncateTable, VacuumTable,
};
use crate::create::{CreateMaterializedView, CreateTable, CreateView};
use crate::insert::{InsertStatement, UpdateStatement};
use crate::name::Ident;
use crate::ops::{
    Backup, CancelQuery, Checkpoint, CompileView, CopyCancel, CopyFrom, CopyTo, Show, Snapshot,
};
use crate::select::SelectStatement;
use std::fmt;

/// One parsed statement. The serializer's dispatch below is exhaustive;
/// adding a variant without a `Display` arm is a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Box<SelectStatement>),
    Insert(Box<InsertStatement>),
    Update(Box<UpdateStatement>),
    CreateTable(Box<CreateTable>),
    CreateView(Box<CreateView>),
    CreateMaterializedView(Box<CreateMaterializedView>),
    AlterTable(Box<AlterTable>),
    AlterView(AlterView),
    AlterMaterializedView(Box<AlterMaterializedView>),
    DropTable(DropTable),
    DropView(DropView),
    RefreshMaterializedView(RefreshMaterializedView),
    TruncateTable(TruncateTable),
    RenameTable(RenameTable),
    VacuumTable(VacuumTable),
    ReindexTable(ReindexTable),
    Show(Show),
    Explain(Box<Statement>),
    CreateUser(CreateUser),
    CreateGroup(CreateGroup),
    CreateServiceAccount(CreateServiceAccount),
    AlterUser(AlterUser),
    AlterServiceAccount(AlterServiceAccount),
    DropPrincipal(DropPrincipal),
    AddUser(AddUser),
    RemoveUser(RemoveUser),
    AssumeServiceAccount(String),
    ExitServiceAccount(Option<String>),
    Grant(Grant),
    Revoke(Revoke),
    GrantAssume(GrantAssume),
    RevokeAssume(RevokeAssume),
    CancelQuery(CancelQuery),
    Checkpoint(Checkpoint),
    Snapshot(Snapshot),
    Backup(Backup),
    CopyFrom(Box<CopyFrom>),
    CopyTo(Box<CopyTo>),
    CopyCancel(CopyCancel),
    CompileView(CompileView),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{s}"),
            Statement::Insert(s) => write!(f, "{s}"),
            Statement::Update(s) => write!(f, "{s}"),
            Statement::CreateTable(s) => write!(f, "{s}"),
            Statement::CreateView(s) => write!(f, "{s}"),
            Statement::CreateMaterializedView(s) => write!(f, "{s}"),
            Statement::AlterTable(s) => write!(f, "{s}"),
            Statement::AlterView(s) => write!(f, "{s}"),
            Statement::AlterMaterializedView(s) => write!(f, "{s}"),
            Statement::DropTable(s) => write!(f, "{s}"),
            Statement::DropView(s) => write!(f, "{s}"),
            Statement::RefreshMaterializedView(s) => write!(f, "{s}"),
            Statement::TruncateTable(s) => write!(f, "{s}"),
            Statement::RenameTable(s) => write!(f, "{s}"),
            Statement::VacuumTable(s) => write!(f, "{s}"),
            Statement::ReindexTable(s) => write!(f, "{s}"),
            Statement::Show(s) => write!(f, "{s}"),
            Statement::Explain(s) => write!(f, "EXPLAIN {s}"),
            Statement::CreateUser(s) => write!(f, "{s}"),
            Statement::CreateGroup(s) => write!(f, "{s}"),
            Statement::CreateServiceAccount(s) => write!(f, "{s}"),
            Statement::AlterUser(s) => write!(f, "{s}"),
            Statement::AlterServiceAccount(s) => write!(f, "{s}"),
            Statement::DropPrincipal(s) => write!(f, "{s}"),
            Statement::AddUser(s) => write!(f, "{s}"),
            Statement::RemoveUser(s) => write!(f, "{s}"),
            Statement::AssumeServiceAccount(name) => {
                write!(f, "ASSUME SERVICE ACCOUNT {}", Ident(name))
            }
            Statement::ExitServiceAccount(name) => {
                write!(f, "EXIT SERVICE ACCOUNT")?;
                if let Some(name) = name {
                    write!(f, " {}", Ident(name))?;
                }
                Ok(())
            }
            Statement::Grant(s) => write!(f, "{s}"),
            Statement::Revoke(s) => write!(f, "{s}"),
            Statement::GrantAssume(s) => write!(f, "{s}"),
            Statement::RevokeAssume(s) => write!(f, "{s}"),
            Statement::CancelQuery(s) => write!(f, "{s}"),
            Statement::Checkpoint(s) => write!(f, "{s}"),
            Statement::Snapshot(s) => write!(f, "{s}"),
            Statement::Backup(s) => write!(f, "{s}"),
            Statement::CopyFrom(s) => write!(f, "{s}"),
            Statement::CopyTo(s) => write!(f, "{s}"),
            Statement::CopyCancel(s) => write!(f, "{s}"),
            Statement::CompileView(s) => write!(f, "{s}"),
        }
    }
}
