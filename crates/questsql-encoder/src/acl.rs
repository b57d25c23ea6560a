use crate::name::{write_string, Ident, QualifiedName};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub if_not_exists: bool,
    pub name: String,
    pub password: Option<PasswordSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PasswordSpec {
    NoPassword,
    Password(String),
}

impl fmt::Display for PasswordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordSpec::NoPassword => write!(f, "WITH NO PASSWORD"),
            PasswordSpec::Password(password) => {
                write!(f, "WITH PASSWORD ")?;
                write_string(f, password)
            }
        }
    }
}

impl fmt::Display for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE USER ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", Ident(&self.name))?;
        if let Some(password) = &self.password {
            write!(f, " {password}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateGroup {
    pub if_not_exists: bool,
    pub name: String,
}

impl fmt::Display for CreateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE GROUP ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", Ident(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateServiceAccount {
    pub if_not_exists: bool,
    pub name: String,
    pub owned_by: Option<String>,
}

impl fmt::Display for CreateServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE SERVICE ACCOUNT ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", Ident(&self.name))?;
        if let Some(owner) = &self.owned_by {
            write!(f, " OWNED BY {}", Ident(owner))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Enable,
    Disable,
    Password(PasswordSpec),
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAction::Enable => write!(f, "ENABLE"),
            UserAction::Disable => write!(f, "DISABLE"),
            UserAction::Password(spec) => write!(f, "{spec}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterUser {
    pub name: String,
    pub action: UserAction,
}

impl fmt::Display for AlterUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER USER {} {}", Ident(&self.name), self.action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterServiceAccount {
    pub name: String,
    pub action: UserAction,
}

impl fmt::Display for AlterServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALTER SERVICE ACCOUNT {} {}",
            Ident(&self.name),
            self.action
        )
    }
}

/// DROP USER / GROUP / SERVICE ACCOUNT share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPrincipal {
    pub kind: PrincipalKind,
    pub if_exists: bool,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Group,
    ServiceAccount,
}

impl fmt::Display for DropPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PrincipalKind::User => "USER",
            PrincipalKind::Group => "GROUP",
            PrincipalKind::ServiceAccount => "SERVICE ACCOUNT",
        };
        write!(f, "DROP {kind} ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{}", Ident(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddUser {
    pub user: String,
    pub groups: Vec<String>,
}

impl fmt::Display for AddUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADD USER {} TO ", Ident(&self.user))?;
        write_names(f, &self.groups)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveUser {
    pub user: String,
    pub groups: Vec<String>,
}

impl fmt::Display for RemoveUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REMOVE USER {} FROM ", Ident(&self.user))?;
        write_names(f, &self.groups)
    }
}

/// GRANT and REVOKE; permissions are stored as upper-cased word runs
/// (`SELECT`, `CREATE TABLE`).
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub permissions: Vec<String>,
    pub on: Option<GrantTarget>,
    pub to: String,
    pub with_grant_option: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrantTarget {
    AllTables,
    Tables(Vec<PermissionTarget>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionTarget {
    pub table: QualifiedName,
    pub columns: Vec<String>,
}

impl fmt::Display for GrantTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantTarget::AllTables => write!(f, "ALL TABLES"),
            GrantTarget::Tables(targets) => {
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", target.table)?;
                    if !target.columns.is_empty() {
                        write!(f, "(")?;
                        for (j, column) in target.columns.iter().enumerate() {
                            if j > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", Ident(column))?;
                        }
                        write!(f, ")")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GRANT {}", self.permissions.join(", "))?;
        if let Some(target) = &self.on {
            write!(f, " ON {target}")?;
        }
        write!(f, " TO {}", Ident(&self.to))?;
        if self.with_grant_option {
            write!(f, " WITH GRANT OPTION")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Revoke {
    pub permissions: Vec<String>,
    pub on: Option<GrantTarget>,
    pub from: String,
}

impl fmt::Display for Revoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REVOKE {}", self.permissions.join(", "))?;
        if let Some(target) = &self.on {
            write!(f, " ON {target}")?;
        }
        write!(f, " FROM {}", Ident(&self.from))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrantAssume {
    pub service_account: String,
    pub to: String,
    pub with_grant_option: bool,
}

impl fmt::Display for GrantAssume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GRANT ASSUME SERVICE ACCOUNT {} TO {}",
            Ident(&self.service_account),
            Ident(&self.to)
        )?;
        if self.with_grant_option {
            write!(f, " WITH GRANT OPTION")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevokeAssume {
    pub service_account: String,
    pub from: String,
}

impl fmt::Display for RevokeAssume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "REVOKE ASSUME SERVICE ACCOUNT {} FROM {}",
            Ident(&self.service_account),
            Ident(&self.from)
        )
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", Ident(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_grants() {
        let grant = Grant {
            permissions: vec!["SELECT".into(), "INSERT".into()],
            on: Some(GrantTarget::Tables(vec![PermissionTarget {
                table: QualifiedName::single("trades"),
                columns: vec![],
            }])),
            to: "analyst".into(),
            with_grant_option: true,
        };
        assert_eq!(
            grant.to_string(),
            "GRANT SELECT, INSERT ON trades TO analyst WITH GRANT OPTION"
        );
    }

    #[test]
    fn it_encodes_user_management() {
        let user = CreateUser {
            if_not_exists: true,
            name: "ingest".into(),
            password: Some(PasswordSpec::Password("secret".into())),
        };
        assert_eq!(
            user.to_string(),
            "CREATE USER IF NOT EXISTS ingest WITH PASSWORD 'secret'"
        );
    }
}
