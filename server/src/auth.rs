//! Operator authorization for issue calls
//!
//! Credential checks live outside the queue; this is the seam where an
//! operator name is resolved into an identity with a role.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// An authorized operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub role: Role,
}

impl Operator {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired(self.name.clone()))
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Operator name is empty")]
    EmptyOperator,

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Operator {0} is not an admin")]
    AdminRequired(String),
}

/// Resolves an operator name into an authorized identity
pub trait Authorizer: Send + Sync {
    fn authorize(&self, operator: &str) -> Result<Operator, AuthError>;
}

/// Fixed roster of operators
///
/// An empty roster runs in open mode: any non-empty name is accepted as a
/// plain user.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    roster: HashMap<String, Role>,
}

impl StaticAuthorizer {
    pub fn new(operators: impl IntoIterator<Item = (String, Role)>) -> Self {
        Self {
            roster: operators.into_iter().collect(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.roster.is_empty()
    }
}

impl Authorizer for StaticAuthorizer {
    fn authorize(&self, operator: &str) -> Result<Operator, AuthError> {
        let name = operator.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyOperator);
        }

        if self.is_open() {
            return Ok(Operator {
                name: name.to_string(),
                role: Role::User,
            });
        }

        self.roster
            .get(name)
            .map(|role| Operator {
                name: name.to_string(),
                role: *role,
            })
            .ok_or_else(|| AuthError::UnknownOperator(name.to_string()))
    }
}
