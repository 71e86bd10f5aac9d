use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid role '{0}', expected one of: admin, manager, salesperson, client, stock_person, cashier")]
pub struct RoleError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Salesperson,
    Client,
    StockPerson,
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Salesperson => "salesperson",
            Role::Client => "client",
            Role::StockPerson => "stock_person",
            Role::Cashier => "cashier",
        }
    }

    /// Roles allowed to touch inventory.
    pub fn is_stock_employee(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::StockPerson)
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "salesperson" => Ok(Role::Salesperson),
            "client" => Ok(Role::Client),
            "stock_person" => Ok(Role::StockPerson),
            "cashier" => Ok(Role::Cashier),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
