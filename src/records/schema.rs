use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::{Row, StoreError};

/// Table (worksheet tab) names in the backing sheet.
pub mod tables {
    pub const DEALS: &str = "deals";
    pub const CUSTOMERS: &str = "customers";
    pub const PARTNERS: &str = "partners";
    pub const USERS: &str = "users";
    pub const ADMINS: &str = "admins";
    pub const AUDIT_LOG: &str = "audit_log";
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Column-name → index map built from a table's header row and validated
/// against the expected column set. A renamed or missing column fails parsing
/// up front instead of silently shifting values into the wrong fields.
/// Extra columns are tolerated (and preserved by whole-row rewrites only as
/// empty cells, so schemas here must stay the superset of what is written).
#[derive(Debug, Clone)]
pub struct Header {
    index: HashMap<String, usize>,
    width: usize,
}

impl Header {
    pub fn parse(table: &str, header: &Row, expected: &[&str]) -> Result<Self, StoreError> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        for column in expected {
            if !index.contains_key(*column) {
                return Err(StoreError::Schema(format!(
                    "table {table} is missing column {column}"
                )));
            }
        }
        Ok(Self {
            index,
            width: header.len(),
        })
    }

    /// Cell value for a column, empty string when the row is ragged.
    /// Only valid for columns that were in the expected set at parse time.
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.index
            .get(column)
            .and_then(|i| row.get(*i))
            .map_or("", String::as_str)
    }

    /// Build a full-width row from (column, value) pairs; unlisted columns
    /// become empty cells.
    pub fn row_from(&self, fields: &[(&str, &str)]) -> Row {
        let mut row = vec![String::new(); self.width];
        for (column, value) in fields {
            if let Some(i) = self.index.get(*column) {
                row[*i] = (*value).to_owned();
            }
        }
        row
    }
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Submitted,
    Approved,
    Rejected,
}

impl DealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the deal has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Submitted)
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => anyhow::bail!("unknown deal status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    PartnerUser,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartnerUser => "partner_user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partner_user" => Ok(Self::PartnerUser),
            "admin" => Ok(Self::Admin),
            other => anyhow::bail!("unknown user role: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Pending,
    Active,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            other => anyhow::bail!("unknown user status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Approved,
    Rejected,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

fn parse_status<T: FromStr<Err = anyhow::Error>>(
    table: &str,
    column: &str,
    value: &str,
) -> Result<T, StoreError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| StoreError::Schema(format!("table {table}, {column}: {e}")))
}

#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    pub id: String,
    pub partner_id: String,
    pub customer_id: String,
    pub submitter_id: String,
    pub status: DealStatus,
    pub company_name: String,
    pub domain: String,
    pub territory: String,
    pub deal_value: String,
    pub deal_stage: String,
    pub expected_close_date: String,
    pub contract_type: String,
    pub approved_by: String,
    pub approved_at: String,
    pub rejection_reason: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Deal {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "partner_id",
        "customer_id",
        "submitter_id",
        "status",
        "company_name",
        "domain",
        "territory",
        "deal_value",
        "deal_stage",
        "expected_close_date",
        "contract_type",
        "approved_by",
        "approved_at",
        "rejection_reason",
        "created_at",
        "updated_at",
    ];

    pub fn from_row(header: &Header, row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: header.cell(row, "id").to_owned(),
            partner_id: header.cell(row, "partner_id").to_owned(),
            customer_id: header.cell(row, "customer_id").to_owned(),
            submitter_id: header.cell(row, "submitter_id").to_owned(),
            status: parse_status(tables::DEALS, "status", header.cell(row, "status"))?,
            company_name: header.cell(row, "company_name").to_owned(),
            domain: header.cell(row, "domain").to_owned(),
            territory: header.cell(row, "territory").to_owned(),
            deal_value: header.cell(row, "deal_value").to_owned(),
            deal_stage: header.cell(row, "deal_stage").to_owned(),
            expected_close_date: header.cell(row, "expected_close_date").to_owned(),
            contract_type: header.cell(row, "contract_type").to_owned(),
            approved_by: header.cell(row, "approved_by").to_owned(),
            approved_at: header.cell(row, "approved_at").to_owned(),
            rejection_reason: header.cell(row, "rejection_reason").to_owned(),
            created_at: header.cell(row, "created_at").to_owned(),
            updated_at: header.cell(row, "updated_at").to_owned(),
        })
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("id", &self.id),
            ("partner_id", &self.partner_id),
            ("customer_id", &self.customer_id),
            ("submitter_id", &self.submitter_id),
            ("status", self.status.as_str()),
            ("company_name", &self.company_name),
            ("domain", &self.domain),
            ("territory", &self.territory),
            ("deal_value", &self.deal_value),
            ("deal_stage", &self.deal_stage),
            ("expected_close_date", &self.expected_close_date),
            ("contract_type", &self.contract_type),
            ("approved_by", &self.approved_by),
            ("approved_at", &self.approved_at),
            ("rejection_reason", &self.rejection_reason),
            ("created_at", &self.created_at),
            ("updated_at", &self.updated_at),
        ])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: String,
    pub company_name: String,
    pub domain: String,
    pub legal_name: String,
    pub industry: String,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Customer {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "company_name",
        "domain",
        "legal_name",
        "industry",
        "location",
        "created_at",
        "updated_at",
    ];

    pub fn from_row(header: &Header, row: &Row) -> Self {
        Self {
            id: header.cell(row, "id").to_owned(),
            company_name: header.cell(row, "company_name").to_owned(),
            domain: header.cell(row, "domain").to_owned(),
            legal_name: header.cell(row, "legal_name").to_owned(),
            industry: header.cell(row, "industry").to_owned(),
            location: header.cell(row, "location").to_owned(),
            created_at: header.cell(row, "created_at").to_owned(),
            updated_at: header.cell(row, "updated_at").to_owned(),
        }
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("id", &self.id),
            ("company_name", &self.company_name),
            ("domain", &self.domain),
            ("legal_name", &self.legal_name),
            ("industry", &self.industry),
            ("location", &self.location),
            ("created_at", &self.created_at),
            ("updated_at", &self.updated_at),
        ])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Partner {
    pub id: String,
    pub company_name: String,
    pub partner_type: String,
    pub territory: String,
    pub status: String,
    pub contact_name: String,
    pub contact_email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Partner {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "company_name",
        "partner_type",
        "territory",
        "status",
        "contact_name",
        "contact_email",
        "created_at",
        "updated_at",
    ];

    pub fn from_row(header: &Header, row: &Row) -> Self {
        Self {
            id: header.cell(row, "id").to_owned(),
            company_name: header.cell(row, "company_name").to_owned(),
            partner_type: header.cell(row, "partner_type").to_owned(),
            territory: header.cell(row, "territory").to_owned(),
            status: header.cell(row, "status").to_owned(),
            contact_name: header.cell(row, "contact_name").to_owned(),
            contact_email: header.cell(row, "contact_email").to_owned(),
            created_at: header.cell(row, "created_at").to_owned(),
            updated_at: header.cell(row, "updated_at").to_owned(),
        }
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("id", &self.id),
            ("company_name", &self.company_name),
            ("partner_type", &self.partner_type),
            ("territory", &self.territory),
            ("status", &self.status),
            ("contact_name", &self.contact_name),
            ("contact_email", &self.contact_email),
            ("created_at", &self.created_at),
            ("updated_at", &self.updated_at),
        ])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub partner_id: String,
    pub email: String,
    /// Empty for externally-authenticated users.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "partner_id",
        "email",
        "password_hash",
        "first_name",
        "last_name",
        "role",
        "status",
        "created_at",
        "updated_at",
    ];

    pub fn from_row(header: &Header, row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: header.cell(row, "id").to_owned(),
            partner_id: header.cell(row, "partner_id").to_owned(),
            email: header.cell(row, "email").to_owned(),
            password_hash: header.cell(row, "password_hash").to_owned(),
            first_name: header.cell(row, "first_name").to_owned(),
            last_name: header.cell(row, "last_name").to_owned(),
            role: parse_status(tables::USERS, "role", header.cell(row, "role"))?,
            status: parse_status(tables::USERS, "status", header.cell(row, "status"))?,
            created_at: header.cell(row, "created_at").to_owned(),
            updated_at: header.cell(row, "updated_at").to_owned(),
        })
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("id", &self.id),
            ("partner_id", &self.partner_id),
            ("email", &self.email),
            ("password_hash", &self.password_hash),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("role", self.role.as_str()),
            ("status", self.status.as_str()),
            ("created_at", &self.created_at),
            ("updated_at", &self.updated_at),
        ])
    }
}

/// Dynamic allow-list entry granting admin role independent of `User::role`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminEntry {
    pub email: String,
    pub added_by: String,
    pub added_at: String,
    pub status: String,
}

impl AdminEntry {
    pub const COLUMNS: &'static [&'static str] = &["email", "added_by", "added_at", "status"];

    pub const STATUS_ACTIVE: &'static str = "active";
    pub const STATUS_REMOVED: &'static str = "removed";

    pub fn from_row(header: &Header, row: &Row) -> Self {
        Self {
            email: header.cell(row, "email").to_owned(),
            added_by: header.cell(row, "added_by").to_owned(),
            added_at: header.cell(row, "added_at").to_owned(),
            status: header.cell(row, "status").to_owned(),
        }
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("email", &self.email),
            ("added_by", &self.added_by),
            ("added_at", &self.added_at),
            ("status", &self.status),
        ])
    }

    pub fn is_active(&self) -> bool {
        self.status == Self::STATUS_ACTIVE
    }
}

/// Append-only trail of terminal deal transitions. Never rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub deal_id: String,
    pub actor_email: String,
    pub action: String,
    pub timestamp: String,
    pub note: String,
}

impl AuditLogEntry {
    pub const COLUMNS: &'static [&'static str] =
        &["id", "deal_id", "actor_email", "action", "timestamp", "note"];

    pub fn from_row(header: &Header, row: &Row) -> Self {
        Self {
            id: header.cell(row, "id").to_owned(),
            deal_id: header.cell(row, "deal_id").to_owned(),
            actor_email: header.cell(row, "actor_email").to_owned(),
            action: header.cell(row, "action").to_owned(),
            timestamp: header.cell(row, "timestamp").to_owned(),
            note: header.cell(row, "note").to_owned(),
        }
    }

    pub fn to_row(&self, header: &Header) -> Row {
        header.row_from(&[
            ("id", &self.id),
            ("deal_id", &self.deal_id),
            ("actor_email", &self.actor_email),
            ("action", &self.action),
            ("timestamp", &self.timestamp),
            ("note", &self.note),
        ])
    }
}
