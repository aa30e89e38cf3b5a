pub mod repo;
pub mod schema;

pub use repo::{DealPatch, Records};
pub use schema::{
    AdminEntry, AuditAction, AuditLogEntry, Customer, Deal, DealStatus, Header, Partner, User,
    UserRole, UserStatus, tables,
};
