use crate::error::ApiError;
use crate::records::{AdminEntry, Records};
use crate::store::timestamp;
use crate::validation;

/// Active entries of the dynamic admin registry.
pub async fn list(records: &Records) -> Result<Vec<AdminEntry>, ApiError> {
    Ok(records
        .admin_entries()
        .await?
        .into_iter()
        .filter(AdminEntry::is_active)
        .collect())
}

/// Grant admin to an email. Emails are stored lowercased so the role
/// resolver's lookup matches regardless of how the address was typed.
/// A previously removed entry is re-activated in place rather than appended
/// again; an already-active one is a conflict.
pub async fn add(records: &Records, email: &str, added_by: &str) -> Result<AdminEntry, ApiError> {
    validation::check_email("email", email)?;
    let email = email.to_ascii_lowercase();

    if let Some((mut entry, position)) = records.find_admin_entry(&email).await? {
        if entry.is_active() {
            return Err(ApiError::Conflict(format!("{email} is already an admin")));
        }
        entry.status = AdminEntry::STATUS_ACTIVE.to_owned();
        entry.added_by = added_by.to_owned();
        entry.added_at = timestamp();
        records.update_admin_entry(position, &entry).await?;
        tracing::info!(email = %entry.email, added_by, "admin registry entry re-activated");
        return Ok(entry);
    }

    let entry = AdminEntry {
        email,
        added_by: added_by.to_owned(),
        added_at: timestamp(),
        status: AdminEntry::STATUS_ACTIVE.to_owned(),
    };
    records.append_admin_entry(&entry).await?;
    tracing::info!(email = %entry.email, added_by, "admin registry entry added");
    Ok(entry)
}

/// Revoke an email's registry grant. The row is kept and soft-removed so the
/// grant history stays visible in the sheet.
pub async fn remove(records: &Records, email: &str) -> Result<(), ApiError> {
    let email = email.to_ascii_lowercase();
    let Some((mut entry, position)) = records.find_admin_entry(&email).await? else {
        return Err(ApiError::NotFound(format!("{email} is not in the admin registry")));
    };
    if !entry.is_active() {
        return Err(ApiError::NotFound(format!("{email} is not an active admin")));
    }
    entry.status = AdminEntry::STATUS_REMOVED.to_owned();
    records.update_admin_entry(position, &entry).await?;
    tracing::info!(email = %entry.email, "admin registry entry removed");
    Ok(())
}
