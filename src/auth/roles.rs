use crate::error::ApiError;
use crate::records::{Records, User, UserRole};

/// Resolve a user's effective role — the one canonical policy lookup.
///
/// Admin can come from any of three sources: the static operator allowlist,
/// the role column on the user record, or an active row in the dynamic admin
/// registry. All role checks must go through here; replicating the
/// three-source OR anywhere else reintroduces the consistency hazard this
/// function exists to contain.
pub async fn resolve(
    records: &Records,
    allowlist: &[String],
    user: &User,
) -> Result<UserRole, ApiError> {
    let email = user.email.to_ascii_lowercase();

    if allowlist.iter().any(|entry| *entry == email) {
        return Ok(UserRole::Admin);
    }
    if user.role == UserRole::Admin {
        return Ok(UserRole::Admin);
    }
    if let Some((entry, _)) = records.find_admin_entry(&email).await?
        && entry.is_active()
    {
        return Ok(UserRole::Admin);
    }
    Ok(UserRole::PartnerUser)
}
