use crate::error::ApiError;
use crate::records::{Records, User, UserRole, UserStatus};
use crate::validation;

/// Identity attributes handed over after external authentication completes.
#[derive(Debug)]
pub struct NewIdentity<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub partner_company: &'a str,
    pub territory: &'a str,
}

/// Land an externally-authenticated identity in the store: reuse the user if
/// the email is known, otherwise create the Partner lazily (first user for a
/// company) and then the User. Externally-authenticated users carry no
/// password hash and start active as partner users.
pub async fn provision_user(records: &Records, identity: &NewIdentity<'_>) -> Result<User, ApiError> {
    validation::check_email("email", identity.email)?;
    validation::check_required("partner_company", identity.partner_company)?;

    if let Some(existing) = records.find_user_by_email(identity.email).await? {
        return Ok(existing);
    }

    let partner = match records
        .find_partner_by_company(identity.partner_company)
        .await?
    {
        Some(partner) => partner,
        None => {
            let contact_name = format!("{} {}", identity.first_name, identity.last_name);
            records
                .create_partner(
                    identity.partner_company,
                    identity.territory,
                    contact_name.trim(),
                    identity.email,
                )
                .await?
        }
    };

    let user = records
        .create_user(
            &partner.id,
            identity.email,
            identity.first_name,
            identity.last_name,
            UserRole::PartnerUser,
            UserStatus::Active,
        )
        .await?;

    tracing::info!(user_id = %user.id, partner_id = %partner.id, "user provisioned");
    Ok(user)
}
