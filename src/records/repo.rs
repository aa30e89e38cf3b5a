use std::sync::Arc;

use crate::error::ApiError;
use crate::records::schema::{
    AdminEntry, AuditLogEntry, Customer, Deal, DealStatus, Header, Partner, User, UserRole,
    UserStatus, tables,
};
use crate::store::{StoreError, TabularStore, generate_id, timestamp};

/// Typed read/write helpers over the tabular store. One instance per request
/// is fine — it holds nothing but the store handle, and every read
/// round-trips to the store (no caching by design).
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn TabularStore>,
}

/// Field deltas for a deal update. Partial in intent, full-row-replace in
/// mechanism: unset fields keep their stored values.
#[derive(Debug, Default)]
pub struct DealPatch {
    pub status: Option<DealStatus>,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Records {
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self { store }
    }

    async fn header(&self, table: &str, expected: &[&str]) -> Result<Header, StoreError> {
        let rows = self.store.rows(table).await?;
        let header_row = rows
            .first()
            .ok_or_else(|| StoreError::Schema(format!("table {table} has no header row")))?;
        Header::parse(table, header_row, expected)
    }

    // -- deals --

    pub async fn deals(&self) -> Result<Vec<Deal>, ApiError> {
        let rows = self.store.rows(tables::DEALS).await?;
        let mut iter = rows.iter();
        let Some(header_row) = iter.next() else {
            return Err(StoreError::Schema("table deals has no header row".into()).into());
        };
        let header = Header::parse(tables::DEALS, header_row, Deal::COLUMNS)?;
        iter.map(|row| Deal::from_row(&header, row).map_err(ApiError::from))
            .collect()
    }

    pub async fn find_deal(&self, id: &str) -> Result<Option<(Deal, u32)>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::DEALS, "id", id)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::DEALS, &found.header, Deal::COLUMNS)?;
        let deal = Deal::from_row(&header, &found.row)?;
        Ok(Some((deal, found.position)))
    }

    /// Append a new deal row, stamping id and timestamps. Returns the stored
    /// deal.
    pub async fn create_deal(&self, mut deal: Deal) -> Result<Deal, ApiError> {
        let header = self.header(tables::DEALS, Deal::COLUMNS).await?;
        let now = timestamp();
        deal.id = generate_id();
        deal.created_at = now.clone();
        deal.updated_at = now;
        self.store
            .append_row(tables::DEALS, deal.to_row(&header))
            .await?;
        Ok(deal)
    }

    /// Merge `patch` into the deal and rewrite its row in place.
    ///
    /// `expected_updated_at` is the `updated_at` the caller read before
    /// deciding to write; if the stored value has moved since, the update is
    /// refused with `Conflict` instead of clobbering a concurrent write.
    pub async fn update_deal(
        &self,
        id: &str,
        patch: DealPatch,
        expected_updated_at: &str,
    ) -> Result<Deal, ApiError> {
        let (mut deal, position) = self
            .find_deal(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("deal {id} not found")))?;

        if deal.updated_at != expected_updated_at {
            return Err(ApiError::Conflict(format!(
                "deal {id} was modified concurrently"
            )));
        }

        if let Some(status) = patch.status {
            deal.status = status;
        }
        if let Some(approved_by) = patch.approved_by {
            deal.approved_by = approved_by;
        }
        if let Some(approved_at) = patch.approved_at {
            deal.approved_at = approved_at;
        }
        if let Some(reason) = patch.rejection_reason {
            deal.rejection_reason = reason;
        }
        deal.updated_at = timestamp();

        let header = self.header(tables::DEALS, Deal::COLUMNS).await?;
        self.store
            .update_row(tables::DEALS, position, deal.to_row(&header))
            .await?;
        Ok(deal)
    }

    // -- customers --

    /// Exact-match lookup on the domain column. Intentionally case-sensitive;
    /// the case-insensitive path is duplicate detection on deals.
    pub async fn find_customer_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<Customer>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::CUSTOMERS, "domain", domain)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::CUSTOMERS, &found.header, Customer::COLUMNS)?;
        Ok(Some(Customer::from_row(&header, &found.row)))
    }

    pub async fn create_customer(
        &self,
        company_name: &str,
        domain: &str,
    ) -> Result<Customer, ApiError> {
        let header = self.header(tables::CUSTOMERS, Customer::COLUMNS).await?;
        let now = timestamp();
        let customer = Customer {
            id: generate_id(),
            company_name: company_name.to_owned(),
            domain: domain.to_owned(),
            legal_name: String::new(),
            industry: String::new(),
            location: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .append_row(tables::CUSTOMERS, customer.to_row(&header))
            .await?;
        Ok(customer)
    }

    // -- partners --

    pub async fn find_partner_by_company(
        &self,
        company_name: &str,
    ) -> Result<Option<Partner>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::PARTNERS, "company_name", company_name)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::PARTNERS, &found.header, Partner::COLUMNS)?;
        Ok(Some(Partner::from_row(&header, &found.row)))
    }

    pub async fn create_partner(
        &self,
        company_name: &str,
        territory: &str,
        contact_name: &str,
        contact_email: &str,
    ) -> Result<Partner, ApiError> {
        let header = self.header(tables::PARTNERS, Partner::COLUMNS).await?;
        let now = timestamp();
        let partner = Partner {
            id: generate_id(),
            company_name: company_name.to_owned(),
            partner_type: String::new(),
            territory: territory.to_owned(),
            status: "active".into(),
            contact_name: contact_name.to_owned(),
            contact_email: contact_email.to_owned(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .append_row(tables::PARTNERS, partner.to_row(&header))
            .await?;
        Ok(partner)
    }

    // -- users --

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::USERS, "id", id)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::USERS, &found.header, User::COLUMNS)?;
        Ok(Some(User::from_row(&header, &found.row)?))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::USERS, "email", email)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::USERS, &found.header, User::COLUMNS)?;
        Ok(Some(User::from_row(&header, &found.row)?))
    }

    pub async fn create_user(
        &self,
        partner_id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: UserRole,
        status: UserStatus,
    ) -> Result<User, ApiError> {
        let header = self.header(tables::USERS, User::COLUMNS).await?;
        let now = timestamp();
        let user = User {
            id: generate_id(),
            partner_id: partner_id.to_owned(),
            email: email.to_owned(),
            password_hash: String::new(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            role,
            status,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .append_row(tables::USERS, user.to_row(&header))
            .await?;
        Ok(user)
    }

    // -- admin registry --

    pub async fn admin_entries(&self) -> Result<Vec<AdminEntry>, ApiError> {
        let rows = self.store.rows(tables::ADMINS).await?;
        let mut iter = rows.iter();
        let Some(header_row) = iter.next() else {
            return Err(StoreError::Schema("table admins has no header row".into()).into());
        };
        let header = Header::parse(tables::ADMINS, header_row, AdminEntry::COLUMNS)?;
        Ok(iter.map(|row| AdminEntry::from_row(&header, row)).collect())
    }

    pub async fn find_admin_entry(
        &self,
        email: &str,
    ) -> Result<Option<(AdminEntry, u32)>, ApiError> {
        let Some(found) = self
            .store
            .find_row_by_column(tables::ADMINS, "email", email)
            .await?
        else {
            return Ok(None);
        };
        let header = Header::parse(tables::ADMINS, &found.header, AdminEntry::COLUMNS)?;
        Ok(Some((AdminEntry::from_row(&header, &found.row), found.position)))
    }

    pub async fn append_admin_entry(&self, entry: &AdminEntry) -> Result<(), ApiError> {
        let header = self.header(tables::ADMINS, AdminEntry::COLUMNS).await?;
        self.store
            .append_row(tables::ADMINS, entry.to_row(&header))
            .await?;
        Ok(())
    }

    pub async fn update_admin_entry(
        &self,
        position: u32,
        entry: &AdminEntry,
    ) -> Result<(), ApiError> {
        let header = self.header(tables::ADMINS, AdminEntry::COLUMNS).await?;
        self.store
            .update_row(tables::ADMINS, position, entry.to_row(&header))
            .await?;
        Ok(())
    }

    // -- audit log --

    pub async fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), ApiError> {
        let header = self.header(tables::AUDIT_LOG, AuditLogEntry::COLUMNS).await?;
        self.store
            .append_row(tables::AUDIT_LOG, entry.to_row(&header))
            .await?;
        Ok(())
    }

    pub async fn audit_for_deal(&self, deal_id: &str) -> Result<Vec<AuditLogEntry>, ApiError> {
        let rows = self.store.rows(tables::AUDIT_LOG).await?;
        let mut iter = rows.iter();
        let Some(header_row) = iter.next() else {
            return Err(StoreError::Schema("table audit_log has no header row".into()).into());
        };
        let header = Header::parse(tables::AUDIT_LOG, header_row, AuditLogEntry::COLUMNS)?;
        Ok(iter
            .map(|row| AuditLogEntry::from_row(&header, row))
            .filter(|entry| entry.deal_id == deal_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn header_row(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| (*c).to_owned()).collect()
    }

    fn seeded() -> Records {
        let store = MemoryStore::with_tables(vec![
            (tables::DEALS, vec![header_row(Deal::COLUMNS)]),
            (tables::CUSTOMERS, vec![header_row(Customer::COLUMNS)]),
            (tables::PARTNERS, vec![header_row(Partner::COLUMNS)]),
            (tables::USERS, vec![header_row(User::COLUMNS)]),
            (tables::ADMINS, vec![header_row(AdminEntry::COLUMNS)]),
            (tables::AUDIT_LOG, vec![header_row(AuditLogEntry::COLUMNS)]),
        ]);
        Records::new(Arc::new(store))
    }

    fn new_deal() -> Deal {
        Deal {
            id: String::new(),
            partner_id: "p1".into(),
            customer_id: "c1".into(),
            submitter_id: "u1".into(),
            status: DealStatus::Submitted,
            company_name: "Acme".into(),
            domain: "acme.com".into(),
            territory: "EMEA".into(),
            deal_value: "250000".into(),
            deal_stage: "negotiation".into(),
            expected_close_date: "2026-10-01".into(),
            contract_type: "new".into(),
            approved_by: String::new(),
            approved_at: String::new(),
            rejection_reason: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn create_deal_stamps_id_and_timestamps() {
        let records = seeded();
        let deal = records.create_deal(new_deal()).await.unwrap();
        assert!(!deal.id.is_empty());
        assert!(!deal.created_at.is_empty());
        assert_eq!(deal.created_at, deal.updated_at);

        let (found, position) = records.find_deal(&deal.id).await.unwrap().unwrap();
        assert_eq!(found.company_name, "Acme");
        assert_eq!(position, 2); // first data row after the header
    }

    #[tokio::test]
    async fn update_deal_merges_patch_fields_only() {
        let records = seeded();
        let deal = records.create_deal(new_deal()).await.unwrap();

        let updated = records
            .update_deal(
                &deal.id,
                DealPatch {
                    status: Some(DealStatus::Approved),
                    approved_by: Some("admin@x.com".into()),
                    approved_at: Some(timestamp()),
                    rejection_reason: None,
                },
                &deal.updated_at,
            )
            .await
            .unwrap();

        assert_eq!(updated.status, DealStatus::Approved);
        assert_eq!(updated.approved_by, "admin@x.com");
        // untouched fields survive the full-row rewrite
        assert_eq!(updated.company_name, "Acme");
        assert_eq!(updated.deal_value, "250000");
        assert!(updated.rejection_reason.is_empty());
    }

    #[tokio::test]
    async fn update_deal_with_stale_snapshot_conflicts() {
        let records = seeded();
        let deal = records.create_deal(new_deal()).await.unwrap();

        let err = records
            .update_deal(
                &deal.id,
                DealPatch::default(),
                "2000-01-01T00:00:00Z", // stale snapshot
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_deal_is_not_found() {
        let records = seeded();
        let err = records
            .update_deal("ghost", DealPatch::default(), "whenever")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn customer_domain_lookup_is_case_sensitive() {
        let records = seeded();
        records.create_customer("Acme", "acme.com").await.unwrap();

        assert!(records
            .find_customer_by_domain("acme.com")
            .await
            .unwrap()
            .is_some());
        // exact match by design; "ACME.COM" is a different key
        assert!(records
            .find_customer_by_domain("ACME.COM")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn audit_entries_filtered_by_deal() {
        let records = seeded();
        for (deal_id, action) in [("d1", "approved"), ("d2", "rejected"), ("d1", "rejected")] {
            records
                .append_audit(&AuditLogEntry {
                    id: generate_id(),
                    deal_id: deal_id.into(),
                    actor_email: "admin@x.com".into(),
                    action: action.into(),
                    timestamp: timestamp(),
                    note: String::new(),
                })
                .await
                .unwrap();
        }
        let for_d1 = records.audit_for_deal("d1").await.unwrap();
        assert_eq!(for_d1.len(), 2);
        assert!(for_d1.iter().all(|e| e.deal_id == "d1"));
    }
}
