use serde::Serialize;

use crate::records::{DealStatus, Records};

/// One existing deal that collides with a submission candidate.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateDeal {
    pub id: String,
    pub company_name: String,
    pub domain: String,
    pub status: DealStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCheck {
    pub has_duplicates: bool,
    pub duplicates: Vec<DuplicateDeal>,
}

impl DuplicateCheck {
    fn none() -> Self {
        Self {
            has_duplicates: false,
            duplicates: Vec::new(),
        }
    }
}

/// Scan existing deals for case-insensitive collisions on company name OR
/// domain. Terminally-rejected deals do not count: their registrations are
/// free to be resubmitted.
///
/// Advisory and fail-open: a store read failure reports no duplicates (with
/// a warning) instead of blocking submission. Callers must not rely on this
/// check for correctness, only as a signal.
pub async fn check(records: &Records, company_name: &str, domain: &str) -> DuplicateCheck {
    let deals = match records.deals().await {
        Ok(deals) => deals,
        Err(e) => {
            tracing::warn!(error = %e, "duplicate check skipped: deal scan failed");
            return DuplicateCheck::none();
        }
    };

    let company = company_name.to_lowercase();
    let domain = domain.to_lowercase();

    let duplicates: Vec<DuplicateDeal> = deals
        .into_iter()
        .filter(|deal| deal.status != DealStatus::Rejected)
        .filter(|deal| {
            deal.company_name.to_lowercase() == company || deal.domain.to_lowercase() == domain
        })
        .map(|deal| DuplicateDeal {
            id: deal.id,
            company_name: deal.company_name,
            domain: deal.domain,
            status: deal.status,
            created_at: deal.created_at,
        })
        .collect();

    DuplicateCheck {
        has_duplicates: !duplicates.is_empty(),
        duplicates,
    }
}
