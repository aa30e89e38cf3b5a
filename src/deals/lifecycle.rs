use serde::{Deserialize, Serialize};

use crate::audit::{DealAudit, write_audit};
use crate::deals::duplicate;
use crate::error::ApiError;
use crate::records::{AuditAction, Deal, DealPatch, DealStatus, Records, User};
use crate::store::timestamp;
use crate::validation;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitDeal {
    pub company_name: String,
    pub domain: String,
    pub partner_company: String,
    pub submitter_name: String,
    pub submitter_email: String,
    #[serde(default)]
    pub territory: String,
    #[serde(default)]
    pub deal_value: String,
    #[serde(default)]
    pub deal_stage: String,
    #[serde(default)]
    pub expected_close_date: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub agreed_to_terms: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmittedDeal {
    pub deal_id: String,
    pub status: DealStatus,
    pub estimated_approval_time: &'static str,
}

#[derive(Debug)]
pub struct DealFilter {
    pub status: Option<DealStatus>,
    pub partner_company: Option<String>,
    pub limit: usize,
}

impl Default for DealFilter {
    fn default() -> Self {
        Self {
            status: None,
            partner_company: None,
            limit: 50,
        }
    }
}

/// Advisory approval-time band, derived from deal value. Non-numeric values
/// fall into the lowest band.
pub fn estimated_approval_time(deal_value: &str) -> &'static str {
    let value: f64 = deal_value.trim().replace(',', "").parse().unwrap_or(0.0);
    if value >= 500_000.0 {
        "3-5 business days"
    } else if value >= 100_000.0 {
        "2-3 business days"
    } else {
        "1-2 business days"
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Register a new deal for the submitting user.
///
/// Duplicate detection runs before anything is written: a collision refuses
/// the whole submission and the caller gets the duplicate set back. The
/// customer is resolved by domain (find-before-create) so repeat submissions
/// for the same domain share one customer record.
#[tracing::instrument(skip(records, submitter, input), fields(domain = %input.domain), err)]
pub async fn submit(
    records: &Records,
    submitter: &User,
    input: &SubmitDeal,
) -> Result<SubmittedDeal, ApiError> {
    validation::check_required("company_name", &input.company_name)?;
    validation::check_required("domain", &input.domain)?;
    validation::check_required("partner_company", &input.partner_company)?;
    validation::check_required("submitter_name", &input.submitter_name)?;
    validation::check_email("submitter_email", &input.submitter_email)?;
    validation::check_terms_agreed(input.agreed_to_terms)?;

    let dup = duplicate::check(records, &input.company_name, &input.domain).await;
    if dup.has_duplicates {
        return Err(ApiError::DuplicateConflict(dup.duplicates));
    }

    let customer = match records.find_customer_by_domain(&input.domain).await? {
        Some(existing) => existing,
        None => {
            records
                .create_customer(&input.company_name, &input.domain)
                .await?
        }
    };

    let deal = records
        .create_deal(Deal {
            id: String::new(),
            partner_id: submitter.partner_id.clone(),
            customer_id: customer.id,
            submitter_id: submitter.id.clone(),
            status: DealStatus::Submitted,
            company_name: input.company_name.clone(),
            domain: input.domain.clone(),
            territory: input.territory.clone(),
            deal_value: input.deal_value.clone(),
            deal_stage: input.deal_stage.clone(),
            expected_close_date: input.expected_close_date.clone(),
            contract_type: input.contract_type.clone(),
            approved_by: String::new(),
            approved_at: String::new(),
            rejection_reason: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        })
        .await?;

    tracing::info!(deal_id = %deal.id, company = %deal.company_name, "deal registered");

    Ok(SubmittedDeal {
        deal_id: deal.id,
        status: DealStatus::Submitted,
        estimated_approval_time: estimated_approval_time(&input.deal_value),
    })
}

/// Approve a submitted deal. One-way and single-shot: anything but
/// `submitted` refuses the transition.
#[tracing::instrument(skip(records), err)]
pub async fn approve(records: &Records, actor_email: &str, deal_id: &str) -> Result<Deal, ApiError> {
    let (deal, _) = records
        .find_deal(deal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deal {deal_id} not found")))?;

    if deal.status.is_terminal() {
        return Err(ApiError::InvalidTransition(format!(
            "deal {deal_id} is already {}",
            deal.status
        )));
    }

    let updated = records
        .update_deal(
            deal_id,
            DealPatch {
                status: Some(DealStatus::Approved),
                approved_by: Some(actor_email.to_owned()),
                approved_at: Some(timestamp()),
                rejection_reason: None,
            },
            &deal.updated_at,
        )
        .await?;

    write_audit(
        records,
        &DealAudit {
            deal_id,
            actor_email,
            action: AuditAction::Approved,
            note: "",
        },
    )
    .await;

    tracing::info!(deal_id, approved_by = actor_email, "deal approved");
    Ok(updated)
}

/// Reject a submitted deal. The reason is mandatory and lands on the row;
/// `approved_by`/`approved_at` record who rejected it and when.
#[tracing::instrument(skip(records, reason), err)]
pub async fn reject(
    records: &Records,
    actor_email: &str,
    deal_id: &str,
    reason: &str,
) -> Result<Deal, ApiError> {
    if reason.trim().is_empty() {
        return Err(ApiError::Validation("rejection reason is required".into()));
    }

    let (deal, _) = records
        .find_deal(deal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deal {deal_id} not found")))?;

    if deal.status.is_terminal() {
        return Err(ApiError::InvalidTransition(format!(
            "deal {deal_id} is already {}",
            deal.status
        )));
    }

    let updated = records
        .update_deal(
            deal_id,
            DealPatch {
                status: Some(DealStatus::Rejected),
                approved_by: Some(actor_email.to_owned()),
                approved_at: Some(timestamp()),
                rejection_reason: Some(reason.trim().to_owned()),
            },
            &deal.updated_at,
        )
        .await?;

    write_audit(
        records,
        &DealAudit {
            deal_id,
            actor_email,
            action: AuditAction::Rejected,
            note: reason.trim(),
        },
    )
    .await;

    tracing::info!(deal_id, rejected_by = actor_email, "deal rejected");
    Ok(updated)
}

/// List deals, newest first, optionally filtered by status and by the
/// registering partner's company name (exact match through the partner
/// record).
pub async fn list(records: &Records, filter: &DealFilter) -> Result<Vec<Deal>, ApiError> {
    let partner_id = match &filter.partner_company {
        Some(company) => match records.find_partner_by_company(company).await? {
            Some(partner) => Some(partner.id),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let mut deals: Vec<Deal> = records
        .deals()
        .await?
        .into_iter()
        .filter(|deal| filter.status.is_none_or(|s| deal.status == s))
        .filter(|deal| {
            partner_id
                .as_deref()
                .is_none_or(|pid| deal.partner_id == pid)
        })
        .collect();

    // created_at is RFC 3339 UTC, so lexicographic order is chronological
    deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    deals.truncate(filter.limit);
    Ok(deals)
}
