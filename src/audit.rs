use crate::records::{AuditAction, AuditLogEntry, Records};
use crate::store::{generate_id, timestamp};

pub struct DealAudit<'a> {
    pub deal_id: &'a str,
    pub actor_email: &'a str,
    pub action: AuditAction,
    pub note: &'a str,
}

/// Append one audit-trail row for a terminal deal transition. Best-effort:
/// the transition has already been written by the time this runs, so a
/// failed append is logged rather than surfaced.
pub async fn write_audit(records: &Records, entry: &DealAudit<'_>) {
    let row = AuditLogEntry {
        id: generate_id(),
        deal_id: entry.deal_id.to_owned(),
        actor_email: entry.actor_email.to_owned(),
        action: entry.action.as_str().to_owned(),
        timestamp: timestamp(),
        note: entry.note.to_owned(),
    };
    if let Err(e) = records.append_audit(&row).await {
        tracing::warn!(
            error = %e,
            deal_id = entry.deal_id,
            action = %entry.action,
            "failed to write audit log entry"
        );
    }
}
