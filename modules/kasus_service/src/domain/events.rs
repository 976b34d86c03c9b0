//! Domain events for the case workflow
//!
//! Every committed transition produces one audit event. Publishing happens after the store
//! transaction succeeded; a publisher failure is logged and never undoes the transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    KasusInitiated {
        kasus_id: Uuid,
        nomor_permohonan: String,
        created: bool,
    },
    PenilaianDraftSaved {
        kasus_id: Uuid,
        penilaian_id: Uuid,
    },
    PenilaianSubmitted {
        kasus_id: Uuid,
        penilaian_id: Uuid,
        signatures: usize,
        downstream_voided: bool,
    },
    KasusVerified {
        kasus_id: Uuid,
        hasil: String,
    },
    KasusStatusChanged {
        kasus_id: Uuid,
        from: String,
        to: String,
    },
    SurveiRecorded {
        kasus_id: Uuid,
        survei_id: Uuid,
    },
    NonCompletionRecorded {
        permohonan_id: Uuid,
        berita_acara_id: Uuid,
    },
    DokumenSaved {
        penilaian_id: Uuid,
        dokumen: String,
        dokumen_id: Uuid,
    },
    EditRequested {
        penilaian_id: Uuid,
        edit_request_id: Uuid,
    },
    EditRequestProcessed {
        penilaian_id: Uuid,
        edit_request_id: Uuid,
        approved: bool,
    },
}

/// Event with who did it and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WorkflowEvent,
}

impl AuditRecord {
    pub fn new(actor_id: Uuid, event: WorkflowEvent) -> Self {
        Self {
            actor_id,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Event publisher trait for publishing domain events
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an audit record
    async fn publish_audit(&self, record: AuditRecord) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish_audit(&self, _record: AuditRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes audit records to the `kasus::audit` tracing target as JSON
pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish_audit(&self, record: AuditRecord) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&record)?;
        tracing::info!(target: "kasus::audit", actor = %record.actor_id, %payload, "workflow event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_serializes_flat_with_event_type() {
        let kasus_id = Uuid::new_v4();
        let record = AuditRecord::new(
            Uuid::new_v4(),
            WorkflowEvent::KasusVerified {
                kasus_id,
                hasil: "Patuh".to_string(),
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event_type"], "kasus_verified");
        assert_eq!(json["hasil"], "Patuh");
        assert_eq!(json["kasus_id"], kasus_id.to_string());
        assert!(json.get("actor_id").is_some());
    }

    #[tokio::test]
    async fn test_publishers_accept_events() {
        let record = AuditRecord::new(
            Uuid::new_v4(),
            WorkflowEvent::EditRequested {
                penilaian_id: Uuid::new_v4(),
                edit_request_id: Uuid::new_v4(),
            },
        );

        assert!(NoOpEventPublisher.publish_audit(record.clone()).await.is_ok());
        assert!(TracingEventPublisher.publish_audit(record).await.is_ok());
    }
}
