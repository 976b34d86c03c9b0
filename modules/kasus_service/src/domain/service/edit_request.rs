//! Edit requests on finalized assessments

use super::{hidden_or_missing, Service, StoreResultExt};
use crate::contract::{
    Actor, EditDecision, EditRequest, EditRequestStatus, KasusError, KasusStatus, PermohonanStatus,
};
use crate::domain::events::WorkflowEvent;
use crate::domain::policy::{self, Action};
use crate::domain::repository::{StatusChange, StoreError};
use crate::domain::validation;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    /// Open a pending request to reopen a finalized assessment.
    ///
    /// At most one request per assessment may be pending; the store enforces the same rule
    /// inside its transaction.
    pub async fn request_edit(
        &self,
        actor: &Actor,
        penilaian_id: Uuid,
        alasan: Option<&str>,
    ) -> Result<EditRequest, KasusError> {
        let (_guard, _, ctx) = self.lock_penilaian(actor, Action::RequestEdit, penilaian_id).await?;

        if !ctx.kasus.status.is_finalized() {
            return Err(KasusError::invalid_transition(ctx.kasus.status, "request an edit"));
        }
        let alasan = validation::optional_text(alasan)
            .ok_or_else(|| KasusError::invalid_field("alasan", "alasan is required"))?;

        let pending = self
            .repos
            .edit_requests
            .find_pending(penilaian_id)
            .await
            .or_internal("edit_request", penilaian_id)?;
        if pending.is_some() {
            return Err(pending_exists(penilaian_id));
        }

        let request = EditRequest {
            id: Uuid::new_v4(),
            penilaian_id,
            requested_by: actor.user_id,
            alasan,
            status: EditRequestStatus::Pending,
            alasan_penolakan: None,
            processed_by: None,
            processed_at: None,
            created_at: Utc::now(),
        };
        let request = match self.repos.edit_requests.create(&request).await {
            Ok(created) => created,
            Err(StoreError::UniqueViolation(_)) => return Err(pending_exists(penilaian_id)),
            Err(e) => return Err(e).or_internal("edit_request", request.id),
        };

        tracing::info!(penilaian_id = %penilaian_id, edit_request_id = %request.id, "edit requested");
        self.publish(
            actor,
            WorkflowEvent::EditRequested {
                penilaian_id,
                edit_request_id: request.id,
            },
        )
        .await;
        Ok(request)
    }

    pub async fn list_edit_requests(&self, actor: &Actor, penilaian_id: Uuid) -> Result<Vec<EditRequest>, KasusError> {
        self.authorize_penilaian(actor, Action::ViewKasus, penilaian_id).await?;
        self.repos
            .edit_requests
            .list_for_penilaian(penilaian_id)
            .await
            .or_internal("edit_request", penilaian_id)
    }

    /// Approve or reject a pending request, exactly once.
    ///
    /// Approval puts the case back to "Menunggu Penilaian" in the same transaction, which
    /// lets the team submit the assessment again. Rejection needs a reason.
    pub async fn process_edit_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
        decision: EditDecision,
    ) -> Result<EditRequest, KasusError> {
        policy::check_role(actor, Action::ProcessEditRequest)?;
        let penilaian_id = self.find_edit_request(actor, request_id).await?.penilaian_id;
        let (_guard, _, ctx) = self
            .lock_penilaian(actor, Action::ProcessEditRequest, penilaian_id)
            .await?;
        let mut request = self.find_edit_request(actor, request_id).await?;

        if request.status != EditRequestStatus::Pending {
            return Err(already_processed(&request));
        }

        let (status, change) = match decision {
            EditDecision::Approve => {
                let mut change = StatusChange::kasus(ctx.kasus.id, KasusStatus::MenungguPenilaian);
                if let Some(permohonan) = ctx
                    .permohonan
                    .as_ref()
                    .filter(|p| p.status == PermohonanStatus::SelesaiDinilai)
                {
                    change = change.and_permohonan(permohonan.id, PermohonanStatus::MenungguPenilaian);
                }
                (EditRequestStatus::Approved, change)
            }
            EditDecision::Reject { alasan } => {
                let alasan = validation::optional_text(alasan.as_deref()).ok_or_else(|| {
                    KasusError::invalid_field("alasan_penolakan", "a rejection reason is required")
                })?;
                request.alasan_penolakan = Some(alasan);
                (EditRequestStatus::Rejected, StatusChange::none())
            }
        };
        request.status = status;
        request.processed_by = Some(actor.user_id);
        request.processed_at = Some(Utc::now());

        let request = match self.repos.edit_requests.commit_decision(&request, change).await {
            Ok(stored) => stored,
            Err(StoreError::StaleVersion) => return Err(already_processed(&request)),
            Err(e) => return Err(e).or_internal("edit_request", request_id),
        };

        let approved = request.status == EditRequestStatus::Approved;
        tracing::info!(
            edit_request_id = %request_id,
            kasus_id = %ctx.kasus.id,
            approved,
            actor = %actor.user_id,
            "edit request processed"
        );
        self.publish(
            actor,
            WorkflowEvent::EditRequestProcessed {
                penilaian_id: request.penilaian_id,
                edit_request_id: request_id,
                approved,
            },
        )
        .await;
        Ok(request)
    }
}

impl Service {
    async fn find_edit_request(&self, actor: &Actor, request_id: Uuid) -> Result<EditRequest, KasusError> {
        self.repos
            .edit_requests
            .find(request_id)
            .await
            .or_internal("edit_request", request_id)?
            .ok_or_else(|| hidden_or_missing(actor, "edit_request", request_id))
    }
}

fn pending_exists(penilaian_id: Uuid) -> KasusError {
    KasusError::conflict(format!("an edit request for penilaian {penilaian_id} is already pending"))
}

fn already_processed(request: &EditRequest) -> KasusError {
    KasusError::conflict(format!("edit request {} has already been processed", request.id))
}
