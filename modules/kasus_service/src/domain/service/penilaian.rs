//! Assessment submission and draft saves

use super::{Service, StoreResultExt};
use crate::contract::{
    Actor, KasusError, KasusStatus, Penilaian, PenilaianDraft, PenilaianSubmission, PermohonanStatus, ValidationErrors,
};
use crate::domain::events::WorkflowEvent;
use crate::domain::policy::Action;
use crate::domain::repository::StatusChange;
use crate::domain::signature;
use crate::domain::validation;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    /// Full submission.
    ///
    /// Validates every section and signer, stores only the incoming signature images, merges
    /// them into the stored set by signer, and commits the assessment together with
    /// case → "Menunggu Verifikasi" and request → "Menunggu Penilaian". Image files written
    /// for a submission that does not commit are removed again.
    pub async fn submit_penilaian(
        &self,
        actor: &Actor,
        kasus_id: Uuid,
        submission: PenilaianSubmission,
    ) -> Result<Penilaian, KasusError> {
        let _guard = self.lock(kasus_id).await;
        let ctx = self.authorize_case(actor, Action::UpdateKasus, kasus_id).await?;
        if ctx.kasus.status.is_finalized() {
            return Err(KasusError::invalid_transition(ctx.kasus.status, "submit the assessment"));
        }
        if let Some(permohonan) = ctx.permohonan.as_ref().filter(|p| p.status.is_terminal()) {
            return Err(KasusError::invalid_transition(permohonan.status, "submit the assessment"));
        }

        let existing = self
            .repos
            .kasus
            .find_penilaian(kasus_id)
            .await
            .or_internal("penilaian", kasus_id)?;
        let mut penilaian = existing.unwrap_or_else(|| Penilaian::empty(kasus_id));

        let mut errors = ValidationErrors::new();
        let valid = validation::validate_submission(&submission, &mut errors);
        let images = signature::decode_team_signatures(
            "tanda_tangan",
            &submission.tanda_tangan,
            &ctx.team_member_ids(),
            self.config.max_signature_bytes,
            &mut errors,
        );
        Self::require_signatures(submission.tanda_tangan.len(), &penilaian.tanda_tangan_tim, &mut errors);
        errors.into_result()?;

        let incoming = signature::store_batch(self.images.as_ref(), "penilaian", &images)
            .await
            .map_err(|e| {
                tracing::error!(kasus_id = %kasus_id, error = ?e, "failed to store signature images");
                KasusError::Internal
            })?;
        let written: Vec<_> = incoming.refs().cloned().collect();

        penilaian.desk_study = valid.desk_study;
        penilaian.pemeriksaan = valid.pemeriksaan;
        penilaian.pengukuran = valid.pengukuran;
        penilaian.catatan = valid.catatan;
        let replaced = penilaian.tanda_tangan_tim.merge(incoming);
        penilaian.updated_at = Utc::now();

        let mut change = StatusChange::kasus(kasus_id, KasusStatus::MenungguVerifikasi);
        if let Some(permohonan) = &ctx.permohonan {
            change = change.and_permohonan(permohonan.id, PermohonanStatus::MenungguPenilaian);
        }

        let stored = match self.repos.kasus.commit_penilaian(&penilaian, change).await {
            Ok(stored) => stored,
            Err(e) => {
                signature::discard(self.images.as_ref(), written.iter()).await;
                return Err(e).or_internal("penilaian", penilaian.id);
            }
        };
        signature::discard(self.images.as_ref(), replaced.iter()).await;

        tracing::info!(
            kasus_id = %kasus_id,
            penilaian_id = %stored.id,
            signatures = stored.tanda_tangan_tim.len(),
            voided = valid.downstream_voided,
            "assessment submitted"
        );
        self.publish(
            actor,
            WorkflowEvent::PenilaianSubmitted {
                kasus_id,
                penilaian_id: stored.id,
                signatures: stored.tanda_tangan_tim.len(),
                downstream_voided: valid.downstream_voided,
            },
        )
        .await;
        Ok(stored)
    }

    /// Partial save of desk study and notes.
    ///
    /// Inspection, measurement and signatures are left as stored; the void rule is not
    /// applied. The request moves to "Draft".
    pub async fn save_penilaian_draft(
        &self,
        actor: &Actor,
        kasus_id: Uuid,
        draft: PenilaianDraft,
    ) -> Result<Penilaian, KasusError> {
        let _guard = self.lock(kasus_id).await;
        let ctx = self.authorize_case(actor, Action::UpdateKasus, kasus_id).await?;
        if ctx.kasus.status.is_finalized() {
            return Err(KasusError::invalid_transition(ctx.kasus.status, "save a draft"));
        }
        if let Some(permohonan) = ctx.permohonan.as_ref().filter(|p| p.status.is_terminal()) {
            return Err(KasusError::invalid_transition(permohonan.status, "save a draft"));
        }

        let mut errors = ValidationErrors::new();
        let desk_study = validation::validate_draft(&draft, &mut errors);
        errors.into_result()?;

        let mut penilaian = self
            .repos
            .kasus
            .find_penilaian(kasus_id)
            .await
            .or_internal("penilaian", kasus_id)?
            .unwrap_or_else(|| Penilaian::empty(kasus_id));

        if let Some(desk_study) = desk_study {
            penilaian.desk_study = desk_study;
        }
        if draft.catatan.is_some() {
            penilaian.catatan = validation::optional_text(draft.catatan.as_deref());
        }
        penilaian.updated_at = Utc::now();

        let change = match &ctx.permohonan {
            Some(permohonan) => StatusChange::permohonan(permohonan.id, PermohonanStatus::Draft),
            None => StatusChange::none(),
        };
        let stored = self
            .repos
            .kasus
            .commit_penilaian(&penilaian, change)
            .await
            .or_internal("penilaian", penilaian.id)?;

        tracing::debug!(kasus_id = %kasus_id, penilaian_id = %stored.id, "assessment draft saved");
        self.publish(
            actor,
            WorkflowEvent::PenilaianDraftSaved {
                kasus_id,
                penilaian_id: stored.id,
            },
        )
        .await;
        Ok(stored)
    }
}
