//! Minutes and analysis documents
//!
//! Each document exists at most once per owning record: saving again updates it in place and
//! merges the incoming signatures into the stored set.

use super::{hidden_or_missing, CaseContext, Service, StoreResultExt};
use crate::contract::{
    Actor, BaHasilPenilaian, BaHasilPenilaianInput, BaPemeriksaan, BaPemeriksaanInput, BeritaAcara, BeritaAcaraInput,
    FormulirAnalisisInput, FormulirAnalisisPenilaian, KasusError, PermohonanStatus, SignatureInput, SignatureRef,
    SignatureSet, Team, ValidationErrors,
};
use crate::domain::events::WorkflowEvent;
use crate::domain::policy::{self, Action, CaseAccess};
use crate::domain::repository::{StatusChange, StoreError};
use crate::domain::signature::{self, SignatureImage};
use crate::domain::validation;
use chrono::Utc;
use uuid::Uuid;

/// Incoming signatures already written to the image store
struct StagedSignatures {
    incoming: SignatureSet,
    written: Vec<SignatureRef>,
}

impl Service {
    async fn stage_signatures(
        &self,
        category: &str,
        images: &[(Uuid, SignatureImage)],
        owner: Uuid,
    ) -> Result<StagedSignatures, KasusError> {
        let incoming = signature::store_batch(self.images.as_ref(), category, images)
            .await
            .map_err(|e| {
                tracing::error!(owner = %owner, category, error = ?e, "failed to store signature images");
                KasusError::Internal
            })?;
        let written = incoming.refs().cloned().collect();
        Ok(StagedSignatures { incoming, written })
    }

    fn decode_signatures(
        &self,
        inputs: &[SignatureInput],
        ctx_members: &[Uuid],
        errors: &mut ValidationErrors,
    ) -> Vec<(Uuid, SignatureImage)> {
        signature::decode_team_signatures(
            "tanda_tangan",
            inputs,
            ctx_members,
            self.config.max_signature_bytes,
            errors,
        )
    }

    // ===== Non-completion minutes =====

    /// Record that the assessment of a request could not take place.
    ///
    /// The request is gated like a case: coordinator or team member. It ends in
    /// "Penilaian Tidak Terlaksana" and is linked to the minutes.
    pub async fn record_non_completion(&self, actor: &Actor, input: BeritaAcaraInput) -> Result<BeritaAcara, KasusError> {
        policy::check_role(actor, Action::RecordNonCompletion)?;

        let mut errors = ValidationErrors::new();
        let valid = validation::validate_berita_acara(&input, &mut errors);
        let Some(permohonan_id) = input.permohonan_id else {
            return Err(KasusError::Validation { errors });
        };

        let _guard = self.lock(permohonan_id).await;
        let nomor = self.find_permohonan(permohonan_id).await?.nomor_permohonan;
        // Submissions on the request's case write the same request row; lock order is request, then case
        let _case_guard = match self.repos.kasus.find_by_nomor(&nomor).await.or_internal("kasus", &nomor)? {
            Some(kasus) => Some(self.lock(kasus.id).await),
            None => None,
        };

        let permohonan = self.find_permohonan(permohonan_id).await?;
        let team: Option<Team> = match permohonan.tim_id {
            Some(tim_id) => self.repos.directory.find_team(tim_id).await.or_internal("tim", tim_id)?,
            None => None,
        };
        let kasus = self.repos.kasus.find_by_nomor(&nomor).await.or_internal("kasus", &nomor)?;
        let members = team.as_ref().map(Team::member_ids).unwrap_or_default();
        let access = CaseAccess {
            kasus_status: kasus.as_ref().map(|k| k.status),
            permohonan_status: Some(permohonan.status),
            penanggung_jawab_id: permohonan.penanggung_jawab_id,
            team_member_ids: members.clone(),
        };
        policy::authorize(actor, Action::RecordNonCompletion, &access)?;

        if permohonan.status == PermohonanStatus::SelesaiDinilai {
            return Err(KasusError::invalid_transition(permohonan.status, "record non-completion"));
        }

        if let Some(pemegang_id) = input.pemegang_id {
            if self.repos.pemegang.find(pemegang_id).await.or_internal("pemegang", pemegang_id)?.is_none() {
                errors.add("pemegang_id", "unknown pemegang");
            }
        }
        if let Some(user_id) = input.penanggung_jawab_id {
            if self.repos.directory.find_user(user_id).await.or_internal("user", user_id)?.is_none() {
                errors.add("penanggung_jawab_id", "unknown user");
            }
        }
        let images = self.decode_signatures(&input.tanda_tangan, &members, &mut errors);
        errors.into_result()?;
        let Some(valid) = valid else {
            return Err(KasusError::Internal);
        };

        let existing = self
            .repos
            .dokumen
            .find_berita_acara_by_permohonan(permohonan_id)
            .await
            .or_internal("berita_acara", permohonan_id)?;

        let staged = self.stage_signatures("berita_acara", &images, permohonan_id).await?;
        let mut berita_acara = existing.unwrap_or_else(|| BeritaAcara {
            id: Uuid::new_v4(),
            permohonan_id,
            pemegang_id: valid.pemegang_id,
            penanggung_jawab_id: valid.penanggung_jawab_id,
            tanggal: valid.tanggal,
            alasan: valid.alasan.clone(),
            tanda_tangan_tim: SignatureSet::new(),
            created_at: Utc::now(),
        });
        berita_acara.pemegang_id = valid.pemegang_id;
        berita_acara.penanggung_jawab_id = valid.penanggung_jawab_id;
        berita_acara.tanggal = valid.tanggal;
        berita_acara.alasan = valid.alasan;
        let replaced = berita_acara.tanda_tangan_tim.merge(staged.incoming);

        let change = StatusChange::permohonan(permohonan_id, PermohonanStatus::PenilaianTidakTerlaksana);
        let stored = match self.repos.dokumen.commit_berita_acara(&berita_acara, change).await {
            Ok(stored) => stored,
            Err(e) => {
                signature::discard(self.images.as_ref(), staged.written.iter()).await;
                return Err(e).or_internal("berita_acara", berita_acara.id);
            }
        };
        signature::discard(self.images.as_ref(), replaced.iter()).await;

        tracing::info!(
            permohonan_id = %permohonan_id,
            berita_acara_id = %stored.id,
            alasan = stored.alasan.label(),
            "non-completion recorded"
        );
        self.publish(
            actor,
            WorkflowEvent::NonCompletionRecorded {
                permohonan_id,
                berita_acara_id: stored.id,
            },
        )
        .await;
        Ok(stored)
    }

    /// Non-completion minutes; visible to whoever may view the request's case
    pub async fn get_berita_acara(&self, actor: &Actor, id: Uuid) -> Result<BeritaAcara, KasusError> {
        policy::check_role(actor, Action::RecordNonCompletion)?;
        let berita_acara = self
            .repos
            .dokumen
            .find_berita_acara(id)
            .await
            .or_internal("berita_acara", id)?
            .ok_or_else(|| hidden_or_missing(actor, "berita_acara", id))?;

        let permohonan = self.find_permohonan(berita_acara.permohonan_id).await?;
        let team = match permohonan.tim_id {
            Some(tim_id) => self.repos.directory.find_team(tim_id).await.or_internal("tim", tim_id)?,
            None => None,
        };
        let access = CaseAccess {
            kasus_status: None,
            permohonan_status: Some(permohonan.status),
            penanggung_jawab_id: permohonan.penanggung_jawab_id,
            team_member_ids: team.as_ref().map(Team::member_ids).unwrap_or_default(),
        };
        policy::authorize(actor, Action::ViewKasus, &access)?;
        Ok(berita_acara)
    }

    // ===== Examination minutes =====

    /// Upsert by assessment. `nomor_ba` must not be held by another assessment's minutes;
    /// keeping the current number on update is fine.
    pub async fn save_ba_pemeriksaan(&self, actor: &Actor, input: BaPemeriksaanInput) -> Result<BaPemeriksaan, KasusError> {
        policy::check_role(actor, Action::UpdateKasus)?;
        let mut errors = ValidationErrors::new();
        let valid = validation::validate_ba_pemeriksaan(&input, &mut errors);
        let Some(penilaian_id) = input.penilaian_id else {
            return Err(KasusError::Validation { errors });
        };

        let (_guard, _, ctx) = self.lock_penilaian(actor, Action::UpdateKasus, penilaian_id).await?;
        let images = self.decode_signatures(&input.tanda_tangan, &ctx.team_member_ids(), &mut errors);

        let existing = self
            .repos
            .dokumen
            .find_ba_pemeriksaan(penilaian_id)
            .await
            .or_internal("ba_pemeriksaan", penilaian_id)?;
        let stored_signatures = existing.as_ref().map(|ba| ba.tanda_tangan_tim.clone()).unwrap_or_default();
        Self::require_signatures(input.tanda_tangan.len(), &stored_signatures, &mut errors);
        errors.into_result()?;
        let Some(valid) = valid else {
            return Err(KasusError::Internal);
        };

        if let Some(holder) = self
            .repos
            .dokumen
            .find_ba_pemeriksaan_by_nomor(&valid.nomor_ba)
            .await
            .or_internal("ba_pemeriksaan", &valid.nomor_ba)?
        {
            if holder.penilaian_id != penilaian_id {
                return Err(duplicate_nomor_ba(&valid.nomor_ba));
            }
        }

        let staged = self.stage_signatures("ba_pemeriksaan", &images, penilaian_id).await?;
        let now = Utc::now();
        let mut ba = existing.unwrap_or_else(|| BaPemeriksaan {
            id: Uuid::new_v4(),
            penilaian_id,
            nomor_ba: String::new(),
            nomor_surat_tugas: String::new(),
            tanggal_surat_tugas: valid.tanggal_surat_tugas,
            nomor_identifikasi: None,
            tanda_tangan_tim: SignatureSet::new(),
            created_at: now,
            updated_at: now,
        });
        ba.nomor_ba = valid.nomor_ba;
        ba.nomor_surat_tugas = valid.nomor_surat_tugas;
        ba.tanggal_surat_tugas = valid.tanggal_surat_tugas;
        ba.nomor_identifikasi = valid.nomor_identifikasi;
        ba.updated_at = now;
        let replaced = ba.tanda_tangan_tim.merge(staged.incoming);

        let stored = match self.repos.dokumen.save_ba_pemeriksaan(&ba).await {
            Ok(stored) => stored,
            // Lost a race with another save of the same number
            Err(StoreError::UniqueViolation(_)) => {
                signature::discard(self.images.as_ref(), staged.written.iter()).await;
                return Err(duplicate_nomor_ba(&ba.nomor_ba));
            }
            Err(e) => {
                signature::discard(self.images.as_ref(), staged.written.iter()).await;
                return Err(e).or_internal("ba_pemeriksaan", ba.id);
            }
        };
        signature::discard(self.images.as_ref(), replaced.iter()).await;
        self.document_saved(actor, &ctx, penilaian_id, "ba_pemeriksaan", stored.id).await;
        Ok(stored)
    }

    pub async fn get_ba_pemeriksaan(&self, actor: &Actor, penilaian_id: Uuid) -> Result<BaPemeriksaan, KasusError> {
        self.authorize_penilaian(actor, Action::ViewKasus, penilaian_id).await?;
        self.repos
            .dokumen
            .find_ba_pemeriksaan(penilaian_id)
            .await
            .or_internal("ba_pemeriksaan", penilaian_id)?
            .ok_or_else(|| KasusError::not_found("ba_pemeriksaan", penilaian_id))
    }

    // ===== Result minutes =====

    pub async fn save_ba_hasil(&self, actor: &Actor, input: BaHasilPenilaianInput) -> Result<BaHasilPenilaian, KasusError> {
        policy::check_role(actor, Action::UpdateKasus)?;
        let mut errors = ValidationErrors::new();
        let valid = validation::validate_ba_hasil(&input, &mut errors);
        let Some(penilaian_id) = input.penilaian_id else {
            return Err(KasusError::Validation { errors });
        };

        let (_guard, _, ctx) = self.lock_penilaian(actor, Action::UpdateKasus, penilaian_id).await?;
        let images = self.decode_signatures(&input.tanda_tangan, &ctx.team_member_ids(), &mut errors);

        let existing = self
            .repos
            .dokumen
            .find_ba_hasil(penilaian_id)
            .await
            .or_internal("ba_hasil_penilaian", penilaian_id)?;
        let stored_signatures = existing.as_ref().map(|ba| ba.tanda_tangan_tim.clone()).unwrap_or_default();
        Self::require_signatures(input.tanda_tangan.len(), &stored_signatures, &mut errors);
        errors.into_result()?;
        let Some(valid) = valid else {
            return Err(KasusError::Internal);
        };

        let staged = self.stage_signatures("ba_hasil_penilaian", &images, penilaian_id).await?;
        let now = Utc::now();
        let mut ba = existing.unwrap_or_else(|| BaHasilPenilaian {
            id: Uuid::new_v4(),
            penilaian_id,
            nomor_ba: String::new(),
            tanggal: valid.tanggal,
            hasil: valid.hasil,
            kesimpulan: String::new(),
            tanda_tangan_tim: SignatureSet::new(),
            created_at: now,
            updated_at: now,
        });
        ba.nomor_ba = valid.nomor_ba;
        ba.tanggal = valid.tanggal;
        ba.hasil = valid.hasil;
        ba.kesimpulan = valid.kesimpulan;
        ba.updated_at = now;
        let replaced = ba.tanda_tangan_tim.merge(staged.incoming);

        let stored = match self.repos.dokumen.save_ba_hasil(&ba).await {
            Ok(stored) => stored,
            Err(e) => {
                signature::discard(self.images.as_ref(), staged.written.iter()).await;
                return Err(e).or_internal("ba_hasil_penilaian", ba.id);
            }
        };
        signature::discard(self.images.as_ref(), replaced.iter()).await;
        self.document_saved(actor, &ctx, penilaian_id, "ba_hasil_penilaian", stored.id).await;
        Ok(stored)
    }

    pub async fn get_ba_hasil(&self, actor: &Actor, penilaian_id: Uuid) -> Result<BaHasilPenilaian, KasusError> {
        self.authorize_penilaian(actor, Action::ViewKasus, penilaian_id).await?;
        self.repos
            .dokumen
            .find_ba_hasil(penilaian_id)
            .await
            .or_internal("ba_hasil_penilaian", penilaian_id)?
            .ok_or_else(|| KasusError::not_found("ba_hasil_penilaian", penilaian_id))
    }

    // ===== Analysis form =====

    pub async fn save_formulir(
        &self,
        actor: &Actor,
        input: FormulirAnalisisInput,
    ) -> Result<FormulirAnalisisPenilaian, KasusError> {
        policy::check_role(actor, Action::UpdateKasus)?;
        let mut errors = ValidationErrors::new();
        let valid = validation::validate_formulir(&input, &mut errors);
        let Some(penilaian_id) = input.penilaian_id else {
            return Err(KasusError::Validation { errors });
        };

        let (_guard, _, ctx) = self.lock_penilaian(actor, Action::UpdateKasus, penilaian_id).await?;
        let images = self.decode_signatures(&input.tanda_tangan, &ctx.team_member_ids(), &mut errors);

        let existing = self
            .repos
            .dokumen
            .find_formulir(penilaian_id)
            .await
            .or_internal("formulir_analisis_penilaian", penilaian_id)?;
        let stored_signatures = existing.as_ref().map(|f| f.tanda_tangan_tim.clone()).unwrap_or_default();
        Self::require_signatures(input.tanda_tangan.len(), &stored_signatures, &mut errors);
        errors.into_result()?;
        let Some(valid) = valid else {
            return Err(KasusError::Internal);
        };

        let staged = self.stage_signatures("formulir_analisis", &images, penilaian_id).await?;
        let now = Utc::now();
        let mut form = existing.unwrap_or_else(|| FormulirAnalisisPenilaian {
            id: Uuid::new_v4(),
            penilaian_id,
            analisis_desk_study: String::new(),
            analisis_pemeriksaan: None,
            analisis_pengukuran: None,
            kesimpulan: valid.kesimpulan,
            rekomendasi: None,
            tanda_tangan_tim: SignatureSet::new(),
            created_at: now,
            updated_at: now,
        });
        form.analisis_desk_study = valid.analisis_desk_study;
        form.analisis_pemeriksaan = valid.analisis_pemeriksaan;
        form.analisis_pengukuran = valid.analisis_pengukuran;
        form.kesimpulan = valid.kesimpulan;
        form.rekomendasi = valid.rekomendasi;
        form.updated_at = now;
        let replaced = form.tanda_tangan_tim.merge(staged.incoming);

        let stored = match self.repos.dokumen.save_formulir(&form).await {
            Ok(stored) => stored,
            Err(e) => {
                signature::discard(self.images.as_ref(), staged.written.iter()).await;
                return Err(e).or_internal("formulir_analisis_penilaian", form.id);
            }
        };
        signature::discard(self.images.as_ref(), replaced.iter()).await;
        self.document_saved(actor, &ctx, penilaian_id, "formulir_analisis_penilaian", stored.id)
            .await;
        Ok(stored)
    }

    pub async fn get_formulir(&self, actor: &Actor, penilaian_id: Uuid) -> Result<FormulirAnalisisPenilaian, KasusError> {
        self.authorize_penilaian(actor, Action::ViewKasus, penilaian_id).await?;
        self.repos
            .dokumen
            .find_formulir(penilaian_id)
            .await
            .or_internal("formulir_analisis_penilaian", penilaian_id)?
            .ok_or_else(|| KasusError::not_found("formulir_analisis_penilaian", penilaian_id))
    }

    async fn document_saved(&self, actor: &Actor, ctx: &CaseContext, penilaian_id: Uuid, dokumen: &str, dokumen_id: Uuid) {
        tracing::info!(kasus_id = %ctx.kasus.id, penilaian_id = %penilaian_id, dokumen, "document saved");
        self.publish(
            actor,
            WorkflowEvent::DokumenSaved {
                penilaian_id,
                dokumen: dokumen.to_string(),
                dokumen_id,
            },
        )
        .await;
    }
}

fn duplicate_nomor_ba(nomor_ba: &str) -> KasusError {
    KasusError::conflict(format!("nomor_ba '{nomor_ba}' is already used by another examination record"))
}
