//! Cases: listing, detail, verification, manual transitions and field surveys

use super::{Service, StoreResultExt};
use crate::contract::{
    Actor, HasilVerifikasi, Kasus, KasusDetail, KasusError, KasusStatus, KasusType, KasusUpdate, Page,
    PermohonanStatus, SignatureRef, Survei, SurveiInput, ValidationErrors,
};
use crate::domain::events::WorkflowEvent;
use crate::domain::policy::{self, Action};
use crate::domain::repository::StatusChange;
use crate::domain::signature::{self, SignatureImage};
use crate::domain::validation;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    /// Cases the actor may view, one page at a time
    pub async fn list_kasus(&self, actor: &Actor, page: Option<u64>) -> Result<Page<Kasus>, KasusError> {
        policy::check_role(actor, Action::ViewKasus)?;
        let all = self.repos.kasus.list_all().await.or_internal("kasus", "*")?;

        let mut visible = Vec::with_capacity(all.len());
        for kasus in all {
            let (ctx, access) = self.resolve_case(kasus).await?;
            if policy::allows(actor, Action::ViewKasus, &access) {
                visible.push(ctx.kasus);
            }
        }
        Ok(self.paginate(visible, page))
    }

    /// Case with holder, request, assessment, team roster and coordinator
    pub async fn get_kasus_detail(&self, actor: &Actor, kasus_id: Uuid) -> Result<KasusDetail, KasusError> {
        let ctx = self.authorize_case(actor, Action::ViewKasus, kasus_id).await?;

        let pemegang = self
            .repos
            .pemegang
            .find(ctx.kasus.pemegang_id)
            .await
            .or_internal("pemegang", ctx.kasus.pemegang_id)?;
        let penilaian = self
            .repos
            .kasus
            .find_penilaian(kasus_id)
            .await
            .or_internal("penilaian", kasus_id)?;
        let tim = match ctx.team.clone() {
            Some(team) => Some(self.roster(team).await?),
            None => None,
        };
        let koordinator = match ctx.permohonan.as_ref().and_then(|p| p.penanggung_jawab_id) {
            Some(id) => self.repos.directory.find_user(id).await.or_internal("user", id)?,
            None => None,
        };

        Ok(KasusDetail {
            kasus: ctx.kasus,
            pemegang,
            permohonan: ctx.permohonan,
            penilaian,
            tim,
            koordinator,
        })
    }

    pub async fn update_kasus(&self, actor: &Actor, kasus_id: Uuid, update: KasusUpdate) -> Result<Kasus, KasusError> {
        let _guard = self.lock(kasus_id).await;
        let mut kasus = self.authorize_case(actor, Action::UpdateKasus, kasus_id).await?.kasus;

        let mut errors = ValidationErrors::new();
        let jenis = match update.jenis.as_deref() {
            Some(label) => validation::required_label::<KasusType>("jenis", Some(label), &mut errors),
            None => Some(kasus.jenis),
        };
        let skor = match update.skor_prioritas {
            Some(_) => validation::priority("skor_prioritas", update.skor_prioritas, &mut errors),
            None => Some(kasus.skor_prioritas),
        };
        errors.into_result()?;

        if let (Some(jenis), Some(skor)) = (jenis, skor) {
            kasus.jenis = jenis;
            kasus.skor_prioritas = skor;
        }
        kasus.updated_at = Utc::now();
        self.repos.kasus.update(&kasus).await.or_internal("kasus", kasus_id)
    }

    /// Delete a case and everything hanging off it, then its image files
    pub async fn delete_kasus(&self, actor: &Actor, kasus_id: Uuid) -> Result<(), KasusError> {
        let _guard = self.lock(kasus_id).await;
        self.authorize_case(actor, Action::DeleteKasus, kasus_id).await?;

        let mut files: Vec<SignatureRef> = Vec::new();
        if let Some(penilaian) = self
            .repos
            .kasus
            .find_penilaian(kasus_id)
            .await
            .or_internal("penilaian", kasus_id)?
        {
            files.extend(penilaian.tanda_tangan_tim.refs().cloned());
        }
        for survei in self.repos.kasus.list_survei(kasus_id).await.or_internal("survei", kasus_id)? {
            files.extend(survei.foto_dokumentasi);
            files.push(survei.tanda_tangan_petugas);
            files.push(survei.tanda_tangan_perwakilan);
        }

        self.repos.kasus.delete(kasus_id).await.or_internal("kasus", kasus_id)?;
        signature::discard(self.images.as_ref(), files.iter()).await;

        tracing::info!(kasus_id = %kasus_id, actor = %actor.user_id, "case deleted");
        Ok(())
    }

    /// Record the verification outcome.
    ///
    /// Only allowed from "Survei Selesai" or "Menunggu Penilaian".
    pub async fn verify_kasus(&self, actor: &Actor, kasus_id: Uuid, hasil: Option<&str>) -> Result<Kasus, KasusError> {
        policy::check_role(actor, Action::VerifikasiKasus)?;
        let mut errors = ValidationErrors::new();
        let hasil: Option<HasilVerifikasi> = validation::required_label("hasil", hasil, &mut errors);

        let _guard = self.lock(kasus_id).await;
        let mut kasus = self.authorize_case(actor, Action::VerifikasiKasus, kasus_id).await?.kasus;
        errors.into_result()?;
        let Some(hasil) = hasil else {
            return Err(KasusError::invalid_field("hasil", "hasil is required"));
        };

        if !kasus.status.can_verify() {
            return Err(KasusError::invalid_transition(kasus.status, "verify"));
        }

        let target = KasusStatus::from(hasil);
        self.repos
            .kasus
            .apply_status(StatusChange::kasus(kasus_id, target))
            .await
            .or_internal("kasus", kasus_id)?;
        kasus.status = target;

        tracing::info!(kasus_id = %kasus_id, hasil = %hasil, actor = %actor.user_id, "case verified");
        self.publish(
            actor,
            WorkflowEvent::KasusVerified {
                kasus_id,
                hasil: hasil.to_string(),
            },
        )
        .await;
        Ok(kasus)
    }

    /// Coordinator-driven transition along the closing part of the workflow
    pub async fn change_kasus_status(
        &self,
        actor: &Actor,
        kasus_id: Uuid,
        target: Option<&str>,
    ) -> Result<Kasus, KasusError> {
        policy::check_role(actor, Action::ChangeKasusStatus)?;
        let mut errors = ValidationErrors::new();
        let target: Option<KasusStatus> = validation::required_label("status", target, &mut errors);

        let _guard = self.lock(kasus_id).await;
        let ctx = self.authorize_case(actor, Action::ChangeKasusStatus, kasus_id).await?;
        errors.into_result()?;
        let Some(target) = target else {
            return Err(KasusError::invalid_field("status", "status is required"));
        };

        let mut kasus = ctx.kasus;
        if !kasus.status.manual_transitions().contains(&target) {
            return Err(KasusError::invalid_transition(
                kasus.status,
                &format!("move to '{target}'"),
            ));
        }

        // The finalized sentinel is mirrored onto the request unless it was never assessed
        let mut change = StatusChange::kasus(kasus_id, target);
        if target == KasusStatus::SelesaiDinilai {
            if let Some(permohonan) = ctx.permohonan.as_ref().filter(|p| !p.status.is_terminal()) {
                change = change.and_permohonan(permohonan.id, PermohonanStatus::SelesaiDinilai);
            }
        }
        self.repos.kasus.apply_status(change).await.or_internal("kasus", kasus_id)?;

        let from = kasus.status;
        kasus.status = target;
        tracing::info!(kasus_id = %kasus_id, from = %from, to = %target, "case status changed");
        self.publish(
            actor,
            WorkflowEvent::KasusStatusChanged {
                kasus_id,
                from: from.to_string(),
                to: target.to_string(),
            },
        )
        .await;
        Ok(kasus)
    }

    /// "Baru" → "Proses Survei"
    pub async fn start_survei(&self, actor: &Actor, kasus_id: Uuid) -> Result<Kasus, KasusError> {
        let _guard = self.lock(kasus_id).await;
        let mut kasus = self.authorize_case(actor, Action::UpdateKasus, kasus_id).await?.kasus;
        if kasus.status != KasusStatus::Baru {
            return Err(KasusError::invalid_transition(kasus.status, "start a survey"));
        }

        self.repos
            .kasus
            .apply_status(StatusChange::kasus(kasus_id, KasusStatus::ProsesSurvei))
            .await
            .or_internal("kasus", kasus_id)?;
        kasus.status = KasusStatus::ProsesSurvei;
        self.publish(
            actor,
            WorkflowEvent::KasusStatusChanged {
                kasus_id,
                from: KasusStatus::Baru.to_string(),
                to: KasusStatus::ProsesSurvei.to_string(),
            },
        )
        .await;
        Ok(kasus)
    }

    /// Store a field survey and move the case to "Survei Selesai"
    pub async fn record_survei(&self, actor: &Actor, kasus_id: Uuid, input: SurveiInput) -> Result<Survei, KasusError> {
        let _guard = self.lock(kasus_id).await;
        let kasus = self.authorize_case(actor, Action::UpdateKasus, kasus_id).await?.kasus;
        if !kasus.status.accepts_survey() {
            return Err(KasusError::invalid_transition(kasus.status, "record a survey"));
        }

        let max = self.config.max_signature_bytes;
        let mut errors = ValidationErrors::new();
        let valid = validation::validate_survei(&input, &mut errors);
        let foto = signature::decode_single("foto_dokumentasi", input.foto_dokumentasi.as_deref(), false, max, &mut errors);
        let ttd_petugas = signature::decode_single(
            "tanda_tangan_petugas",
            input.tanda_tangan_petugas.as_deref(),
            true,
            max,
            &mut errors,
        );
        let ttd_perwakilan = signature::decode_single(
            "tanda_tangan_perwakilan",
            input.tanda_tangan_perwakilan.as_deref(),
            true,
            max,
            &mut errors,
        );
        errors.into_result()?;
        let (Some(valid), Some(ttd_petugas), Some(ttd_perwakilan)) = (valid, ttd_petugas, ttd_perwakilan) else {
            return Err(KasusError::Internal);
        };

        let mut written: Vec<SignatureRef> = Vec::new();
        let stored = self
            .store_survey_images(foto.as_ref(), &ttd_petugas, &ttd_perwakilan, &mut written)
            .await;
        let (foto_ref, petugas_ref, perwakilan_ref) = match stored {
            Ok(refs) => refs,
            Err(e) => {
                signature::discard(self.images.as_ref(), written.iter()).await;
                tracing::error!(kasus_id = %kasus_id, error = ?e, "failed to store survey images");
                return Err(KasusError::Internal);
            }
        };

        let survei = Survei {
            id: Uuid::new_v4(),
            kasus_id,
            petugas_id: actor.user_id,
            tanggal: valid.tanggal,
            latitude: valid.latitude,
            longitude: valid.longitude,
            pemeriksaan: valid.pemeriksaan,
            pengukuran: valid.pengukuran,
            foto_dokumentasi: foto_ref,
            tanda_tangan_petugas: petugas_ref,
            nama_perwakilan: valid.nama_perwakilan,
            tanda_tangan_perwakilan: perwakilan_ref,
            catatan: valid.catatan,
            created_at: Utc::now(),
        };

        let change = if kasus.status == KasusStatus::SurveiSelesai {
            StatusChange::none()
        } else {
            StatusChange::kasus(kasus_id, KasusStatus::SurveiSelesai)
        };
        let survei = match self.repos.kasus.create_survei(&survei, change).await {
            Ok(survei) => survei,
            Err(e) => {
                signature::discard(self.images.as_ref(), written.iter()).await;
                return Err(e).or_internal("survei", kasus_id);
            }
        };

        tracing::info!(kasus_id = %kasus_id, survei_id = %survei.id, "survey recorded");
        self.publish(
            actor,
            WorkflowEvent::SurveiRecorded {
                kasus_id,
                survei_id: survei.id,
            },
        )
        .await;
        Ok(survei)
    }

    async fn store_survey_images(
        &self,
        foto: Option<&SignatureImage>,
        petugas: &SignatureImage,
        perwakilan: &SignatureImage,
        written: &mut Vec<SignatureRef>,
    ) -> anyhow::Result<(Option<SignatureRef>, SignatureRef, SignatureRef)> {
        let foto_ref = match foto {
            Some(image) => {
                let r = self.images.store("survei_foto", image).await?;
                written.push(r.clone());
                Some(r)
            }
            None => None,
        };
        let petugas_ref = self.images.store("survei_ttd_petugas", petugas).await?;
        written.push(petugas_ref.clone());
        let perwakilan_ref = self.images.store("survei_ttd_perwakilan", perwakilan).await?;
        written.push(perwakilan_ref.clone());
        Ok((foto_ref, petugas_ref, perwakilan_ref))
    }

    pub async fn list_survei(&self, actor: &Actor, kasus_id: Uuid) -> Result<Vec<Survei>, KasusError> {
        self.authorize_case(actor, Action::ViewKasus, kasus_id).await?;
        self.repos.kasus.list_survei(kasus_id).await.or_internal("survei", kasus_id)
    }
}
