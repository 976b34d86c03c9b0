//! Assessment requests and case initiation

use super::{Service, StoreResultExt};
use crate::contract::{
    Actor, Kasus, KasusError, KasusStatus, KasusType, Page, PermohonanFilter, PermohonanInput, PermohonanPenilaian,
    PermohonanStatus, ValidationErrors,
};
use crate::domain::events::WorkflowEvent;
use crate::domain::policy::{self, Action};
use crate::domain::repository::{StatusChange, StoreError};
use crate::domain::validation;
use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};
use uuid::Uuid;

/// `{unix seconds}-{5 random alphanumerics}`, e.g. `1700000000-AbCde`
pub fn generate_nomor_permohonan() -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), 5);
    format!("{}-{}", Utc::now().timestamp(), suffix)
}

/// Resolved references of a request form
struct Assignment {
    pemegang_id: Uuid,
    tim_id: Option<Uuid>,
    penanggung_jawab_id: Option<Uuid>,
    skor_prioritas: u8,
}

impl Service {
    /// Validate the form and check that every referenced record exists
    async fn resolve_assignment(&self, input: &PermohonanInput) -> Result<Assignment, KasusError> {
        let mut errors = ValidationErrors::new();
        let pemegang_id = validation::required_id("pemegang_id", input.pemegang_id, &mut errors);
        let skor_prioritas = validation::priority("skor_prioritas", input.skor_prioritas, &mut errors);

        if let Some(id) = pemegang_id {
            if self.repos.pemegang.find(id).await.or_internal("pemegang", id)?.is_none() {
                errors.add("pemegang_id", "unknown pemegang");
            }
        }
        if let Some(id) = input.tim_id {
            if self.repos.directory.find_team(id).await.or_internal("tim", id)?.is_none() {
                errors.add("tim_id", "unknown tim");
            }
        }
        if let Some(id) = input.penanggung_jawab_id {
            if self.repos.directory.find_user(id).await.or_internal("user", id)?.is_none() {
                errors.add("penanggung_jawab_id", "unknown user");
            }
        }

        match (pemegang_id, skor_prioritas) {
            (Some(pemegang_id), Some(skor_prioritas)) if errors.is_empty() => Ok(Assignment {
                pemegang_id,
                tim_id: input.tim_id,
                penanggung_jawab_id: input.penanggung_jawab_id,
                skor_prioritas,
            }),
            _ => Err(KasusError::Validation { errors }),
        }
    }

    /// Create a request with a freshly generated number
    pub async fn create_permohonan(
        &self,
        actor: &Actor,
        input: PermohonanInput,
    ) -> Result<PermohonanPenilaian, KasusError> {
        policy::check_role(actor, Action::ManagePermohonan)?;
        let assignment = self.resolve_assignment(&input).await?;

        for attempt in 1..=self.config.request_number_attempts.max(1) {
            let now = Utc::now();
            let permohonan = PermohonanPenilaian {
                id: Uuid::new_v4(),
                nomor_permohonan: generate_nomor_permohonan(),
                pemegang_id: assignment.pemegang_id,
                tim_id: assignment.tim_id,
                penanggung_jawab_id: assignment.penanggung_jawab_id,
                skor_prioritas: assignment.skor_prioritas,
                status: PermohonanStatus::Baru,
                berita_acara_id: None,
                created_at: now,
                updated_at: now,
            };

            match self.repos.permohonan.create(&permohonan).await {
                Ok(created) => {
                    tracing::info!(
                        permohonan_id = %created.id,
                        nomor = %created.nomor_permohonan,
                        actor = %actor.user_id,
                        "request created"
                    );
                    return Ok(created);
                }
                Err(StoreError::UniqueViolation(_)) => {
                    tracing::debug!(attempt, nomor = %permohonan.nomor_permohonan, "request number taken, retrying");
                }
                Err(e) => return Err(e).or_internal("permohonan", permohonan.id),
            }
        }

        Err(KasusError::conflict("could not allocate a unique request number"))
    }

    pub async fn list_permohonan(
        &self,
        actor: &Actor,
        filter: PermohonanFilter,
        page: Option<u64>,
    ) -> Result<Page<PermohonanPenilaian>, KasusError> {
        policy::check_role(actor, Action::ViewPermohonan)?;
        let (page, per_page, offset) = self.page_window(page);
        let (items, total) = self
            .repos
            .permohonan
            .list(filter, per_page, offset)
            .await
            .or_internal("permohonan", "*")?;
        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn get_permohonan(&self, actor: &Actor, id: Uuid) -> Result<PermohonanPenilaian, KasusError> {
        policy::check_role(actor, Action::ViewPermohonan)?;
        self.find_permohonan(id).await
    }

    /// Reassign holder, team, coordinator or priority; the number never changes
    pub async fn update_permohonan(
        &self,
        actor: &Actor,
        id: Uuid,
        input: PermohonanInput,
    ) -> Result<PermohonanPenilaian, KasusError> {
        policy::check_role(actor, Action::ManagePermohonan)?;
        let mut permohonan = self.find_permohonan(id).await?;
        let assignment = self.resolve_assignment(&input).await?;

        permohonan.pemegang_id = assignment.pemegang_id;
        permohonan.tim_id = assignment.tim_id;
        permohonan.penanggung_jawab_id = assignment.penanggung_jawab_id;
        permohonan.skor_prioritas = assignment.skor_prioritas;
        permohonan.updated_at = Utc::now();
        self.repos
            .permohonan
            .update(&permohonan)
            .await
            .or_internal("permohonan", id)
    }

    /// Refused once a case has been initiated from the request
    pub async fn delete_permohonan(&self, actor: &Actor, id: Uuid) -> Result<(), KasusError> {
        policy::check_role(actor, Action::ManagePermohonan)?;
        let permohonan = self.find_permohonan(id).await?;
        let kasus = self
            .repos
            .kasus
            .find_by_nomor(&permohonan.nomor_permohonan)
            .await
            .or_internal("kasus", &permohonan.nomor_permohonan)?;
        if kasus.is_some() {
            return Err(KasusError::conflict(format!(
                "request {} already has a case",
                permohonan.nomor_permohonan
            )));
        }
        self.repos.permohonan.delete(id).await.or_internal("permohonan", id)?;
        Ok(())
    }

    pub(super) async fn find_permohonan(&self, id: Uuid) -> Result<PermohonanPenilaian, KasusError> {
        self.repos
            .permohonan
            .find(id)
            .await
            .or_internal("permohonan", id)?
            .ok_or_else(|| KasusError::not_found("permohonan", id))
    }

    /// Create the case of a request, or refresh it when it already exists.
    ///
    /// Holder, team, coordinator and priority are copied from the request. A request still in
    /// "Baru" moves to "Menunggu Penilaian" in the same transaction. Returns the case and
    /// whether it was created.
    pub async fn initiate_kasus(&self, actor: &Actor, permohonan_id: Uuid) -> Result<(Kasus, bool), KasusError> {
        policy::check_role(actor, Action::InitiateKasus)?;
        let _guard = self.lock(permohonan_id).await;

        let permohonan = self.find_permohonan(permohonan_id).await?;
        if permohonan.status.is_terminal() {
            return Err(KasusError::invalid_transition(permohonan.status, "initiate a case"));
        }

        let existing = self
            .repos
            .kasus
            .find_by_nomor(&permohonan.nomor_permohonan)
            .await
            .or_internal("kasus", &permohonan.nomor_permohonan)?;

        let now = Utc::now();
        let kasus = match existing {
            Some(mut kasus) => {
                kasus.pemegang_id = permohonan.pemegang_id;
                kasus.tim_id = permohonan.tim_id;
                kasus.penanggung_jawab_id = permohonan.penanggung_jawab_id;
                kasus.skor_prioritas = permohonan.skor_prioritas;
                kasus.updated_at = now;
                kasus
            }
            None => Kasus {
                id: Uuid::new_v4(),
                jenis: KasusType::PmpUmk,
                nomor_permohonan: permohonan.nomor_permohonan.clone(),
                status: KasusStatus::Baru,
                skor_prioritas: permohonan.skor_prioritas,
                tim_id: permohonan.tim_id,
                penanggung_jawab_id: permohonan.penanggung_jawab_id,
                pemegang_id: permohonan.pemegang_id,
                created_at: now,
                updated_at: now,
            },
        };

        let change = if permohonan.status == PermohonanStatus::Baru {
            StatusChange::permohonan(permohonan.id, PermohonanStatus::MenungguPenilaian)
        } else {
            StatusChange::none()
        };

        let (kasus, created) = self
            .repos
            .kasus
            .upsert_by_nomor(&kasus, change)
            .await
            .or_internal("kasus", &permohonan.nomor_permohonan)?;

        tracing::info!(
            kasus_id = %kasus.id,
            permohonan_id = %permohonan.id,
            created,
            "case initiated"
        );
        self.publish(
            actor,
            WorkflowEvent::KasusInitiated {
                kasus_id: kasus.id,
                nomor_permohonan: kasus.nomor_permohonan.clone(),
                created,
            },
        )
        .await;

        Ok((kasus, created))
    }
}
