//! Domain service - business logic orchestration
//!
//! One [`Service`] owns the whole workflow. Operations are grouped by aggregate in the
//! submodules; this file holds the shared plumbing: case locks, authorization against the
//! case → request → team indirection, store error mapping and event publishing.

mod directory;
mod dokumen;
mod edit_request;
mod kasus;
mod penilaian;
mod permohonan;

use super::events::{AuditRecord, EventPublisher, WorkflowEvent};
use super::policy::{self, Action, CaseAccess};
use super::repository::{Repositories, StoreError, StoreResult};
use super::signature::ImageStore;
use crate::config::Config;
use crate::contract::{
    Actor, Kasus, KasusError, Page, Penilaian, PermohonanPenilaian, SignatureSet, Team, ValidationErrors,
};
use dashmap::DashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Domain service for the case workflow
pub struct Service {
    repos: Repositories,
    images: Arc<dyn ImageStore>,
    event_publisher: Arc<dyn EventPublisher>,
    config: Config,
    /// Serializes read-modify-write sequences per case (or per request before a case exists)
    case_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// A case together with what it was authorized against
#[derive(Debug, Clone)]
pub(crate) struct CaseContext {
    pub kasus: Kasus,
    pub permohonan: Option<PermohonanPenilaian>,
    pub team: Option<Team>,
}

impl CaseContext {
    /// Members of the request's team; empty when the link is broken
    pub fn team_member_ids(&self) -> Vec<Uuid> {
        self.team.as_ref().map(Team::member_ids).unwrap_or_default()
    }
}

impl Service {
    /// Create a new service instance
    pub fn new(
        repos: Repositories,
        images: Arc<dyn ImageStore>,
        event_publisher: Arc<dyn EventPublisher>,
        config: Config,
    ) -> Self {
        Self {
            repos,
            images,
            event_publisher,
            config,
            case_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hold the per-key async mutex for the rest of the caller's scope
    async fn lock(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let mutex = self.case_locks.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    async fn publish(&self, actor: &Actor, event: WorkflowEvent) {
        let record = AuditRecord::new(actor.user_id, event);
        if let Err(e) = self.event_publisher.publish_audit(record).await {
            tracing::warn!(error = %e, "failed to publish audit event");
        }
    }

    /// Resolve the policy inputs of a case through its originating request
    async fn resolve_case(&self, kasus: Kasus) -> Result<(CaseContext, CaseAccess), KasusError> {
        let permohonan = self
            .repos
            .permohonan
            .find_by_nomor(&kasus.nomor_permohonan)
            .await
            .or_internal("permohonan", &kasus.nomor_permohonan)?;

        let team = match permohonan.as_ref().and_then(|p| p.tim_id) {
            Some(tim_id) => self.repos.directory.find_team(tim_id).await.or_internal("tim", tim_id)?,
            None => None,
        };

        let access = CaseAccess {
            kasus_status: Some(kasus.status),
            permohonan_status: permohonan.as_ref().map(|p| p.status),
            penanggung_jawab_id: permohonan.as_ref().and_then(|p| p.penanggung_jawab_id),
            team_member_ids: team.as_ref().map(Team::member_ids).unwrap_or_default(),
        };
        if permohonan.is_none() {
            tracing::warn!(kasus_id = %kasus.id, nomor = %kasus.nomor_permohonan, "case has no originating request");
        }

        Ok((CaseContext { kasus, permohonan, team }, access))
    }

    /// Role check, lookup, then membership check
    async fn authorize_case(&self, actor: &Actor, action: Action, kasus_id: Uuid) -> Result<CaseContext, KasusError> {
        policy::check_role(actor, action)?;

        let kasus = self
            .repos
            .kasus
            .find(kasus_id)
            .await
            .or_internal("kasus", kasus_id)?
            .ok_or_else(|| hidden_or_missing(actor, "kasus", kasus_id))?;

        let (ctx, access) = self.resolve_case(kasus).await?;
        policy::authorize(actor, action, &access).inspect_err(|_| {
            tracing::debug!(actor = %actor.user_id, kasus_id = %kasus_id, ?action, "case access denied");
        })?;
        Ok(ctx)
    }

    /// Same as [`Self::authorize_case`], entered through an assessment id
    async fn authorize_penilaian(
        &self,
        actor: &Actor,
        action: Action,
        penilaian_id: Uuid,
    ) -> Result<(Penilaian, CaseContext), KasusError> {
        policy::check_role(actor, action)?;

        let penilaian = self
            .repos
            .kasus
            .find_penilaian_by_id(penilaian_id)
            .await
            .or_internal("penilaian", penilaian_id)?
            .ok_or_else(|| hidden_or_missing(actor, "penilaian", penilaian_id))?;
        let ctx = self.authorize_case(actor, action, penilaian.kasus_id).await?;
        Ok((penilaian, ctx))
    }

    /// Take the lock of the case owning an assessment, then authorize against a fresh read
    async fn lock_penilaian(
        &self,
        actor: &Actor,
        action: Action,
        penilaian_id: Uuid,
    ) -> Result<(OwnedMutexGuard<()>, Penilaian, CaseContext), KasusError> {
        policy::check_role(actor, action)?;

        let kasus_id = self
            .repos
            .kasus
            .find_penilaian_by_id(penilaian_id)
            .await
            .or_internal("penilaian", penilaian_id)?
            .map(|p| p.kasus_id)
            .ok_or_else(|| hidden_or_missing(actor, "penilaian", penilaian_id))?;
        let guard = self.lock(kasus_id).await;
        let (penilaian, ctx) = self.authorize_penilaian(actor, action, penilaian_id).await?;
        Ok((guard, penilaian, ctx))
    }

    /// Reject an empty union of stored and incoming signatures
    fn require_signatures(incoming: usize, existing: &SignatureSet, errors: &mut ValidationErrors) {
        if incoming == 0 && existing.is_empty() {
            errors.add("tanda_tangan", "at least one team signature is required");
        }
    }

    /// 1-based page → (page, per_page, offset)
    fn page_window(&self, page: Option<u64>) -> (u64, u64, u64) {
        let page = page.unwrap_or(1).max(1);
        let per_page = self.config.page_size.max(1);
        // SQL offsets are signed 64-bit
        let offset = (page - 1).saturating_mul(per_page).min(i64::MAX as u64);
        (page, per_page, offset)
    }

    fn paginate<T>(&self, items: Vec<T>, page: Option<u64>) -> Page<T> {
        let (page, per_page, offset) = self.page_window(page);
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .collect();
        Page {
            items,
            total,
            page,
            per_page,
        }
    }
}

/// Unknown ids of team-gated records answer like records the caller may not see, except to Admin
pub(crate) fn hidden_or_missing(actor: &Actor, resource: &str, id: Uuid) -> KasusError {
    if actor.is_admin() {
        KasusError::not_found(resource, id)
    } else {
        KasusError::Forbidden
    }
}

/// Translate storage failures at the service boundary
pub(crate) trait StoreResultExt<T> {
    fn or_internal(self, entity: &'static str, id: impl Display) -> Result<T, KasusError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn or_internal(self, entity: &'static str, id: impl Display) -> Result<T, KasusError> {
        self.map_err(|e| match e {
            StoreError::UniqueViolation(key) => {
                KasusError::conflict(format!("{entity} conflicts with an existing record ({key})"))
            }
            StoreError::StaleVersion => {
                KasusError::conflict(format!("{entity} {id} was modified concurrently; reload and retry"))
            }
            StoreError::Other(err) => {
                tracing::error!(entity, id = %id, error = ?err, "store operation failed");
                KasusError::Internal
            }
        })
    }
}
