//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs
//!
//! Every method that changes more than one row runs inside a single store transaction; a
//! [`StatusChange`] passed alongside a write is applied in that same transaction.

use crate::contract::{
    BaHasilPenilaian, BaPemeriksaan, BeritaAcara, EditRequest, FormulirAnalisisPenilaian, Kasus,
    KasusStatus, Pemegang, Penilaian, PermohonanFilter, PermohonanPenilaian, PermohonanStatus,
    Survei, Team, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Storage failures the domain reacts to
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key (document number, request number, pending edit request) already exists
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The row changed since it was read (version or status guard did not match)
    #[error("record was modified concurrently")]
    StaleVersion,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Status side effects committed together with a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub kasus: Option<(Uuid, KasusStatus)>,
    pub permohonan: Option<(Uuid, PermohonanStatus)>,
}

impl StatusChange {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn kasus(kasus_id: Uuid, status: KasusStatus) -> Self {
        Self {
            kasus: Some((kasus_id, status)),
            permohonan: None,
        }
    }

    pub fn permohonan(permohonan_id: Uuid, status: PermohonanStatus) -> Self {
        Self {
            kasus: None,
            permohonan: Some((permohonan_id, status)),
        }
    }

    pub fn and_permohonan(mut self, permohonan_id: Uuid, status: PermohonanStatus) -> Self {
        self.permohonan = Some((permohonan_id, status));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kasus.is_none() && self.permohonan.is_none()
    }
}

/// Users and teams
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn create_team(&self, team: &Team) -> StoreResult<Team>;

    /// Rename the team and replace its memberships wholesale
    async fn update_team(&self, team: &Team) -> StoreResult<Team>;

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>>;

    async fn list_teams(&self) -> StoreResult<Vec<Team>>;

    /// Delete a team and its memberships; requests pointing at it lose their team link
    async fn delete_team(&self, id: Uuid) -> StoreResult<bool>;
}

/// Business holders
#[async_trait]
pub trait PemegangRepository: Send + Sync {
    async fn create(&self, pemegang: &Pemegang) -> StoreResult<Pemegang>;

    async fn update(&self, pemegang: &Pemegang) -> StoreResult<Pemegang>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Pemegang>>;

    async fn list_all(&self) -> StoreResult<Vec<Pemegang>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Whether any request or case still points at the holder
    async fn is_referenced(&self, id: Uuid) -> StoreResult<bool>;
}

/// Assessment requests
#[async_trait]
pub trait PermohonanRepository: Send + Sync {
    /// Insert; a taken `nomor_permohonan` yields [`StoreError::UniqueViolation`]
    async fn create(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian>;

    /// Update mutable attributes; the request number is never rewritten
    async fn update(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<PermohonanPenilaian>>;

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<PermohonanPenilaian>>;

    /// One page ordered by priority (desc) then creation time (desc), plus the total count
    async fn list(
        &self,
        filter: PermohonanFilter,
        limit: u64,
        offset: u64,
    ) -> StoreResult<(Vec<PermohonanPenilaian>, u64)>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Cases, their assessment and field surveys
#[async_trait]
pub trait KasusRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Kasus>>;

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<Kasus>>;

    /// Every case ordered by priority (desc) then creation time (desc)
    async fn list_all(&self) -> StoreResult<Vec<Kasus>>;

    /// Insert the case, or refresh the copied attributes of the case already holding the
    /// same request number. Returns the stored case and whether it was created.
    async fn upsert_by_nomor(&self, kasus: &Kasus, change: StatusChange) -> StoreResult<(Kasus, bool)>;

    async fn update(&self, kasus: &Kasus) -> StoreResult<Kasus>;

    /// Delete the case together with its assessment, surveys, documents and edit requests
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Apply status changes without any other write
    async fn apply_status(&self, change: StatusChange) -> StoreResult<()>;

    async fn find_penilaian(&self, kasus_id: Uuid) -> StoreResult<Option<Penilaian>>;

    async fn find_penilaian_by_id(&self, id: Uuid) -> StoreResult<Option<Penilaian>>;

    /// Persist an assessment read at `penilaian.version` (0 = not stored yet).
    ///
    /// The write only succeeds if the stored version still matches; the returned assessment
    /// carries the bumped version.
    async fn commit_penilaian(&self, penilaian: &Penilaian, change: StatusChange) -> StoreResult<Penilaian>;

    async fn create_survei(&self, survei: &Survei, change: StatusChange) -> StoreResult<Survei>;

    /// Surveys of a case, most recent first
    async fn list_survei(&self, kasus_id: Uuid) -> StoreResult<Vec<Survei>>;
}

/// Minutes and analysis documents, each unique per owning record
#[async_trait]
pub trait DokumenRepository: Send + Sync {
    async fn find_berita_acara(&self, id: Uuid) -> StoreResult<Option<BeritaAcara>>;

    async fn find_berita_acara_by_permohonan(&self, permohonan_id: Uuid) -> StoreResult<Option<BeritaAcara>>;

    /// Upsert the minutes, link them to the request and apply the request status change
    async fn commit_berita_acara(&self, berita_acara: &BeritaAcara, change: StatusChange) -> StoreResult<BeritaAcara>;

    async fn find_ba_pemeriksaan(&self, penilaian_id: Uuid) -> StoreResult<Option<BaPemeriksaan>>;

    async fn find_ba_pemeriksaan_by_nomor(&self, nomor_ba: &str) -> StoreResult<Option<BaPemeriksaan>>;

    /// Insert or update by id; a `nomor_ba` held by another record is a unique violation
    async fn save_ba_pemeriksaan(&self, ba: &BaPemeriksaan) -> StoreResult<BaPemeriksaan>;

    async fn find_ba_hasil(&self, penilaian_id: Uuid) -> StoreResult<Option<BaHasilPenilaian>>;

    async fn save_ba_hasil(&self, ba: &BaHasilPenilaian) -> StoreResult<BaHasilPenilaian>;

    async fn find_formulir(&self, penilaian_id: Uuid) -> StoreResult<Option<FormulirAnalisisPenilaian>>;

    async fn save_formulir(&self, form: &FormulirAnalisisPenilaian) -> StoreResult<FormulirAnalisisPenilaian>;
}

/// Edit requests on finalized assessments
#[async_trait]
pub trait EditRequestRepository: Send + Sync {
    /// Insert a pending request; fails with [`StoreError::UniqueViolation`] when the
    /// assessment already has one pending
    async fn create(&self, request: &EditRequest) -> StoreResult<EditRequest>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<EditRequest>>;

    async fn find_pending(&self, penilaian_id: Uuid) -> StoreResult<Option<EditRequest>>;

    /// Requests of an assessment, newest first
    async fn list_for_penilaian(&self, penilaian_id: Uuid) -> StoreResult<Vec<EditRequest>>;

    /// Record the decision only while the stored request is still pending
    /// ([`StoreError::StaleVersion`] otherwise) and apply `change` atomically
    async fn commit_decision(&self, request: &EditRequest, change: StatusChange) -> StoreResult<EditRequest>;
}

/// Every repository the service depends on
#[derive(Clone)]
pub struct Repositories {
    pub directory: Arc<dyn DirectoryRepository>,
    pub pemegang: Arc<dyn PemegangRepository>,
    pub permohonan: Arc<dyn PermohonanRepository>,
    pub kasus: Arc<dyn KasusRepository>,
    pub dokumen: Arc<dyn DokumenRepository>,
    pub edit_requests: Arc<dyn EditRequestRepository>,
}

impl Repositories {
    /// Bundle a single store that implements every repository trait
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DirectoryRepository
            + PemegangRepository
            + PermohonanRepository
            + KasusRepository
            + DokumenRepository
            + EditRequestRepository
            + 'static,
    {
        Self {
            directory: store.clone(),
            pemegang: store.clone(),
            permohonan: store.clone(),
            kasus: store.clone(),
            dokumen: store.clone(),
            edit_requests: store,
        }
    }
}
