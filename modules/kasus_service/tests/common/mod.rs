//! Shared fixtures: an in-memory store implementing every repository, an image store that
//! only records what it was asked to do, and a seeded team/request setup.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use kasus_service::contract::*;
use kasus_service::domain::{
    DirectoryRepository, DokumenRepository, EditRequestRepository, ImageStore, KasusRepository,
    NoOpEventPublisher, PemegangRepository, PermohonanRepository, Repositories, Service, SignatureImage,
    StatusChange, StoreError, StoreResult,
};
use kasus_service::Config;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 1x1 transparent PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn print_test_header(test_name: &str, purpose: &str) {
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}

// ===== In-memory store =====

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    teams: HashMap<Uuid, Team>,
    pemegang: HashMap<Uuid, Pemegang>,
    permohonan: HashMap<Uuid, PermohonanPenilaian>,
    kasus: HashMap<Uuid, Kasus>,
    penilaian: HashMap<Uuid, Penilaian>,
    survei: HashMap<Uuid, Survei>,
    berita_acara: HashMap<Uuid, BeritaAcara>,
    ba_pemeriksaan: HashMap<Uuid, BaPemeriksaan>,
    ba_hasil: HashMap<Uuid, BaHasilPenilaian>,
    formulir: HashMap<Uuid, FormulirAnalisisPenilaian>,
    edit_requests: HashMap<Uuid, EditRequest>,
}

impl State {
    fn apply(&mut self, change: StatusChange) -> StoreResult<()> {
        if let Some((id, status)) = change.kasus {
            let kasus = self.kasus.get_mut(&id).ok_or_else(|| missing("kasus", id))?;
            kasus.status = status;
            kasus.updated_at = Utc::now();
        }
        if let Some((id, status)) = change.permohonan {
            let permohonan = self.permohonan.get_mut(&id).ok_or_else(|| missing("permohonan", id))?;
            permohonan.status = status;
            permohonan.updated_at = Utc::now();
        }
        Ok(())
    }

    fn has_assessment(&self, nomor: &str) -> bool {
        self.kasus
            .values()
            .filter(|k| k.nomor_permohonan == nomor)
            .any(|k| self.penilaian.values().any(|p| p.kasus_id == k.id))
    }
}

fn missing(resource: &str, id: Uuid) -> StoreError {
    StoreError::Other(anyhow::anyhow!("{resource} {id} does not exist"))
}

/// Every repository over one lock, so each call behaves like a transaction
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, user: User) {
        self.state.write().users.insert(user.id, user);
    }

    pub fn seed_team(&self, team: Team) {
        self.state.write().teams.insert(team.id, team);
    }

    pub fn seed_pemegang(&self, pemegang: Pemegang) {
        self.state.write().pemegang.insert(pemegang.id, pemegang);
    }

    pub fn seed_permohonan(&self, permohonan: PermohonanPenilaian) {
        self.state.write().permohonan.insert(permohonan.id, permohonan);
    }

    pub fn permohonan(&self, id: Uuid) -> Option<PermohonanPenilaian> {
        self.state.read().permohonan.get(&id).cloned()
    }

    pub fn kasus(&self, id: Uuid) -> Option<Kasus> {
        self.state.read().kasus.get(&id).cloned()
    }

    pub fn kasus_count(&self) -> usize {
        self.state.read().kasus.len()
    }

    pub fn set_kasus_status(&self, id: Uuid, status: KasusStatus) {
        if let Some(kasus) = self.state.write().kasus.get_mut(&id) {
            kasus.status = status;
        }
    }

    pub fn set_permohonan_status(&self, id: Uuid, status: PermohonanStatus) {
        if let Some(permohonan) = self.state.write().permohonan.get_mut(&id) {
            permohonan.status = status;
        }
    }

    pub fn print_state(&self, context: &str) {
        let state = self.state.read();
        println!("\n========== Store State: {} ==========", context);
        for permohonan in state.permohonan.values() {
            println!("  permohonan {} [{}]", permohonan.nomor_permohonan, permohonan.status);
        }
        for kasus in state.kasus.values() {
            println!("  kasus {} [{}]", kasus.nomor_permohonan, kasus.status);
        }
        println!("  penilaian: {}, edit requests: {}", state.penilaian.len(), state.edit_requests.len());
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<User> {
        let mut state = self.state.write();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(format!("users.email {}", user.email)));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.state.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create_team(&self, team: &Team) -> StoreResult<Team> {
        self.state.write().teams.insert(team.id, team.clone());
        Ok(team.clone())
    }

    async fn update_team(&self, team: &Team) -> StoreResult<Team> {
        let mut state = self.state.write();
        let stored = state.teams.get_mut(&team.id).ok_or_else(|| missing("tim", team.id))?;
        stored.name = team.name.clone();
        stored.members = team.members.clone();
        stored.updated_at = team.updated_at;
        Ok(stored.clone())
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.state.read().teams.get(&id).cloned())
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let mut teams: Vec<Team> = self.state.read().teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write();
        for permohonan in state.permohonan.values_mut().filter(|p| p.tim_id == Some(id)) {
            permohonan.tim_id = None;
        }
        for kasus in state.kasus.values_mut().filter(|k| k.tim_id == Some(id)) {
            kasus.tim_id = None;
        }
        Ok(state.teams.remove(&id).is_some())
    }
}

#[async_trait]
impl PemegangRepository for InMemoryStore {
    async fn create(&self, pemegang: &Pemegang) -> StoreResult<Pemegang> {
        self.state.write().pemegang.insert(pemegang.id, pemegang.clone());
        Ok(pemegang.clone())
    }

    async fn update(&self, pemegang: &Pemegang) -> StoreResult<Pemegang> {
        let mut state = self.state.write();
        let stored = state
            .pemegang
            .get_mut(&pemegang.id)
            .ok_or_else(|| missing("pemegang", pemegang.id))?;
        let created_at = stored.created_at;
        *stored = Pemegang {
            created_at,
            ..pemegang.clone()
        };
        Ok(stored.clone())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Pemegang>> {
        Ok(self.state.read().pemegang.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Pemegang>> {
        let mut all: Vec<Pemegang> = self.state.read().pemegang.values().cloned().collect();
        all.sort_by(|a, b| a.nama.cmp(&b.nama));
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().pemegang.remove(&id).is_some())
    }

    async fn is_referenced(&self, id: Uuid) -> StoreResult<bool> {
        let state = self.state.read();
        Ok(state.permohonan.values().any(|p| p.pemegang_id == id) || state.kasus.values().any(|k| k.pemegang_id == id))
    }
}

#[async_trait]
impl PermohonanRepository for InMemoryStore {
    async fn create(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian> {
        let mut state = self.state.write();
        if state
            .permohonan
            .values()
            .any(|p| p.nomor_permohonan == permohonan.nomor_permohonan)
        {
            return Err(StoreError::UniqueViolation(format!(
                "permohonan.nomor_permohonan {}",
                permohonan.nomor_permohonan
            )));
        }
        state.permohonan.insert(permohonan.id, permohonan.clone());
        Ok(permohonan.clone())
    }

    async fn update(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian> {
        let mut state = self.state.write();
        let stored = state
            .permohonan
            .get_mut(&permohonan.id)
            .ok_or_else(|| missing("permohonan", permohonan.id))?;
        stored.pemegang_id = permohonan.pemegang_id;
        stored.tim_id = permohonan.tim_id;
        stored.penanggung_jawab_id = permohonan.penanggung_jawab_id;
        stored.skor_prioritas = permohonan.skor_prioritas;
        stored.status = permohonan.status;
        stored.berita_acara_id = permohonan.berita_acara_id;
        stored.updated_at = permohonan.updated_at;
        Ok(stored.clone())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<PermohonanPenilaian>> {
        Ok(self.state.read().permohonan.get(&id).cloned())
    }

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<PermohonanPenilaian>> {
        Ok(self
            .state
            .read()
            .permohonan
            .values()
            .find(|p| p.nomor_permohonan == nomor)
            .cloned())
    }

    async fn list(
        &self,
        filter: PermohonanFilter,
        limit: u64,
        offset: u64,
    ) -> StoreResult<(Vec<PermohonanPenilaian>, u64)> {
        let state = self.state.read();
        let mut matching: Vec<PermohonanPenilaian> = state
            .permohonan
            .values()
            .filter(|p| filter == PermohonanFilter::All || !state.has_assessment(&p.nomor_permohonan))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.skor_prioritas
                .cmp(&a.skor_prioritas)
                .then(b.created_at.cmp(&a.created_at))
        });
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write();
        state.berita_acara.retain(|_, ba| ba.permohonan_id != id);
        Ok(state.permohonan.remove(&id).is_some())
    }
}

#[async_trait]
impl KasusRepository for InMemoryStore {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Kasus>> {
        Ok(self.state.read().kasus.get(&id).cloned())
    }

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<Kasus>> {
        Ok(self
            .state
            .read()
            .kasus
            .values()
            .find(|k| k.nomor_permohonan == nomor)
            .cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Kasus>> {
        let mut all: Vec<Kasus> = self.state.read().kasus.values().cloned().collect();
        all.sort_by(|a, b| {
            b.skor_prioritas
                .cmp(&a.skor_prioritas)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(all)
    }

    async fn upsert_by_nomor(&self, kasus: &Kasus, change: StatusChange) -> StoreResult<(Kasus, bool)> {
        let mut state = self.state.write();
        let existing = state
            .kasus
            .values_mut()
            .find(|k| k.nomor_permohonan == kasus.nomor_permohonan);
        let (stored, created) = match existing {
            Some(stored) => {
                stored.skor_prioritas = kasus.skor_prioritas;
                stored.tim_id = kasus.tim_id;
                stored.penanggung_jawab_id = kasus.penanggung_jawab_id;
                stored.pemegang_id = kasus.pemegang_id;
                stored.updated_at = kasus.updated_at;
                (stored.clone(), false)
            }
            None => {
                state.kasus.insert(kasus.id, kasus.clone());
                (kasus.clone(), true)
            }
        };
        state.apply(change)?;
        Ok((stored, created))
    }

    async fn update(&self, kasus: &Kasus) -> StoreResult<Kasus> {
        let mut state = self.state.write();
        let stored = state.kasus.get_mut(&kasus.id).ok_or_else(|| missing("kasus", kasus.id))?;
        let (nomor, created_at) = (stored.nomor_permohonan.clone(), stored.created_at);
        *stored = Kasus {
            nomor_permohonan: nomor,
            created_at,
            ..kasus.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write();
        let penilaian_ids: Vec<Uuid> = state
            .penilaian
            .values()
            .filter(|p| p.kasus_id == id)
            .map(|p| p.id)
            .collect();
        for penilaian_id in &penilaian_ids {
            state.edit_requests.retain(|_, r| r.penilaian_id != *penilaian_id);
            state.ba_pemeriksaan.retain(|_, d| d.penilaian_id != *penilaian_id);
            state.ba_hasil.retain(|_, d| d.penilaian_id != *penilaian_id);
            state.formulir.retain(|_, d| d.penilaian_id != *penilaian_id);
            state.penilaian.remove(penilaian_id);
        }
        state.survei.retain(|_, s| s.kasus_id != id);
        Ok(state.kasus.remove(&id).is_some())
    }

    async fn apply_status(&self, change: StatusChange) -> StoreResult<()> {
        self.state.write().apply(change)
    }

    async fn find_penilaian(&self, kasus_id: Uuid) -> StoreResult<Option<Penilaian>> {
        Ok(self
            .state
            .read()
            .penilaian
            .values()
            .find(|p| p.kasus_id == kasus_id)
            .cloned())
    }

    async fn find_penilaian_by_id(&self, id: Uuid) -> StoreResult<Option<Penilaian>> {
        Ok(self.state.read().penilaian.get(&id).cloned())
    }

    async fn commit_penilaian(&self, penilaian: &Penilaian, change: StatusChange) -> StoreResult<Penilaian> {
        let mut state = self.state.write();
        let current = state
            .penilaian
            .values()
            .find(|p| p.kasus_id == penilaian.kasus_id)
            .map(|p| p.version)
            .unwrap_or(0);
        if current != penilaian.version {
            return Err(StoreError::StaleVersion);
        }
        let mut stored = penilaian.clone();
        stored.version = penilaian.version + 1;
        state.penilaian.insert(stored.id, stored.clone());
        state.apply(change)?;
        Ok(stored)
    }

    async fn create_survei(&self, survei: &Survei, change: StatusChange) -> StoreResult<Survei> {
        let mut state = self.state.write();
        state.survei.insert(survei.id, survei.clone());
        state.apply(change)?;
        Ok(survei.clone())
    }

    async fn list_survei(&self, kasus_id: Uuid) -> StoreResult<Vec<Survei>> {
        let mut all: Vec<Survei> = self
            .state
            .read()
            .survei
            .values()
            .filter(|s| s.kasus_id == kasus_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[async_trait]
impl DokumenRepository for InMemoryStore {
    async fn find_berita_acara(&self, id: Uuid) -> StoreResult<Option<BeritaAcara>> {
        Ok(self.state.read().berita_acara.get(&id).cloned())
    }

    async fn find_berita_acara_by_permohonan(&self, permohonan_id: Uuid) -> StoreResult<Option<BeritaAcara>> {
        Ok(self
            .state
            .read()
            .berita_acara
            .values()
            .find(|ba| ba.permohonan_id == permohonan_id)
            .cloned())
    }

    async fn commit_berita_acara(&self, berita_acara: &BeritaAcara, change: StatusChange) -> StoreResult<BeritaAcara> {
        let mut state = self.state.write();
        let permohonan = state
            .permohonan
            .get_mut(&berita_acara.permohonan_id)
            .ok_or_else(|| missing("permohonan", berita_acara.permohonan_id))?;
        permohonan.berita_acara_id = Some(berita_acara.id);
        state.berita_acara.insert(berita_acara.id, berita_acara.clone());
        state.apply(change)?;
        Ok(berita_acara.clone())
    }

    async fn find_ba_pemeriksaan(&self, penilaian_id: Uuid) -> StoreResult<Option<BaPemeriksaan>> {
        Ok(self
            .state
            .read()
            .ba_pemeriksaan
            .values()
            .find(|ba| ba.penilaian_id == penilaian_id)
            .cloned())
    }

    async fn find_ba_pemeriksaan_by_nomor(&self, nomor_ba: &str) -> StoreResult<Option<BaPemeriksaan>> {
        Ok(self
            .state
            .read()
            .ba_pemeriksaan
            .values()
            .find(|ba| ba.nomor_ba == nomor_ba)
            .cloned())
    }

    async fn save_ba_pemeriksaan(&self, ba: &BaPemeriksaan) -> StoreResult<BaPemeriksaan> {
        let mut state = self.state.write();
        if state
            .ba_pemeriksaan
            .values()
            .any(|other| other.id != ba.id && other.nomor_ba == ba.nomor_ba)
        {
            return Err(StoreError::UniqueViolation(format!("ba_pemeriksaan.nomor_ba {}", ba.nomor_ba)));
        }
        state.ba_pemeriksaan.insert(ba.id, ba.clone());
        Ok(ba.clone())
    }

    async fn find_ba_hasil(&self, penilaian_id: Uuid) -> StoreResult<Option<BaHasilPenilaian>> {
        Ok(self
            .state
            .read()
            .ba_hasil
            .values()
            .find(|ba| ba.penilaian_id == penilaian_id)
            .cloned())
    }

    async fn save_ba_hasil(&self, ba: &BaHasilPenilaian) -> StoreResult<BaHasilPenilaian> {
        self.state.write().ba_hasil.insert(ba.id, ba.clone());
        Ok(ba.clone())
    }

    async fn find_formulir(&self, penilaian_id: Uuid) -> StoreResult<Option<FormulirAnalisisPenilaian>> {
        Ok(self
            .state
            .read()
            .formulir
            .values()
            .find(|f| f.penilaian_id == penilaian_id)
            .cloned())
    }

    async fn save_formulir(&self, form: &FormulirAnalisisPenilaian) -> StoreResult<FormulirAnalisisPenilaian> {
        self.state.write().formulir.insert(form.id, form.clone());
        Ok(form.clone())
    }
}

#[async_trait]
impl EditRequestRepository for InMemoryStore {
    async fn create(&self, request: &EditRequest) -> StoreResult<EditRequest> {
        let mut state = self.state.write();
        if state
            .edit_requests
            .values()
            .any(|r| r.penilaian_id == request.penilaian_id && r.status == EditRequestStatus::Pending)
        {
            return Err(StoreError::UniqueViolation(format!(
                "edit_requests pending for {}",
                request.penilaian_id
            )));
        }
        state.edit_requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<EditRequest>> {
        Ok(self.state.read().edit_requests.get(&id).cloned())
    }

    async fn find_pending(&self, penilaian_id: Uuid) -> StoreResult<Option<EditRequest>> {
        Ok(self
            .state
            .read()
            .edit_requests
            .values()
            .find(|r| r.penilaian_id == penilaian_id && r.status == EditRequestStatus::Pending)
            .cloned())
    }

    async fn list_for_penilaian(&self, penilaian_id: Uuid) -> StoreResult<Vec<EditRequest>> {
        let mut all: Vec<EditRequest> = self
            .state
            .read()
            .edit_requests
            .values()
            .filter(|r| r.penilaian_id == penilaian_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn commit_decision(&self, request: &EditRequest, change: StatusChange) -> StoreResult<EditRequest> {
        let mut state = self.state.write();
        let stored = state
            .edit_requests
            .get_mut(&request.id)
            .ok_or_else(|| missing("edit_request", request.id))?;
        if stored.status != EditRequestStatus::Pending {
            return Err(StoreError::StaleVersion);
        }
        *stored = request.clone();
        state.apply(change)?;
        Ok(request.clone())
    }
}

// ===== Image store =====

/// Keeps nothing on disk; remembers which references were handed out and removed
#[derive(Default)]
pub struct MemoryImageStore {
    stored: Mutex<Vec<SignatureRef>>,
    removed: Mutex<Vec<SignatureRef>>,
}

impl MemoryImageStore {
    pub fn stored(&self) -> Vec<SignatureRef> {
        self.stored.lock().clone()
    }

    pub fn removed(&self) -> Vec<SignatureRef> {
        self.removed.lock().clone()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(&self, category: &str, image: &SignatureImage) -> anyhow::Result<SignatureRef> {
        let reference = SignatureRef::new(format!(
            "{category}/{}.{}",
            Uuid::new_v4(),
            image.format().extension()
        ));
        self.stored.lock().push(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &SignatureRef) -> anyhow::Result<()> {
        self.removed.lock().push(reference.clone());
        Ok(())
    }
}

// ===== Fixture =====

/// Coordinator U1 owns one request assigned to team T1 (Ketua + Petugas)
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub images: Arc<MemoryImageStore>,
    pub service: Arc<Service>,
    pub admin: Actor,
    pub koordinator: Actor,
    pub ketua: Actor,
    pub petugas: Actor,
    /// Ketua of another team
    pub outsider: Actor,
    pub sekretariat: Actor,
    pub team_id: Uuid,
    pub pemegang_id: Uuid,
    pub permohonan_id: Uuid,
}

fn user(name: &str, role: Role) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@dinas.go.id", name.to_lowercase().replace(' ', ".")),
        role,
        created_at: now,
        updated_at: now,
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();

        let admin = user("Admin", Role::Admin);
        let koordinator = user("Budi Koordinator", Role::KoordinatorLapangan);
        let ketua = user("Sari Ketua", Role::KetuaTim);
        let petugas = user("Andi Petugas", Role::PetugasLapangan);
        let outsider = user("Rina Ketua", Role::KetuaTim);
        let sekretariat = user("Dewi Sekretariat", Role::Sekretariat);
        for u in [&admin, &koordinator, &ketua, &petugas, &outsider, &sekretariat] {
            store.seed_user(u.clone());
        }

        let team = Team {
            id: Uuid::new_v4(),
            name: "T1".to_string(),
            members: vec![
                Membership {
                    user_id: ketua.id,
                    role: TeamRole::KetuaTim,
                },
                Membership {
                    user_id: petugas.id,
                    role: TeamRole::PetugasLapangan,
                },
            ],
            created_at: now,
            updated_at: now,
        };
        let other_team = Team {
            id: Uuid::new_v4(),
            name: "T2".to_string(),
            members: vec![Membership {
                user_id: outsider.id,
                role: TeamRole::KetuaTim,
            }],
            created_at: now,
            updated_at: now,
        };
        let team_id = team.id;
        store.seed_team(team);
        store.seed_team(other_team);

        let pemegang = Pemegang {
            id: Uuid::new_v4(),
            nama: "CV Maju".to_string(),
            nomor_identitas: "9120001234567".to_string(),
            kegiatan_usaha: "Perdagangan eceran".to_string(),
            alamat: "Jl. Merdeka 1".to_string(),
            kontak: None,
            created_at: now,
            updated_at: now,
        };
        let pemegang_id = pemegang.id;
        store.seed_pemegang(pemegang);

        let permohonan = PermohonanPenilaian {
            id: Uuid::new_v4(),
            nomor_permohonan: "PMP-20260101-0001".to_string(),
            pemegang_id,
            tim_id: Some(team_id),
            penanggung_jawab_id: Some(koordinator.id),
            skor_prioritas: 50,
            status: PermohonanStatus::Baru,
            berita_acara_id: None,
            created_at: now,
            updated_at: now,
        };
        let permohonan_id = permohonan.id;
        store.seed_permohonan(permohonan);

        let images = Arc::new(MemoryImageStore::default());
        let service = Arc::new(Service::new(
            Repositories::from_store(store.clone()),
            images.clone(),
            Arc::new(NoOpEventPublisher),
            config,
        ));

        let actor = |u: &User| Actor::new(u.id, u.role);
        Self {
            admin: actor(&admin),
            koordinator: actor(&koordinator),
            ketua: actor(&ketua),
            petugas: actor(&petugas),
            outsider: actor(&outsider),
            sekretariat: actor(&sekretariat),
            store,
            images,
            service,
            team_id,
            pemegang_id,
            permohonan_id,
        }
    }

    /// Initiate the seeded request's case and return its id
    pub async fn initiate(&self) -> Uuid {
        let (kasus, created) = self
            .service
            .initiate_kasus(&self.koordinator, self.permohonan_id)
            .await
            .unwrap();
        assert!(created);
        kasus.id
    }

    /// Submit a compliant assessment signed by the Ketua
    pub async fn submit(&self, kasus_id: Uuid) -> Penilaian {
        self.service
            .submit_penilaian(&self.ketua, kasus_id, compliant_submission(self.ketua.user_id))
            .await
            .unwrap()
    }

    /// Case with a submitted assessment, walked to a verified outcome
    pub async fn finalized(&self) -> (Uuid, Penilaian) {
        let kasus_id = self.initiate().await;
        let penilaian = self.submit(kasus_id).await;
        self.store.set_kasus_status(kasus_id, KasusStatus::MenungguPenilaian);
        self.service
            .verify_kasus(&self.ketua, kasus_id, Some("Patuh"))
            .await
            .unwrap();
        (kasus_id, penilaian)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Input builders =====

pub fn desk_study(hasil: &str) -> DeskStudyInput {
    DeskStudyInput {
        pernyataan_lokasi: Some("Jl. Merdeka 1".into()),
        pernyataan_kegiatan: Some("Perdagangan eceran".into()),
        jenis_rencana_tata_ruang: Some("RDTR".into()),
        arahan_rencana_tata_ruang: Some("Zona perdagangan dan jasa".into()),
        hasil_kesesuaian: Some(hasil.into()),
    }
}

pub fn pemeriksaan() -> Vec<PemeriksaanInput> {
    (1..=8)
        .map(|i| PemeriksaanInput {
            pernyataan: Some(format!("Butir pemeriksaan {i}")),
            hasil: Some("Sesuai".into()),
        })
        .collect()
}

pub fn pengukuran() -> Vec<PengukuranInput> {
    vec![PengukuranInput {
        parameter: Some("KDB".into()),
        nilai: Some("60".into()),
        status: Some("Sesuai".into()),
    }]
}

pub fn signature(user_id: Uuid) -> SignatureInput {
    SignatureInput {
        user_id: Some(user_id),
        signature: Some(PNG_DATA_URI.to_string()),
    }
}

pub fn compliant_submission(signer: Uuid) -> PenilaianSubmission {
    PenilaianSubmission {
        desk_study: vec![desk_study("Sesuai")],
        pemeriksaan: Some(pemeriksaan()),
        pengukuran: Some(pengukuran()),
        catatan: Some("Lokasi sesuai rencana tata ruang".into()),
        tanda_tangan: vec![signature(signer)],
    }
}

pub fn tanggal() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default()
}
