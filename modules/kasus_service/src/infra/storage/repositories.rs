//! SeaORM repository implementations
//!
//! Writes that touch more than one row open a transaction on the shared connection and apply
//! the accompanying [`StatusChange`] before committing.

use crate::contract::{
    BaHasilPenilaian, BaPemeriksaan, BeritaAcara, EditRequest, EditRequestStatus, FormulirAnalisisPenilaian,
    Kasus, Pemegang, Penilaian, PermohonanFilter, PermohonanPenilaian, Survei, Team, User,
};
use crate::domain::repository::{
    DirectoryRepository, DokumenRepository, EditRequestRepository, KasusRepository, PemegangRepository,
    PermohonanRepository, Repositories, StatusChange, StoreError, StoreResult,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entity;
use super::mapper;

/// Build every repository over one connection
pub fn sea_orm_repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        directory: Arc::new(SeaOrmDirectoryRepository::new(db.clone())),
        pemegang: Arc::new(SeaOrmPemegangRepository::new(db.clone())),
        permohonan: Arc::new(SeaOrmPermohonanRepository::new(db.clone())),
        kasus: Arc::new(SeaOrmKasusRepository::new(db.clone())),
        dokumen: Arc::new(SeaOrmDokumenRepository::new(db.clone())),
        edit_requests: Arc::new(SeaOrmEditRequestRepository::new(db)),
    }
}

fn db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
        _ => StoreError::Other(err.into()),
    }
}

fn missing(entity: &str, id: Uuid) -> StoreError {
    StoreError::Other(anyhow!("{entity} {id} does not exist"))
}

/// Apply the status side effects inside the caller's connection or transaction
async fn apply_change<C: ConnectionTrait>(conn: &C, change: StatusChange) -> StoreResult<()> {
    let now = Utc::now();
    if let Some((kasus_id, status)) = change.kasus {
        let result = entity::kasus::Entity::update_many()
            .col_expr(entity::kasus::Column::Status, Expr::value(status.as_str()))
            .col_expr(entity::kasus::Column::UpdatedAt, Expr::value(now))
            .filter(entity::kasus::Column::Id.eq(kasus_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(missing("kasus", kasus_id));
        }
    }
    if let Some((permohonan_id, status)) = change.permohonan {
        let result = entity::permohonan_penilaian::Entity::update_many()
            .col_expr(entity::permohonan_penilaian::Column::Status, Expr::value(status.as_str()))
            .col_expr(entity::permohonan_penilaian::Column::UpdatedAt, Expr::value(now))
            .filter(entity::permohonan_penilaian::Column::Id.eq(permohonan_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(missing("permohonan", permohonan_id));
        }
    }
    Ok(())
}

async fn load_members<C: ConnectionTrait>(conn: &C, team_id: Uuid) -> StoreResult<Vec<entity::team_members::Model>> {
    entity::team_members::Entity::find()
        .filter(entity::team_members::Column::TeamId.eq(team_id))
        .all(conn)
        .await
        .map_err(db_err)
}

async fn insert_members<C: ConnectionTrait>(conn: &C, team: &Team) -> StoreResult<()> {
    let rows = mapper::membership_rows(team);
    if rows.is_empty() {
        return Ok(());
    }
    entity::team_members::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

// ===== Directory Repository =====

pub struct SeaOrmDirectoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDirectoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectoryRepository for SeaOrmDirectoryRepository {
    async fn create_user(&self, user: &User) -> StoreResult<User> {
        let active: entity::users::ActiveModel = user.into();
        let row = entity::users::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.try_into()?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = entity::users::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = entity::users::Entity::find()
            .order_by_asc(entity::users::Column::Name)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(User::try_from).collect::<anyhow::Result<_>>()?)
    }

    async fn create_team(&self, team: &Team) -> StoreResult<Team> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let active: entity::teams::ActiveModel = team.into();
        entity::teams::Entity::insert(active)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        insert_members(&txn, team).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(team.clone())
    }

    async fn update_team(&self, team: &Team) -> StoreResult<Team> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut active: entity::teams::ActiveModel = team.into();
        active.created_at = NotSet;
        entity::teams::Entity::update(active)
            .exec(&txn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => missing("tim", team.id),
                other => db_err(other),
            })?;

        entity::team_members::Entity::delete_many()
            .filter(entity::team_members::Column::TeamId.eq(team.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        insert_members(&txn, team).await?;
        txn.commit().await.map_err(db_err)?;

        self.find_team(team.id).await?.ok_or_else(|| missing("tim", team.id))
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let Some(row) = entity::teams::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let members = load_members(&*self.db, id).await?;
        Ok(Some(mapper::team_from_rows(row, members)?))
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let rows = entity::teams::Entity::find()
            .order_by_asc(entity::teams::Column::Name)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        let mut members: HashMap<Uuid, Vec<entity::team_members::Model>> = HashMap::new();
        for m in entity::team_members::Entity::find()
            .all(&*self.db)
            .await
            .map_err(db_err)?
        {
            members.entry(m.team_id).or_default().push(m);
        }

        let teams = rows
            .into_iter()
            .map(|row| {
                let own = members.remove(&row.id).unwrap_or_default();
                mapper::team_from_rows(row, own)
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(teams)
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;
        entity::permohonan_penilaian::Entity::update_many()
            .col_expr(entity::permohonan_penilaian::Column::TimId, Expr::value(Option::<Uuid>::None))
            .filter(entity::permohonan_penilaian::Column::TimId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        entity::kasus::Entity::update_many()
            .col_expr(entity::kasus::Column::TimId, Expr::value(Option::<Uuid>::None))
            .filter(entity::kasus::Column::TimId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        entity::team_members::Entity::delete_many()
            .filter(entity::team_members::Column::TeamId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let result = entity::teams::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

// ===== Pemegang Repository =====

pub struct SeaOrmPemegangRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPemegangRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PemegangRepository for SeaOrmPemegangRepository {
    async fn create(&self, pemegang: &Pemegang) -> StoreResult<Pemegang> {
        let active: entity::pemegang::ActiveModel = pemegang.into();
        let row = entity::pemegang::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.into())
    }

    async fn update(&self, pemegang: &Pemegang) -> StoreResult<Pemegang> {
        let mut active: entity::pemegang::ActiveModel = pemegang.into();
        active.created_at = NotSet;
        let row = entity::pemegang::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => missing("pemegang", pemegang.id),
                other => db_err(other),
            })?;
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Pemegang>> {
        let row = entity::pemegang::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_all(&self) -> StoreResult<Vec<Pemegang>> {
        let rows = entity::pemegang::Entity::find()
            .order_by_asc(entity::pemegang::Column::Nama)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = entity::pemegang::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn is_referenced(&self, id: Uuid) -> StoreResult<bool> {
        let requests = entity::permohonan_penilaian::Entity::find()
            .filter(entity::permohonan_penilaian::Column::PemegangId.eq(id))
            .count(&*self.db)
            .await
            .map_err(db_err)?;
        if requests > 0 {
            return Ok(true);
        }
        let cases = entity::kasus::Entity::find()
            .filter(entity::kasus::Column::PemegangId.eq(id))
            .count(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(cases > 0)
    }
}

// ===== Permohonan Repository =====

pub struct SeaOrmPermohonanRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPermohonanRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermohonanRepository for SeaOrmPermohonanRepository {
    async fn create(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian> {
        let active: entity::permohonan_penilaian::ActiveModel = permohonan.into();
        let row = entity::permohonan_penilaian::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.try_into()?)
    }

    async fn update(&self, permohonan: &PermohonanPenilaian) -> StoreResult<PermohonanPenilaian> {
        let mut active: entity::permohonan_penilaian::ActiveModel = permohonan.into();
        active.nomor_permohonan = NotSet;
        active.created_at = NotSet;
        let row = entity::permohonan_penilaian::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => missing("permohonan", permohonan.id),
                other => db_err(other),
            })?;
        Ok(row.try_into()?)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<PermohonanPenilaian>> {
        let row = entity::permohonan_penilaian::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(PermohonanPenilaian::try_from).transpose()?)
    }

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<PermohonanPenilaian>> {
        let row = entity::permohonan_penilaian::Entity::find()
            .filter(entity::permohonan_penilaian::Column::NomorPermohonan.eq(nomor))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(PermohonanPenilaian::try_from).transpose()?)
    }

    async fn list(
        &self,
        filter: PermohonanFilter,
        limit: u64,
        offset: u64,
    ) -> StoreResult<(Vec<PermohonanPenilaian>, u64)> {
        use entity::permohonan_penilaian::{Column, Entity};

        let mut query = Entity::find();
        if filter == PermohonanFilter::Pending {
            // Requests whose case already carries an assessment are no longer pending
            let assessed = Query::select()
                .column((entity::kasus::Entity, entity::kasus::Column::NomorPermohonan))
                .from(entity::kasus::Entity)
                .inner_join(
                    entity::penilaian::Entity,
                    Expr::col((entity::penilaian::Entity, entity::penilaian::Column::KasusId))
                        .equals((entity::kasus::Entity, entity::kasus::Column::Id)),
                )
                .to_owned();
            query = query.filter(Column::NomorPermohonan.not_in_subquery(assessed));
        }

        let total = query.clone().count(&*self.db).await.map_err(db_err)?;
        let rows = query
            .order_by_desc(Column::SkorPrioritas)
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(PermohonanPenilaian::try_from)
            .collect::<anyhow::Result<_>>()?;
        Ok((items, total))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;
        entity::berita_acara::Entity::delete_many()
            .filter(entity::berita_acara::Column::PermohonanId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let result = entity::permohonan_penilaian::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

// ===== Kasus Repository =====

pub struct SeaOrmKasusRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmKasusRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KasusRepository for SeaOrmKasusRepository {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Kasus>> {
        let row = entity::kasus::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Kasus::try_from).transpose()?)
    }

    async fn find_by_nomor(&self, nomor: &str) -> StoreResult<Option<Kasus>> {
        let row = entity::kasus::Entity::find()
            .filter(entity::kasus::Column::NomorPermohonan.eq(nomor))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Kasus::try_from).transpose()?)
    }

    async fn list_all(&self) -> StoreResult<Vec<Kasus>> {
        let rows = entity::kasus::Entity::find()
            .order_by_desc(entity::kasus::Column::SkorPrioritas)
            .order_by_desc(entity::kasus::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Kasus::try_from).collect::<anyhow::Result<_>>()?)
    }

    async fn upsert_by_nomor(&self, kasus: &Kasus, change: StatusChange) -> StoreResult<(Kasus, bool)> {
        use sea_orm::ActiveValue::Set;

        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = entity::kasus::Entity::find()
            .filter(entity::kasus::Column::NomorPermohonan.eq(kasus.nomor_permohonan.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let (stored, created) = match existing {
            Some(row) => {
                // Status, type and identity stay with the stored case
                let active = entity::kasus::ActiveModel {
                    id: Set(row.id),
                    skor_prioritas: Set(i32::from(kasus.skor_prioritas)),
                    tim_id: Set(kasus.tim_id),
                    penanggung_jawab_id: Set(kasus.penanggung_jawab_id),
                    pemegang_id: Set(kasus.pemegang_id),
                    updated_at: Set(kasus.updated_at),
                    ..Default::default()
                };
                let row = entity::kasus::Entity::update(active)
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                (row, false)
            }
            None => {
                let active: entity::kasus::ActiveModel = kasus.into();
                let row = entity::kasus::Entity::insert(active)
                    .exec_with_returning(&txn)
                    .await
                    .map_err(db_err)?;
                (row, true)
            }
        };

        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)?;
        Ok((stored.try_into()?, created))
    }

    async fn update(&self, kasus: &Kasus) -> StoreResult<Kasus> {
        let mut active: entity::kasus::ActiveModel = kasus.into();
        active.nomor_permohonan = NotSet;
        active.created_at = NotSet;
        let row = entity::kasus::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => missing("kasus", kasus.id),
                other => db_err(other),
            })?;
        Ok(row.try_into()?)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let penilaian = entity::penilaian::Entity::find()
            .filter(entity::penilaian::Column::KasusId.eq(id))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if let Some(penilaian) = penilaian {
            entity::edit_requests::Entity::delete_many()
                .filter(entity::edit_requests::Column::PenilaianId.eq(penilaian.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            entity::ba_pemeriksaan::Entity::delete_many()
                .filter(entity::ba_pemeriksaan::Column::PenilaianId.eq(penilaian.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            entity::ba_hasil_penilaian::Entity::delete_many()
                .filter(entity::ba_hasil_penilaian::Column::PenilaianId.eq(penilaian.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            entity::formulir_analisis_penilaian::Entity::delete_many()
                .filter(entity::formulir_analisis_penilaian::Column::PenilaianId.eq(penilaian.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            entity::penilaian::Entity::delete_by_id(penilaian.id)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }
        entity::survei::Entity::delete_many()
            .filter(entity::survei::Column::KasusId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let result = entity::kasus::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn apply_status(&self, change: StatusChange) -> StoreResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;
        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)
    }

    async fn find_penilaian(&self, kasus_id: Uuid) -> StoreResult<Option<Penilaian>> {
        let row = entity::penilaian::Entity::find()
            .filter(entity::penilaian::Column::KasusId.eq(kasus_id))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Penilaian::try_from).transpose()?)
    }

    async fn find_penilaian_by_id(&self, id: Uuid) -> StoreResult<Option<Penilaian>> {
        let row = entity::penilaian::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Penilaian::try_from).transpose()?)
    }

    async fn commit_penilaian(&self, penilaian: &Penilaian, change: StatusChange) -> StoreResult<Penilaian> {
        use sea_orm::ActiveValue::Set;

        let next_version = penilaian.version + 1;
        let mut active = mapper::penilaian_active(penilaian)?;
        active.version = Set(next_version);

        let txn = self.db.begin().await.map_err(db_err)?;
        if penilaian.version == 0 {
            // A concurrent first write holds the unique kasus_id
            entity::penilaian::Entity::insert(active)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| match db_err(e) {
                    StoreError::UniqueViolation(_) => StoreError::StaleVersion,
                    other => other,
                })?;
        } else {
            active.created_at = NotSet;
            let result = entity::penilaian::Entity::update_many()
                .set(active)
                .filter(entity::penilaian::Column::Id.eq(penilaian.id))
                .filter(entity::penilaian::Column::Version.eq(penilaian.version))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            if result.rows_affected == 0 {
                return Err(StoreError::StaleVersion);
            }
        }
        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)?;

        let mut stored = penilaian.clone();
        stored.version = next_version;
        Ok(stored)
    }

    async fn create_survei(&self, survei: &Survei, change: StatusChange) -> StoreResult<Survei> {
        let active = mapper::survei_active(survei)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        entity::survei::Entity::insert(active)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(survei.clone())
    }

    async fn list_survei(&self, kasus_id: Uuid) -> StoreResult<Vec<Survei>> {
        let rows = entity::survei::Entity::find()
            .filter(entity::survei::Column::KasusId.eq(kasus_id))
            .order_by_desc(entity::survei::Column::Tanggal)
            .order_by_desc(entity::survei::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Survei::try_from).collect::<anyhow::Result<_>>()?)
    }
}

// ===== Dokumen Repository =====

pub struct SeaOrmDokumenRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDokumenRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DokumenRepository for SeaOrmDokumenRepository {
    async fn find_berita_acara(&self, id: Uuid) -> StoreResult<Option<BeritaAcara>> {
        let row = entity::berita_acara::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(BeritaAcara::try_from).transpose()?)
    }

    async fn find_berita_acara_by_permohonan(&self, permohonan_id: Uuid) -> StoreResult<Option<BeritaAcara>> {
        let row = entity::berita_acara::Entity::find()
            .filter(entity::berita_acara::Column::PermohonanId.eq(permohonan_id))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(BeritaAcara::try_from).transpose()?)
    }

    async fn commit_berita_acara(&self, berita_acara: &BeritaAcara, change: StatusChange) -> StoreResult<BeritaAcara> {
        let mut active = mapper::berita_acara_active(berita_acara)?;
        let txn = self.db.begin().await.map_err(db_err)?;

        let exists = entity::berita_acara::Entity::find_by_id(berita_acara.id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_some();
        if exists {
            active.created_at = NotSet;
            entity::berita_acara::Entity::update(active)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        } else {
            entity::berita_acara::Entity::insert(active)
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }

        let linked = entity::permohonan_penilaian::Entity::update_many()
            .col_expr(
                entity::permohonan_penilaian::Column::BeritaAcaraId,
                Expr::value(Some(berita_acara.id)),
            )
            .filter(entity::permohonan_penilaian::Column::Id.eq(berita_acara.permohonan_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if linked.rows_affected == 0 {
            return Err(missing("permohonan", berita_acara.permohonan_id));
        }

        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(berita_acara.clone())
    }

    async fn find_ba_pemeriksaan(&self, penilaian_id: Uuid) -> StoreResult<Option<BaPemeriksaan>> {
        let row = entity::ba_pemeriksaan::Entity::find()
            .filter(entity::ba_pemeriksaan::Column::PenilaianId.eq(penilaian_id))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(BaPemeriksaan::try_from).transpose()?)
    }

    async fn find_ba_pemeriksaan_by_nomor(&self, nomor_ba: &str) -> StoreResult<Option<BaPemeriksaan>> {
        let row = entity::ba_pemeriksaan::Entity::find()
            .filter(entity::ba_pemeriksaan::Column::NomorBa.eq(nomor_ba))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(BaPemeriksaan::try_from).transpose()?)
    }

    async fn save_ba_pemeriksaan(&self, ba: &BaPemeriksaan) -> StoreResult<BaPemeriksaan> {
        let mut active = mapper::ba_pemeriksaan_active(ba)?;
        let exists = entity::ba_pemeriksaan::Entity::find_by_id(ba.id)
            .one(&*self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if exists {
            active.created_at = NotSet;
            entity::ba_pemeriksaan::Entity::update(active)
                .exec(&*self.db)
                .await
                .map_err(db_err)?;
        } else {
            entity::ba_pemeriksaan::Entity::insert(active)
                .exec_without_returning(&*self.db)
                .await
                .map_err(db_err)?;
        }
        Ok(ba.clone())
    }

    async fn find_ba_hasil(&self, penilaian_id: Uuid) -> StoreResult<Option<BaHasilPenilaian>> {
        let row = entity::ba_hasil_penilaian::Entity::find()
            .filter(entity::ba_hasil_penilaian::Column::PenilaianId.eq(penilaian_id))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(BaHasilPenilaian::try_from).transpose()?)
    }

    async fn save_ba_hasil(&self, ba: &BaHasilPenilaian) -> StoreResult<BaHasilPenilaian> {
        let mut active = mapper::ba_hasil_active(ba)?;
        let exists = entity::ba_hasil_penilaian::Entity::find_by_id(ba.id)
            .one(&*self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if exists {
            active.created_at = NotSet;
            entity::ba_hasil_penilaian::Entity::update(active)
                .exec(&*self.db)
                .await
                .map_err(db_err)?;
        } else {
            entity::ba_hasil_penilaian::Entity::insert(active)
                .exec_without_returning(&*self.db)
                .await
                .map_err(db_err)?;
        }
        Ok(ba.clone())
    }

    async fn find_formulir(&self, penilaian_id: Uuid) -> StoreResult<Option<FormulirAnalisisPenilaian>> {
        let row = entity::formulir_analisis_penilaian::Entity::find()
            .filter(entity::formulir_analisis_penilaian::Column::PenilaianId.eq(penilaian_id))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(FormulirAnalisisPenilaian::try_from).transpose()?)
    }

    async fn save_formulir(&self, form: &FormulirAnalisisPenilaian) -> StoreResult<FormulirAnalisisPenilaian> {
        let mut active = mapper::formulir_active(form)?;
        let exists = entity::formulir_analisis_penilaian::Entity::find_by_id(form.id)
            .one(&*self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if exists {
            active.created_at = NotSet;
            entity::formulir_analisis_penilaian::Entity::update(active)
                .exec(&*self.db)
                .await
                .map_err(db_err)?;
        } else {
            entity::formulir_analisis_penilaian::Entity::insert(active)
                .exec_without_returning(&*self.db)
                .await
                .map_err(db_err)?;
        }
        Ok(form.clone())
    }
}

// ===== Edit Request Repository =====

pub struct SeaOrmEditRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmEditRequestRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EditRequestRepository for SeaOrmEditRequestRepository {
    async fn create(&self, request: &EditRequest) -> StoreResult<EditRequest> {
        let active: entity::edit_requests::ActiveModel = request.into();
        entity::edit_requests::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(request.clone())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<EditRequest>> {
        let row = entity::edit_requests::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(EditRequest::try_from).transpose()?)
    }

    async fn find_pending(&self, penilaian_id: Uuid) -> StoreResult<Option<EditRequest>> {
        let row = entity::edit_requests::Entity::find()
            .filter(entity::edit_requests::Column::PenilaianId.eq(penilaian_id))
            .filter(entity::edit_requests::Column::Status.eq(EditRequestStatus::Pending.as_str()))
            .one(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(EditRequest::try_from).transpose()?)
    }

    async fn list_for_penilaian(&self, penilaian_id: Uuid) -> StoreResult<Vec<EditRequest>> {
        let rows = entity::edit_requests::Entity::find()
            .filter(entity::edit_requests::Column::PenilaianId.eq(penilaian_id))
            .order_by_desc(entity::edit_requests::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(EditRequest::try_from).collect::<anyhow::Result<_>>()?)
    }

    async fn commit_decision(&self, request: &EditRequest, change: StatusChange) -> StoreResult<EditRequest> {
        use entity::edit_requests::{Column, Entity};

        let txn = self.db.begin().await.map_err(db_err)?;
        let result = Entity::update_many()
            .col_expr(Column::Status, Expr::value(request.status.as_str()))
            .col_expr(Column::AlasanPenolakan, Expr::value(request.alasan_penolakan.clone()))
            .col_expr(Column::ProcessedBy, Expr::value(request.processed_by))
            .col_expr(Column::ProcessedAt, Expr::value(request.processed_at))
            .filter(Column::Id.eq(request.id))
            .filter(Column::Status.eq(EditRequestStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::StaleVersion);
        }
        apply_change(&txn, change).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(request.clone())
    }
}
