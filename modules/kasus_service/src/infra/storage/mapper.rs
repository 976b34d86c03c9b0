//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Reading a row back can fail when a
//! stored label or JSON section no longer parses, so the entity → model direction is `TryFrom`.

use super::entity;
use crate::contract::{
    AlasanTidakTerlaksana, BaHasilPenilaian, BaPemeriksaan, BeritaAcara, DeskStudyEntry, EditRequest,
    FormulirAnalisisPenilaian, Kasus, Membership, Pemegang, PemeriksaanEntry, Penilaian, PengukuranEntry,
    PermohonanPenilaian, SignatureRef, SignatureSet, Survei, Team, User,
};
use anyhow::{anyhow, Context};
use sea_orm::ActiveValue::Set;
use std::collections::BTreeMap;
use uuid::Uuid;

fn score(value: i32) -> anyhow::Result<u8> {
    u8::try_from(value).with_context(|| format!("priority score out of range: {value}"))
}

// ===== Directory =====

impl TryFrom<entity::users::Model> for User {
    type Error = anyhow::Error;

    fn try_from(row: entity::users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&User> for entity::users::ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role.as_str().to_string()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}

/// Assemble a team from its row and membership rows
pub fn team_from_rows(
    row: entity::teams::Model,
    members: Vec<entity::team_members::Model>,
) -> anyhow::Result<Team> {
    let members = members
        .into_iter()
        .map(|m| {
            Ok(Membership {
                user_id: m.user_id,
                role: m.role.parse()?,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Team {
        id: row.id,
        name: row.name,
        members,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl From<&Team> for entity::teams::ActiveModel {
    fn from(team: &Team) -> Self {
        Self {
            id: Set(team.id),
            name: Set(team.name.clone()),
            created_at: Set(team.created_at),
            updated_at: Set(team.updated_at),
        }
    }
}

pub fn membership_rows(team: &Team) -> Vec<entity::team_members::ActiveModel> {
    team.members
        .iter()
        .map(|m| entity::team_members::ActiveModel {
            team_id: Set(team.id),
            user_id: Set(m.user_id),
            role: Set(m.role.as_str().to_string()),
        })
        .collect()
}

// ===== Pemegang / Permohonan / Kasus =====

impl From<entity::pemegang::Model> for Pemegang {
    fn from(row: entity::pemegang::Model) -> Self {
        Self {
            id: row.id,
            nama: row.nama,
            nomor_identitas: row.nomor_identitas,
            kegiatan_usaha: row.kegiatan_usaha,
            alamat: row.alamat,
            kontak: row.kontak,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Pemegang> for entity::pemegang::ActiveModel {
    fn from(p: &Pemegang) -> Self {
        Self {
            id: Set(p.id),
            nama: Set(p.nama.clone()),
            nomor_identitas: Set(p.nomor_identitas.clone()),
            kegiatan_usaha: Set(p.kegiatan_usaha.clone()),
            alamat: Set(p.alamat.clone()),
            kontak: Set(p.kontak.clone()),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}

impl TryFrom<entity::permohonan_penilaian::Model> for PermohonanPenilaian {
    type Error = anyhow::Error;

    fn try_from(row: entity::permohonan_penilaian::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            nomor_permohonan: row.nomor_permohonan,
            pemegang_id: row.pemegang_id,
            tim_id: row.tim_id,
            penanggung_jawab_id: row.penanggung_jawab_id,
            skor_prioritas: score(row.skor_prioritas)?,
            status: row.status.parse()?,
            berita_acara_id: row.berita_acara_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&PermohonanPenilaian> for entity::permohonan_penilaian::ActiveModel {
    fn from(p: &PermohonanPenilaian) -> Self {
        Self {
            id: Set(p.id),
            nomor_permohonan: Set(p.nomor_permohonan.clone()),
            pemegang_id: Set(p.pemegang_id),
            tim_id: Set(p.tim_id),
            penanggung_jawab_id: Set(p.penanggung_jawab_id),
            skor_prioritas: Set(i32::from(p.skor_prioritas)),
            status: Set(p.status.as_str().to_string()),
            berita_acara_id: Set(p.berita_acara_id),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}

impl TryFrom<entity::kasus::Model> for Kasus {
    type Error = anyhow::Error;

    fn try_from(row: entity::kasus::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            jenis: row.jenis.parse()?,
            nomor_permohonan: row.nomor_permohonan,
            status: row.status.parse()?,
            skor_prioritas: score(row.skor_prioritas)?,
            tim_id: row.tim_id,
            penanggung_jawab_id: row.penanggung_jawab_id,
            pemegang_id: row.pemegang_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Kasus> for entity::kasus::ActiveModel {
    fn from(k: &Kasus) -> Self {
        Self {
            id: Set(k.id),
            jenis: Set(k.jenis.as_str().to_string()),
            nomor_permohonan: Set(k.nomor_permohonan.clone()),
            status: Set(k.status.as_str().to_string()),
            skor_prioritas: Set(i32::from(k.skor_prioritas)),
            tim_id: Set(k.tim_id),
            penanggung_jawab_id: Set(k.penanggung_jawab_id),
            pemegang_id: Set(k.pemegang_id),
            created_at: Set(k.created_at),
            updated_at: Set(k.updated_at),
        }
    }
}

// ===== Penilaian =====

impl TryFrom<entity::penilaian::Model> for Penilaian {
    type Error = anyhow::Error;

    fn try_from(row: entity::penilaian::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            kasus_id: row.kasus_id,
            desk_study: desk_study_from_json(row.desk_study)?,
            pemeriksaan: pemeriksaan_from_json(row.pemeriksaan)?,
            pengukuran: pengukuran_from_json(row.pengukuran)?,
            catatan: row.catatan,
            tanda_tangan_tim: signatures_from_json(row.tanda_tangan_tim)?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Active model for a penilaian write; `version` is set by the repository
pub fn penilaian_active(p: &Penilaian) -> anyhow::Result<entity::penilaian::ActiveModel> {
    Ok(entity::penilaian::ActiveModel {
        id: Set(p.id),
        kasus_id: Set(p.kasus_id),
        desk_study: Set(desk_study_to_json(&p.desk_study)?),
        pemeriksaan: Set(pemeriksaan_to_json(&p.pemeriksaan)?),
        pengukuran: Set(pengukuran_to_json(&p.pengukuran)?),
        catatan: Set(p.catatan.clone()),
        tanda_tangan_tim: Set(signatures_to_json(&p.tanda_tangan_tim)?),
        version: Set(p.version),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    })
}

// ===== Survei =====

impl TryFrom<entity::survei::Model> for Survei {
    type Error = anyhow::Error;

    fn try_from(row: entity::survei::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            kasus_id: row.kasus_id,
            petugas_id: row.petugas_id,
            tanggal: row.tanggal,
            latitude: row.latitude,
            longitude: row.longitude,
            pemeriksaan: pemeriksaan_from_json(row.pemeriksaan)?,
            pengukuran: pengukuran_from_json(row.pengukuran)?,
            foto_dokumentasi: row.foto_dokumentasi.map(SignatureRef::new),
            tanda_tangan_petugas: SignatureRef::new(row.tanda_tangan_petugas),
            nama_perwakilan: row.nama_perwakilan,
            tanda_tangan_perwakilan: SignatureRef::new(row.tanda_tangan_perwakilan),
            catatan: row.catatan,
            created_at: row.created_at,
        })
    }
}

pub fn survei_active(s: &Survei) -> anyhow::Result<entity::survei::ActiveModel> {
    Ok(entity::survei::ActiveModel {
        id: Set(s.id),
        kasus_id: Set(s.kasus_id),
        petugas_id: Set(s.petugas_id),
        tanggal: Set(s.tanggal),
        latitude: Set(s.latitude),
        longitude: Set(s.longitude),
        pemeriksaan: Set(pemeriksaan_to_json(&s.pemeriksaan)?),
        pengukuran: Set(pengukuran_to_json(&s.pengukuran)?),
        foto_dokumentasi: Set(s.foto_dokumentasi.as_ref().map(|r| r.as_str().to_string())),
        tanda_tangan_petugas: Set(s.tanda_tangan_petugas.as_str().to_string()),
        nama_perwakilan: Set(s.nama_perwakilan.clone()),
        tanda_tangan_perwakilan: Set(s.tanda_tangan_perwakilan.as_str().to_string()),
        catatan: Set(s.catatan.clone()),
        created_at: Set(s.created_at),
    })
}

// ===== Documents =====

impl TryFrom<entity::berita_acara::Model> for BeritaAcara {
    type Error = anyhow::Error;

    fn try_from(row: entity::berita_acara::Model) -> Result<Self, Self::Error> {
        let alasan = AlasanTidakTerlaksana::from_parts(&row.alasan, row.alasan_lainnya)
            .ok_or_else(|| anyhow!("unknown non-completion reason: '{}'", row.alasan))?;
        Ok(Self {
            id: row.id,
            permohonan_id: row.permohonan_id,
            pemegang_id: row.pemegang_id,
            penanggung_jawab_id: row.penanggung_jawab_id,
            tanggal: row.tanggal,
            alasan,
            tanda_tangan_tim: signatures_from_json(row.tanda_tangan_tim)?,
            created_at: row.created_at,
        })
    }
}

pub fn berita_acara_active(ba: &BeritaAcara) -> anyhow::Result<entity::berita_acara::ActiveModel> {
    Ok(entity::berita_acara::ActiveModel {
        id: Set(ba.id),
        permohonan_id: Set(ba.permohonan_id),
        pemegang_id: Set(ba.pemegang_id),
        penanggung_jawab_id: Set(ba.penanggung_jawab_id),
        tanggal: Set(ba.tanggal),
        alasan: Set(ba.alasan.label().to_string()),
        alasan_lainnya: Set(ba.alasan.keterangan().map(str::to_string)),
        tanda_tangan_tim: Set(signatures_to_json(&ba.tanda_tangan_tim)?),
        created_at: Set(ba.created_at),
    })
}

impl TryFrom<entity::ba_pemeriksaan::Model> for BaPemeriksaan {
    type Error = anyhow::Error;

    fn try_from(row: entity::ba_pemeriksaan::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            penilaian_id: row.penilaian_id,
            nomor_ba: row.nomor_ba,
            nomor_surat_tugas: row.nomor_surat_tugas,
            tanggal_surat_tugas: row.tanggal_surat_tugas,
            nomor_identifikasi: row.nomor_identifikasi,
            tanda_tangan_tim: signatures_from_json(row.tanda_tangan_tim)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn ba_pemeriksaan_active(ba: &BaPemeriksaan) -> anyhow::Result<entity::ba_pemeriksaan::ActiveModel> {
    Ok(entity::ba_pemeriksaan::ActiveModel {
        id: Set(ba.id),
        penilaian_id: Set(ba.penilaian_id),
        nomor_ba: Set(ba.nomor_ba.clone()),
        nomor_surat_tugas: Set(ba.nomor_surat_tugas.clone()),
        tanggal_surat_tugas: Set(ba.tanggal_surat_tugas),
        nomor_identifikasi: Set(ba.nomor_identifikasi.clone()),
        tanda_tangan_tim: Set(signatures_to_json(&ba.tanda_tangan_tim)?),
        created_at: Set(ba.created_at),
        updated_at: Set(ba.updated_at),
    })
}

impl TryFrom<entity::ba_hasil_penilaian::Model> for BaHasilPenilaian {
    type Error = anyhow::Error;

    fn try_from(row: entity::ba_hasil_penilaian::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            penilaian_id: row.penilaian_id,
            nomor_ba: row.nomor_ba,
            tanggal: row.tanggal,
            hasil: row.hasil.parse()?,
            kesimpulan: row.kesimpulan,
            tanda_tangan_tim: signatures_from_json(row.tanda_tangan_tim)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn ba_hasil_active(ba: &BaHasilPenilaian) -> anyhow::Result<entity::ba_hasil_penilaian::ActiveModel> {
    Ok(entity::ba_hasil_penilaian::ActiveModel {
        id: Set(ba.id),
        penilaian_id: Set(ba.penilaian_id),
        nomor_ba: Set(ba.nomor_ba.clone()),
        tanggal: Set(ba.tanggal),
        hasil: Set(ba.hasil.as_str().to_string()),
        kesimpulan: Set(ba.kesimpulan.clone()),
        tanda_tangan_tim: Set(signatures_to_json(&ba.tanda_tangan_tim)?),
        created_at: Set(ba.created_at),
        updated_at: Set(ba.updated_at),
    })
}

impl TryFrom<entity::formulir_analisis_penilaian::Model> for FormulirAnalisisPenilaian {
    type Error = anyhow::Error;

    fn try_from(row: entity::formulir_analisis_penilaian::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            penilaian_id: row.penilaian_id,
            analisis_desk_study: row.analisis_desk_study,
            analisis_pemeriksaan: row.analisis_pemeriksaan,
            analisis_pengukuran: row.analisis_pengukuran,
            kesimpulan: row.kesimpulan.parse()?,
            rekomendasi: row.rekomendasi,
            tanda_tangan_tim: signatures_from_json(row.tanda_tangan_tim)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn formulir_active(
    form: &FormulirAnalisisPenilaian,
) -> anyhow::Result<entity::formulir_analisis_penilaian::ActiveModel> {
    Ok(entity::formulir_analisis_penilaian::ActiveModel {
        id: Set(form.id),
        penilaian_id: Set(form.penilaian_id),
        analisis_desk_study: Set(form.analisis_desk_study.clone()),
        analisis_pemeriksaan: Set(form.analisis_pemeriksaan.clone()),
        analisis_pengukuran: Set(form.analisis_pengukuran.clone()),
        kesimpulan: Set(form.kesimpulan.as_str().to_string()),
        rekomendasi: Set(form.rekomendasi.clone()),
        tanda_tangan_tim: Set(signatures_to_json(&form.tanda_tangan_tim)?),
        created_at: Set(form.created_at),
        updated_at: Set(form.updated_at),
    })
}

// ===== Edit requests =====

impl TryFrom<entity::edit_requests::Model> for EditRequest {
    type Error = anyhow::Error;

    fn try_from(row: entity::edit_requests::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            penilaian_id: row.penilaian_id,
            requested_by: row.requested_by,
            alasan: row.alasan,
            status: row.status.parse()?,
            alasan_penolakan: row.alasan_penolakan,
            processed_by: row.processed_by,
            processed_at: row.processed_at,
            created_at: row.created_at,
        })
    }
}

impl From<&EditRequest> for entity::edit_requests::ActiveModel {
    fn from(r: &EditRequest) -> Self {
        Self {
            id: Set(r.id),
            penilaian_id: Set(r.penilaian_id),
            requested_by: Set(r.requested_by),
            alasan: Set(r.alasan.clone()),
            status: Set(r.status.as_str().to_string()),
            alasan_penolakan: Set(r.alasan_penolakan.clone()),
            processed_by: Set(r.processed_by),
            processed_at: Set(r.processed_at),
            created_at: Set(r.created_at),
        }
    }
}

// ===== JSON Serialization Helpers =====

/// JSON representation of a desk-study line
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct DeskStudyJson {
    pernyataan_lokasi: String,
    pernyataan_kegiatan: String,
    jenis_rencana_tata_ruang: String,
    arahan_rencana_tata_ruang: String,
    #[serde(default)]
    hasil_kesesuaian: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct PemeriksaanJson {
    pernyataan: String,
    hasil: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct PengukuranJson {
    parameter: String,
    nilai: f64,
    status: String,
}

fn desk_study_to_json(entries: &[DeskStudyEntry]) -> anyhow::Result<serde_json::Value> {
    let rows: Vec<DeskStudyJson> = entries
        .iter()
        .map(|e| DeskStudyJson {
            pernyataan_lokasi: e.pernyataan_lokasi.clone(),
            pernyataan_kegiatan: e.pernyataan_kegiatan.clone(),
            jenis_rencana_tata_ruang: e.jenis_rencana_tata_ruang.clone(),
            arahan_rencana_tata_ruang: e.arahan_rencana_tata_ruang.clone(),
            hasil_kesesuaian: e.hasil_kesesuaian.map(|h| h.as_str().to_string()),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

fn desk_study_from_json(value: serde_json::Value) -> anyhow::Result<Vec<DeskStudyEntry>> {
    let rows: Vec<DeskStudyJson> = serde_json::from_value(value).context("desk_study column")?;
    rows.into_iter()
        .map(|r| {
            Ok(DeskStudyEntry {
                pernyataan_lokasi: r.pernyataan_lokasi,
                pernyataan_kegiatan: r.pernyataan_kegiatan,
                jenis_rencana_tata_ruang: r.jenis_rencana_tata_ruang,
                arahan_rencana_tata_ruang: r.arahan_rencana_tata_ruang,
                hasil_kesesuaian: r.hasil_kesesuaian.map(|h| h.parse()).transpose()?,
            })
        })
        .collect()
}

fn pemeriksaan_to_json(entries: &[PemeriksaanEntry]) -> anyhow::Result<serde_json::Value> {
    let rows: Vec<PemeriksaanJson> = entries
        .iter()
        .map(|e| PemeriksaanJson {
            pernyataan: e.pernyataan.clone(),
            hasil: e.hasil.as_str().to_string(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

fn pemeriksaan_from_json(value: serde_json::Value) -> anyhow::Result<Vec<PemeriksaanEntry>> {
    let rows: Vec<PemeriksaanJson> = serde_json::from_value(value).context("pemeriksaan column")?;
    rows.into_iter()
        .map(|r| {
            Ok(PemeriksaanEntry {
                pernyataan: r.pernyataan,
                hasil: r.hasil.parse()?,
            })
        })
        .collect()
}

fn pengukuran_to_json(entries: &[PengukuranEntry]) -> anyhow::Result<serde_json::Value> {
    let rows: Vec<PengukuranJson> = entries
        .iter()
        .map(|e| PengukuranJson {
            parameter: e.parameter.clone(),
            nilai: e.nilai,
            status: e.status.as_str().to_string(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

fn pengukuran_from_json(value: serde_json::Value) -> anyhow::Result<Vec<PengukuranEntry>> {
    let rows: Vec<PengukuranJson> = serde_json::from_value(value).context("pengukuran column")?;
    rows.into_iter()
        .map(|r| {
            Ok(PengukuranEntry {
                parameter: r.parameter,
                nilai: r.nilai,
                status: r.status.parse()?,
            })
        })
        .collect()
}

fn signatures_to_json(set: &SignatureSet) -> anyhow::Result<serde_json::Value> {
    let map: BTreeMap<Uuid, &str> = set.iter().map(|(user, r)| (*user, r.as_str())).collect();
    Ok(serde_json::to_value(map)?)
}

fn signatures_from_json(value: serde_json::Value) -> anyhow::Result<SignatureSet> {
    let map: BTreeMap<Uuid, String> = serde_json::from_value(value).context("signature column")?;
    Ok(map
        .into_iter()
        .map(|(user, path)| (user, SignatureRef::new(path)))
        .collect())
}
