//! Minutes (berita acara), analysis forms, field surveys and edit requests

use super::model::{labelled_enum, HasilVerifikasi};
use super::penilaian::{PemeriksaanInput, PemeriksaanEntry, PengukuranEntry, PengukuranInput};
use super::penilaian::{SignatureInput, SignatureRef, SignatureSet};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Why an assessment could not take place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlasanTidakTerlaksana {
    TidakDapatDihubungi,
    LokasiTidakDitemukan,
    /// Free-text reason
    Lainnya(String),
}

impl AlasanTidakTerlaksana {
    pub const TIDAK_DAPAT_DIHUBUNGI: &'static str = "Tidak Dapat Dihubungi";
    pub const LOKASI_TIDAK_DITEMUKAN: &'static str = "Lokasi Tidak Ditemukan";
    pub const LAINNYA: &'static str = "Lainnya";

    /// Stored reason label
    pub fn label(&self) -> &'static str {
        match self {
            Self::TidakDapatDihubungi => Self::TIDAK_DAPAT_DIHUBUNGI,
            Self::LokasiTidakDitemukan => Self::LOKASI_TIDAK_DITEMUKAN,
            Self::Lainnya(_) => Self::LAINNYA,
        }
    }

    pub fn keterangan(&self) -> Option<&str> {
        match self {
            Self::Lainnya(text) => Some(text),
            _ => None,
        }
    }

    /// Rebuild from the stored label and free text
    pub fn from_parts(label: &str, keterangan: Option<String>) -> Option<Self> {
        match label {
            Self::TIDAK_DAPAT_DIHUBUNGI => Some(Self::TidakDapatDihubungi),
            Self::LOKASI_TIDAK_DITEMUKAN => Some(Self::LokasiTidakDitemukan),
            Self::LAINNYA => Some(Self::Lainnya(keterangan.unwrap_or_default())),
            _ => None,
        }
    }
}

/// Minutes recording that an assessment could not be carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeritaAcara {
    pub id: Uuid,
    pub permohonan_id: Uuid,
    pub pemegang_id: Uuid,
    pub penanggung_jawab_id: Uuid,
    pub tanggal: NaiveDate,
    pub alasan: AlasanTidakTerlaksana,
    pub tanda_tangan_tim: SignatureSet,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeritaAcaraInput {
    pub permohonan_id: Option<Uuid>,
    pub pemegang_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub tanggal: Option<NaiveDate>,
    pub alasan: Option<String>,
    pub alasan_lainnya: Option<String>,
    pub tanda_tangan: Vec<SignatureInput>,
}

/// Examination minutes tied to a physical task order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaPemeriksaan {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    /// Unique across all examination minutes
    pub nomor_ba: String,
    pub nomor_surat_tugas: String,
    pub tanggal_surat_tugas: NaiveDate,
    pub nomor_identifikasi: Option<String>,
    pub tanda_tangan_tim: SignatureSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaPemeriksaanInput {
    pub penilaian_id: Option<Uuid>,
    pub nomor_ba: Option<String>,
    pub nomor_surat_tugas: Option<String>,
    pub tanggal_surat_tugas: Option<NaiveDate>,
    pub nomor_identifikasi: Option<String>,
    pub tanda_tangan: Vec<SignatureInput>,
}

/// Minutes of the assessment result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaHasilPenilaian {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub nomor_ba: String,
    pub tanggal: NaiveDate,
    pub hasil: HasilVerifikasi,
    pub kesimpulan: String,
    pub tanda_tangan_tim: SignatureSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaHasilPenilaianInput {
    pub penilaian_id: Option<Uuid>,
    pub nomor_ba: Option<String>,
    pub tanggal: Option<NaiveDate>,
    pub hasil: Option<String>,
    pub kesimpulan: Option<String>,
    pub tanda_tangan: Vec<SignatureInput>,
}

/// Structured compliance analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulirAnalisisPenilaian {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub analisis_desk_study: String,
    pub analisis_pemeriksaan: Option<String>,
    pub analisis_pengukuran: Option<String>,
    pub kesimpulan: HasilVerifikasi,
    pub rekomendasi: Option<String>,
    pub tanda_tangan_tim: SignatureSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulirAnalisisInput {
    pub penilaian_id: Option<Uuid>,
    pub analisis_desk_study: Option<String>,
    pub analisis_pemeriksaan: Option<String>,
    pub analisis_pengukuran: Option<String>,
    pub kesimpulan: Option<String>,
    pub rekomendasi: Option<String>,
    pub tanda_tangan: Vec<SignatureInput>,
}

/// Field survey captured on site
#[derive(Debug, Clone, PartialEq)]
pub struct Survei {
    pub id: Uuid,
    pub kasus_id: Uuid,
    pub petugas_id: Uuid,
    pub tanggal: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub pemeriksaan: Vec<PemeriksaanEntry>,
    pub pengukuran: Vec<PengukuranEntry>,
    pub foto_dokumentasi: Option<SignatureRef>,
    pub tanda_tangan_petugas: SignatureRef,
    pub nama_perwakilan: String,
    pub tanda_tangan_perwakilan: SignatureRef,
    pub catatan: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveiInput {
    pub tanggal: Option<NaiveDate>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub pemeriksaan: Vec<PemeriksaanInput>,
    pub pengukuran: Vec<PengukuranInput>,
    pub foto_dokumentasi: Option<String>,
    pub tanda_tangan_petugas: Option<String>,
    pub nama_perwakilan: Option<String>,
    pub tanda_tangan_perwakilan: Option<String>,
    pub catatan: Option<String>,
}

labelled_enum! {
    /// Edit request lifecycle; approved and rejected are terminal
    EditRequestStatus, "edit request status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Request by a team member to reopen a finalized assessment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub requested_by: Uuid,
    pub alasan: String,
    pub status: EditRequestStatus,
    pub alasan_penolakan: Option<String>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Approver's verdict on a pending edit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDecision {
    Approve,
    Reject { alasan: Option<String> },
}
