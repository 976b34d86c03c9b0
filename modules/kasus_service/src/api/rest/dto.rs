//! REST DTOs with serde derives for HTTP API
//!
//! Request bodies keep every field optional so that missing values surface as field-level
//! validation errors from the domain instead of opaque deserialization failures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Accept `12.5`, `"12.5"` or `null` and keep the textual form for domain validation
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

// ===== Directory DTOs =====

/// User response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Application role
    #[schema(example = "Koordinator Lapangan")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[schema(example = "Petugas Lapangan")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipDto {
    pub user_id: Uuid,
    #[schema(example = "Ketua Tim")]
    pub role: String,
}

/// Team response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDto {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<MembershipDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MembershipRequest {
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

/// Create or replace a team; members are replaced wholesale
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TeamRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<MembershipRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamMemberDto {
    pub user: UserDto,
    pub role: String,
}

/// Team with members resolved to users
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamRosterDto {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<TeamMemberDto>,
}

// ===== Pemegang DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PemegangDto {
    pub id: Uuid,
    #[schema(example = "CV Maju")]
    pub nama: String,
    pub nomor_identitas: String,
    pub kegiatan_usaha: String,
    pub alamat: String,
    pub kontak: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PemegangRequest {
    pub nama: Option<String>,
    pub nomor_identitas: Option<String>,
    pub kegiatan_usaha: Option<String>,
    pub alamat: Option<String>,
    pub kontak: Option<String>,
}

// ===== Permohonan DTOs =====

/// Assessment request response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermohonanDto {
    pub id: Uuid,
    #[schema(example = "1700000000-AbCde")]
    pub nomor_permohonan: String,
    pub pemegang_id: Uuid,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub skor_prioritas: u8,
    #[schema(example = "Baru")]
    pub status: String,
    pub berita_acara_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PermohonanRequest {
    pub pemegang_id: Option<Uuid>,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub skor_prioritas: Option<i64>,
}

/// Query parameters for listing requests
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermohonanListQuery {
    /// `pending` or `all` (default)
    pub status: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermohonanPage {
    pub items: Vec<PermohonanDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

/// Result of `POST /penilaian/initiate/{permohonanId}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitiateResponse {
    pub kasus_id: Uuid,
    /// False when an existing case was refreshed
    pub created: bool,
}

// ===== Kasus DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KasusDto {
    pub id: Uuid,
    #[schema(example = "PMP_UMK")]
    pub jenis: String,
    pub nomor_permohonan: String,
    #[schema(example = "Menunggu Verifikasi")]
    pub status: String,
    pub skor_prioritas: u8,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub pemegang_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KasusPage {
    pub items: Vec<KasusDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct KasusUpdateRequest {
    pub jenis: Option<String>,
    pub skor_prioritas: Option<i64>,
}

/// Case with business, assessment, team and coordinator
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KasusDetailDto {
    pub kasus: KasusDto,
    pub pemegang: Option<PemegangDto>,
    pub permohonan: Option<PermohonanDto>,
    pub penilaian: Option<PenilaianDto>,
    pub tim: Option<TeamRosterDto>,
    pub koordinator: Option<UserDto>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VerifikasiRequest {
    #[schema(example = "Patuh")]
    pub hasil: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    #[schema(example = "Proses Keberatan")]
    pub status: Option<String>,
}

// ===== Penilaian DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeskStudyDto {
    pub pernyataan_lokasi: String,
    pub pernyataan_kegiatan: String,
    pub jenis_rencana_tata_ruang: String,
    pub arahan_rencana_tata_ruang: String,
    pub hasil_kesesuaian: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PemeriksaanDto {
    pub pernyataan: String,
    #[schema(example = "Sesuai")]
    pub hasil: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PengukuranDto {
    pub parameter: String,
    pub nilai: f64,
    #[schema(example = "Melebihi")]
    pub status: String,
}

/// One stored signature
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignatureDto {
    pub user_id: Uuid,
    /// Stored file reference
    pub file: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PenilaianDto {
    pub id: Uuid,
    pub kasus_id: Uuid,
    pub desk_study: Vec<DeskStudyDto>,
    pub pemeriksaan: Vec<PemeriksaanDto>,
    pub pengukuran: Vec<PengukuranDto>,
    pub catatan: Option<String>,
    pub tanda_tangan_tim: Vec<SignatureDto>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DeskStudyRequest {
    pub pernyataan_lokasi: Option<String>,
    pub pernyataan_kegiatan: Option<String>,
    pub jenis_rencana_tata_ruang: Option<String>,
    pub arahan_rencana_tata_ruang: Option<String>,
    #[schema(example = "Sesuai")]
    pub hasil_kesesuaian: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PemeriksaanRequest {
    pub pernyataan: Option<String>,
    pub hasil: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PengukuranRequest {
    pub parameter: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "string_or_number")]
    pub nilai: Option<String>,
    pub status: Option<String>,
}

/// Signer and the data-URI of their signature image
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SignatureRequest {
    pub user_id: Option<Uuid>,
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub signature: Option<String>,
}

/// Full assessment submission
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PenilaianSubmitRequest {
    #[serde(default)]
    pub desk_study: Vec<DeskStudyRequest>,
    pub pemeriksaan: Option<Vec<PemeriksaanRequest>>,
    pub pengukuran: Option<Vec<PengukuranRequest>>,
    pub catatan: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Vec<SignatureRequest>,
}

/// Partial save of desk study and notes
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PenilaianDraftRequest {
    pub desk_study: Option<Vec<DeskStudyRequest>>,
    pub catatan: Option<String>,
}

// ===== Survei DTOs =====

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SurveiRequest {
    pub tanggal: Option<NaiveDate>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub longitude: Option<String>,
    #[serde(default)]
    pub pemeriksaan: Vec<PemeriksaanRequest>,
    #[serde(default)]
    pub pengukuran: Vec<PengukuranRequest>,
    /// Data-URI of the documentation photo
    pub foto_dokumentasi: Option<String>,
    pub tanda_tangan_petugas: Option<String>,
    pub nama_perwakilan: Option<String>,
    pub tanda_tangan_perwakilan: Option<String>,
    pub catatan: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SurveiDto {
    pub id: Uuid,
    pub kasus_id: Uuid,
    pub petugas_id: Uuid,
    pub tanggal: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub pemeriksaan: Vec<PemeriksaanDto>,
    pub pengukuran: Vec<PengukuranDto>,
    pub foto_dokumentasi: Option<String>,
    pub tanda_tangan_petugas: String,
    pub nama_perwakilan: String,
    pub tanda_tangan_perwakilan: String,
    pub catatan: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ===== Document DTOs =====

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BeritaAcaraRequest {
    pub permohonan_id: Option<Uuid>,
    pub pemegang_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub tanggal: Option<NaiveDate>,
    #[schema(example = "Lokasi Tidak Ditemukan")]
    pub alasan: Option<String>,
    /// Required when `alasan` is "Lainnya"
    pub alasan_lainnya: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Vec<SignatureRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BeritaAcaraDto {
    pub id: Uuid,
    pub permohonan_id: Uuid,
    pub pemegang_id: Uuid,
    pub penanggung_jawab_id: Uuid,
    pub tanggal: NaiveDate,
    pub alasan: String,
    pub alasan_lainnya: Option<String>,
    pub tanda_tangan_tim: Vec<SignatureDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BaPemeriksaanRequest {
    pub penilaian_id: Option<Uuid>,
    pub nomor_ba: Option<String>,
    pub nomor_surat_tugas: Option<String>,
    pub tanggal_surat_tugas: Option<NaiveDate>,
    pub nomor_identifikasi: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Vec<SignatureRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BaPemeriksaanDto {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub nomor_ba: String,
    pub nomor_surat_tugas: String,
    pub tanggal_surat_tugas: NaiveDate,
    pub nomor_identifikasi: Option<String>,
    pub tanda_tangan_tim: Vec<SignatureDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BaHasilRequest {
    pub penilaian_id: Option<Uuid>,
    pub nomor_ba: Option<String>,
    pub tanggal: Option<NaiveDate>,
    pub hasil: Option<String>,
    pub kesimpulan: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Vec<SignatureRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BaHasilDto {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub nomor_ba: String,
    pub tanggal: NaiveDate,
    pub hasil: String,
    pub kesimpulan: String,
    pub tanda_tangan_tim: Vec<SignatureDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FormulirRequest {
    pub penilaian_id: Option<Uuid>,
    pub analisis_desk_study: Option<String>,
    pub analisis_pemeriksaan: Option<String>,
    pub analisis_pengukuran: Option<String>,
    pub kesimpulan: Option<String>,
    pub rekomendasi: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Vec<SignatureRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormulirDto {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub analisis_desk_study: String,
    pub analisis_pemeriksaan: Option<String>,
    pub analisis_pengukuran: Option<String>,
    pub kesimpulan: String,
    pub rekomendasi: Option<String>,
    pub tanda_tangan_tim: Vec<SignatureDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Edit request DTOs =====

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EditRequestCreate {
    pub alasan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RejectEditRequest {
    pub alasan_penolakan: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditRequestDto {
    pub id: Uuid,
    pub penilaian_id: Uuid,
    pub requested_by: Uuid,
    pub alasan: String,
    #[schema(example = "pending")]
    pub status: String,
    pub alasan_penolakan: Option<String>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

// Note: Conversion implementations live in mapper.rs
