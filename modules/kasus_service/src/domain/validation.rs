//! Input validation
//!
//! Raw client input (`*Input` contract types) is turned into typed values here. Validators
//! never stop at the first problem: they record every failure into a [`ValidationErrors`]
//! map keyed by the dotted field path, and the caller turns a non-empty map into
//! `KasusError::Validation`.

use crate::contract::{
    AlasanTidakTerlaksana, BaHasilPenilaianInput, BaPemeriksaanInput, BeritaAcaraInput,
    DeskStudyEntry, DeskStudyInput, FormulirAnalisisInput, HasilKesesuaian, HasilVerifikasi,
    KasusError, Membership, MembershipInput, PemegangInput, PemeriksaanEntry, PemeriksaanInput,
    PenilaianDraft, PenilaianSubmission, PengukuranEntry, PengukuranInput, Role, StatusPengukuran,
    SurveiInput, TeamInput, TeamRole, UserInput, ValidationErrors,
};
use chrono::NaiveDate;
use std::str::FromStr;
use uuid::Uuid;

/// Trimmed, non-empty text or a "required" error
pub fn required_text(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

/// Trimmed text, `None` when blank
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parse a required label into its closed vocabulary
pub fn required_label<T>(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => match v.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                errors.add(field, e.to_string());
                None
            }
        },
        _ => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

pub fn required_id(field: &str, value: Option<Uuid>, errors: &mut ValidationErrors) -> Option<Uuid> {
    if value.is_none() {
        errors.add(field, format!("{field} is required"));
    }
    value
}

pub fn required_date(field: &str, value: Option<NaiveDate>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    if value.is_none() {
        errors.add(field, format!("{field} is required"));
    }
    value
}

/// Priority score in 0..=100; absent means 0
pub fn priority(field: &str, value: Option<i64>, errors: &mut ValidationErrors) -> Option<u8> {
    match value {
        None => Some(0),
        Some(v) if (0..=100).contains(&v) => u8::try_from(v).ok(),
        Some(_) => {
            errors.add(field, format!("{field} must be between 0 and 100"));
            None
        }
    }
}

// ===== Assessment =====

/// Typed content of a full submission, after the void rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPenilaian {
    pub desk_study: Vec<DeskStudyEntry>,
    pub pemeriksaan: Vec<PemeriksaanEntry>,
    pub pengukuran: Vec<PengukuranEntry>,
    pub catatan: Option<String>,
    /// The desk study was non-compliant and downstream sections were discarded
    pub downstream_voided: bool,
}

fn desk_study_entry(i: usize, input: &DeskStudyInput, errors: &mut ValidationErrors) -> Option<DeskStudyEntry> {
    let lokasi = required_text(
        &format!("desk_study.{i}.pernyataan_lokasi"),
        input.pernyataan_lokasi.as_deref(),
        errors,
    );
    let kegiatan = required_text(
        &format!("desk_study.{i}.pernyataan_kegiatan"),
        input.pernyataan_kegiatan.as_deref(),
        errors,
    );
    let jenis = required_text(
        &format!("desk_study.{i}.jenis_rencana_tata_ruang"),
        input.jenis_rencana_tata_ruang.as_deref(),
        errors,
    );
    let arahan = required_text(
        &format!("desk_study.{i}.arahan_rencana_tata_ruang"),
        input.arahan_rencana_tata_ruang.as_deref(),
        errors,
    );
    let hasil: Option<HasilKesesuaian> = required_label(
        &format!("desk_study.{i}.hasil_kesesuaian"),
        input.hasil_kesesuaian.as_deref(),
        errors,
    );

    Some(DeskStudyEntry {
        pernyataan_lokasi: lokasi?,
        pernyataan_kegiatan: kegiatan?,
        jenis_rencana_tata_ruang: jenis?,
        arahan_rencana_tata_ruang: arahan?,
        hasil_kesesuaian: Some(hasil?),
    })
}

/// Inspection lines under `field`
pub fn pemeriksaan_entries(
    field: &str,
    inputs: &[PemeriksaanInput],
    errors: &mut ValidationErrors,
) -> Vec<PemeriksaanEntry> {
    let mut entries = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let pernyataan = required_text(&format!("{field}.{i}.pernyataan"), input.pernyataan.as_deref(), errors);
        let hasil = required_label(&format!("{field}.{i}.hasil"), input.hasil.as_deref(), errors);
        if let (Some(pernyataan), Some(hasil)) = (pernyataan, hasil) {
            entries.push(PemeriksaanEntry { pernyataan, hasil });
        }
    }
    entries
}

/// Measurement lines under `field`; `nilai` must be a finite number
pub fn pengukuran_entries(
    field: &str,
    inputs: &[PengukuranInput],
    errors: &mut ValidationErrors,
) -> Vec<PengukuranEntry> {
    let mut entries = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let parameter = required_text(&format!("{field}.{i}.parameter"), input.parameter.as_deref(), errors);

        let nilai_field = format!("{field}.{i}.nilai");
        let nilai = match input.nilai.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    errors.add(&nilai_field, format!("{nilai_field} must be numeric"));
                    None
                }
            },
            _ => {
                errors.add(&nilai_field, format!("{nilai_field} is required"));
                None
            }
        };

        let status: Option<StatusPengukuran> =
            required_label(&format!("{field}.{i}.status"), input.status.as_deref(), errors);

        if let (Some(parameter), Some(nilai), Some(status)) = (parameter, nilai, status) {
            entries.push(PengukuranEntry {
                parameter,
                nilai,
                status,
            });
        }
    }
    entries
}

/// Validate a full submission (signatures are checked separately).
///
/// When any desk-study line is "Tidak Sesuai" the inspection and measurement input is
/// neither validated nor kept: both sections come back empty.
pub fn validate_submission(submission: &PenilaianSubmission, errors: &mut ValidationErrors) -> ValidatedPenilaian {
    if submission.desk_study.is_empty() {
        errors.add("desk_study", "desk_study must contain at least one entry");
    }

    let desk_study: Vec<DeskStudyEntry> = submission
        .desk_study
        .iter()
        .enumerate()
        .filter_map(|(i, input)| desk_study_entry(i, input, errors))
        .collect();

    // Raw labels decide the void rule, so a malformed sibling entry cannot hide it
    let downstream_voided = submission
        .desk_study
        .iter()
        .any(|e| e.hasil_kesesuaian.as_deref().map(str::trim) == Some(HasilKesesuaian::TidakSesuai.as_str()));

    let (pemeriksaan, pengukuran) = if downstream_voided {
        (Vec::new(), Vec::new())
    } else {
        let pemeriksaan = match submission.pemeriksaan.as_deref() {
            Some(inputs) if !inputs.is_empty() => pemeriksaan_entries("pemeriksaan", inputs, errors),
            _ => {
                errors.add("pemeriksaan", "pemeriksaan is required when the desk study is compliant");
                Vec::new()
            }
        };
        let pengukuran = pengukuran_entries(
            "pengukuran",
            submission.pengukuran.as_deref().unwrap_or_default(),
            errors,
        );
        (pemeriksaan, pengukuran)
    };

    ValidatedPenilaian {
        desk_study,
        pemeriksaan,
        pengukuran,
        catatan: optional_text(submission.catatan.as_deref()),
        downstream_voided,
    }
}

/// Validate a draft save.
///
/// Returns `None` when the draft carries no desk study, which leaves the stored one as is.
/// Blank text is allowed; a present `hasil_kesesuaian` must still be a known label.
pub fn validate_draft(draft: &PenilaianDraft, errors: &mut ValidationErrors) -> Option<Vec<DeskStudyEntry>> {
    let inputs = draft.desk_study.as_ref()?;
    let entries = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
            let hasil = match optional_text(input.hasil_kesesuaian.as_deref()) {
                None => None,
                Some(label) => match label.parse::<HasilKesesuaian>() {
                    Ok(h) => Some(h),
                    Err(e) => {
                        errors.add(format!("desk_study.{i}.hasil_kesesuaian"), e.to_string());
                        None
                    }
                },
            };
            DeskStudyEntry {
                pernyataan_lokasi: text(&input.pernyataan_lokasi),
                pernyataan_kegiatan: text(&input.pernyataan_kegiatan),
                jenis_rencana_tata_ruang: text(&input.jenis_rencana_tata_ruang),
                arahan_rencana_tata_ruang: text(&input.arahan_rencana_tata_ruang),
                hasil_kesesuaian: hasil,
            }
        })
        .collect();
    Some(entries)
}

// ===== Directory =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn validate_user(input: &UserInput) -> Result<ValidatedUser, KasusError> {
    let mut errors = ValidationErrors::new();
    let name = required_text("name", input.name.as_deref(), &mut errors);
    let email = required_text("email", input.email.as_deref(), &mut errors);
    if let Some(email) = &email {
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            errors.add("email", "email is not a valid address");
        }
    }
    let role = required_label("role", input.role.as_deref(), &mut errors);

    match (name, email, role) {
        (Some(name), Some(email), Some(role)) if errors.is_empty() => Ok(ValidatedUser { name, email, role }),
        _ => Err(KasusError::Validation { errors }),
    }
}

/// Team name and de-duplicated memberships
pub fn validate_team(input: &TeamInput) -> Result<(String, Vec<Membership>), KasusError> {
    let mut errors = ValidationErrors::new();
    let name = required_text("name", input.name.as_deref(), &mut errors);

    let mut members: Vec<Membership> = Vec::with_capacity(input.members.len());
    for (i, MembershipInput { user_id, role }) in input.members.iter().enumerate() {
        let user_id = required_id(&format!("members.{i}.user_id"), *user_id, &mut errors);
        let role: Option<TeamRole> = required_label(&format!("members.{i}.role"), role.as_deref(), &mut errors);
        if let (Some(user_id), Some(role)) = (user_id, role) {
            if members.iter().any(|m| m.user_id == user_id) {
                errors.add(
                    format!("members.{i}.user_id"),
                    "a user may appear only once per team",
                );
            } else {
                members.push(Membership { user_id, role });
            }
        }
    }

    errors.into_result()?;
    name.map(|n| (n, members)).ok_or(KasusError::Internal)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPemegang {
    pub nama: String,
    pub nomor_identitas: String,
    pub kegiatan_usaha: String,
    pub alamat: String,
    pub kontak: Option<String>,
}

pub fn validate_pemegang(input: &PemegangInput) -> Result<ValidatedPemegang, KasusError> {
    let mut errors = ValidationErrors::new();
    let nama = required_text("nama", input.nama.as_deref(), &mut errors);
    let nomor_identitas = required_text("nomor_identitas", input.nomor_identitas.as_deref(), &mut errors);
    let kegiatan_usaha = required_text("kegiatan_usaha", input.kegiatan_usaha.as_deref(), &mut errors);
    let alamat = required_text("alamat", input.alamat.as_deref(), &mut errors);

    match (nama, nomor_identitas, kegiatan_usaha, alamat) {
        (Some(nama), Some(nomor_identitas), Some(kegiatan_usaha), Some(alamat)) => Ok(ValidatedPemegang {
            nama,
            nomor_identitas,
            kegiatan_usaha,
            alamat,
            kontak: optional_text(input.kontak.as_deref()),
        }),
        _ => Err(KasusError::Validation { errors }),
    }
}

// ===== Field survey =====

/// Textual part of a survey; images are decoded by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSurvei {
    pub tanggal: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub pemeriksaan: Vec<PemeriksaanEntry>,
    pub pengukuran: Vec<PengukuranEntry>,
    pub nama_perwakilan: String,
    pub catatan: Option<String>,
}

fn coordinate(field: &str, raw: Option<&str>, bound: f64, errors: &mut ValidationErrors) -> Option<f64> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.add(field, format!("{field} is required"));
        return None;
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= bound => Some(v),
        Ok(_) => {
            errors.add(field, format!("{field} must be between -{bound} and {bound}"));
            None
        }
        Err(_) => {
            errors.add(field, format!("{field} must be numeric"));
            None
        }
    }
}

pub fn validate_survei(input: &SurveiInput, errors: &mut ValidationErrors) -> Option<ValidatedSurvei> {
    let tanggal = required_date("tanggal", input.tanggal, errors);
    let latitude = coordinate("latitude", input.latitude.as_deref(), 90.0, errors);
    let longitude = coordinate("longitude", input.longitude.as_deref(), 180.0, errors);
    let pemeriksaan = pemeriksaan_entries("pemeriksaan", &input.pemeriksaan, errors);
    let pengukuran = pengukuran_entries("pengukuran", &input.pengukuran, errors);
    let nama_perwakilan = required_text("nama_perwakilan", input.nama_perwakilan.as_deref(), errors);

    Some(ValidatedSurvei {
        tanggal: tanggal?,
        latitude: latitude?,
        longitude: longitude?,
        pemeriksaan,
        pengukuran,
        nama_perwakilan: nama_perwakilan?,
        catatan: optional_text(input.catatan.as_deref()),
    })
}

// ===== Minutes =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBeritaAcara {
    pub permohonan_id: Uuid,
    pub pemegang_id: Uuid,
    pub penanggung_jawab_id: Uuid,
    pub tanggal: NaiveDate,
    pub alasan: AlasanTidakTerlaksana,
}

fn at_least_one_signature(count: usize, errors: &mut ValidationErrors) {
    if count == 0 {
        errors.add("tanda_tangan", "at least one team signature is required");
    }
}

pub fn validate_berita_acara(input: &BeritaAcaraInput, errors: &mut ValidationErrors) -> Option<ValidatedBeritaAcara> {
    let permohonan_id = required_id("permohonan_id", input.permohonan_id, errors);
    let pemegang_id = required_id("pemegang_id", input.pemegang_id, errors);
    let penanggung_jawab_id = required_id("penanggung_jawab_id", input.penanggung_jawab_id, errors);
    let tanggal = required_date("tanggal", input.tanggal, errors);
    at_least_one_signature(input.tanda_tangan.len(), errors);

    let alasan = match input.alasan.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("alasan", "alasan is required");
            None
        }
        Some(label) => {
            let keterangan = optional_text(input.alasan_lainnya.as_deref());
            if label == AlasanTidakTerlaksana::LAINNYA && keterangan.is_none() {
                errors.add("alasan_lainnya", "alasan_lainnya is required when alasan is 'Lainnya'");
                None
            } else {
                let parsed = AlasanTidakTerlaksana::from_parts(label, keterangan);
                if parsed.is_none() {
                    errors.add("alasan", format!("unknown reason: '{label}'"));
                }
                parsed
            }
        }
    };

    Some(ValidatedBeritaAcara {
        permohonan_id: permohonan_id?,
        pemegang_id: pemegang_id?,
        penanggung_jawab_id: penanggung_jawab_id?,
        tanggal: tanggal?,
        alasan: alasan?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBaPemeriksaan {
    pub penilaian_id: Uuid,
    pub nomor_ba: String,
    pub nomor_surat_tugas: String,
    pub tanggal_surat_tugas: NaiveDate,
    pub nomor_identifikasi: Option<String>,
}

pub fn validate_ba_pemeriksaan(
    input: &BaPemeriksaanInput,
    errors: &mut ValidationErrors,
) -> Option<ValidatedBaPemeriksaan> {
    let penilaian_id = required_id("penilaian_id", input.penilaian_id, errors);
    let nomor_ba = required_text("nomor_ba", input.nomor_ba.as_deref(), errors);
    let nomor_surat_tugas = required_text("nomor_surat_tugas", input.nomor_surat_tugas.as_deref(), errors);
    let tanggal_surat_tugas = required_date("tanggal_surat_tugas", input.tanggal_surat_tugas, errors);

    Some(ValidatedBaPemeriksaan {
        penilaian_id: penilaian_id?,
        nomor_ba: nomor_ba?,
        nomor_surat_tugas: nomor_surat_tugas?,
        tanggal_surat_tugas: tanggal_surat_tugas?,
        nomor_identifikasi: optional_text(input.nomor_identifikasi.as_deref()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBaHasil {
    pub penilaian_id: Uuid,
    pub nomor_ba: String,
    pub tanggal: NaiveDate,
    pub hasil: HasilVerifikasi,
    pub kesimpulan: String,
}

pub fn validate_ba_hasil(input: &BaHasilPenilaianInput, errors: &mut ValidationErrors) -> Option<ValidatedBaHasil> {
    let penilaian_id = required_id("penilaian_id", input.penilaian_id, errors);
    let nomor_ba = required_text("nomor_ba", input.nomor_ba.as_deref(), errors);
    let tanggal = required_date("tanggal", input.tanggal, errors);
    let hasil = required_label("hasil", input.hasil.as_deref(), errors);
    let kesimpulan = required_text("kesimpulan", input.kesimpulan.as_deref(), errors);

    Some(ValidatedBaHasil {
        penilaian_id: penilaian_id?,
        nomor_ba: nomor_ba?,
        tanggal: tanggal?,
        hasil: hasil?,
        kesimpulan: kesimpulan?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFormulir {
    pub penilaian_id: Uuid,
    pub analisis_desk_study: String,
    pub analisis_pemeriksaan: Option<String>,
    pub analisis_pengukuran: Option<String>,
    pub kesimpulan: HasilVerifikasi,
    pub rekomendasi: Option<String>,
}

pub fn validate_formulir(input: &FormulirAnalisisInput, errors: &mut ValidationErrors) -> Option<ValidatedFormulir> {
    let penilaian_id = required_id("penilaian_id", input.penilaian_id, errors);
    let analisis_desk_study = required_text("analisis_desk_study", input.analisis_desk_study.as_deref(), errors);
    let kesimpulan = required_label("kesimpulan", input.kesimpulan.as_deref(), errors);

    Some(ValidatedFormulir {
        penilaian_id: penilaian_id?,
        analisis_desk_study: analisis_desk_study?,
        analisis_pemeriksaan: optional_text(input.analisis_pemeriksaan.as_deref()),
        analisis_pengukuran: optional_text(input.analisis_pengukuran.as_deref()),
        kesimpulan: kesimpulan?,
        rekomendasi: optional_text(input.rekomendasi.as_deref()),
    })
}
