//! Mapper implementations for converting between DTOs and contract models
//!
//! Response DTOs are built from contract models; request DTOs become the raw `*Input`
//! contract types, which the domain validates.

use super::dto::*;
use crate::contract;

fn signatures(set: &contract::SignatureSet) -> Vec<SignatureDto> {
    set.iter()
        .map(|(user_id, file)| SignatureDto {
            user_id: *user_id,
            file: file.as_str().to_string(),
        })
        .collect()
}

fn signature_inputs(requests: Vec<SignatureRequest>) -> Vec<contract::SignatureInput> {
    requests.into_iter().map(Into::into).collect()
}

// ===== Directory =====

impl From<contract::User> for UserDto {
    fn from(user: contract::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CreateUserRequest> for contract::UserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
        }
    }
}

impl From<contract::Team> for TeamDto {
    fn from(team: contract::Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            members: team
                .members
                .into_iter()
                .map(|m| MembershipDto {
                    user_id: m.user_id,
                    role: m.role.to_string(),
                })
                .collect(),
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

impl From<TeamRequest> for contract::TeamInput {
    fn from(req: TeamRequest) -> Self {
        Self {
            name: req.name,
            members: req
                .members
                .into_iter()
                .map(|m| contract::MembershipInput {
                    user_id: m.user_id,
                    role: m.role,
                })
                .collect(),
        }
    }
}

impl From<contract::TeamRoster> for TeamRosterDto {
    fn from(roster: contract::TeamRoster) -> Self {
        Self {
            id: roster.team.id,
            name: roster.team.name,
            members: roster
                .members
                .into_iter()
                .map(|m| TeamMemberDto {
                    user: m.user.into(),
                    role: m.role.to_string(),
                })
                .collect(),
        }
    }
}

// ===== Pemegang / Permohonan =====

impl From<contract::Pemegang> for PemegangDto {
    fn from(p: contract::Pemegang) -> Self {
        Self {
            id: p.id,
            nama: p.nama,
            nomor_identitas: p.nomor_identitas,
            kegiatan_usaha: p.kegiatan_usaha,
            alamat: p.alamat,
            kontak: p.kontak,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<PemegangRequest> for contract::PemegangInput {
    fn from(req: PemegangRequest) -> Self {
        Self {
            nama: req.nama,
            nomor_identitas: req.nomor_identitas,
            kegiatan_usaha: req.kegiatan_usaha,
            alamat: req.alamat,
            kontak: req.kontak,
        }
    }
}

impl From<contract::PermohonanPenilaian> for PermohonanDto {
    fn from(p: contract::PermohonanPenilaian) -> Self {
        Self {
            id: p.id,
            nomor_permohonan: p.nomor_permohonan,
            pemegang_id: p.pemegang_id,
            tim_id: p.tim_id,
            penanggung_jawab_id: p.penanggung_jawab_id,
            skor_prioritas: p.skor_prioritas,
            status: p.status.to_string(),
            berita_acara_id: p.berita_acara_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<PermohonanRequest> for contract::PermohonanInput {
    fn from(req: PermohonanRequest) -> Self {
        Self {
            pemegang_id: req.pemegang_id,
            tim_id: req.tim_id,
            penanggung_jawab_id: req.penanggung_jawab_id,
            skor_prioritas: req.skor_prioritas,
        }
    }
}

impl From<contract::Page<contract::PermohonanPenilaian>> for PermohonanPage {
    fn from(page: contract::Page<contract::PermohonanPenilaian>) -> Self {
        let last_page = page.last_page();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            last_page,
        }
    }
}

// ===== Kasus =====

impl From<contract::Kasus> for KasusDto {
    fn from(k: contract::Kasus) -> Self {
        Self {
            id: k.id,
            jenis: k.jenis.to_string(),
            nomor_permohonan: k.nomor_permohonan,
            status: k.status.to_string(),
            skor_prioritas: k.skor_prioritas,
            tim_id: k.tim_id,
            penanggung_jawab_id: k.penanggung_jawab_id,
            pemegang_id: k.pemegang_id,
            created_at: k.created_at,
            updated_at: k.updated_at,
        }
    }
}

impl From<contract::Page<contract::Kasus>> for KasusPage {
    fn from(page: contract::Page<contract::Kasus>) -> Self {
        let last_page = page.last_page();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            last_page,
        }
    }
}

impl From<KasusUpdateRequest> for contract::KasusUpdate {
    fn from(req: KasusUpdateRequest) -> Self {
        Self {
            jenis: req.jenis,
            skor_prioritas: req.skor_prioritas,
        }
    }
}

impl From<contract::KasusDetail> for KasusDetailDto {
    fn from(detail: contract::KasusDetail) -> Self {
        Self {
            kasus: detail.kasus.into(),
            pemegang: detail.pemegang.map(Into::into),
            permohonan: detail.permohonan.map(Into::into),
            penilaian: detail.penilaian.map(Into::into),
            tim: detail.tim.map(Into::into),
            koordinator: detail.koordinator.map(Into::into),
        }
    }
}

// ===== Penilaian =====

impl From<contract::DeskStudyEntry> for DeskStudyDto {
    fn from(e: contract::DeskStudyEntry) -> Self {
        Self {
            pernyataan_lokasi: e.pernyataan_lokasi,
            pernyataan_kegiatan: e.pernyataan_kegiatan,
            jenis_rencana_tata_ruang: e.jenis_rencana_tata_ruang,
            arahan_rencana_tata_ruang: e.arahan_rencana_tata_ruang,
            hasil_kesesuaian: e.hasil_kesesuaian.map(|h| h.to_string()),
        }
    }
}

impl From<contract::PemeriksaanEntry> for PemeriksaanDto {
    fn from(e: contract::PemeriksaanEntry) -> Self {
        Self {
            pernyataan: e.pernyataan,
            hasil: e.hasil.to_string(),
        }
    }
}

impl From<contract::PengukuranEntry> for PengukuranDto {
    fn from(e: contract::PengukuranEntry) -> Self {
        Self {
            parameter: e.parameter,
            nilai: e.nilai,
            status: e.status.to_string(),
        }
    }
}

impl From<contract::Penilaian> for PenilaianDto {
    fn from(p: contract::Penilaian) -> Self {
        Self {
            id: p.id,
            kasus_id: p.kasus_id,
            tanda_tangan_tim: signatures(&p.tanda_tangan_tim),
            desk_study: p.desk_study.into_iter().map(Into::into).collect(),
            pemeriksaan: p.pemeriksaan.into_iter().map(Into::into).collect(),
            pengukuran: p.pengukuran.into_iter().map(Into::into).collect(),
            catatan: p.catatan,
            version: p.version,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<DeskStudyRequest> for contract::DeskStudyInput {
    fn from(req: DeskStudyRequest) -> Self {
        Self {
            pernyataan_lokasi: req.pernyataan_lokasi,
            pernyataan_kegiatan: req.pernyataan_kegiatan,
            jenis_rencana_tata_ruang: req.jenis_rencana_tata_ruang,
            arahan_rencana_tata_ruang: req.arahan_rencana_tata_ruang,
            hasil_kesesuaian: req.hasil_kesesuaian,
        }
    }
}

impl From<PemeriksaanRequest> for contract::PemeriksaanInput {
    fn from(req: PemeriksaanRequest) -> Self {
        Self {
            pernyataan: req.pernyataan,
            hasil: req.hasil,
        }
    }
}

impl From<PengukuranRequest> for contract::PengukuranInput {
    fn from(req: PengukuranRequest) -> Self {
        Self {
            parameter: req.parameter,
            nilai: req.nilai,
            status: req.status,
        }
    }
}

impl From<SignatureRequest> for contract::SignatureInput {
    fn from(req: SignatureRequest) -> Self {
        Self {
            user_id: req.user_id,
            signature: req.signature,
        }
    }
}

impl From<PenilaianSubmitRequest> for contract::PenilaianSubmission {
    fn from(req: PenilaianSubmitRequest) -> Self {
        Self {
            desk_study: req.desk_study.into_iter().map(Into::into).collect(),
            pemeriksaan: req.pemeriksaan.map(|v| v.into_iter().map(Into::into).collect()),
            pengukuran: req.pengukuran.map(|v| v.into_iter().map(Into::into).collect()),
            catatan: req.catatan,
            tanda_tangan: signature_inputs(req.tanda_tangan),
        }
    }
}

impl From<PenilaianDraftRequest> for contract::PenilaianDraft {
    fn from(req: PenilaianDraftRequest) -> Self {
        Self {
            desk_study: req.desk_study.map(|v| v.into_iter().map(Into::into).collect()),
            catatan: req.catatan,
        }
    }
}

// ===== Survei =====

impl From<SurveiRequest> for contract::SurveiInput {
    fn from(req: SurveiRequest) -> Self {
        Self {
            tanggal: req.tanggal,
            latitude: req.latitude,
            longitude: req.longitude,
            pemeriksaan: req.pemeriksaan.into_iter().map(Into::into).collect(),
            pengukuran: req.pengukuran.into_iter().map(Into::into).collect(),
            foto_dokumentasi: req.foto_dokumentasi,
            tanda_tangan_petugas: req.tanda_tangan_petugas,
            nama_perwakilan: req.nama_perwakilan,
            tanda_tangan_perwakilan: req.tanda_tangan_perwakilan,
            catatan: req.catatan,
        }
    }
}

impl From<contract::Survei> for SurveiDto {
    fn from(s: contract::Survei) -> Self {
        Self {
            id: s.id,
            kasus_id: s.kasus_id,
            petugas_id: s.petugas_id,
            tanggal: s.tanggal,
            latitude: s.latitude,
            longitude: s.longitude,
            pemeriksaan: s.pemeriksaan.into_iter().map(Into::into).collect(),
            pengukuran: s.pengukuran.into_iter().map(Into::into).collect(),
            foto_dokumentasi: s.foto_dokumentasi.map(|r| r.as_str().to_string()),
            tanda_tangan_petugas: s.tanda_tangan_petugas.as_str().to_string(),
            nama_perwakilan: s.nama_perwakilan,
            tanda_tangan_perwakilan: s.tanda_tangan_perwakilan.as_str().to_string(),
            catatan: s.catatan,
            created_at: s.created_at,
        }
    }
}

// ===== Documents =====

impl From<BeritaAcaraRequest> for contract::BeritaAcaraInput {
    fn from(req: BeritaAcaraRequest) -> Self {
        Self {
            permohonan_id: req.permohonan_id,
            pemegang_id: req.pemegang_id,
            penanggung_jawab_id: req.penanggung_jawab_id,
            tanggal: req.tanggal,
            alasan: req.alasan,
            alasan_lainnya: req.alasan_lainnya,
            tanda_tangan: signature_inputs(req.tanda_tangan),
        }
    }
}

impl From<contract::BeritaAcara> for BeritaAcaraDto {
    fn from(ba: contract::BeritaAcara) -> Self {
        Self {
            id: ba.id,
            permohonan_id: ba.permohonan_id,
            pemegang_id: ba.pemegang_id,
            penanggung_jawab_id: ba.penanggung_jawab_id,
            tanggal: ba.tanggal,
            alasan: ba.alasan.label().to_string(),
            alasan_lainnya: ba.alasan.keterangan().map(str::to_string),
            tanda_tangan_tim: signatures(&ba.tanda_tangan_tim),
            created_at: ba.created_at,
        }
    }
}

impl From<BaPemeriksaanRequest> for contract::BaPemeriksaanInput {
    fn from(req: BaPemeriksaanRequest) -> Self {
        Self {
            penilaian_id: req.penilaian_id,
            nomor_ba: req.nomor_ba,
            nomor_surat_tugas: req.nomor_surat_tugas,
            tanggal_surat_tugas: req.tanggal_surat_tugas,
            nomor_identifikasi: req.nomor_identifikasi,
            tanda_tangan: signature_inputs(req.tanda_tangan),
        }
    }
}

impl From<contract::BaPemeriksaan> for BaPemeriksaanDto {
    fn from(ba: contract::BaPemeriksaan) -> Self {
        Self {
            id: ba.id,
            penilaian_id: ba.penilaian_id,
            tanda_tangan_tim: signatures(&ba.tanda_tangan_tim),
            nomor_ba: ba.nomor_ba,
            nomor_surat_tugas: ba.nomor_surat_tugas,
            tanggal_surat_tugas: ba.tanggal_surat_tugas,
            nomor_identifikasi: ba.nomor_identifikasi,
            created_at: ba.created_at,
            updated_at: ba.updated_at,
        }
    }
}

impl From<BaHasilRequest> for contract::BaHasilPenilaianInput {
    fn from(req: BaHasilRequest) -> Self {
        Self {
            penilaian_id: req.penilaian_id,
            nomor_ba: req.nomor_ba,
            tanggal: req.tanggal,
            hasil: req.hasil,
            kesimpulan: req.kesimpulan,
            tanda_tangan: signature_inputs(req.tanda_tangan),
        }
    }
}

impl From<contract::BaHasilPenilaian> for BaHasilDto {
    fn from(ba: contract::BaHasilPenilaian) -> Self {
        Self {
            id: ba.id,
            penilaian_id: ba.penilaian_id,
            tanda_tangan_tim: signatures(&ba.tanda_tangan_tim),
            nomor_ba: ba.nomor_ba,
            tanggal: ba.tanggal,
            hasil: ba.hasil.to_string(),
            kesimpulan: ba.kesimpulan,
            created_at: ba.created_at,
            updated_at: ba.updated_at,
        }
    }
}

impl From<FormulirRequest> for contract::FormulirAnalisisInput {
    fn from(req: FormulirRequest) -> Self {
        Self {
            penilaian_id: req.penilaian_id,
            analisis_desk_study: req.analisis_desk_study,
            analisis_pemeriksaan: req.analisis_pemeriksaan,
            analisis_pengukuran: req.analisis_pengukuran,
            kesimpulan: req.kesimpulan,
            rekomendasi: req.rekomendasi,
            tanda_tangan: signature_inputs(req.tanda_tangan),
        }
    }
}

impl From<contract::FormulirAnalisisPenilaian> for FormulirDto {
    fn from(form: contract::FormulirAnalisisPenilaian) -> Self {
        Self {
            id: form.id,
            penilaian_id: form.penilaian_id,
            tanda_tangan_tim: signatures(&form.tanda_tangan_tim),
            analisis_desk_study: form.analisis_desk_study,
            analisis_pemeriksaan: form.analisis_pemeriksaan,
            analisis_pengukuran: form.analisis_pengukuran,
            kesimpulan: form.kesimpulan.to_string(),
            rekomendasi: form.rekomendasi,
            created_at: form.created_at,
            updated_at: form.updated_at,
        }
    }
}

// ===== Edit requests =====

impl From<contract::EditRequest> for EditRequestDto {
    fn from(r: contract::EditRequest) -> Self {
        Self {
            id: r.id,
            penilaian_id: r.penilaian_id,
            requested_by: r.requested_by,
            alasan: r.alasan,
            status: r.status.to_string(),
            alasan_penolakan: r.alasan_penolakan,
            processed_by: r.processed_by,
            processed_at: r.processed_at,
            created_at: r.created_at,
        }
    }
}
