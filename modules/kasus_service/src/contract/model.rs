//! Contract models for the kasus service
//!
//! These models are transport-agnostic and used across the domain, storage and REST layers.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Returned when a stored or submitted label does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: '{value}'")]
pub struct UnknownVariant {
    /// Which vocabulary was being parsed
    pub kind: &'static str,
    /// The offending label
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Declares a closed label vocabulary: `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical label as stored and exchanged over HTTP
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::contract::model::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err($crate::contract::model::UnknownVariant::new($kind, other)),
                }
            }
        }
    };
}

pub(crate) use labelled_enum;

labelled_enum! {
    /// Application role; every user holds exactly one
    Role, "role" {
        Admin => "Admin",
        KoordinatorLapangan => "Koordinator Lapangan",
        KetuaTim => "Ketua Tim",
        PetugasLapangan => "Petugas Lapangan",
        Sekretariat => "Sekretariat",
    }
}

labelled_enum! {
    /// Role a user plays inside one team
    TeamRole, "team role" {
        KetuaTim => "Ketua Tim",
        PetugasLapangan => "Petugas Lapangan",
    }
}

labelled_enum! {
    /// Case type
    KasusType, "case type" {
        Kkpr => "KKPR",
        PmpUmk => "PMP_UMK",
    }
}

labelled_enum! {
    /// Case status vocabulary
    KasusStatus, "case status" {
        Baru => "Baru",
        ProsesSurvei => "Proses Survei",
        SurveiSelesai => "Survei Selesai",
        MenungguPenilaian => "Menunggu Penilaian",
        MenungguVerifikasi => "Menunggu Verifikasi",
        PenilaianSelesaiPatuh => "Penilaian Selesai - Patuh",
        PenilaianSelesaiTidakPatuh => "Penilaian Selesai - Tidak Patuh",
        Selesai => "Selesai",
        ProsesKeberatan => "Proses Keberatan",
        SelesaiDinilai => "Selesai Dinilai (Verifikasi)",
    }
}

labelled_enum! {
    /// Assessment request status vocabulary
    PermohonanStatus, "request status" {
        Baru => "Baru",
        Draft => "Draft",
        MenungguPenilaian => "Menunggu Penilaian",
        PenilaianTidakTerlaksana => "Penilaian Tidak Terlaksana",
        SelesaiDinilai => "Selesai Dinilai (Verifikasi)",
    }
}

labelled_enum! {
    /// Binary verification outcome
    HasilVerifikasi, "verification outcome" {
        Patuh => "Patuh",
        TidakPatuh => "Tidak Patuh",
    }
}

impl KasusStatus {
    /// Statuses from which a verification outcome may be recorded
    pub const VERIFIABLE: &'static [KasusStatus] =
        &[KasusStatus::SurveiSelesai, KasusStatus::MenungguPenilaian];

    /// The assessment is closed; reopening requires an approved edit request
    pub fn is_finalized(&self) -> bool {
        matches!(
            self,
            KasusStatus::PenilaianSelesaiPatuh
                | KasusStatus::PenilaianSelesaiTidakPatuh
                | KasusStatus::ProsesKeberatan
                | KasusStatus::Selesai
                | KasusStatus::SelesaiDinilai
        )
    }

    pub fn can_verify(&self) -> bool {
        Self::VERIFIABLE.contains(self)
    }

    /// Transitions a coordinator may apply by hand
    pub fn manual_transitions(&self) -> &'static [KasusStatus] {
        match self {
            KasusStatus::SurveiSelesai => &[KasusStatus::MenungguPenilaian],
            KasusStatus::MenungguVerifikasi
            | KasusStatus::PenilaianSelesaiPatuh
            | KasusStatus::PenilaianSelesaiTidakPatuh => {
                &[KasusStatus::ProsesKeberatan, KasusStatus::Selesai]
            }
            KasusStatus::ProsesKeberatan => &[KasusStatus::Selesai],
            KasusStatus::Selesai => &[KasusStatus::SelesaiDinilai],
            _ => &[],
        }
    }

    /// Statuses that still accept a field survey record
    pub fn accepts_survey(&self) -> bool {
        matches!(
            self,
            KasusStatus::Baru | KasusStatus::ProsesSurvei | KasusStatus::SurveiSelesai
        )
    }
}

impl From<HasilVerifikasi> for KasusStatus {
    fn from(hasil: HasilVerifikasi) -> Self {
        match hasil {
            HasilVerifikasi::Patuh => KasusStatus::PenilaianSelesaiPatuh,
            HasilVerifikasi::TidakPatuh => KasusStatus::PenilaianSelesaiTidakPatuh,
        }
    }
}

impl PermohonanStatus {
    /// No further workflow step may touch the request
    pub fn is_terminal(&self) -> bool {
        matches!(self, PermohonanStatus::PenilaianTidakTerlaksana)
    }
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Application user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when registering a user in the directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// One user's seat in a team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub user_id: Uuid,
    pub role: TeamRole,
}

/// Named group of users working a case together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Membership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().map(|m| m.user_id).collect()
    }
}

/// Team seat as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipInput {
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

/// Fields accepted when creating or editing a team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamInput {
    pub name: Option<String>,
    pub members: Vec<MembershipInput>,
}

/// A team member resolved to its user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub user: User,
    pub role: TeamRole,
}

/// Team with members eager-loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub team: Team,
    pub members: Vec<TeamMember>,
}

/// Audited business holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pemegang {
    pub id: Uuid,
    pub nama: String,
    pub nomor_identitas: String,
    pub kegiatan_usaha: String,
    pub alamat: String,
    pub kontak: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a business holder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PemegangInput {
    pub nama: Option<String>,
    pub nomor_identitas: Option<String>,
    pub kegiatan_usaha: Option<String>,
    pub alamat: Option<String>,
    pub kontak: Option<String>,
}

/// Assessment request (intake record preceding a case)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermohonanPenilaian {
    pub id: Uuid,
    /// Generated, globally unique and immutable
    pub nomor_permohonan: String,
    pub pemegang_id: Uuid,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub skor_prioritas: u8,
    pub status: PermohonanStatus,
    pub berita_acara_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermohonanInput {
    pub pemegang_id: Option<Uuid>,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub skor_prioritas: Option<i64>,
}

/// Request list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermohonanFilter {
    /// Requests whose case has no assessment yet (or no case at all)
    Pending,
    #[default]
    All,
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page).max(1)
    }
}

/// The operative workflow unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kasus {
    pub id: Uuid,
    pub jenis: KasusType,
    /// Matches the originating request one to one
    pub nomor_permohonan: String,
    pub status: KasusStatus,
    pub skor_prioritas: u8,
    pub tim_id: Option<Uuid>,
    pub penanggung_jawab_id: Option<Uuid>,
    pub pemegang_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable case attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KasusUpdate {
    pub jenis: Option<String>,
    pub skor_prioritas: Option<i64>,
}

/// Case with everything a reviewer needs eager-loaded
#[derive(Debug, Clone, PartialEq)]
pub struct KasusDetail {
    pub kasus: Kasus,
    pub pemegang: Option<Pemegang>,
    pub permohonan: Option<PermohonanPenilaian>,
    pub penilaian: Option<super::penilaian::Penilaian>,
    pub tim: Option<TeamRoster>,
    pub koordinator: Option<User>,
}
