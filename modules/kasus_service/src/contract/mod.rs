//! Contract layer - transport-agnostic models and errors
//!
//! NO serde derives on models - these are pure domain types.

pub mod dokumen;
pub mod error;
pub mod model;
pub mod penilaian;

pub use dokumen::{
    AlasanTidakTerlaksana, BaHasilPenilaian, BaHasilPenilaianInput, BaPemeriksaan,
    BaPemeriksaanInput, BeritaAcara, BeritaAcaraInput, EditDecision, EditRequest,
    EditRequestStatus, FormulirAnalisisInput, FormulirAnalisisPenilaian, Survei, SurveiInput,
};
pub use error::{KasusError, ValidationErrors};
pub use model::{
    Actor, HasilVerifikasi, Kasus, KasusDetail, KasusStatus, KasusType, KasusUpdate, Membership,
    MembershipInput, Page, Pemegang, PemegangInput, PermohonanFilter, PermohonanInput, PermohonanPenilaian,
    PermohonanStatus, Role, Team, TeamInput, TeamMember, TeamRole, TeamRoster, UnknownVariant,
    User, UserInput,
};
pub use penilaian::{
    desk_study_voids_downstream, DeskStudyEntry, DeskStudyInput, HasilKesesuaian,
    PemeriksaanEntry, PemeriksaanInput, Penilaian, PenilaianDraft, PenilaianSubmission,
    PengukuranEntry, PengukuranInput, SignatureInput, SignatureRef, SignatureSet,
    StatusPengukuran,
};
