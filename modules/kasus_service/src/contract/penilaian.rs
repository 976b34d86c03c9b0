//! Assessment (penilaian) models and the team signature set

use super::model::labelled_enum;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

labelled_enum! {
    /// Compliance result of one desk-study or inspection line
    HasilKesesuaian, "compliance result" {
        Sesuai => "Sesuai",
        TidakSesuai => "Tidak Sesuai",
    }
}

labelled_enum! {
    /// Status tag attached to a measured value
    StatusPengukuran, "measurement status" {
        Sesuai => "Sesuai",
        Melebihi => "Melebihi",
        Kurang => "Kurang",
        TidakDiatur => "Tidak Diatur",
        TidakDapatDiukur => "Tidak Dapat Diukur",
    }
}

/// Number of fixed inspection items on the assessment form
pub const PEMERIKSAAN_ITEMS: usize = 8;

/// Number of fixed measurement items on the assessment form
pub const PENGUKURAN_ITEMS: usize = 12;

/// Opaque reference to a stored signature or photo file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureRef(String);

impl SignatureRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignatureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team signatures keyed by signer
///
/// Merging is last-writer-wins per user id: entries for signers absent from an
/// incoming batch are kept untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet(BTreeMap<Uuid, SignatureRef>);

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entries present in `incoming`, keep the rest.
    /// Returns the references that were replaced and are no longer referenced.
    pub fn merge(&mut self, incoming: SignatureSet) -> Vec<SignatureRef> {
        let mut replaced = Vec::new();
        for (user_id, signature) in incoming.0 {
            if let Some(previous) = self.0.insert(user_id, signature.clone()) {
                if previous != signature {
                    replaced.push(previous);
                }
            }
        }
        replaced
    }

    pub fn insert(&mut self, user_id: Uuid, signature: SignatureRef) -> Option<SignatureRef> {
        self.0.insert(user_id, signature)
    }

    pub fn get(&self, user_id: &Uuid) -> Option<&SignatureRef> {
        self.0.get(user_id)
    }

    pub fn contains(&self, user_id: &Uuid) -> bool {
        self.0.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &SignatureRef)> {
        self.0.iter()
    }

    pub fn signers(&self) -> impl Iterator<Item = &Uuid> {
        self.0.keys()
    }

    pub fn refs(&self) -> impl Iterator<Item = &SignatureRef> {
        self.0.values()
    }
}

impl FromIterator<(Uuid, SignatureRef)> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = (Uuid, SignatureRef)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Desk-study line: location and activity checked against the spatial plan
///
/// Draft saves may leave fields blank; a submitted assessment always has all five.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskStudyEntry {
    pub pernyataan_lokasi: String,
    pub pernyataan_kegiatan: String,
    pub jenis_rencana_tata_ruang: String,
    pub arahan_rencana_tata_ruang: String,
    pub hasil_kesesuaian: Option<HasilKesesuaian>,
}

/// Inspection line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemeriksaanEntry {
    pub pernyataan: String,
    pub hasil: HasilKesesuaian,
}

/// Measurement line
#[derive(Debug, Clone, PartialEq)]
pub struct PengukuranEntry {
    pub parameter: String,
    pub nilai: f64,
    pub status: StatusPengukuran,
}

/// A non-compliant desk study voids the inspection and measurement sections
pub fn desk_study_voids_downstream(entries: &[DeskStudyEntry]) -> bool {
    entries
        .iter()
        .any(|e| e.hasil_kesesuaian == Some(HasilKesesuaian::TidakSesuai))
}

/// Assessment of a case; at most one per case
#[derive(Debug, Clone, PartialEq)]
pub struct Penilaian {
    pub id: Uuid,
    pub kasus_id: Uuid,
    pub desk_study: Vec<DeskStudyEntry>,
    pub pemeriksaan: Vec<PemeriksaanEntry>,
    pub pengukuran: Vec<PengukuranEntry>,
    pub catatan: Option<String>,
    pub tanda_tangan_tim: SignatureSet,
    /// Optimistic concurrency counter, bumped on every write
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Penilaian {
    /// Fresh, unsaved assessment for a case
    pub fn empty(kasus_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kasus_id,
            desk_study: Vec::new(),
            pemeriksaan: Vec::new(),
            pengukuran: Vec::new(),
            catatan: None,
            tanda_tangan_tim: SignatureSet::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_desk_study_non_compliant(&self) -> bool {
        desk_study_voids_downstream(&self.desk_study)
    }
}

// ===== Raw (unvalidated) submissions =====

/// Desk-study line as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskStudyInput {
    pub pernyataan_lokasi: Option<String>,
    pub pernyataan_kegiatan: Option<String>,
    pub jenis_rencana_tata_ruang: Option<String>,
    pub arahan_rencana_tata_ruang: Option<String>,
    pub hasil_kesesuaian: Option<String>,
}

/// Inspection line as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PemeriksaanInput {
    pub pernyataan: Option<String>,
    pub hasil: Option<String>,
}

/// Measurement line as sent by the client; `nilai` keeps its textual form until validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PengukuranInput {
    pub parameter: Option<String>,
    pub nilai: Option<String>,
    pub status: Option<String>,
}

/// One signer and the data-URI of their signature image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureInput {
    pub user_id: Option<Uuid>,
    pub signature: Option<String>,
}

/// Full assessment submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenilaianSubmission {
    pub desk_study: Vec<DeskStudyInput>,
    pub pemeriksaan: Option<Vec<PemeriksaanInput>>,
    pub pengukuran: Option<Vec<PengukuranInput>>,
    pub catatan: Option<String>,
    pub tanda_tangan: Vec<SignatureInput>,
}

/// Partial save: desk study and notes only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenilaianDraft {
    pub desk_study: Option<Vec<DeskStudyInput>>,
    pub catatan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_absent_signers_and_overwrites_present_ones() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut existing: SignatureSet = [(a, SignatureRef::new("a-1.png"))].into_iter().collect();

        let replaced = existing.merge([(b, SignatureRef::new("b-1.png"))].into_iter().collect());
        assert!(replaced.is_empty());
        assert_eq!(existing.get(&a), Some(&SignatureRef::new("a-1.png")));
        assert_eq!(existing.get(&b), Some(&SignatureRef::new("b-1.png")));

        let replaced = existing.merge([(a, SignatureRef::new("a-2.png"))].into_iter().collect());
        assert_eq!(replaced, vec![SignatureRef::new("a-1.png")]);
        assert_eq!(existing.get(&a), Some(&SignatureRef::new("a-2.png")));
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn void_rule_triggers_on_any_non_compliant_line() {
        let mut entries = vec![DeskStudyEntry {
            hasil_kesesuaian: Some(HasilKesesuaian::Sesuai),
            ..Default::default()
        }];
        assert!(!desk_study_voids_downstream(&entries));

        entries.push(DeskStudyEntry {
            hasil_kesesuaian: Some(HasilKesesuaian::TidakSesuai),
            ..Default::default()
        });
        assert!(desk_study_voids_downstream(&entries));
    }

    #[test]
    fn blank_desk_study_is_not_treated_as_non_compliant() {
        assert!(!desk_study_voids_downstream(&[]));
        assert!(!desk_study_voids_downstream(&[DeskStudyEntry::default()]));
    }

    #[test]
    fn measurement_status_labels_round_trip() {
        for status in StatusPengukuran::ALL {
            assert_eq!(status.as_str().parse::<StatusPengukuran>().ok(), Some(*status));
        }
        assert!("Lebih".parse::<StatusPengukuran>().is_err());
    }
}
