//! Authorization policy
//!
//! Every protected operation names an [`Action`]. A decision is made in two steps:
//!
//! 1. the actor's role must appear in the action's allow-list (Admin always passes);
//! 2. for case-scoped actions, the actor must be the case coordinator or a member of the
//!    case team. Both are resolved through the originating request (case → request → team /
//!    coordinator), never from the copies stored on the case itself.
//!
//! A finalized case (case **or** request status "Selesai Dinilai (Verifikasi)") may be viewed by
//! any operational role without membership.

use crate::contract::{Actor, KasusError, KasusStatus, PermohonanStatus, Role};
use uuid::Uuid;

/// Protected operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewKasus,
    InitiateKasus,
    UpdateKasus,
    DeleteKasus,
    VerifikasiKasus,
    ChangeKasusStatus,
    RequestEdit,
    ProcessEditRequest,
    RecordNonCompletion,
    ManageUsers,
    ViewDirectory,
    ManageTeams,
    ManagePemegang,
    ViewPemegang,
    ManagePermohonan,
    ViewPermohonan,
}

use Role::{KetuaTim, KoordinatorLapangan, PetugasLapangan, Sekretariat};

const OPERATIONAL: &[Role] = &[KoordinatorLapangan, KetuaTim, PetugasLapangan];
const SUPERVISORS: &[Role] = &[KoordinatorLapangan, KetuaTim];
const EVERYONE: &[Role] = &[KoordinatorLapangan, KetuaTim, PetugasLapangan, Sekretariat];

/// Roles that may view a finalized case without being on its team
pub const PUBLIC_VIEW_ROLES: &[Role] = OPERATIONAL;

impl Action {
    /// Non-admin roles allowed to attempt the action
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::ViewKasus => OPERATIONAL,
            Action::InitiateKasus => OPERATIONAL,
            Action::UpdateKasus => OPERATIONAL,
            Action::DeleteKasus => SUPERVISORS,
            Action::VerifikasiKasus => SUPERVISORS,
            Action::ChangeKasusStatus => &[KoordinatorLapangan],
            Action::RequestEdit => OPERATIONAL,
            Action::ProcessEditRequest => SUPERVISORS,
            Action::RecordNonCompletion => OPERATIONAL,
            Action::ManageUsers => &[],
            Action::ViewDirectory => EVERYONE,
            Action::ManageTeams => &[Sekretariat],
            Action::ManagePemegang => &[Sekretariat, KoordinatorLapangan],
            Action::ViewPemegang => EVERYONE,
            Action::ManagePermohonan => &[Sekretariat, KoordinatorLapangan],
            Action::ViewPermohonan => EVERYONE,
        }
    }

    /// Whether the team-membership test applies after the role check
    pub fn requires_membership(&self) -> bool {
        matches!(
            self,
            Action::ViewKasus
                | Action::UpdateKasus
                | Action::DeleteKasus
                | Action::VerifikasiKasus
                | Action::ChangeKasusStatus
                | Action::RequestEdit
                | Action::ProcessEditRequest
                | Action::RecordNonCompletion
        )
    }
}

/// What the policy needs to know about a case, resolved through its request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseAccess {
    pub kasus_status: Option<KasusStatus>,
    pub permohonan_status: Option<PermohonanStatus>,
    /// Coordinator recorded on the request
    pub penanggung_jawab_id: Option<Uuid>,
    /// Members of the request's team, any team role
    pub team_member_ids: Vec<Uuid>,
}

impl CaseAccess {
    /// Case or request carries the finalized sentinel (OR semantics, the two may diverge)
    pub fn is_publicly_viewable(&self) -> bool {
        self.kasus_status == Some(KasusStatus::SelesaiDinilai)
            || self.permohonan_status == Some(PermohonanStatus::SelesaiDinilai)
    }

    pub fn is_coordinator_or_member(&self, user_id: Uuid) -> bool {
        self.penanggung_jawab_id == Some(user_id) || self.team_member_ids.contains(&user_id)
    }
}

/// Role allow-list step alone; run before any lookup
pub fn check_role(actor: &Actor, action: Action) -> Result<(), KasusError> {
    if actor.is_admin() || action.allowed_roles().contains(&actor.role) {
        Ok(())
    } else {
        Err(KasusError::Forbidden)
    }
}

/// Full decision for a case-scoped action
pub fn authorize(actor: &Actor, action: Action, access: &CaseAccess) -> Result<(), KasusError> {
    if actor.is_admin() {
        return Ok(());
    }
    check_role(actor, action)?;

    if !action.requires_membership() {
        return Ok(());
    }
    if action == Action::ViewKasus
        && access.is_publicly_viewable()
        && PUBLIC_VIEW_ROLES.contains(&actor.role)
    {
        return Ok(());
    }
    if access.is_coordinator_or_member(actor.user_id) {
        Ok(())
    } else {
        Err(KasusError::Forbidden)
    }
}

/// Boolean form of [`authorize`], for list filtering
pub fn allows(actor: &Actor, action: Action, access: &CaseAccess) -> bool {
    authorize(actor, action, access).is_ok()
}
