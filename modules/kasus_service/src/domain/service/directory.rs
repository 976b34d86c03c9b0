//! Users, teams and business holders

use super::{Service, StoreResultExt};
use crate::contract::{
    Actor, KasusError, Membership, Pemegang, PemegangInput, Team, TeamInput, TeamMember, TeamRoster, User, UserInput,
    ValidationErrors,
};
use crate::domain::policy::{self, Action};
use crate::domain::validation;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    // ===== Users =====

    pub async fn create_user(&self, actor: &Actor, input: UserInput) -> Result<User, KasusError> {
        policy::check_role(actor, Action::ManageUsers)?;
        let valid = validation::validate_user(&input)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: valid.name,
            email: valid.email,
            role: valid.role,
            created_at: now,
            updated_at: now,
        };
        let user = self
            .repos
            .directory
            .create_user(&user)
            .await
            .or_internal("user", user.id)?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, KasusError> {
        policy::check_role(actor, Action::ViewDirectory)?;
        self.repos.directory.list_users().await.or_internal("user", "*")
    }

    pub async fn get_user(&self, actor: &Actor, id: Uuid) -> Result<User, KasusError> {
        policy::check_role(actor, Action::ViewDirectory)?;
        self.repos
            .directory
            .find_user(id)
            .await
            .or_internal("user", id)?
            .ok_or_else(|| KasusError::not_found("user", id))
    }

    // ===== Teams =====

    /// Every member must name an existing user
    async fn check_members_exist(&self, members: &[Membership]) -> Result<(), KasusError> {
        let mut errors = ValidationErrors::new();
        for (i, member) in members.iter().enumerate() {
            let found = self
                .repos
                .directory
                .find_user(member.user_id)
                .await
                .or_internal("user", member.user_id)?;
            if found.is_none() {
                errors.add(format!("members.{i}.user_id"), "unknown user");
            }
        }
        errors.into_result()
    }

    pub async fn create_team(&self, actor: &Actor, input: TeamInput) -> Result<Team, KasusError> {
        policy::check_role(actor, Action::ManageTeams)?;
        let (name, members) = validation::validate_team(&input)?;
        self.check_members_exist(&members).await?;

        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name,
            members,
            created_at: now,
            updated_at: now,
        };
        let team = self.repos.directory.create_team(&team).await.or_internal("tim", team.id)?;
        tracing::info!(tim_id = %team.id, members = team.members.len(), "team created");
        Ok(team)
    }

    /// Rename and replace the member list
    pub async fn update_team(&self, actor: &Actor, id: Uuid, input: TeamInput) -> Result<Team, KasusError> {
        policy::check_role(actor, Action::ManageTeams)?;
        let mut team = self
            .repos
            .directory
            .find_team(id)
            .await
            .or_internal("tim", id)?
            .ok_or_else(|| KasusError::not_found("tim", id))?;

        let (name, members) = validation::validate_team(&input)?;
        self.check_members_exist(&members).await?;

        team.name = name;
        team.members = members;
        team.updated_at = Utc::now();
        self.repos.directory.update_team(&team).await.or_internal("tim", id)
    }

    pub async fn get_team(&self, actor: &Actor, id: Uuid) -> Result<TeamRoster, KasusError> {
        policy::check_role(actor, Action::ViewDirectory)?;
        let team = self
            .repos
            .directory
            .find_team(id)
            .await
            .or_internal("tim", id)?
            .ok_or_else(|| KasusError::not_found("tim", id))?;
        self.roster(team).await
    }

    pub async fn list_teams(&self, actor: &Actor) -> Result<Vec<Team>, KasusError> {
        policy::check_role(actor, Action::ViewDirectory)?;
        self.repos.directory.list_teams().await.or_internal("tim", "*")
    }

    pub async fn delete_team(&self, actor: &Actor, id: Uuid) -> Result<(), KasusError> {
        policy::check_role(actor, Action::ManageTeams)?;
        if self.repos.directory.delete_team(id).await.or_internal("tim", id)? {
            tracing::info!(tim_id = %id, "team deleted");
            Ok(())
        } else {
            Err(KasusError::not_found("tim", id))
        }
    }

    /// Resolve member seats to user records; seats of vanished users are skipped
    pub(crate) async fn roster(&self, team: Team) -> Result<TeamRoster, KasusError> {
        let mut members = Vec::with_capacity(team.members.len());
        for seat in &team.members {
            if let Some(user) = self
                .repos
                .directory
                .find_user(seat.user_id)
                .await
                .or_internal("user", seat.user_id)?
            {
                members.push(TeamMember { user, role: seat.role });
            }
        }
        Ok(TeamRoster { team, members })
    }

    // ===== Business holders =====

    pub async fn create_pemegang(&self, actor: &Actor, input: PemegangInput) -> Result<Pemegang, KasusError> {
        policy::check_role(actor, Action::ManagePemegang)?;
        let valid = validation::validate_pemegang(&input)?;

        let now = Utc::now();
        let pemegang = Pemegang {
            id: Uuid::new_v4(),
            nama: valid.nama,
            nomor_identitas: valid.nomor_identitas,
            kegiatan_usaha: valid.kegiatan_usaha,
            alamat: valid.alamat,
            kontak: valid.kontak,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .pemegang
            .create(&pemegang)
            .await
            .or_internal("pemegang", pemegang.id)
    }

    pub async fn update_pemegang(&self, actor: &Actor, id: Uuid, input: PemegangInput) -> Result<Pemegang, KasusError> {
        policy::check_role(actor, Action::ManagePemegang)?;
        let mut pemegang = self.find_pemegang(id).await?;
        let valid = validation::validate_pemegang(&input)?;

        pemegang.nama = valid.nama;
        pemegang.nomor_identitas = valid.nomor_identitas;
        pemegang.kegiatan_usaha = valid.kegiatan_usaha;
        pemegang.alamat = valid.alamat;
        pemegang.kontak = valid.kontak;
        pemegang.updated_at = Utc::now();
        self.repos.pemegang.update(&pemegang).await.or_internal("pemegang", id)
    }

    pub async fn get_pemegang(&self, actor: &Actor, id: Uuid) -> Result<Pemegang, KasusError> {
        policy::check_role(actor, Action::ViewPemegang)?;
        self.find_pemegang(id).await
    }

    pub async fn list_pemegang(&self, actor: &Actor) -> Result<Vec<Pemegang>, KasusError> {
        policy::check_role(actor, Action::ViewPemegang)?;
        self.repos.pemegang.list_all().await.or_internal("pemegang", "*")
    }

    /// Refused while any request or case still refers to the holder
    pub async fn delete_pemegang(&self, actor: &Actor, id: Uuid) -> Result<(), KasusError> {
        policy::check_role(actor, Action::ManagePemegang)?;
        self.find_pemegang(id).await?;
        if self.repos.pemegang.is_referenced(id).await.or_internal("pemegang", id)? {
            return Err(KasusError::conflict(format!(
                "pemegang {id} is still referenced by a request or case"
            )));
        }
        self.repos.pemegang.delete(id).await.or_internal("pemegang", id)?;
        Ok(())
    }

    pub(super) async fn find_pemegang(&self, id: Uuid) -> Result<Pemegang, KasusError> {
        self.repos
            .pemegang
            .find(id)
            .await
            .or_internal("pemegang", id)?
            .ok_or_else(|| KasusError::not_found("pemegang", id))
    }
}
