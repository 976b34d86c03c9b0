//! HTTP request handlers - thin layer that delegates to domain service
//!
//! Every protected handler receives the [`Actor`] injected by the auth middleware and passes it
//! to the service, which owns all authorization decisions.

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::contract::{Actor, EditDecision, PermohonanFilter};
use crate::domain::Service;
use axum::{extract::Path, extract::Query, http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

type SharedService = Extension<Arc<Service>>;
type CurrentActor = Extension<Actor>;

// ===== Health =====

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, body = HealthResponse)))]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ===== Directory =====

#[utoipa::path(get, path = "/users", tag = "directory",
    responses((status = 200, body = [UserDto]), (status = 403, body = Problem)))]
pub async fn list_users(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
) -> Result<Json<Vec<UserDto>>, Problem> {
    let users = service.list_users(&actor).await.map_err(map_domain_error)?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/users", tag = "directory", request_body = CreateUserRequest,
    responses((status = 201, body = UserDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn create_user(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), Problem> {
    let user = service
        .create_user(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(get, path = "/tim", tag = "directory",
    responses((status = 200, body = [TeamDto]), (status = 403, body = Problem)))]
pub async fn list_teams(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
) -> Result<Json<Vec<TeamDto>>, Problem> {
    let teams = service.list_teams(&actor).await.map_err(map_domain_error)?;
    Ok(Json(teams.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/tim", tag = "directory", request_body = TeamRequest,
    responses((status = 201, body = TeamDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn create_team(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<TeamRequest>,
) -> Result<(StatusCode, Json<TeamDto>), Problem> {
    let team = service
        .create_team(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(team.into())))
}

#[utoipa::path(get, path = "/tim/{id}", tag = "directory", params(("id" = Uuid, Path)),
    responses((status = 200, body = TeamRosterDto), (status = 404, body = Problem)))]
pub async fn get_team(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamRosterDto>, Problem> {
    let roster = service.get_team(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(roster.into()))
}

#[utoipa::path(put, path = "/tim/{id}", tag = "directory", params(("id" = Uuid, Path)),
    request_body = TeamRequest,
    responses((status = 200, body = TeamDto), (status = 404, body = Problem), (status = 422, body = Problem)))]
pub async fn update_team(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<TeamRequest>,
) -> Result<Json<TeamDto>, Problem> {
    let team = service
        .update_team(&actor, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(team.into()))
}

#[utoipa::path(delete, path = "/tim/{id}", tag = "directory", params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404, body = Problem)))]
pub async fn delete_team(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_team(&actor, id).await.map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Pemegang =====

#[utoipa::path(get, path = "/pemegang", tag = "pemegang",
    responses((status = 200, body = [PemegangDto]), (status = 403, body = Problem)))]
pub async fn list_pemegang(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
) -> Result<Json<Vec<PemegangDto>>, Problem> {
    let items = service.list_pemegang(&actor).await.map_err(map_domain_error)?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/pemegang", tag = "pemegang", request_body = PemegangRequest,
    responses((status = 201, body = PemegangDto), (status = 422, body = Problem)))]
pub async fn create_pemegang(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<PemegangRequest>,
) -> Result<(StatusCode, Json<PemegangDto>), Problem> {
    let pemegang = service
        .create_pemegang(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(pemegang.into())))
}

#[utoipa::path(get, path = "/pemegang/{id}", tag = "pemegang", params(("id" = Uuid, Path)),
    responses((status = 200, body = PemegangDto), (status = 404, body = Problem)))]
pub async fn get_pemegang(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<PemegangDto>, Problem> {
    let pemegang = service.get_pemegang(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(pemegang.into()))
}

#[utoipa::path(put, path = "/pemegang/{id}", tag = "pemegang", params(("id" = Uuid, Path)),
    request_body = PemegangRequest,
    responses((status = 200, body = PemegangDto), (status = 404, body = Problem), (status = 422, body = Problem)))]
pub async fn update_pemegang(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<PemegangRequest>,
) -> Result<Json<PemegangDto>, Problem> {
    let pemegang = service
        .update_pemegang(&actor, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(pemegang.into()))
}

#[utoipa::path(delete, path = "/pemegang/{id}", tag = "pemegang", params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404, body = Problem), (status = 409, body = Problem)))]
pub async fn delete_pemegang(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_pemegang(&actor, id).await.map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Permohonan =====

fn parse_filter(status: Option<&str>) -> Result<PermohonanFilter, Problem> {
    match status {
        None | Some("all") => Ok(PermohonanFilter::All),
        Some("pending") => Ok(PermohonanFilter::Pending),
        Some(other) => Err(Problem::invalid_parameter(
            "status",
            format!("expected 'pending' or 'all', got '{}'", other),
        )),
    }
}

#[utoipa::path(get, path = "/permohonan-penilaian", tag = "permohonan", params(PermohonanListQuery),
    responses((status = 200, body = PermohonanPage), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn list_permohonan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Query(query): Query<PermohonanListQuery>,
) -> Result<Json<PermohonanPage>, Problem> {
    let filter = parse_filter(query.status.as_deref())?;
    let page = service
        .list_permohonan(&actor, filter, query.page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(page.into()))
}

#[utoipa::path(post, path = "/permohonan-penilaian", tag = "permohonan", request_body = PermohonanRequest,
    responses((status = 201, body = PermohonanDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn create_permohonan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<PermohonanRequest>,
) -> Result<(StatusCode, Json<PermohonanDto>), Problem> {
    let permohonan = service
        .create_permohonan(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(permohonan.into())))
}

#[utoipa::path(get, path = "/permohonan-penilaian/{id}", tag = "permohonan", params(("id" = Uuid, Path)),
    responses((status = 200, body = PermohonanDto), (status = 404, body = Problem)))]
pub async fn get_permohonan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<PermohonanDto>, Problem> {
    let permohonan = service.get_permohonan(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(permohonan.into()))
}

#[utoipa::path(put, path = "/permohonan-penilaian/{id}", tag = "permohonan", params(("id" = Uuid, Path)),
    request_body = PermohonanRequest,
    responses((status = 200, body = PermohonanDto), (status = 404, body = Problem), (status = 422, body = Problem)))]
pub async fn update_permohonan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<PermohonanRequest>,
) -> Result<Json<PermohonanDto>, Problem> {
    let permohonan = service
        .update_permohonan(&actor, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(permohonan.into()))
}

#[utoipa::path(delete, path = "/permohonan-penilaian/{id}", tag = "permohonan", params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404, body = Problem), (status = 409, body = Problem)))]
pub async fn delete_permohonan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_permohonan(&actor, id).await.map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// 201 when the case was created, 200 when an existing one was refreshed
#[utoipa::path(post, path = "/penilaian/initiate/{permohonan_id}", tag = "penilaian",
    params(("permohonan_id" = Uuid, Path)),
    responses((status = 201, body = InitiateResponse), (status = 200, body = InitiateResponse),
        (status = 403, body = Problem), (status = 404, body = Problem), (status = 422, body = Problem)))]
pub async fn initiate_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(permohonan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<InitiateResponse>), Problem> {
    let (kasus, created) = service
        .initiate_kasus(&actor, permohonan_id)
        .await
        .map_err(map_domain_error)?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(InitiateResponse {
            kasus_id: kasus.id,
            created,
        }),
    ))
}

// ===== Kasus =====

#[utoipa::path(get, path = "/kasus", tag = "kasus", params(PageQuery),
    responses((status = 200, body = KasusPage), (status = 403, body = Problem)))]
pub async fn list_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Query(query): Query<PageQuery>,
) -> Result<Json<KasusPage>, Problem> {
    let page = service.list_kasus(&actor, query.page).await.map_err(map_domain_error)?;
    Ok(Json(page.into()))
}

#[utoipa::path(get, path = "/kasus/{id}", tag = "kasus", params(("id" = Uuid, Path)),
    responses((status = 200, body = KasusDetailDto), (status = 403, body = Problem), (status = 404, body = Problem)))]
pub async fn get_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<KasusDetailDto>, Problem> {
    let detail = service.get_kasus_detail(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(detail.into()))
}

#[utoipa::path(put, path = "/kasus/{id}", tag = "kasus", params(("id" = Uuid, Path)),
    request_body = KasusUpdateRequest,
    responses((status = 200, body = KasusDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn update_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<KasusUpdateRequest>,
) -> Result<Json<KasusDto>, Problem> {
    let kasus = service
        .update_kasus(&actor, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(kasus.into()))
}

#[utoipa::path(delete, path = "/kasus/{id}", tag = "kasus", params(("id" = Uuid, Path)),
    responses((status = 204), (status = 403, body = Problem), (status = 404, body = Problem)))]
pub async fn delete_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_kasus(&actor, id).await.map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/kasus/{id}/verifikasi", tag = "kasus", params(("id" = Uuid, Path)),
    request_body = VerifikasiRequest,
    responses((status = 200, body = KasusDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn verify_kasus(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifikasiRequest>,
) -> Result<Json<KasusDto>, Problem> {
    let kasus = service
        .verify_kasus(&actor, id, req.hasil.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(kasus.into()))
}

#[utoipa::path(post, path = "/kasus/{id}/status", tag = "kasus", params(("id" = Uuid, Path)),
    request_body = StatusChangeRequest,
    responses((status = 200, body = KasusDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn change_kasus_status(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<KasusDto>, Problem> {
    let kasus = service
        .change_kasus_status(&actor, id, req.status.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(kasus.into()))
}

#[utoipa::path(post, path = "/kasus/{id}/survei/mulai", tag = "kasus", params(("id" = Uuid, Path)),
    responses((status = 200, body = KasusDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn start_survei(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<KasusDto>, Problem> {
    let kasus = service.start_survei(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(kasus.into()))
}

#[utoipa::path(get, path = "/kasus/{id}/survei", tag = "kasus", params(("id" = Uuid, Path)),
    responses((status = 200, body = [SurveiDto]), (status = 403, body = Problem)))]
pub async fn list_survei(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SurveiDto>>, Problem> {
    let surveys = service.list_survei(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(surveys.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/kasus/{id}/survei", tag = "kasus", params(("id" = Uuid, Path)),
    request_body = SurveiRequest,
    responses((status = 201, body = SurveiDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn record_survei(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<SurveiRequest>,
) -> Result<(StatusCode, Json<SurveiDto>), Problem> {
    let survei = service
        .record_survei(&actor, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(survei.into())))
}

// ===== Penilaian =====

/// Assessment view of a case: the case with its assessment and team
#[utoipa::path(get, path = "/penilaian/pmp-umk/{kasus_id}", tag = "penilaian",
    params(("kasus_id" = Uuid, Path)),
    responses((status = 200, body = KasusDetailDto), (status = 403, body = Problem), (status = 404, body = Problem)))]
pub async fn get_penilaian(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(kasus_id): Path<Uuid>,
) -> Result<Json<KasusDetailDto>, Problem> {
    let detail = service
        .get_kasus_detail(&actor, kasus_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(detail.into()))
}

#[utoipa::path(post, path = "/penilaian/pmp-umk/{kasus_id}", tag = "penilaian",
    params(("kasus_id" = Uuid, Path)), request_body = PenilaianSubmitRequest,
    responses((status = 201, body = PenilaianDto), (status = 403, body = Problem),
        (status = 409, body = Problem), (status = 422, body = Problem)))]
pub async fn submit_penilaian(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(kasus_id): Path<Uuid>,
    Json(req): Json<PenilaianSubmitRequest>,
) -> Result<(StatusCode, Json<PenilaianDto>), Problem> {
    let penilaian = service
        .submit_penilaian(&actor, kasus_id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(penilaian.into())))
}

#[utoipa::path(post, path = "/penilaian/pmp-umk/{kasus_id}/draft", tag = "penilaian",
    params(("kasus_id" = Uuid, Path)), request_body = PenilaianDraftRequest,
    responses((status = 200, body = PenilaianDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn save_penilaian_draft(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(kasus_id): Path<Uuid>,
    Json(req): Json<PenilaianDraftRequest>,
) -> Result<Json<PenilaianDto>, Problem> {
    let penilaian = service
        .save_penilaian_draft(&actor, kasus_id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(penilaian.into()))
}

// ===== Documents =====

#[utoipa::path(post, path = "/berita-acara", tag = "dokumen", request_body = BeritaAcaraRequest,
    responses((status = 201, body = BeritaAcaraDto), (status = 403, body = Problem),
        (status = 409, body = Problem), (status = 422, body = Problem)))]
pub async fn create_berita_acara(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<BeritaAcaraRequest>,
) -> Result<(StatusCode, Json<BeritaAcaraDto>), Problem> {
    let berita_acara = service
        .record_non_completion(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(berita_acara.into())))
}

#[utoipa::path(get, path = "/berita-acara/{id}", tag = "dokumen", params(("id" = Uuid, Path)),
    responses((status = 200, body = BeritaAcaraDto), (status = 404, body = Problem)))]
pub async fn get_berita_acara(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<BeritaAcaraDto>, Problem> {
    let berita_acara = service.get_berita_acara(&actor, id).await.map_err(map_domain_error)?;
    Ok(Json(berita_acara.into()))
}

#[utoipa::path(post, path = "/ba-pemeriksaan", tag = "dokumen", request_body = BaPemeriksaanRequest,
    responses((status = 200, body = BaPemeriksaanDto), (status = 403, body = Problem),
        (status = 409, body = Problem), (status = 422, body = Problem)))]
pub async fn save_ba_pemeriksaan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<BaPemeriksaanRequest>,
) -> Result<Json<BaPemeriksaanDto>, Problem> {
    let ba = service
        .save_ba_pemeriksaan(&actor, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(ba.into()))
}

#[utoipa::path(get, path = "/ba-pemeriksaan/{penilaian_id}", tag = "dokumen",
    params(("penilaian_id" = Uuid, Path)),
    responses((status = 200, body = BaPemeriksaanDto), (status = 404, body = Problem)))]
pub async fn get_ba_pemeriksaan(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(penilaian_id): Path<Uuid>,
) -> Result<Json<BaPemeriksaanDto>, Problem> {
    let ba = service
        .get_ba_pemeriksaan(&actor, penilaian_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(ba.into()))
}

#[utoipa::path(post, path = "/ba-hasil-penilaian", tag = "dokumen", request_body = BaHasilRequest,
    responses((status = 200, body = BaHasilDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn save_ba_hasil(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<BaHasilRequest>,
) -> Result<Json<BaHasilDto>, Problem> {
    let ba = service.save_ba_hasil(&actor, req.into()).await.map_err(map_domain_error)?;
    Ok(Json(ba.into()))
}

#[utoipa::path(get, path = "/ba-hasil-penilaian/{penilaian_id}", tag = "dokumen",
    params(("penilaian_id" = Uuid, Path)),
    responses((status = 200, body = BaHasilDto), (status = 404, body = Problem)))]
pub async fn get_ba_hasil(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(penilaian_id): Path<Uuid>,
) -> Result<Json<BaHasilDto>, Problem> {
    let ba = service
        .get_ba_hasil(&actor, penilaian_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(ba.into()))
}

#[utoipa::path(post, path = "/formulir-analisis-penilaian", tag = "dokumen", request_body = FormulirRequest,
    responses((status = 200, body = FormulirDto), (status = 403, body = Problem), (status = 422, body = Problem)))]
pub async fn save_formulir(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Json(req): Json<FormulirRequest>,
) -> Result<Json<FormulirDto>, Problem> {
    let form = service.save_formulir(&actor, req.into()).await.map_err(map_domain_error)?;
    Ok(Json(form.into()))
}

#[utoipa::path(get, path = "/formulir-analisis-penilaian/{penilaian_id}", tag = "dokumen",
    params(("penilaian_id" = Uuid, Path)),
    responses((status = 200, body = FormulirDto), (status = 404, body = Problem)))]
pub async fn get_formulir(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(penilaian_id): Path<Uuid>,
) -> Result<Json<FormulirDto>, Problem> {
    let form = service
        .get_formulir(&actor, penilaian_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(form.into()))
}

// ===== Edit requests =====

#[utoipa::path(get, path = "/penilaian/{penilaian_id}/edit-requests", tag = "edit-requests",
    params(("penilaian_id" = Uuid, Path)),
    responses((status = 200, body = [EditRequestDto]), (status = 403, body = Problem)))]
pub async fn list_edit_requests(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(penilaian_id): Path<Uuid>,
) -> Result<Json<Vec<EditRequestDto>>, Problem> {
    let requests = service
        .list_edit_requests(&actor, penilaian_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/penilaian/{penilaian_id}/edit-requests", tag = "edit-requests",
    params(("penilaian_id" = Uuid, Path)), request_body = EditRequestCreate,
    responses((status = 201, body = EditRequestDto), (status = 403, body = Problem),
        (status = 409, body = Problem), (status = 422, body = Problem)))]
pub async fn create_edit_request(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(penilaian_id): Path<Uuid>,
    Json(req): Json<EditRequestCreate>,
) -> Result<(StatusCode, Json<EditRequestDto>), Problem> {
    let request = service
        .request_edit(&actor, penilaian_id, req.alasan.as_deref())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

#[utoipa::path(post, path = "/edit-requests/{id}/approve", tag = "edit-requests",
    params(("id" = Uuid, Path)),
    responses((status = 200, body = EditRequestDto), (status = 403, body = Problem), (status = 409, body = Problem)))]
pub async fn approve_edit_request(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<EditRequestDto>, Problem> {
    let request = service
        .process_edit_request(&actor, id, EditDecision::Approve)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(request.into()))
}

#[utoipa::path(post, path = "/edit-requests/{id}/reject", tag = "edit-requests",
    params(("id" = Uuid, Path)), request_body = RejectEditRequest,
    responses((status = 200, body = EditRequestDto), (status = 403, body = Problem), (status = 409, body = Problem)))]
pub async fn reject_edit_request(
    Extension(service): SharedService,
    Extension(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectEditRequest>,
) -> Result<Json<EditRequestDto>, Problem> {
    let decision = EditDecision::Reject {
        alasan: req.alasan_penolakan,
    };
    let request = service
        .process_edit_request(&actor, id, decision)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(request.into()))
}
