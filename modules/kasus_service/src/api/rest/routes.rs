//! Route registration and the OpenAPI document

use super::{auth, dto::*, error::Problem, handlers};
use crate::domain::Service;
use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Kasus Penilaian API", description = "Case workflow for spatial-plan compliance assessments"),
    paths(
        handlers::health,
        handlers::list_users, handlers::create_user,
        handlers::list_teams, handlers::create_team, handlers::get_team, handlers::update_team, handlers::delete_team,
        handlers::list_pemegang, handlers::create_pemegang, handlers::get_pemegang, handlers::update_pemegang,
        handlers::delete_pemegang,
        handlers::list_permohonan, handlers::create_permohonan, handlers::get_permohonan,
        handlers::update_permohonan, handlers::delete_permohonan, handlers::initiate_kasus,
        handlers::list_kasus, handlers::get_kasus, handlers::update_kasus, handlers::delete_kasus,
        handlers::verify_kasus, handlers::change_kasus_status, handlers::start_survei,
        handlers::list_survei, handlers::record_survei,
        handlers::get_penilaian, handlers::submit_penilaian, handlers::save_penilaian_draft,
        handlers::create_berita_acara, handlers::get_berita_acara,
        handlers::save_ba_pemeriksaan, handlers::get_ba_pemeriksaan,
        handlers::save_ba_hasil, handlers::get_ba_hasil,
        handlers::save_formulir, handlers::get_formulir,
        handlers::list_edit_requests, handlers::create_edit_request,
        handlers::approve_edit_request, handlers::reject_edit_request,
    ),
    components(schemas(
        Problem, HealthResponse, UserDto, CreateUserRequest, MembershipDto, TeamDto, MembershipRequest,
        TeamRequest, TeamMemberDto, TeamRosterDto, PemegangDto, PemegangRequest, PermohonanDto,
        PermohonanRequest, PermohonanPage, InitiateResponse, KasusDto, KasusPage, KasusUpdateRequest,
        KasusDetailDto, VerifikasiRequest, StatusChangeRequest, DeskStudyDto, PemeriksaanDto,
        PengukuranDto, SignatureDto, PenilaianDto, DeskStudyRequest, PemeriksaanRequest,
        PengukuranRequest, SignatureRequest, PenilaianSubmitRequest, PenilaianDraftRequest,
        SurveiRequest, SurveiDto, BeritaAcaraRequest, BeritaAcaraDto, BaPemeriksaanRequest,
        BaPemeriksaanDto, BaHasilRequest, BaHasilDto, FormulirRequest, FormulirDto,
        EditRequestCreate, RejectEditRequest, EditRequestDto,
    )),
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full REST router.
///
/// `/health` and `/openapi.json` are public; everything else sits behind bearer
/// authentication.
pub fn router(service: Arc<Service>, auth_state: Arc<auth::AuthState>) -> Router {
    let protected = Router::new()
        // Directory
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/tim", get(handlers::list_teams).post(handlers::create_team))
        .route(
            "/tim/{id}",
            get(handlers::get_team)
                .put(handlers::update_team)
                .delete(handlers::delete_team),
        )
        .route("/pemegang", get(handlers::list_pemegang).post(handlers::create_pemegang))
        .route(
            "/pemegang/{id}",
            get(handlers::get_pemegang)
                .put(handlers::update_pemegang)
                .delete(handlers::delete_pemegang),
        )
        // Requests
        .route(
            "/permohonan-penilaian",
            get(handlers::list_permohonan).post(handlers::create_permohonan),
        )
        .route(
            "/permohonan-penilaian/{id}",
            get(handlers::get_permohonan)
                .put(handlers::update_permohonan)
                .delete(handlers::delete_permohonan),
        )
        .route("/penilaian/initiate/{permohonan_id}", post(handlers::initiate_kasus))
        // Cases
        .route("/kasus", get(handlers::list_kasus))
        .route(
            "/kasus/{id}",
            get(handlers::get_kasus)
                .put(handlers::update_kasus)
                .delete(handlers::delete_kasus),
        )
        .route("/kasus/{id}/verifikasi", post(handlers::verify_kasus))
        .route("/kasus/{id}/status", post(handlers::change_kasus_status))
        .route("/kasus/{id}/survei/mulai", post(handlers::start_survei))
        .route(
            "/kasus/{id}/survei",
            get(handlers::list_survei).post(handlers::record_survei),
        )
        // Assessment
        .route(
            "/penilaian/pmp-umk/{kasus_id}",
            get(handlers::get_penilaian).post(handlers::submit_penilaian),
        )
        .route("/penilaian/pmp-umk/{kasus_id}/draft", post(handlers::save_penilaian_draft))
        // Documents
        .route("/berita-acara", post(handlers::create_berita_acara))
        .route("/berita-acara/{id}", get(handlers::get_berita_acara))
        .route("/ba-pemeriksaan", post(handlers::save_ba_pemeriksaan))
        .route("/ba-pemeriksaan/{penilaian_id}", get(handlers::get_ba_pemeriksaan))
        .route("/ba-hasil-penilaian", post(handlers::save_ba_hasil))
        .route("/ba-hasil-penilaian/{penilaian_id}", get(handlers::get_ba_hasil))
        .route("/formulir-analisis-penilaian", post(handlers::save_formulir))
        .route(
            "/formulir-analisis-penilaian/{penilaian_id}",
            get(handlers::get_formulir),
        )
        // Edit requests
        .route(
            "/penilaian/{penilaian_id}/edit-requests",
            get(handlers::list_edit_requests).post(handlers::create_edit_request),
        )
        .route("/edit-requests/{id}/approve", post(handlers::approve_edit_request))
        .route("/edit-requests/{id}/reject", post(handlers::reject_edit_request))
        .route_layer(middleware::from_fn_with_state(auth_state, auth::require_auth))
        .layer(Extension(service));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi_json))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_the_workflow_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/permohonan-penilaian",
            "/penilaian/initiate/{permohonan_id}",
            "/penilaian/pmp-umk/{kasus_id}",
            "/penilaian/pmp-umk/{kasus_id}/draft",
            "/kasus/{id}/verifikasi",
            "/berita-acara",
            "/ba-pemeriksaan",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
