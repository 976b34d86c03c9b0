//! Case lifecycle: initiation, assessment submission, verification and the manual closing steps

mod common;

use common::*;
use kasus_service::contract::*;

#[tokio::test]
async fn initiate_creates_the_case_once_and_copies_the_request() {
    print_test_header(
        "initiate_creates_the_case_once_and_copies_the_request",
        "A second initiation refreshes the existing case instead of creating another",
    );
    let fx = Fixture::new();

    let (kasus, created) = fx
        .service
        .initiate_kasus(&fx.koordinator, fx.permohonan_id)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(kasus.status, KasusStatus::Baru);
    assert_eq!(kasus.jenis, KasusType::PmpUmk);
    assert_eq!(kasus.tim_id, Some(fx.team_id));
    assert_eq!(kasus.pemegang_id, fx.pemegang_id);
    assert_eq!(kasus.penanggung_jawab_id, Some(fx.koordinator.user_id));
    assert_eq!(kasus.skor_prioritas, 50);

    let permohonan = fx.store.permohonan(fx.permohonan_id).unwrap();
    assert_eq!(permohonan.status, PermohonanStatus::MenungguPenilaian);
    assert_eq!(kasus.nomor_permohonan, permohonan.nomor_permohonan);

    let (again, created) = fx
        .service
        .initiate_kasus(&fx.ketua, fx.permohonan_id)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(again.id, kasus.id);
    assert_eq!(fx.store.kasus_count(), 1);
    fx.store.print_state("after double initiate");
}

#[tokio::test]
async fn initiate_is_refused_after_non_completion() {
    let fx = Fixture::new();
    fx.store
        .set_permohonan_status(fx.permohonan_id, PermohonanStatus::PenilaianTidakTerlaksana);

    let err = fx
        .service
        .initiate_kasus(&fx.koordinator, fx.permohonan_id)
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));
    assert_eq!(fx.store.kasus_count(), 0);
}

#[tokio::test]
async fn initiate_of_unknown_request_is_not_found() {
    let fx = Fixture::new();
    let err = fx
        .service
        .initiate_kasus(&fx.koordinator, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::NotFound { .. }));
}

#[tokio::test]
async fn submission_moves_case_and_request_forward() {
    print_test_header(
        "submission_moves_case_and_request_forward",
        "Ketua submits a compliant assessment with one team signature",
    );
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let penilaian = fx.submit(kasus_id).await;
    assert_eq!(penilaian.version, 1);
    assert_eq!(penilaian.desk_study.len(), 1);
    assert_eq!(penilaian.pemeriksaan.len(), 8);
    assert_eq!(penilaian.pengukuran.len(), 1);
    assert!(penilaian.tanda_tangan_tim.contains(&fx.ketua.user_id));

    let kasus = fx.store.kasus(kasus_id).unwrap();
    assert_eq!(kasus.status, KasusStatus::MenungguVerifikasi);
    let permohonan = fx.store.permohonan(fx.permohonan_id).unwrap();
    assert_eq!(permohonan.status, PermohonanStatus::MenungguPenilaian);
    assert_eq!(fx.images.stored().len(), 1);
}

#[tokio::test]
async fn verification_only_from_the_verifiable_statuses() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    // Menunggu Verifikasi is not in the verification window
    let err = fx
        .service
        .verify_kasus(&fx.ketua, kasus_id, Some("Patuh"))
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));

    for (start, hasil, expected) in [
        (KasusStatus::SurveiSelesai, "Patuh", KasusStatus::PenilaianSelesaiPatuh),
        (KasusStatus::MenungguPenilaian, "Tidak Patuh", KasusStatus::PenilaianSelesaiTidakPatuh),
    ] {
        fx.store.set_kasus_status(kasus_id, start);
        let kasus = fx.service.verify_kasus(&fx.ketua, kasus_id, Some(hasil)).await.unwrap();
        assert_eq!(kasus.status, expected);
        assert_eq!(fx.store.kasus(kasus_id).unwrap().status, expected);
    }
}

#[tokio::test]
async fn verification_rejects_unknown_outcomes_and_petugas() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.store.set_kasus_status(kasus_id, KasusStatus::MenungguPenilaian);

    let err = fx
        .service
        .verify_kasus(&fx.ketua, kasus_id, Some("Lulus"))
        .await
        .unwrap_err();
    match err {
        KasusError::Validation { errors } => assert!(errors.contains("hasil")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = fx
        .service
        .verify_kasus(&fx.petugas, kasus_id, Some("Patuh"))
        .await
        .unwrap_err();
    assert_eq!(err, KasusError::Forbidden);
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::MenungguPenilaian);
}

#[tokio::test]
async fn coordinator_walks_the_closing_transitions() {
    print_test_header(
        "coordinator_walks_the_closing_transitions",
        "Patuh → Proses Keberatan → Selesai → Selesai Dinilai, mirrored onto the request at the end",
    );
    let fx = Fixture::new();
    let (kasus_id, _) = fx.finalized().await;

    for target in [KasusStatus::ProsesKeberatan, KasusStatus::Selesai] {
        let kasus = fx
            .service
            .change_kasus_status(&fx.koordinator, kasus_id, Some(target.as_str()))
            .await
            .unwrap();
        assert_eq!(kasus.status, target);
    }
    assert_eq!(
        fx.store.permohonan(fx.permohonan_id).unwrap().status,
        PermohonanStatus::MenungguPenilaian
    );

    fx.service
        .change_kasus_status(&fx.koordinator, kasus_id, Some(KasusStatus::SelesaiDinilai.as_str()))
        .await
        .unwrap();
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::SelesaiDinilai);
    assert_eq!(
        fx.store.permohonan(fx.permohonan_id).unwrap().status,
        PermohonanStatus::SelesaiDinilai
    );
}

#[tokio::test]
async fn submitted_case_closes_without_verification() {
    print_test_header(
        "submitted_case_closes_without_verification",
        "Menunggu Verifikasi → Proses Keberatan → Selesai → Selesai Dinilai, service calls only",
    );
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let err = fx
        .service
        .change_kasus_status(&fx.koordinator, kasus_id, Some("Menunggu Penilaian"))
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));

    for target in [
        KasusStatus::ProsesKeberatan,
        KasusStatus::Selesai,
        KasusStatus::SelesaiDinilai,
    ] {
        let kasus = fx
            .service
            .change_kasus_status(&fx.koordinator, kasus_id, Some(target.as_str()))
            .await
            .unwrap();
        assert_eq!(kasus.status, target);
    }
    assert_eq!(
        fx.store.permohonan(fx.permohonan_id).unwrap().status,
        PermohonanStatus::SelesaiDinilai
    );
}

#[tokio::test]
async fn submitted_case_can_be_closed_directly() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let kasus = fx
        .service
        .change_kasus_status(&fx.koordinator, kasus_id, Some("Selesai"))
        .await
        .unwrap();
    assert_eq!(kasus.status, KasusStatus::Selesai);

    // Closed cases refuse a further submission
    let err = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, compliant_submission(fx.ketua.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));
}

#[tokio::test]
async fn manual_transitions_outside_the_table_are_refused() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let err = fx
        .service
        .change_kasus_status(&fx.koordinator, kasus_id, Some("Selesai"))
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));

    // Only the coordinator role may move statuses by hand
    fx.store.set_kasus_status(kasus_id, KasusStatus::SurveiSelesai);
    let err = fx
        .service
        .change_kasus_status(&fx.ketua, kasus_id, Some("Menunggu Penilaian"))
        .await
        .unwrap_err();
    assert_eq!(err, KasusError::Forbidden);

    let kasus = fx
        .service
        .change_kasus_status(&fx.koordinator, kasus_id, Some("Menunggu Penilaian"))
        .await
        .unwrap();
    assert_eq!(kasus.status, KasusStatus::MenungguPenilaian);
}

fn survei_input() -> SurveiInput {
    SurveiInput {
        tanggal: Some(tanggal()),
        latitude: Some("-6.2088".into()),
        longitude: Some("106.8456".into()),
        pemeriksaan: pemeriksaan(),
        pengukuran: pengukuran(),
        foto_dokumentasi: None,
        tanda_tangan_petugas: Some(PNG_DATA_URI.into()),
        nama_perwakilan: Some("Pak Joko".into()),
        tanda_tangan_perwakilan: Some(PNG_DATA_URI.into()),
        catatan: None,
    }
}

#[tokio::test]
async fn survey_flow_starts_and_completes() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let kasus = fx.service.start_survei(&fx.petugas, kasus_id).await.unwrap();
    assert_eq!(kasus.status, KasusStatus::ProsesSurvei);
    let err = fx.service.start_survei(&fx.petugas, kasus_id).await.unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));

    let survei = fx
        .service
        .record_survei(&fx.petugas, kasus_id, survei_input())
        .await
        .unwrap();
    assert_eq!(survei.petugas_id, fx.petugas.user_id);
    assert_eq!(survei.pemeriksaan.len(), 8);
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::SurveiSelesai);
    assert_eq!(fx.images.stored().len(), 2);

    // A second visit is still accepted and listed first
    let second = fx
        .service
        .record_survei(&fx.ketua, kasus_id, survei_input())
        .await
        .unwrap();
    let listed = fx.service.list_survei(&fx.koordinator, kasus_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
}

#[tokio::test]
async fn survey_requires_signatures_and_valid_coordinates() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut input = survei_input();
    input.latitude = Some("95".into());
    input.tanda_tangan_perwakilan = None;
    input.nama_perwakilan = Some("  ".into());

    let err = fx
        .service
        .record_survei(&fx.petugas, kasus_id, input)
        .await
        .unwrap_err();
    let KasusError::Validation { errors } = err else {
        panic!("expected validation error");
    };
    for field in ["latitude", "tanda_tangan_perwakilan", "nama_perwakilan"] {
        assert!(errors.contains(field), "missing error for {field}: {errors}");
    }
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::Baru);
    assert!(fx.images.stored().is_empty());
}

#[tokio::test]
async fn survey_is_refused_once_assessment_is_under_review() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let err = fx
        .service
        .record_survei(&fx.petugas, kasus_id, survei_input())
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));
}

#[tokio::test]
async fn case_update_and_delete_cascade() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let updated = fx
        .service
        .update_kasus(
            &fx.ketua,
            kasus_id,
            KasusUpdate {
                jenis: Some("KKPR".into()),
                skor_prioritas: Some(90),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.jenis, KasusType::Kkpr);
    assert_eq!(updated.skor_prioritas, 90);

    let err = fx
        .service
        .update_kasus(
            &fx.ketua,
            kasus_id,
            KasusUpdate {
                jenis: None,
                skor_prioritas: Some(101),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::Validation { .. }));

    fx.service.delete_kasus(&fx.ketua, kasus_id).await.unwrap();
    assert!(fx.store.kasus(kasus_id).is_none());
    let err = fx.service.get_kasus_detail(&fx.admin, kasus_id).await.unwrap_err();
    assert!(matches!(err, KasusError::NotFound { .. }));
}

#[tokio::test]
async fn case_detail_carries_team_holder_and_assessment() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let detail = fx.service.get_kasus_detail(&fx.petugas, kasus_id).await.unwrap();
    assert_eq!(detail.kasus.id, kasus_id);
    assert_eq!(detail.pemegang.map(|p| p.nama), Some("CV Maju".to_string()));
    assert_eq!(detail.permohonan.map(|p| p.id), Some(fx.permohonan_id));
    assert!(detail.penilaian.is_some());
    let roster = detail.tim.unwrap();
    assert_eq!(roster.members.len(), 2);
    assert_eq!(detail.koordinator.map(|u| u.id), Some(fx.koordinator.user_id));
}

#[tokio::test]
async fn pending_filter_hides_assessed_requests() {
    let fx = Fixture::new();
    let pending = fx
        .service
        .list_permohonan(&fx.sekretariat, PermohonanFilter::Pending, None)
        .await
        .unwrap();
    assert_eq!(pending.total, 1);

    let kasus_id = fx.initiate().await;
    let pending = fx
        .service
        .list_permohonan(&fx.sekretariat, PermohonanFilter::Pending, None)
        .await
        .unwrap();
    assert_eq!(pending.total, 1, "a case without assessment is still pending");

    fx.submit(kasus_id).await;
    let pending = fx
        .service
        .list_permohonan(&fx.sekretariat, PermohonanFilter::Pending, None)
        .await
        .unwrap();
    assert_eq!(pending.total, 0);

    let all = fx
        .service
        .list_permohonan(&fx.sekretariat, PermohonanFilter::All, Some(1))
        .await
        .unwrap();
    assert_eq!(all.total, 1);
    assert_eq!(all.per_page, 10);
}

#[tokio::test]
async fn requests_are_created_with_unique_numbers_and_ordered_by_priority() {
    let fx = Fixture::new();
    let low = fx
        .service
        .create_permohonan(
            &fx.sekretariat,
            PermohonanInput {
                pemegang_id: Some(fx.pemegang_id),
                tim_id: Some(fx.team_id),
                penanggung_jawab_id: Some(fx.koordinator.user_id),
                skor_prioritas: Some(10),
            },
        )
        .await
        .unwrap();
    let high = fx
        .service
        .create_permohonan(
            &fx.koordinator,
            PermohonanInput {
                pemegang_id: Some(fx.pemegang_id),
                tim_id: None,
                penanggung_jawab_id: None,
                skor_prioritas: Some(80),
            },
        )
        .await
        .unwrap();
    assert_eq!(low.status, PermohonanStatus::Baru);
    assert_ne!(low.nomor_permohonan, high.nomor_permohonan);

    let page = fx
        .service
        .list_permohonan(&fx.petugas, PermohonanFilter::All, None)
        .await
        .unwrap();
    let order: Vec<u8> = page.items.iter().map(|p| p.skor_prioritas).collect();
    assert_eq!(order, vec![80, 50, 10]);

    let err = fx
        .service
        .create_permohonan(
            &fx.sekretariat,
            PermohonanInput {
                pemegang_id: Some(uuid::Uuid::new_v4()),
                skor_prioritas: Some(150),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    let KasusError::Validation { errors } = err else {
        panic!("expected validation error");
    };
    assert!(errors.contains("pemegang_id"));
    assert!(errors.contains("skor_prioritas"));
}

#[tokio::test]
async fn far_out_pages_are_empty() {
    let fx = Fixture::new();
    fx.initiate().await;

    let cases = fx.service.list_kasus(&fx.petugas, Some(u64::MAX)).await.unwrap();
    assert_eq!(cases.total, 1);
    assert!(cases.items.is_empty());

    let requests = fx
        .service
        .list_permohonan(&fx.sekretariat, PermohonanFilter::All, Some(u64::MAX))
        .await
        .unwrap();
    assert_eq!(requests.total, 1);
    assert!(requests.items.is_empty());
}
