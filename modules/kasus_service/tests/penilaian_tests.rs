//! Assessment submission: validation, the void rule, team signatures and drafts

mod common;

use common::*;
use kasus_service::contract::*;

fn field_errors(err: KasusError) -> ValidationErrors {
    match err {
        KasusError::Validation { errors } => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn signatures_merge_across_submissions() {
    print_test_header(
        "signatures_merge_across_submissions",
        "A later submission keeps absent signers and replaces the file of a re-signing one",
    );
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let first = fx.submit(kasus_id).await;
    let ketua_first = first.tanda_tangan_tim.get(&fx.ketua.user_id).cloned().unwrap();

    // Petugas signs alone; the Ketua signature stays
    let mut second = compliant_submission(fx.petugas.user_id);
    second.catatan = None;
    let second = fx
        .service
        .submit_penilaian(&fx.petugas, kasus_id, second)
        .await
        .unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(second.id, first.id);
    assert_eq!(second.tanda_tangan_tim.len(), 2);
    assert_eq!(second.tanda_tangan_tim.get(&fx.ketua.user_id), Some(&ketua_first));
    assert_eq!(second.catatan, None);
    assert!(fx.images.removed().is_empty());

    // Ketua signs again; the old file is released
    let third = fx.submit(kasus_id).await;
    assert_eq!(third.version, 3);
    assert_eq!(third.tanda_tangan_tim.len(), 2);
    assert_ne!(third.tanda_tangan_tim.get(&fx.ketua.user_id), Some(&ketua_first));
    assert_eq!(fx.images.removed(), vec![ketua_first]);
}

#[tokio::test]
async fn resubmission_without_new_signatures_counts_stored_ones() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    fx.submit(kasus_id).await;

    let mut unsigned = compliant_submission(fx.ketua.user_id);
    unsigned.tanda_tangan.clear();
    let stored = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, unsigned)
        .await
        .unwrap();
    assert_eq!(stored.tanda_tangan_tim.len(), 1);
}

#[tokio::test]
async fn first_submission_needs_a_signature() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut unsigned = compliant_submission(fx.ketua.user_id);
    unsigned.tanda_tangan.clear();
    let err = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, unsigned)
        .await
        .unwrap_err();
    assert!(field_errors(err).contains("tanda_tangan"));
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::Baru);
}

#[tokio::test]
async fn non_compliant_desk_study_voids_inspection_and_measurement() {
    print_test_header(
        "non_compliant_desk_study_voids_inspection_and_measurement",
        "Any 'Tidak Sesuai' line empties the downstream sections, even when they were sent",
    );
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut submission = compliant_submission(fx.ketua.user_id);
    submission.desk_study = vec![desk_study("Sesuai"), desk_study("Tidak Sesuai")];
    let stored = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, submission)
        .await
        .unwrap();

    assert!(stored.is_desk_study_non_compliant());
    assert!(stored.pemeriksaan.is_empty());
    assert!(stored.pengukuran.is_empty());
    assert_eq!(stored.desk_study.len(), 2);
}

#[tokio::test]
async fn voided_submission_does_not_require_inspection() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let submission = PenilaianSubmission {
        desk_study: vec![desk_study("Tidak Sesuai")],
        pemeriksaan: None,
        pengukuran: None,
        catatan: None,
        tanda_tangan: vec![signature(fx.ketua.user_id)],
    };
    assert!(fx.service.submit_penilaian(&fx.ketua, kasus_id, submission).await.is_ok());
}

#[tokio::test]
async fn compliant_submission_requires_inspection() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut submission = compliant_submission(fx.ketua.user_id);
    submission.pemeriksaan = Some(vec![]);
    let err = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, submission)
        .await
        .unwrap_err();
    assert!(field_errors(err).contains("pemeriksaan"));
}

#[tokio::test]
async fn incomplete_lines_are_reported_by_index() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut submission = compliant_submission(fx.ketua.user_id);
    submission.desk_study[0].arahan_rencana_tata_ruang = None;
    submission.desk_study[0].hasil_kesesuaian = Some("Mungkin".into());
    if let Some(lines) = submission.pengukuran.as_mut() {
        lines[0].status = Some("Lebih".into());
        lines[0].nilai = Some("enam puluh".into());
    }

    let errors = field_errors(
        fx.service
            .submit_penilaian(&fx.ketua, kasus_id, submission)
            .await
            .unwrap_err(),
    );
    for field in [
        "desk_study.0.arahan_rencana_tata_ruang",
        "desk_study.0.hasil_kesesuaian",
        "pengukuran.0.status",
        "pengukuran.0.nilai",
    ] {
        assert!(errors.contains(field), "missing error for {field}: {errors}");
    }
}

#[tokio::test]
async fn empty_desk_study_is_rejected() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut submission = compliant_submission(fx.ketua.user_id);
    submission.desk_study.clear();
    let err = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, submission)
        .await
        .unwrap_err();
    assert!(field_errors(err).contains("desk_study"));
}

#[tokio::test]
async fn signer_outside_the_team_is_rejected() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    // The coordinator may submit but is not a team member, so cannot sign
    let err = fx
        .service
        .submit_penilaian(&fx.koordinator, kasus_id, compliant_submission(fx.koordinator.user_id))
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert!(errors.contains("tanda_tangan.0.user_id"));
    assert!(fx.images.stored().is_empty());

    let mut bad_payload = compliant_submission(fx.ketua.user_id);
    bad_payload.tanda_tangan[0].signature = Some("data:image/bmp;base64,Qk0=".into());
    let errors = field_errors(
        fx.service
            .submit_penilaian(&fx.ketua, kasus_id, bad_payload)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("tanda_tangan.0.signature"));
}

#[tokio::test]
async fn repeated_signer_is_rejected_before_any_file_is_written() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let mut submission = compliant_submission(fx.ketua.user_id);
    submission.tanda_tangan.push(signature(fx.ketua.user_id));
    let errors = field_errors(
        fx.service
            .submit_penilaian(&fx.ketua, kasus_id, submission)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("tanda_tangan.1.user_id"));
    assert!(fx.images.stored().is_empty());
    assert_eq!(fx.store.kasus(kasus_id).unwrap().status, KasusStatus::Baru);
}

#[tokio::test]
async fn finalized_assessment_cannot_be_resubmitted() {
    let fx = Fixture::new();
    let (kasus_id, _) = fx.finalized().await;

    let err = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, compliant_submission(fx.ketua.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));

    let err = fx
        .service
        .save_penilaian_draft(&fx.ketua, kasus_id, PenilaianDraft::default())
        .await
        .unwrap_err();
    assert!(matches!(err, KasusError::InvalidTransition { .. }));
}

#[tokio::test]
async fn draft_saves_desk_study_without_the_void_rule() {
    print_test_header(
        "draft_saves_desk_study_without_the_void_rule",
        "Drafts keep inspection data, accept blank text and move the request to Draft",
    );
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    let submitted = fx.submit(kasus_id).await;

    let draft = PenilaianDraft {
        desk_study: Some(vec![DeskStudyInput {
            hasil_kesesuaian: Some("Tidak Sesuai".into()),
            ..Default::default()
        }]),
        catatan: Some("Perlu cek ulang".into()),
    };
    let stored = fx
        .service
        .save_penilaian_draft(&fx.petugas, kasus_id, draft)
        .await
        .unwrap();

    assert_eq!(stored.version, submitted.version + 1);
    assert_eq!(stored.pemeriksaan, submitted.pemeriksaan);
    assert_eq!(stored.tanda_tangan_tim, submitted.tanda_tangan_tim);
    assert_eq!(stored.catatan.as_deref(), Some("Perlu cek ulang"));
    assert_eq!(
        stored.desk_study[0].hasil_kesesuaian,
        Some(HasilKesesuaian::TidakSesuai)
    );
    assert_eq!(
        fx.store.permohonan(fx.permohonan_id).unwrap().status,
        PermohonanStatus::Draft
    );
}

#[tokio::test]
async fn draft_without_desk_study_keeps_the_stored_one() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;
    let submitted = fx.submit(kasus_id).await;

    let stored = fx
        .service
        .save_penilaian_draft(
            &fx.ketua,
            kasus_id,
            PenilaianDraft {
                desk_study: None,
                catatan: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.desk_study, submitted.desk_study);
    assert_eq!(stored.catatan, submitted.catatan);
}

#[tokio::test]
async fn draft_rejects_unknown_result_labels() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let err = fx
        .service
        .save_penilaian_draft(
            &fx.ketua,
            kasus_id,
            PenilaianDraft {
                desk_study: Some(vec![DeskStudyInput {
                    hasil_kesesuaian: Some("Hampir".into()),
                    ..Default::default()
                }]),
                catatan: None,
            },
        )
        .await
        .unwrap_err();
    assert!(field_errors(err).contains("desk_study.0.hasil_kesesuaian"));
}

#[tokio::test]
async fn concurrent_submissions_are_serialized() {
    let fx = Fixture::new();
    let kasus_id = fx.initiate().await;

    let a = fx
        .service
        .submit_penilaian(&fx.ketua, kasus_id, compliant_submission(fx.ketua.user_id));
    let b = fx
        .service
        .submit_penilaian(&fx.petugas, kasus_id, compliant_submission(fx.petugas.user_id));
    let (a, b) = tokio::join!(a, b);
    let versions = {
        let mut v = vec![a.unwrap().version, b.unwrap().version];
        v.sort_unstable();
        v
    };
    assert_eq!(versions, vec![1, 2]);

    let detail = fx.service.get_kasus_detail(&fx.ketua, kasus_id).await.unwrap();
    assert_eq!(detail.penilaian.unwrap().tanda_tangan_tim.len(), 2);
}
