//! Database migrations for the kasus service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_directory::Migration),
            Box::new(m20250301_000002_create_workflow::Migration),
            Box::new(m20250301_000003_create_dokumen::Migration),
        ]
    }
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_directory {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_directory"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(created_at(Users::CreatedAt))
                        .col(created_at(Users::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Teams::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Teams::Name).string().not_null())
                        .col(created_at(Teams::CreatedAt))
                        .col(created_at(Teams::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TeamMembers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TeamMembers::TeamId).uuid().not_null())
                        .col(ColumnDef::new(TeamMembers::UserId).uuid().not_null())
                        .col(ColumnDef::new(TeamMembers::Role).string().not_null())
                        .primary_key(Index::create().col(TeamMembers::TeamId).col(TeamMembers::UserId))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_team_members_team")
                                .from(TeamMembers::Table, TeamMembers::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_team_members_user")
                                .from(TeamMembers::Table, TeamMembers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_team_members_user_id")
                        .table(TeamMembers::Table)
                        .col(TeamMembers::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
                .await?;
            manager.drop_table(Table::drop().table(Teams::Table).to_owned()).await?;
            manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        Role,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Teams {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TeamMembers {
        Table,
        TeamId,
        UserId,
        Role,
    }
}

mod m20250301_000002_create_workflow {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_workflow"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pemegang::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pemegang::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Pemegang::Nama).string().not_null())
                        .col(ColumnDef::new(Pemegang::NomorIdentitas).string().not_null())
                        .col(ColumnDef::new(Pemegang::KegiatanUsaha).string().not_null())
                        .col(ColumnDef::new(Pemegang::Alamat).string().not_null())
                        .col(ColumnDef::new(Pemegang::Kontak).string())
                        .col(created_at(Pemegang::CreatedAt))
                        .col(created_at(Pemegang::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PermohonanPenilaian::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PermohonanPenilaian::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(PermohonanPenilaian::NomorPermohonan)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PermohonanPenilaian::PemegangId).uuid().not_null())
                        .col(ColumnDef::new(PermohonanPenilaian::TimId).uuid())
                        .col(ColumnDef::new(PermohonanPenilaian::PenanggungJawabId).uuid())
                        .col(
                            ColumnDef::new(PermohonanPenilaian::SkorPrioritas)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PermohonanPenilaian::Status).string().not_null())
                        .col(ColumnDef::new(PermohonanPenilaian::BeritaAcaraId).uuid())
                        .col(created_at(PermohonanPenilaian::CreatedAt))
                        .col(created_at(PermohonanPenilaian::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permohonan_pemegang")
                                .from(PermohonanPenilaian::Table, PermohonanPenilaian::PemegangId)
                                .to(Pemegang::Table, Pemegang::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permohonan_tim")
                                .from(PermohonanPenilaian::Table, PermohonanPenilaian::TimId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_permohonan_priority")
                        .table(PermohonanPenilaian::Table)
                        .col(PermohonanPenilaian::SkorPrioritas)
                        .col(PermohonanPenilaian::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Kasus::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Kasus::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Kasus::Jenis).string().not_null())
                        .col(ColumnDef::new(Kasus::NomorPermohonan).string().not_null().unique_key())
                        .col(ColumnDef::new(Kasus::Status).string().not_null())
                        .col(ColumnDef::new(Kasus::SkorPrioritas).integer().not_null().default(0))
                        .col(ColumnDef::new(Kasus::TimId).uuid())
                        .col(ColumnDef::new(Kasus::PenanggungJawabId).uuid())
                        .col(ColumnDef::new(Kasus::PemegangId).uuid().not_null())
                        .col(created_at(Kasus::CreatedAt))
                        .col(created_at(Kasus::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_kasus_pemegang")
                                .from(Kasus::Table, Kasus::PemegangId)
                                .to(Pemegang::Table, Pemegang::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Penilaian::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Penilaian::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Penilaian::KasusId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(Penilaian::DeskStudy).json().not_null())
                        .col(ColumnDef::new(Penilaian::Pemeriksaan).json().not_null())
                        .col(ColumnDef::new(Penilaian::Pengukuran).json().not_null())
                        .col(ColumnDef::new(Penilaian::Catatan).text())
                        .col(ColumnDef::new(Penilaian::TandaTanganTim).json().not_null())
                        .col(ColumnDef::new(Penilaian::Version).integer().not_null().default(1))
                        .col(created_at(Penilaian::CreatedAt))
                        .col(created_at(Penilaian::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_penilaian_kasus")
                                .from(Penilaian::Table, Penilaian::KasusId)
                                .to(Kasus::Table, Kasus::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Survei::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Survei::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Survei::KasusId).uuid().not_null())
                        .col(ColumnDef::new(Survei::PetugasId).uuid().not_null())
                        .col(ColumnDef::new(Survei::Tanggal).date().not_null())
                        .col(ColumnDef::new(Survei::Latitude).double().not_null())
                        .col(ColumnDef::new(Survei::Longitude).double().not_null())
                        .col(ColumnDef::new(Survei::Pemeriksaan).json().not_null())
                        .col(ColumnDef::new(Survei::Pengukuran).json().not_null())
                        .col(ColumnDef::new(Survei::FotoDokumentasi).string())
                        .col(ColumnDef::new(Survei::TandaTanganPetugas).string().not_null())
                        .col(ColumnDef::new(Survei::NamaPerwakilan).string().not_null())
                        .col(ColumnDef::new(Survei::TandaTanganPerwakilan).string().not_null())
                        .col(ColumnDef::new(Survei::Catatan).text())
                        .col(created_at(Survei::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_survei_kasus")
                                .from(Survei::Table, Survei::KasusId)
                                .to(Kasus::Table, Kasus::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_survei_kasus_id")
                        .table(Survei::Table)
                        .col(Survei::KasusId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager.drop_table(Table::drop().table(Survei::Table).to_owned()).await?;
            manager.drop_table(Table::drop().table(Penilaian::Table).to_owned()).await?;
            manager.drop_table(Table::drop().table(Kasus::Table).to_owned()).await?;
            manager
                .drop_table(Table::drop().table(PermohonanPenilaian::Table).to_owned())
                .await?;
            manager.drop_table(Table::drop().table(Pemegang::Table).to_owned()).await
        }
    }

    #[derive(DeriveIden)]
    enum Pemegang {
        Table,
        Id,
        Nama,
        NomorIdentitas,
        KegiatanUsaha,
        Alamat,
        Kontak,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PermohonanPenilaian {
        Table,
        Id,
        NomorPermohonan,
        PemegangId,
        TimId,
        PenanggungJawabId,
        SkorPrioritas,
        Status,
        BeritaAcaraId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Kasus {
        Table,
        Id,
        Jenis,
        NomorPermohonan,
        Status,
        SkorPrioritas,
        TimId,
        PenanggungJawabId,
        PemegangId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Penilaian {
        Table,
        Id,
        KasusId,
        DeskStudy,
        Pemeriksaan,
        Pengukuran,
        Catatan,
        TandaTanganTim,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Survei {
        Table,
        Id,
        KasusId,
        PetugasId,
        Tanggal,
        Latitude,
        Longitude,
        Pemeriksaan,
        Pengukuran,
        FotoDokumentasi,
        TandaTanganPetugas,
        NamaPerwakilan,
        TandaTanganPerwakilan,
        Catatan,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Teams {
        Table,
        Id,
    }
}

mod m20250301_000003_create_dokumen {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_dokumen"
        }
    }

    fn signatures<T: IntoIden>(col: T) -> ColumnDef {
        ColumnDef::new(col).json().not_null().to_owned()
    }

    fn belongs_to_penilaian<T: IntoIden + Clone + 'static>(name: &str, table: T, col: T) -> ForeignKeyCreateStatement {
        ForeignKey::create()
            .name(name)
            .from(table, col)
            .to(Penilaian::Table, Penilaian::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BeritaAcara::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BeritaAcara::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(BeritaAcara::PermohonanId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(BeritaAcara::PemegangId).uuid().not_null())
                        .col(ColumnDef::new(BeritaAcara::PenanggungJawabId).uuid().not_null())
                        .col(ColumnDef::new(BeritaAcara::Tanggal).date().not_null())
                        .col(ColumnDef::new(BeritaAcara::Alasan).string().not_null())
                        .col(ColumnDef::new(BeritaAcara::AlasanLainnya).text())
                        .col(signatures(BeritaAcara::TandaTanganTim))
                        .col(created_at(BeritaAcara::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_berita_acara_permohonan")
                                .from(BeritaAcara::Table, BeritaAcara::PermohonanId)
                                .to(PermohonanPenilaian::Table, PermohonanPenilaian::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BaPemeriksaan::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BaPemeriksaan::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(BaPemeriksaan::PenilaianId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(BaPemeriksaan::NomorBa).string().not_null().unique_key())
                        .col(ColumnDef::new(BaPemeriksaan::NomorSuratTugas).string().not_null())
                        .col(ColumnDef::new(BaPemeriksaan::TanggalSuratTugas).date().not_null())
                        .col(ColumnDef::new(BaPemeriksaan::NomorIdentifikasi).string())
                        .col(signatures(BaPemeriksaan::TandaTanganTim))
                        .col(created_at(BaPemeriksaan::CreatedAt))
                        .col(created_at(BaPemeriksaan::UpdatedAt))
                        .foreign_key(&mut belongs_to_penilaian(
                            "fk_ba_pemeriksaan_penilaian",
                            BaPemeriksaan::Table,
                            BaPemeriksaan::PenilaianId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BaHasilPenilaian::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BaHasilPenilaian::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(BaHasilPenilaian::PenilaianId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(BaHasilPenilaian::NomorBa).string().not_null())
                        .col(ColumnDef::new(BaHasilPenilaian::Tanggal).date().not_null())
                        .col(ColumnDef::new(BaHasilPenilaian::Hasil).string().not_null())
                        .col(ColumnDef::new(BaHasilPenilaian::Kesimpulan).text().not_null())
                        .col(signatures(BaHasilPenilaian::TandaTanganTim))
                        .col(created_at(BaHasilPenilaian::CreatedAt))
                        .col(created_at(BaHasilPenilaian::UpdatedAt))
                        .foreign_key(&mut belongs_to_penilaian(
                            "fk_ba_hasil_penilaian",
                            BaHasilPenilaian::Table,
                            BaHasilPenilaian::PenilaianId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FormulirAnalisisPenilaian::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(FormulirAnalisisPenilaian::PenilaianId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::AnalisisDeskStudy).text().not_null())
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::AnalisisPemeriksaan).text())
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::AnalisisPengukuran).text())
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::Kesimpulan).string().not_null())
                        .col(ColumnDef::new(FormulirAnalisisPenilaian::Rekomendasi).text())
                        .col(signatures(FormulirAnalisisPenilaian::TandaTanganTim))
                        .col(created_at(FormulirAnalisisPenilaian::CreatedAt))
                        .col(created_at(FormulirAnalisisPenilaian::UpdatedAt))
                        .foreign_key(&mut belongs_to_penilaian(
                            "fk_formulir_penilaian",
                            FormulirAnalisisPenilaian::Table,
                            FormulirAnalisisPenilaian::PenilaianId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EditRequests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(EditRequests::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(EditRequests::PenilaianId).uuid().not_null())
                        .col(ColumnDef::new(EditRequests::RequestedBy).uuid().not_null())
                        .col(ColumnDef::new(EditRequests::Alasan).text().not_null())
                        .col(ColumnDef::new(EditRequests::Status).string().not_null())
                        .col(ColumnDef::new(EditRequests::AlasanPenolakan).text())
                        .col(ColumnDef::new(EditRequests::ProcessedBy).uuid())
                        .col(ColumnDef::new(EditRequests::ProcessedAt).timestamp_with_time_zone())
                        .col(created_at(EditRequests::CreatedAt))
                        .foreign_key(&mut belongs_to_penilaian(
                            "fk_edit_requests_penilaian",
                            EditRequests::Table,
                            EditRequests::PenilaianId,
                        ))
                        .to_owned(),
                )
                .await?;

            // At most one pending request per assessment; partial indexes work on Postgres and SQLite
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_edit_requests_one_pending \
                     ON edit_requests (penilaian_id) WHERE status = 'pending'",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager.drop_table(Table::drop().table(EditRequests::Table).to_owned()).await?;
            manager
                .drop_table(Table::drop().table(FormulirAnalisisPenilaian::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BaHasilPenilaian::Table).to_owned())
                .await?;
            manager.drop_table(Table::drop().table(BaPemeriksaan::Table).to_owned()).await?;
            manager.drop_table(Table::drop().table(BeritaAcara::Table).to_owned()).await
        }
    }

    #[derive(DeriveIden, Clone)]
    enum BeritaAcara {
        Table,
        Id,
        PermohonanId,
        PemegangId,
        PenanggungJawabId,
        Tanggal,
        Alasan,
        AlasanLainnya,
        TandaTanganTim,
        CreatedAt,
    }

    #[derive(DeriveIden, Clone)]
    enum BaPemeriksaan {
        Table,
        Id,
        PenilaianId,
        NomorBa,
        NomorSuratTugas,
        TanggalSuratTugas,
        NomorIdentifikasi,
        TandaTanganTim,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone)]
    enum BaHasilPenilaian {
        Table,
        Id,
        PenilaianId,
        NomorBa,
        Tanggal,
        Hasil,
        Kesimpulan,
        TandaTanganTim,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone)]
    enum FormulirAnalisisPenilaian {
        Table,
        Id,
        PenilaianId,
        AnalisisDeskStudy,
        AnalisisPemeriksaan,
        AnalisisPengukuran,
        Kesimpulan,
        Rekomendasi,
        TandaTanganTim,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone)]
    enum EditRequests {
        Table,
        Id,
        PenilaianId,
        RequestedBy,
        Alasan,
        Status,
        AlasanPenolakan,
        ProcessedBy,
        ProcessedAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Penilaian {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum PermohonanPenilaian {
        Table,
        Id,
    }
}
