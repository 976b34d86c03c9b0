//! SeaORM entities for database tables
//!
//! Status and vocabulary columns hold the canonical labels; structured assessment sections
//! and signature sets are JSON columns.

/// Application users
pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
        /// Role label
        pub role: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Teams
pub mod teams {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "teams")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// One-to-many relationship with memberships
        #[sea_orm(has_many = "super::team_members::Entity")]
        Members,
    }

    impl Related<super::team_members::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Members.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Team memberships; (team, user) is the primary key so a user sits once per team
pub mod team_members {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "team_members")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub team_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: Uuid,
        /// Team role label
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::teams::Entity",
            from = "Column::TeamId",
            to = "super::teams::Column::Id"
        )]
        Team,
    }

    impl Related<super::teams::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Team.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Business holders
pub mod pemegang {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "pemegang")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub nama: String,
        pub nomor_identitas: String,
        pub kegiatan_usaha: String,
        pub alamat: String,
        pub kontak: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Assessment requests
pub mod permohonan_penilaian {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "permohonan_penilaian")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub nomor_permohonan: String,
        pub pemegang_id: Uuid,
        pub tim_id: Option<Uuid>,
        pub penanggung_jawab_id: Option<Uuid>,
        pub skor_prioritas: i32,
        pub status: String,
        pub berita_acara_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Cases
pub mod kasus {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "kasus")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub jenis: String,
        #[sea_orm(unique)]
        pub nomor_permohonan: String,
        pub status: String,
        pub skor_prioritas: i32,
        pub tim_id: Option<Uuid>,
        pub penanggung_jawab_id: Option<Uuid>,
        pub pemegang_id: Uuid,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::penilaian::Entity")]
        Penilaian,
    }

    impl Related<super::penilaian::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Penilaian.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Assessments, one per case
pub mod penilaian {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "penilaian")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub kasus_id: Uuid,
        pub desk_study: Json,
        pub pemeriksaan: Json,
        pub pengukuran: Json,
        #[sea_orm(column_type = "Text", nullable)]
        pub catatan: Option<String>,
        /// user id → file reference
        pub tanda_tangan_tim: Json,
        pub version: i32,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::kasus::Entity",
            from = "Column::KasusId",
            to = "super::kasus::Column::Id"
        )]
        Kasus,
    }

    impl Related<super::kasus::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Kasus.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Field surveys
pub mod survei {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "survei")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub kasus_id: Uuid,
        pub petugas_id: Uuid,
        pub tanggal: Date,
        pub latitude: f64,
        pub longitude: f64,
        pub pemeriksaan: Json,
        pub pengukuran: Json,
        pub foto_dokumentasi: Option<String>,
        pub tanda_tangan_petugas: String,
        pub nama_perwakilan: String,
        pub tanda_tangan_perwakilan: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub catatan: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Non-completion minutes, one per request
pub mod berita_acara {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "berita_acara")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub permohonan_id: Uuid,
        pub pemegang_id: Uuid,
        pub penanggung_jawab_id: Uuid,
        pub tanggal: Date,
        pub alasan: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub alasan_lainnya: Option<String>,
        pub tanda_tangan_tim: Json,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Examination minutes, one per assessment, globally unique number
pub mod ba_pemeriksaan {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "ba_pemeriksaan")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub penilaian_id: Uuid,
        #[sea_orm(unique)]
        pub nomor_ba: String,
        pub nomor_surat_tugas: String,
        pub tanggal_surat_tugas: Date,
        pub nomor_identifikasi: Option<String>,
        pub tanda_tangan_tim: Json,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Result minutes, one per assessment
pub mod ba_hasil_penilaian {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "ba_hasil_penilaian")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub penilaian_id: Uuid,
        pub nomor_ba: String,
        pub tanggal: Date,
        pub hasil: String,
        #[sea_orm(column_type = "Text")]
        pub kesimpulan: String,
        pub tanda_tangan_tim: Json,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Compliance analysis form, one per assessment
pub mod formulir_analisis_penilaian {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "formulir_analisis_penilaian")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub penilaian_id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub analisis_desk_study: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub analisis_pemeriksaan: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub analisis_pengukuran: Option<String>,
        pub kesimpulan: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub rekomendasi: Option<String>,
        pub tanda_tangan_tim: Json,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Edit requests
pub mod edit_requests {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "edit_requests")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub penilaian_id: Uuid,
        pub requested_by: Uuid,
        #[sea_orm(column_type = "Text")]
        pub alasan: String,
        pub status: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub alasan_penolakan: Option<String>,
        pub processed_by: Option<Uuid>,
        pub processed_at: Option<DateTimeUtc>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
