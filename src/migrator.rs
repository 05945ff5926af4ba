use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user_app_table::Migration),
            Box::new(m20240101_000002_create_laporan_table::Migration),
            Box::new(m20240101_000003_create_notifikasi_table::Migration),
            Box::new(m20240101_000004_create_reference_tables::Migration),
        ]
    }
}

fn schema() -> Alias {
    Alias::new(crate::db::SCHEMA)
}

mod m20240101_000001_create_user_app_table {
    use super::schema;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_user_app_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "CREATE SCHEMA IF NOT EXISTS {}",
                    crate::db::SCHEMA
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table((schema(), UserApp::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserApp::IdUser)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UserApp::Nama).string().not_null())
                        .col(
                            ColumnDef::new(UserApp::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(UserApp::Password).string().not_null())
                        .col(
                            ColumnDef::new(UserApp::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(UserApp::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table((schema(), UserApp::Table)).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum UserApp {
        Table,
        IdUser,
        Nama,
        Email,
        Password,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_laporan_table {
    use super::m20240101_000001_create_user_app_table::UserApp;
    use super::schema;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_laporan_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table((schema(), Laporan::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Laporan::IdLaporan)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Laporan::IdUser).integer().not_null())
                        .col(ColumnDef::new(Laporan::TipeLaporan).string().not_null())
                        .col(ColumnDef::new(Laporan::Lokasi).text().not_null())
                        .col(
                            ColumnDef::new(Laporan::TitikLokasi)
                                .custom(Alias::new("POINT"))
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Laporan::Waktu)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Laporan::Deskripsi).text().not_null())
                        .col(ColumnDef::new(Laporan::Status).string().null())
                        .col(ColumnDef::new(Laporan::Foto).text().not_null())
                        .col(
                            ColumnDef::new(Laporan::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Laporan::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_laporan_user_app")
                                .from((schema(), Laporan::Table), Laporan::IdUser)
                                .to((schema(), UserApp::Table), UserApp::IdUser)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Backs the daily flood-alert count.
            manager
                .create_index(
                    Index::create()
                        .name("idx_laporan_tipe_status_waktu")
                        .table((schema(), Laporan::Table))
                        .col(Laporan::TipeLaporan)
                        .col(Laporan::Status)
                        .col(Laporan::Waktu)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table((schema(), Laporan::Table)).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Laporan {
        Table,
        IdLaporan,
        IdUser,
        TipeLaporan,
        Lokasi,
        TitikLokasi,
        Waktu,
        Deskripsi,
        Status,
        Foto,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_notifikasi_table {
    use super::schema;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_notifikasi_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table((schema(), Notifikasi::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifikasi::IdNotifikasi)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifikasi::Judul).string().not_null())
                        .col(ColumnDef::new(Notifikasi::Pesan).text().not_null())
                        .col(
                            ColumnDef::new(Notifikasi::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_notifikasi_created_at")
                        .table((schema(), Notifikasi::Table))
                        .col(Notifikasi::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table((schema(), Notifikasi::Table))
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Notifikasi {
        Table,
        IdNotifikasi,
        Judul,
        Pesan,
        CreatedAt,
    }
}

/// Static reference data published to the app as-is.
mod m20240101_000004_create_reference_tables {
    use super::schema;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_reference_tables"
        }
    }

    fn created_at<T: IntoIden>(col: T) -> ColumnDef {
        ColumnDef::new(col)
            .timestamp_with_time_zone()
            .not_null()
            .default(Expr::current_timestamp())
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table((schema(), InformasiBanjir::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InformasiBanjir::IdInformasi)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InformasiBanjir::Judul).string().not_null())
                        .col(ColumnDef::new(InformasiBanjir::Deskripsi).text().not_null())
                        .col(ColumnDef::new(InformasiBanjir::Lokasi).string().null())
                        .col(ColumnDef::new(InformasiBanjir::TingkatBahaya).string().null())
                        .col(ColumnDef::new(InformasiBanjir::Latitude).double().null())
                        .col(ColumnDef::new(InformasiBanjir::Longitude).double().null())
                        .col(&mut created_at(InformasiBanjir::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table((schema(), TempatEvakuasi::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TempatEvakuasi::IdTempat)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(TempatEvakuasi::NamaTempat).string().not_null())
                        .col(ColumnDef::new(TempatEvakuasi::Alamat).text().not_null())
                        .col(ColumnDef::new(TempatEvakuasi::Kapasitas).integer().null())
                        .col(ColumnDef::new(TempatEvakuasi::Latitude).double().null())
                        .col(ColumnDef::new(TempatEvakuasi::Longitude).double().null())
                        .col(&mut created_at(TempatEvakuasi::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table((schema(), RiwayatBanjir::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RiwayatBanjir::IdRiwayat)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RiwayatBanjir::Lokasi).string().not_null())
                        .col(ColumnDef::new(RiwayatBanjir::Tanggal).date().not_null())
                        .col(ColumnDef::new(RiwayatBanjir::KetinggianAir).double().null())
                        .col(ColumnDef::new(RiwayatBanjir::Deskripsi).text().null())
                        .col(&mut created_at(RiwayatBanjir::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table((schema(), TipsMitigasi::Table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TipsMitigasi::IdTips)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(TipsMitigasi::Judul).string().not_null())
                        .col(ColumnDef::new(TipsMitigasi::Deskripsi).text().not_null())
                        .col(ColumnDef::new(TipsMitigasi::Kategori).string().null())
                        .col(&mut created_at(TipsMitigasi::CreatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table((schema(), TipsMitigasi::Table))
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table((schema(), RiwayatBanjir::Table))
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table((schema(), TempatEvakuasi::Table))
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table((schema(), InformasiBanjir::Table))
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InformasiBanjir {
        Table,
        IdInformasi,
        Judul,
        Deskripsi,
        Lokasi,
        TingkatBahaya,
        Latitude,
        Longitude,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum TempatEvakuasi {
        Table,
        IdTempat,
        NamaTempat,
        Alamat,
        Kapasitas,
        Latitude,
        Longitude,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum RiwayatBanjir {
        Table,
        IdRiwayat,
        Lokasi,
        Tanggal,
        KetinggianAir,
        Deskripsi,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum TipsMitigasi {
        Table,
        IdTips,
        Judul,
        Deskripsi,
        Kategori,
        CreatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_unique() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 4);
    }
}
