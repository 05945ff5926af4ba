use sea_orm::{DatabaseConnection, JsonValue};
use std::sync::Arc;

use crate::{
    db::{fetch_json_rows, raw_statement},
    errors::{ResultExt, ServiceError},
};

/// Static reference tables published to the app verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    MitigationTips,
    FloodInfo,
    EvacuationPlaces,
    FloodHistory,
}

impl Resource {
    pub fn table(self) -> &'static str {
        match self {
            Resource::MitigationTips => "tips_mitigasi",
            Resource::FloodInfo => "informasi_banjir",
            Resource::EvacuationPlaces => "tempat_evakuasi",
            Resource::FloodHistory => "riwayat_banjir",
        }
    }

    pub fn select_all_sql(self) -> String {
        format!("SELECT * FROM {}.{}", crate::db::SCHEMA, self.table())
    }

    fn failure_message(self) -> &'static str {
        match self {
            Resource::MitigationTips => "Terjadi kesalahan saat mengambil data tips mitigasi",
            Resource::FloodInfo => "Terjadi kesalahan saat mengambil data informasi banjir",
            Resource::EvacuationPlaces => "Terjadi kesalahan saat mengambil data tempat evakuasi",
            Resource::FloodHistory => "Terjadi kesalahan saat mengambil data riwayat banjir",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceService {
    db: Arc<DatabaseConnection>,
}

impl ResourceService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Every row of the resource table, column names as keys.
    pub async fn list(&self, resource: Resource) -> Result<Vec<JsonValue>, ServiceError> {
        fetch_json_rows(&*self.db, raw_statement(&resource.select_all_sql()))
            .await
            .or_internal(resource.failure_message())
    }
}
