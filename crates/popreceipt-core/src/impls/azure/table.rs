//! AzureRecordStore - Table
//!
//! FaceRecord は PartitionKey / RowKey と文字列プロパティだけのエンティティとして書きます。

use async_trait::async_trait;
use azure_data_tables::prelude::{TableClient, TableServiceClient};
use azure_storage::StorageCredentials;
use serde_json::{Map, Value};

use super::{ignore_already_exists, ignore_not_found, service_error};
use crate::domain::{FaceRecord, ServiceError, ServiceKind};
use crate::ports::RecordStore;

const PARTITION_KEY: &str = "PartitionKey";
const ROW_KEY: &str = "RowKey";

pub struct AzureRecordStore {
    name: String,
    table: TableClient,
}

impl AzureRecordStore {
    pub fn new(account: &str, credentials: StorageCredentials, table: &str) -> Self {
        let service = TableServiceClient::new(account.to_string(), credentials);
        Self {
            name: table.to_string(),
            table: service.table_client(table),
        }
    }
}

/// FaceRecord → エンティティ（PartitionKey / RowKey + 文字列プロパティ）
fn to_entity(record: &FaceRecord) -> Value {
    let mut entity = Map::new();
    entity.insert(PARTITION_KEY.to_string(), Value::from(record.partition_key.as_str()));
    entity.insert(ROW_KEY.to_string(), Value::from(record.row_key.as_str()));
    for (name, value) in &record.properties {
        entity.insert(name.clone(), Value::from(value.as_str()));
    }
    Value::Object(entity)
}

/// エンティティ → FaceRecord（システムプロパティと odata 注釈は捨てる）
fn from_entity(partition_key: &str, row_key: &str, entity: Value) -> FaceRecord {
    let mut record = FaceRecord::new(partition_key, row_key);
    if let Value::Object(fields) = entity {
        for (name, value) in fields {
            if name == PARTITION_KEY || name == ROW_KEY || name == "Timestamp" || name.contains('@')
            {
                continue;
            }
            if let Value::String(value) = value {
                record.properties.insert(name, value);
            }
        }
    }
    record
}

#[async_trait]
impl RecordStore for AzureRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        let result = self.table.create().await.map(|_| ());
        ignore_already_exists(ServiceKind::Table, result)
    }

    async fn insert_or_replace(&self, record: &FaceRecord) -> Result<(), ServiceError> {
        let entity = to_entity(record);
        self.table
            .partition_key_client(record.partition_key.clone())
            .entity_client(record.row_key.clone())
            .insert_or_replace(entity)
            .map_err(|e| service_error(ServiceKind::Table, e))?
            .await
            .map(|_| ())
            .map_err(|e| service_error(ServiceKind::Table, e))
    }

    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<FaceRecord>, ServiceError> {
        let response = self
            .table
            .partition_key_client(partition_key.to_string())
            .entity_client(row_key.to_string())
            .get::<Value>()
            .await;

        match response {
            Ok(response) => Ok(Some(from_entity(partition_key, row_key, response.entity))),
            Err(err) => match service_error(ServiceKind::Table, err) {
                // 行が無いのは ResourceNotFound、テーブルが無いのは TableNotFound
                ServiceError::NotFound { code, .. } if code == "ResourceNotFound" => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        let result = self.table.delete().await.map(|_| ());
        ignore_not_found(ServiceKind::Table, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Detection, UnitId};
    use serde_json::json;

    #[test]
    fn entity_round_trips_through_json() {
        let unit = UnitId::new("photo1.jpg");
        let record = FaceRecord::from_detections("FaceImages", &unit, &[Detection::with_age(34.0)], 250);

        let entity = to_entity(&record);
        assert_eq!(
            entity,
            json!({"PartitionKey": "FaceImages", "RowKey": "photo1.jpg", "person1": "34"})
        );
    }

    #[test]
    fn system_properties_are_dropped() {
        let entity = json!({
            "odata.metadata": "https://acct.table.core.windows.net/$metadata#sampletable/@Element",
            "odata.etag": "W/\"datetime'2024-01-01T12%3A00%3A00Z'\"",
            "PartitionKey": "FaceImages",
            "RowKey": "photo1.jpg",
            "Timestamp": "2024-01-01T12:00:00Z",
            "Timestamp@odata.type": "Edm.DateTime",
            "person1": "34"
        });
        let record = from_entity("FaceImages", "photo1.jpg", entity);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("person1"), Some("34"));
    }
}
