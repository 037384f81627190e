//! InMemoryRecordStore - 開発用のテーブル

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{FaceRecord, ServiceError, ServiceKind};
use crate::ports::RecordStore;

type Key = (String, String);

/// InMemoryRecordStore は (PartitionKey, RowKey) → レコード
pub struct InMemoryRecordStore {
    name: String,
    records: Mutex<Option<HashMap<Key, FaceRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(None),
        }
    }

    pub async fn len(&self) -> usize {
        let records = self.records.lock().await;
        records.as_ref().map_or(0, HashMap::len)
    }

    fn table_not_found(&self) -> ServiceError {
        ServiceError::not_found(ServiceKind::Table, "TableNotFound", &self.name)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), ServiceError> {
        let mut records = self.records.lock().await;
        if records.is_none() {
            *records = Some(HashMap::new());
        }
        Ok(())
    }

    async fn insert_or_replace(&self, record: &FaceRecord) -> Result<(), ServiceError> {
        let mut records = self.records.lock().await;
        let table = records.as_mut().ok_or_else(|| self.table_not_found())?;
        table.insert(
            (record.partition_key.clone(), record.row_key.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<FaceRecord>, ServiceError> {
        let records = self.records.lock().await;
        let table = records.as_ref().ok_or_else(|| self.table_not_found())?;
        Ok(table
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned())
    }

    async fn delete_if_exists(&self) -> Result<(), ServiceError> {
        *self.records.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Detection, UnitId};

    #[tokio::test]
    async fn insert_or_replace_replaces_whole_record() {
        let store = InMemoryRecordStore::new("sampletable");
        store.create_if_not_exists().await.unwrap();
        let unit = UnitId::new("photo1.jpg");

        let two = FaceRecord::from_detections(
            "FaceImages",
            &unit,
            &[Detection::with_age(34.0), Detection::with_age(40.0)],
            250,
        );
        store.insert_or_replace(&two).await.unwrap();

        let one = FaceRecord::from_detections("FaceImages", &unit, &[Detection::with_age(35.0)], 250);
        store.insert_or_replace(&one).await.unwrap();

        let stored = store.retrieve("FaceImages", "photo1.jpg").await.unwrap().unwrap();
        assert_eq!(stored, one);
        assert!(stored.get("person2").is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn retrieve_missing_row_is_none() {
        let store = InMemoryRecordStore::new("sampletable");
        store.create_if_not_exists().await.unwrap();
        assert!(store.retrieve("FaceImages", "nope.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let store = InMemoryRecordStore::new("sampletable");
        let err = store.retrieve("FaceImages", "photo1.jpg").await.unwrap_err();
        assert_eq!(err.code(), Some("TableNotFound"));
    }
}
