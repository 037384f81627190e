//! Azure Storage 実装（`azure` feature）
//!
//! - **AzureQueue**: Storage Queue（pop receipt の本家）
//! - **AzureBlobStore**: Blob コンテナ
//! - **AzureRecordStore**: Table
//!
//! 3 つとも同じ `StorageCredentials` から作ります。

mod blob;
mod queue;
mod table;

pub use self::blob::AzureBlobStore;
pub use self::queue::AzureQueue;
pub use self::table::AzureRecordStore;

use azure_core::error::ErrorKind;

use crate::domain::{ServiceError, ServiceKind};

const CONFLICT: u16 = 409;
const NOT_FOUND: u16 = 404;

/// azure_core のエラーを HTTP ステータスとエラーコード付きの ServiceError にする
pub(crate) fn service_error(service: ServiceKind, err: azure_core::Error) -> ServiceError {
    match err.kind() {
        ErrorKind::HttpResponse { status, error_code } => {
            let status = *status as u16;
            match error_code.as_deref() {
                Some(code) if status == NOT_FOUND => ServiceError::NotFound {
                    service,
                    code: code.to_string(),
                    name: err.to_string(),
                },
                _ => ServiceError::Request {
                    service,
                    status: Some(status),
                    code: error_code.clone(),
                    message: err.to_string(),
                },
            }
        }
        _ => ServiceError::Request {
            service,
            status: None,
            code: None,
            message: err.to_string(),
        },
    }
}

/// create が「既に存在する」と返したときのエラーコード
///
/// 同じ 409 でも `*BeingDeleted`（削除中）は失敗のまま返す。
fn already_exists_code(service: ServiceKind) -> &'static str {
    match service {
        ServiceKind::Queue => "QueueAlreadyExists",
        ServiceKind::Blob => "ContainerAlreadyExists",
        ServiceKind::Table => "TableAlreadyExists",
    }
}

/// 既に存在する（409 + `*AlreadyExists`）を成功として扱う
pub(crate) fn ignore_already_exists(
    service: ServiceKind,
    result: azure_core::Result<()>,
) -> Result<(), ServiceError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if is_already_exists(service, &err) => Ok(()),
        Err(err) => Err(service_error(service, err)),
    }
}

fn is_already_exists(service: ServiceKind, err: &azure_core::Error) -> bool {
    match err.kind() {
        ErrorKind::HttpResponse { status, error_code } => {
            *status as u16 == CONFLICT
                && error_code.as_deref() == Some(already_exists_code(service))
        }
        _ => false,
    }
}

/// 存在しない（404）を成功として扱う
pub(crate) fn ignore_not_found(
    service: ServiceKind,
    result: azure_core::Result<()>,
) -> Result<(), ServiceError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if http_status(&err) == Some(NOT_FOUND) => Ok(()),
        Err(err) => Err(service_error(service, err)),
    }
}

fn http_status(err: &azure_core::Error) -> Option<u16> {
    match err.kind() {
        ErrorKind::HttpResponse { status, .. } => Some(*status as u16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azure_core::StatusCode;

    fn http_error(status: StatusCode, code: &str) -> azure_core::Error {
        azure_core::Error::message(
            ErrorKind::HttpResponse {
                status,
                error_code: Some(code.to_string()),
            },
            "server returned an error",
        )
    }

    #[test]
    fn existing_resource_counts_as_created() {
        for (service, code) in [
            (ServiceKind::Queue, "QueueAlreadyExists"),
            (ServiceKind::Blob, "ContainerAlreadyExists"),
            (ServiceKind::Table, "TableAlreadyExists"),
        ] {
            let result = ignore_already_exists(service, Err(http_error(StatusCode::Conflict, code)));
            assert_eq!(result, Ok(()), "{service}");
        }
    }

    #[test]
    fn resource_being_deleted_fails_setup() {
        for (service, code) in [
            (ServiceKind::Queue, "QueueBeingDeleted"),
            (ServiceKind::Blob, "ContainerBeingDeleted"),
            (ServiceKind::Table, "TableBeingDeleted"),
        ] {
            let err = ignore_already_exists(service, Err(http_error(StatusCode::Conflict, code)))
                .unwrap_err();
            assert_eq!(err.code(), Some(code));
            assert!(matches!(err, ServiceError::Request { status: Some(409), .. }));
        }
    }

    #[test]
    fn another_services_code_is_not_swallowed() {
        let result = ignore_already_exists(
            ServiceKind::Blob,
            Err(http_error(StatusCode::Conflict, "TableAlreadyExists")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_resource_on_delete_is_ignored() {
        let result = ignore_not_found(
            ServiceKind::Queue,
            Err(http_error(StatusCode::NotFound, "QueueNotFound")),
        );
        assert_eq!(result, Ok(()));
    }
}
