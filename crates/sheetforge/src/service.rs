//! Request handling: validate, build, serialize, store

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::build_workbook;
use crate::config::{GeneratorConfig, StorageKind};
use crate::error::{GenerateError, Result, ValidationErrors};
use crate::schema::{StorageHint, WorkbookConfig};
use crate::select::select_generator;
use crate::serializer::{Capabilities, DocumentSerializer, XlsxSerializer};
use crate::storage::{LocalStorage, Storage};
use crate::validate::validate;

pub const SUCCESS_MESSAGE: &str = "Excel file generated successfully";

/// A serialized workbook and what the caller needs to describe it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWorkbook {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub file_size: usize,
    pub sheets_count: usize,
}

/// Build and serialize an already validated configuration
pub fn generate(config: &WorkbookConfig, serializer: &dyn DocumentSerializer) -> Result<GeneratedWorkbook> {
    let file_name = if config.file_name.trim().is_empty() {
        format!("report_{}.xlsx", Utc::now().timestamp_millis())
    } else {
        config.file_name.clone()
    };
    info!("Generating '{}' with {} sheet(s)", file_name, config.sheets.len());

    let options = config.output_options();
    if options.password.as_deref().map_or(false, |p| !p.is_empty()) {
        warn!("'{}': open-password protection is not supported, writing an unprotected file", file_name);
    }

    let kind = select_generator(config);
    let builder = kind.builder(Capabilities::of(serializer));
    let workbook = build_workbook(&builder, config)?;
    let bytes = serializer.serialize(&workbook)?;

    info!("Generated '{}' ({} bytes, {:?} generator)", file_name, bytes.len(), kind);
    Ok(GeneratedWorkbook {
        file_size: bytes.len(),
        sheets_count: workbook.sheet_count(),
        file_name,
        bytes,
    })
}

/// Success envelope returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub download_url: String,
    pub file_name: String,
    pub file_size: usize,
    pub sheets_count: usize,
    pub message: String,
    pub expires_in: Option<u64>,
}

/// Entry point for raw requests
pub struct WorkbookService {
    config: GeneratorConfig,
    object_storage: Option<Box<dyn Storage>>,
}

impl WorkbookService {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            object_storage: None,
        }
    }

    /// Register the backend used when object storage is selected
    pub fn with_object_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.object_storage = Some(storage);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Parse a JSON document and handle it
    pub fn handle_json(&self, raw: &str) -> Result<GenerationResult> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationErrors::single("", format!("invalid JSON: {}", e)))?;
        self.handle(&value)
    }

    pub fn handle(&self, raw: &Value) -> Result<GenerationResult> {
        let config = validate(raw)?;
        let options = config.output_options();

        let kind = match options.storage {
            Some(StorageHint::S3) => StorageKind::ObjectStore,
            Some(StorageHint::Local) => StorageKind::Local,
            None => self.config.storage,
        };
        let local;
        let (storage, expires_in): (&dyn Storage, Option<u64>) = match kind {
            StorageKind::Local => {
                local = LocalStorage::new(&self.config.local_storage_path);
                (&local, local.expires_in())
            }
            StorageKind::ObjectStore => {
                let backend = self.object_storage.as_deref().ok_or_else(|| {
                    GenerateError::storage_unavailable("Object storage selected but no backend is configured")
                })?;
                let expiry = backend.expires_in().or(Some(self.config.url_expiry_secs));
                (backend, expiry)
            }
        };

        let serializer = XlsxSerializer::with_compression(options.compress.unwrap_or(true));
        let generated = generate(&config, &serializer)?;

        let locator = storage.upload(&generated.bytes, &generated.file_name)?;
        let download_url = storage.resolve_url(&locator)?;

        Ok(GenerationResult {
            success: true,
            download_url,
            file_name: generated.file_name,
            file_size: generated.file_size,
            sheets_count: generated.sheets_count,
            message: SUCCESS_MESSAGE.to_string(),
            expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{STORAGE_UNAVAILABLE, VALIDATION_ERROR};
    use crate::storage::Locator;
    use serde_json::json;
    use std::cell::RefCell;

    fn request(file_name: &str) -> Value {
        json!({
            "file_name": file_name,
            "sheets": [
                { "name": "A", "columns": [{ "header": "X", "key": "x" }], "data": [{ "x": 1 }] },
                { "name": "B", "columns": [], "data": [] }
            ]
        })
    }

    #[derive(Default)]
    struct MemoryStorage {
        uploads: RefCell<Vec<(String, usize)>>,
    }

    impl Storage for MemoryStorage {
        fn upload(&self, bytes: &[u8], suggested_name: &str) -> Result<Locator> {
            self.uploads.borrow_mut().push((suggested_name.to_string(), bytes.len()));
            Ok(Locator::new(format!("bucket/{}", suggested_name)))
        }

        fn resolve_url(&self, locator: &Locator) -> Result<String> {
            Ok(format!("https://files.test/{}", locator))
        }

        fn delete(&self, _locator: &Locator) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_generate_counts() {
        let config = validate(&request("two.xlsx")).unwrap();
        let generated = generate(&config, &XlsxSerializer::new()).unwrap();
        assert_eq!(generated.sheets_count, 2);
        assert_eq!(generated.file_size, generated.bytes.len());
        assert_eq!(generated.file_name, "two.xlsx");
    }

    #[test]
    fn test_empty_file_name_falls_back() {
        let config = validate(&request("")).unwrap();
        let generated = generate(&config, &XlsxSerializer::new()).unwrap();
        assert!(generated.file_name.starts_with("report_"));
        assert!(generated.file_name.ends_with(".xlsx"));
    }

    #[test]
    fn test_handle_local() {
        let dir = tempfile::tempdir().unwrap();
        let service = WorkbookService::new(GeneratorConfig {
            local_storage_path: dir.path().to_path_buf(),
            ..Default::default()
        });
        let result = service.handle(&request("local.xlsx")).unwrap();

        assert!(result.success);
        assert_eq!(result.message, SUCCESS_MESSAGE);
        assert_eq!(result.sheets_count, 2);
        assert_eq!(result.expires_in, None);
        assert!(result.download_url.starts_with("file://"));
        assert!(result.download_url.ends_with("_local.xlsx"));
    }

    #[test]
    fn test_object_storage_requires_backend() {
        let mut raw = request("s3.xlsx");
        raw["options"] = json!({ "storage": "s3" });
        let err = WorkbookService::new(GeneratorConfig::default()).handle(&raw).unwrap_err();
        assert_eq!(err.code(), STORAGE_UNAVAILABLE);
    }

    #[test]
    fn test_object_storage_backend() {
        let service = WorkbookService::new(GeneratorConfig {
            storage: StorageKind::ObjectStore,
            url_expiry_secs: 900,
            ..Default::default()
        })
        .with_object_storage(Box::new(MemoryStorage::default()));

        let result = service.handle(&request("remote.xlsx")).unwrap();
        assert_eq!(result.download_url, "https://files.test/bucket/remote.xlsx");
        assert_eq!(result.expires_in, Some(900));

        let envelope = serde_json::to_value(&result).unwrap();
        assert_eq!(envelope["file_name"], "remote.xlsx");
        assert_eq!(envelope["expires_in"], 900);
    }

    #[test]
    fn test_handle_json_rejects_garbage() {
        let service = WorkbookService::new(GeneratorConfig::default());
        let err = service.handle_json("{ not json").unwrap_err();
        assert_eq!(err.code(), VALIDATION_ERROR);

        let err = service.handle(&json!({ "sheets": [] })).unwrap_err();
        assert_eq!(err.code(), VALIDATION_ERROR);
    }
}
