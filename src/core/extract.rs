use crate::domain::model::{
    ExtractedModule, ExtractionReport, SkippedRecord, DEFAULT_LEAF_NAME,
};
use crate::utils::error::{FetchError, Result, SkipReason};
use serde_json::Value;
use std::collections::HashSet;

// 每筆 entry 裡模組列表的位置
const DATA_PATH: [&str; 3] = ["body", "result", "data"];

pub fn parse_response(raw: &str, network_url: &str) -> Result<ExtractionReport> {
    let document: Value = serde_json::from_str(raw)?;

    let entries = document
        .get(network_url)
        .ok_or_else(|| FetchError::MissingNetworkKey(network_url.to_string()))?
        .as_array()
        .ok_or_else(|| FetchError::NotASequence(network_url.to_string()))?;

    let mut report = ExtractionReport::default();
    let mut claimed = HashSet::new();

    for (entry_index, entry) in entries.iter().enumerate() {
        let modules = match resolve_data(entry) {
            Ok(modules) => modules,
            Err(reason) => {
                tracing::warn!("Skipping entry {}: {}", entry_index, reason);
                report.skipped.push(SkippedRecord {
                    entry: entry_index,
                    module: None,
                    reason,
                });
                continue;
            }
        };

        for (module_index, raw_module) in modules.iter().enumerate() {
            let validated = validate_module(raw_module).and_then(|module| {
                if claimed.insert(module.relative_path()) {
                    Ok(module)
                } else {
                    Err(SkipReason::DuplicatePath {
                        path: module.relative_path(),
                    })
                }
            });

            match validated {
                Ok(module) => report.modules.push(module),
                Err(reason) => {
                    tracing::warn!(
                        "Skipping module {} of entry {}: {}",
                        module_index,
                        entry_index,
                        reason
                    );
                    report.skipped.push(SkippedRecord {
                        entry: entry_index,
                        module: Some(module_index),
                        reason,
                    });
                }
            }
        }
    }

    tracing::debug!(
        "Extracted {} modules, skipped {} records",
        report.modules.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// 走 body.result.data，回傳模組列表
fn resolve_data(entry: &Value) -> std::result::Result<&Vec<Value>, SkipReason> {
    let mut current = entry;
    for key in DATA_PATH {
        current = current.get(key).ok_or(SkipReason::MissingKey { key })?;
    }
    current.as_array().ok_or(SkipReason::DataNotSequence)
}

/// 檢查單一模組的 name / code 並推導輸出位置
pub fn validate_module(raw: &Value) -> std::result::Result<ExtractedModule, SkipReason> {
    let name = non_empty_str(raw, "name")?;
    let code = non_empty_str(raw, "code")?;
    let (namespace, leaf_name) = split_module_name(name);

    check_path_segment(name, namespace)?;
    check_path_segment(name, leaf_name)?;

    Ok(ExtractedModule {
        qualified_name: name.to_string(),
        namespace: namespace.to_string(),
        leaf_name: leaf_name.to_string(),
        code: code.to_string(),
    })
}

/// 以最後一個 `.` 切開；沒有 `.` 時整個名稱當 namespace，檔名用預設值
pub fn split_module_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((name, DEFAULT_LEAF_NAME))
}

fn non_empty_str<'a>(raw: &'a Value, field: &'static str) -> std::result::Result<&'a str, SkipReason> {
    raw.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingField { field })
}

fn check_path_segment(name: &str, segment: &str) -> std::result::Result<(), SkipReason> {
    let reason = if segment.is_empty() {
        "empty path segment"
    } else if segment == "." || segment == ".." {
        "relative path segment"
    } else if segment.contains(['/', '\\', '\0']) {
        "contains a path separator or NUL"
    } else {
        return Ok(());
    };

    Err(SkipReason::UnsafeName {
        name: name.to_string(),
        reason,
    })
}
