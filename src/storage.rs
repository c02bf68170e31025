use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// 读取 JSON 文件；文件缺失或损坏时返回调用方提供的默认值。
/// 历史/配置文件损坏不应让用户操作失败，只记录警告。
pub fn load_json_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    if !path.exists() {
        return default;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("无法读取 {}: {}，使用默认值", path.display(), e);
            return default;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!("JSON 损坏 {}: {}，使用默认值", path.display(), e);
            default
        }
    }
}

/// 整体重写 JSON 文件（无部分写入保护，单用户本地场景可接受）
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> std::result::Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn load_missing_file_returns_default() {
        let loaded: Vec<String> =
            load_json_or(Path::new("/ruta/inexistente/archivo.json"), vec!["x".to_string()]);
        assert_eq!(loaded, vec!["x".to_string()]);
    }

    #[test]
    fn load_corrupt_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.json");
        fs::write(&path, "{ esto no es json").unwrap();

        let loaded: BTreeMap<String, i64> = load_json_or(&path, BTreeMap::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("datos.json");

        let mut data = BTreeMap::new();
        data.insert("total".to_string(), 236.0_f64);
        save_json(&path, &data).unwrap();

        let loaded: BTreeMap<String, f64> = load_json_or(&path, BTreeMap::new());
        assert_eq!(loaded, data);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.json");

        save_json(&path, &vec![1, 2, 3]).unwrap();
        save_json(&path, &vec![9]).unwrap();

        let loaded: Vec<i64> = load_json_or(&path, Vec::new());
        assert_eq!(loaded, vec![9]);
    }
}
