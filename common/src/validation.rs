//! アップロード前のファイル検証
//!
//! 形式とサイズはネットワーク呼び出しの前にクライアント側で確認する。

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 最大ファイルサイズ (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 受け付ける拡張子とMIMEタイプ
pub const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
];

/// ファイル選択ダイアログの `accept` 属性用
pub fn accept_attribute() -> String {
    ACCEPTED_TYPES
        .iter()
        .map(|(ext, _)| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

/// 選択されたファイルの情報（検証と表示のみに使う）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    /// ブラウザが報告したMIMEタイプ。CLIでは `None`
    pub mime_type: Option<String>,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// 報告されたMIMEタイプ、なければ拡張子から推定したもの
    pub fn resolved_mime(&self) -> Option<String> {
        match &self.mime_type {
            Some(mime) => Some(normalize_mime(mime)),
            None => {
                let ext = self.extension()?;
                mime_for_extension(&ext).map(str::to_string)
            }
        }
    }
}

/// `image/JPEG; charset=...` → `image/jpeg`
fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED_TYPES.iter().any(|(_, m)| *m == mime)
}

/// ファイルを検証し、送信に使うMIMEタイプを返す
pub fn validate_file(file: &FileMeta) -> Result<String, ValidationError> {
    let mime = file
        .resolved_mime()
        .filter(|m| is_accepted_mime(m))
        .ok_or_else(|| ValidationError::UnsupportedType {
            name: file.name.clone(),
        })?;

    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size_mb: format!("{:.1}", file.size as f64 / (1024.0 * 1024.0)),
            max_mb: MAX_FILE_SIZE / (1024 * 1024),
        });
    }

    Ok(mime)
}
