//! 入力画像の列挙と読み込み
//!
//! 1 つのディレクトリ直下の `*.jpg`（拡張子は大文字小文字を区別しない）だけを対象にします。

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::domain::{PipelineError, UnitId};

const IMAGE_EXTENSION: &str = "jpg";

/// 1 枚の画像 = 1 単位の処理
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub unit: UnitId,
    pub path: PathBuf,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
}

/// ディレクトリ直下の画像をファイル名順で返す
///
/// ディレクトリが無ければ `ErrorKind::NotFound` の `PipelineError::Io`。
pub async fn list_images(dir: &Path) -> Result<Vec<ImageFile>, PipelineError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::io(dir, e))?;

    let mut images = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::io(dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| PipelineError::io(&path, e))?;
        if !file_type.is_file() || !is_image(&path) {
            continue;
        }
        if let Some(unit) = UnitId::from_path(&path) {
            images.push(ImageFile { unit, path });
        }
    }

    images.sort_by(|a, b| a.unit.cmp(&b.unit));
    Ok(images)
}

pub async fn read_image(image: &ImageFile) -> Result<Bytes, PipelineError> {
    tokio::fs::read(&image.path)
        .await
        .map(Bytes::from)
        .map_err(|e| PipelineError::io(&image.path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_jpg_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["photo2.jpg", "photo1.JPG", "notes.txt", "photo3.jpeg"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let images = list_images(dir.path()).await.unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.unit.as_str()).collect();
        assert_eq!(names, vec!["photo1.JPG", "photo2.jpg"]);

        let content = read_image(&images[1]).await.unwrap();
        assert_eq!(content, Bytes::from_static(b"photo2.jpg"));
    }

    #[tokio::test]
    async fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_images(&dir.path().join("testfolder")).await.unwrap_err();
        assert!(err.is_missing_input());
    }
}
