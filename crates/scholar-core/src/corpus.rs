use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Error;
use crate::segment::Segmenter;
use crate::types::Chunk;

/// Reads pre-extracted document text and turns it into [`Chunk`]s.
#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    segmenter: Segmenter,
}

impl CorpusLoader {
    pub fn new(segmenter: Segmenter) -> Self { Self { segmenter } }

    /// Loads a single `.txt` file or every `.txt` file under a directory,
    /// in sorted path order.
    pub fn load(&self, path: &Path) -> Result<Vec<Chunk>> {
        if !path.exists() {
            return Err(Error::NotFound(format!("corpus path {}", path.display())).into());
        }
        let files = if path.is_file() { vec![path.to_path_buf()] } else { list_txt_files(path) };
        if files.is_empty() {
            info!(dir = %path.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), "processing file {}/{}", file_index + 1, files.len());
            let content = read_file_content(file_path)?;
            let source_id = source_id_for(file_path);
            all_chunks.extend(self.chunk_document(&source_id, &file_path.to_string_lossy(), &content));
        }
        info!(files = files.len(), chunks = all_chunks.len(), "corpus loaded");
        Ok(all_chunks)
    }

    pub fn chunk_document(&self, source_id: &str, source_path: &str, text: &str) -> Vec<Chunk> {
        let pieces = self.segmenter.segment(text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                id: format!("{source_id}:{chunk_index}"),
                source_id: source_id.to_string(),
                source_path: source_path.to_string(),
                text,
                chunk_index,
                total_chunks,
            })
            .collect()
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn source_id_for(file_path: &Path) -> String {
    file_path
        .file_stem()
        .map_or_else(|| file_path.to_string_lossy().to_string(), |s| s.to_string_lossy().to_string())
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}
