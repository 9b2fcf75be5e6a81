//! Context Persistence Store - 저장/불러오기/복원
//!
//! 모든 작업은 전부 아니면 전무입니다:
//! - 확인 거부 → `UserDeclined`, 문서와 컨텍스트 모두 그대로
//! - 손상된 저장 값 → `CorruptPersistedContext`, 라이브 컨텍스트를 건드리기 전에 실패
//! - 저장된 값 없음 → `RestoreOutcome::NothingToDo` (에러 아님)

use super::{decode_paths, encode_paths, ContextCodec, LocalVariableCodec, PropertyCodec};
use crate::context::ContextEntrySet;
use crate::host::{DocumentHost, DocumentKind, Prompter};
use std::path::PathBuf;
use tally_foundation::{Error, PersistenceConfig, Result};
use tracing::{debug, info};

const OVERWRITE_PROMPT: &str = "A saved context already exists in this document. Overwrite it?";
const REPLACE_PROMPT: &str = "The current context is not empty. Replace it with the saved context?";

/// 복원 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// 복원된 파일 항목 수
    Restored(usize),
    /// 저장된 컨텍스트 없음
    NothingToDo,
}

impl RestoreOutcome {
    pub fn restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored(_))
    }
}

/// 문서 종류별 codec 묶음
pub struct ContextPersistenceStore {
    codecs: Vec<Box<dyn ContextCodec>>,
}

impl ContextPersistenceStore {
    /// 기본 codec (property drawer, local variables) 등록
    pub fn new(config: &PersistenceConfig) -> Result<Self> {
        Ok(Self {
            codecs: vec![
                Box::new(PropertyCodec::new(config.property_key.clone())),
                Box::new(LocalVariableCodec::new(config.variable_name.clone())?),
            ],
        })
    }

    /// codec 없이 생성 (직접 등록용)
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// codec 등록 (같은 종류가 있으면 교체)
    pub fn register(&mut self, codec: Box<dyn ContextCodec>) {
        self.codecs.retain(|c| c.kind() != codec.kind());
        self.codecs.push(codec);
    }

    /// 문서 종류에 맞는 codec
    pub fn codec_for(&self, kind: DocumentKind) -> Result<&dyn ContextCodec> {
        self.codecs
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
            .ok_or_else(|| Error::UnsupportedDocument(kind.to_string()))
    }

    pub fn supports(&self, kind: DocumentKind) -> bool {
        self.codec_for(kind).is_ok()
    }

    /// 저장된 경로 목록 (없으면 None)
    pub fn load(&self, host: &dyn DocumentHost) -> Result<Option<Vec<PathBuf>>> {
        let codec = self.codec_for(host.document_kind())?;
        let text = host.document_text()?;

        match codec.read_raw(&text) {
            Some(raw) => Ok(Some(decode_paths(&raw)?)),
            None => Ok(None),
        }
    }

    /// 현재 파일 항목을 문서에 저장, 저장한 경로 수 반환
    ///
    /// 비어있지 않은 저장 값(손상된 값 포함)이 이미 있으면 확인을 받습니다.
    pub fn save(
        &self,
        host: &dyn DocumentHost,
        entries: &ContextEntrySet,
        prompter: &dyn Prompter,
    ) -> Result<usize> {
        let codec = self.codec_for(host.document_kind())?;
        let text = host.document_text()?;

        if let Some(raw) = codec.read_raw(&text) {
            let has_saved = decode_paths(&raw).map(|p| !p.is_empty()).unwrap_or(true);
            if has_saved && !prompter.confirm(OVERWRITE_PROMPT) {
                info!("Save cancelled, existing context kept");
                return Err(Error::declined(OVERWRITE_PROMPT));
            }
        }

        let paths = entries.file_paths();
        let blob = encode_paths(&paths)?;
        host.write_document_text(&codec.write(&text, &blob))?;

        info!(kind = %codec.kind(), files = paths.len(), "Context saved");
        Ok(paths.len())
    }

    /// 저장된 컨텍스트로 라이브 컨텍스트 교체
    ///
    /// 파싱이 끝난 뒤에만 라이브 컨텍스트를 변경합니다.
    pub fn restore(
        &self,
        host: &dyn DocumentHost,
        entries: &ContextEntrySet,
        prompter: &dyn Prompter,
    ) -> Result<RestoreOutcome> {
        let paths = match self.load(host)? {
            Some(paths) if !paths.is_empty() => paths,
            _ => {
                info!("No saved context to restore");
                return Ok(RestoreOutcome::NothingToDo);
            }
        };

        if !entries.is_empty() && !prompter.confirm(REPLACE_PROMPT) {
            info!("Restore cancelled, current context kept");
            return Err(Error::declined(REPLACE_PROMPT));
        }

        entries.remove_all();
        let restored = paths.into_iter().filter(|p| entries.add_file(p.clone())).count();
        debug!(restored, "Re-added saved files");

        info!(files = restored, "Context restored");
        Ok(RestoreOutcome::Restored(restored))
    }
}
