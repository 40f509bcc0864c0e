use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::buffer::OwnedBuffer;
use crate::config::ProcessorConfig;
use crate::engine::{NarrowTokenId, TokenId, TokenizerEngine, NO_ID};
use crate::error::{EngineError, ProcessorError};
use crate::piece::Piece;
use crate::pipeline::{self, Affixes};
use crate::tokenizer::HfEngine;

/// File name `from_dir` looks for.
pub const MODEL_FILE_NAME: &str = "tokenizer.json";

/// A tokenizer handle: at most one loaded engine plus the settings applied to it.
///
/// Queries on a processor that has never loaded a model return the empty
/// answers (`-1` ids, zero pieces, empty pieces); encodes and decodes fail
/// with `FAILED_PRECONDITION`.
#[derive(Debug)]
pub struct Processor<E: TokenizerEngine = HfEngine> {
    engine: Option<E>,
    config: ProcessorConfig,
}

impl<E: TokenizerEngine> Default for Processor<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn present(id: TokenId) -> Option<TokenId> {
    if id < 0 {
        None
    } else {
        Some(id)
    }
}

impl<E: TokenizerEngine> Processor<E> {
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self { engine: None, config }
    }

    /// Create a processor and load `data` into it.
    pub fn from_model(data: &[u8]) -> Result<Self, ProcessorError> {
        let mut processor = Self::new();
        processor.load(data)?;
        Ok(processor)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProcessorError> {
        let data = fs::read(path.as_ref())?;
        Self::from_model(&data)
    }

    /// Load `<dir>/tokenizer.json`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ProcessorError> {
        Self::from_file(dir.as_ref().join(MODEL_FILE_NAME))
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Replace the settings. Reserved-token overrides take effect on the next load.
    pub fn set_config(&mut self, config: ProcessorConfig) {
        self.config = config;
    }

    /// Parse `data` and install the resulting engine.
    ///
    /// The previous engine is dropped only after the new one parsed
    /// successfully; on failure the processor is left exactly as it was.
    pub fn load(&mut self, data: &[u8]) -> Result<(), EngineError> {
        match E::load_model(data, &self.config) {
            Ok(engine) => {
                if self.engine.replace(engine).is_some() {
                    debug!("replaced previously loaded model");
                }
                Ok(())
            }
            Err(e) => {
                warn!("model load failed ({} bytes): {}", data.len(), e);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    fn loaded(&self) -> Result<&E, EngineError> {
        self.engine
            .as_ref()
            .ok_or_else(|| EngineError::failed_precondition("Model is not initialized."))
    }

    pub fn unk_id(&self) -> TokenId {
        self.engine.as_ref().map_or(NO_ID, E::unk_id)
    }

    pub fn bos_id(&self) -> TokenId {
        self.engine.as_ref().map_or(NO_ID, E::bos_id)
    }

    pub fn eos_id(&self) -> TokenId {
        self.engine.as_ref().map_or(NO_ID, E::eos_id)
    }

    pub fn pad_id(&self) -> TokenId {
        self.engine.as_ref().map_or(NO_ID, E::pad_id)
    }

    pub fn unk(&self) -> Option<TokenId> {
        present(self.unk_id())
    }

    pub fn bos(&self) -> Option<TokenId> {
        present(self.bos_id())
    }

    pub fn eos(&self) -> Option<TokenId> {
        present(self.eos_id())
    }

    pub fn pad(&self) -> Option<TokenId> {
        present(self.pad_id())
    }

    pub fn is_unknown(&self, id: TokenId) -> bool {
        self.engine.as_ref().map_or(false, |engine| engine.is_unknown(id))
    }

    pub fn num_pieces(&self) -> usize {
        self.engine.as_ref().map_or(0, E::num_pieces)
    }

    pub fn id_to_piece(&self, id: TokenId) -> Piece<'_> {
        match &self.engine {
            Some(engine) => Piece::new(engine.id_to_piece(id)),
            None => Piece::empty(),
        }
    }

    /// Owned, UTF-8 checked copy of a piece.
    pub fn id_to_piece_string(&self, id: TokenId) -> Result<String, ProcessorError> {
        Ok(self.id_to_piece(id).to_str()?.to_owned())
    }

    pub fn piece_to_id(&self, piece: &str) -> TokenId {
        self.engine.as_ref().map_or(NO_ID, |engine| engine.piece_to_id(piece))
    }

    pub fn encode(&self, text: &str) -> Result<OwnedBuffer<TokenId>, EngineError> {
        let ids = self.loaded()?.segment(text)?;
        Ok(pipeline::wide(ids))
    }

    pub fn encode16(&self, text: &str) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
        self.encode16_with(text, Affixes::NONE)
    }

    pub fn encode16_with_suffix(
        &self,
        text: &str,
        suffix: NarrowTokenId,
    ) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
        self.encode16_with(text, Affixes::suffix(suffix))
    }

    pub fn encode16_with_prefix(
        &self,
        text: &str,
        prefix: NarrowTokenId,
    ) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
        self.encode16_with(text, Affixes::prefix(prefix))
    }

    pub fn encode16_with_prefix_suffix(
        &self,
        text: &str,
        prefix: NarrowTokenId,
        suffix: NarrowTokenId,
    ) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
        self.encode16_with(text, Affixes::both(prefix, suffix))
    }

    pub fn encode16_with(
        &self,
        text: &str,
        affixes: Affixes,
    ) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
        let ids = self.loaded()?.segment(text)?;
        pipeline::narrow(&ids, affixes, self.config.narrow_overflow)
    }

    pub fn decode(&self, ids: &[TokenId]) -> Result<OwnedBuffer<u8>, EngineError> {
        let text = self.loaded()?.reconstruct(ids)?;
        Ok(OwnedBuffer::from(text.into_bytes()))
    }

    pub fn decode16(&self, ids: &[NarrowTokenId]) -> Result<OwnedBuffer<u8>, EngineError> {
        self.decode(&pipeline::widen(ids))
    }
}
