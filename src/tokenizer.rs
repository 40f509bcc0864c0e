use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use tokenizers::Tokenizer; // From the 'tokenizers' crate

use crate::config::ProcessorConfig;
use crate::engine::{TokenId, TokenizerEngine, NO_ID};
use crate::error::EngineError;

// Conventional spellings tried when neither the model nor the config names a reserved token.
const UNK_SPELLINGS: &[&str] = &["<unk>", "[UNK]"];
const BOS_SPELLINGS: &[&str] = &["<s>", "[CLS]", "<bos>", "<|startoftext|>"];
const EOS_SPELLINGS: &[&str] = &["</s>", "[SEP]", "<eos>", "<|endoftext|>"];
const PAD_SPELLINGS: &[&str] = &["<pad>", "[PAD]"];

/// Engine backed by a HuggingFace `tokenizer.json` document.
///
/// The piece table is materialized at load time so that `id_to_piece` can
/// hand out borrowed views instead of fresh strings. It is keyed by id, since
/// a vocabulary may leave gaps in its id space.
#[derive(Debug)]
pub struct HfEngine {
    tokenizer: Tokenizer,
    pieces: HashMap<u32, String>,
    unk: TokenId,
    bos: TokenId,
    eos: TokenId,
    pad: TokenId,
}

impl HfEngine {
    fn lookup(&self, piece: &str) -> Option<TokenId> {
        self.tokenizer.token_to_id(piece).and_then(|id| TokenId::try_from(id).ok())
    }

    fn contains(&self, id: TokenId) -> bool {
        u32::try_from(id).map_or(false, |id| self.pieces.contains_key(&id))
    }

    fn resolve(&self, declared: Option<TokenId>, configured: Option<&str>, spellings: &[&str]) -> TokenId {
        declared
            .filter(|&id| self.contains(id))
            .or_else(|| configured.and_then(|piece| self.lookup(piece)))
            .or_else(|| spellings.iter().find_map(|piece| self.lookup(piece)))
            .unwrap_or(NO_ID)
    }

    fn declared_unk(&self, document: &Value) -> Option<TokenId> {
        let model = &document["model"];
        if let Some(id) = model["unk_id"].as_i64() {
            return TokenId::try_from(id).ok();
        }
        model["unk_token"].as_str().and_then(|piece| self.lookup(piece))
    }

    fn declared_pad(&self, document: &Value) -> Option<TokenId> {
        let padding = &document["padding"];
        padding["pad_token"]
            .as_str()
            .and_then(|piece| self.lookup(piece))
            .or_else(|| padding["pad_id"].as_i64().and_then(|id| TokenId::try_from(id).ok()))
    }
}

impl TokenizerEngine for HfEngine {
    fn load_model(bytes: &[u8], config: &ProcessorConfig) -> Result<Self, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::invalid_argument("model blob is empty"));
        }
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| EngineError::data_loss(format!("model blob is not a tokenizer document: {}", e)))?;
        let tokenizer = Tokenizer::from_bytes(bytes)
            .map_err(|e| EngineError::data_loss(format!("failed to build tokenizer: {}", e)))?;

        let pieces: HashMap<u32, String> = tokenizer.get_vocab(true).into_iter().map(|(piece, id)| (id, piece)).collect();

        let mut engine = HfEngine { tokenizer, pieces, unk: NO_ID, bos: NO_ID, eos: NO_ID, pad: NO_ID };
        engine.unk = engine.resolve(engine.declared_unk(&document), config.unk_piece.as_deref(), UNK_SPELLINGS);
        engine.bos = engine.resolve(None, config.bos_piece.as_deref(), BOS_SPELLINGS);
        engine.eos = engine.resolve(None, config.eos_piece.as_deref(), EOS_SPELLINGS);
        engine.pad = engine.resolve(engine.declared_pad(&document), config.pad_piece.as_deref(), PAD_SPELLINGS);

        debug!(
            "loaded tokenizer: {} pieces, unk={} bos={} eos={} pad={}",
            engine.pieces.len(),
            engine.unk,
            engine.bos,
            engine.eos,
            engine.pad
        );
        Ok(engine)
    }

    fn segment(&self, text: &str) -> Result<Vec<TokenId>, EngineError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| EngineError::internal(format!("Encoding failed: {}", e)))?;
        encoding
            .get_ids()
            .iter()
            .map(|&id| TokenId::try_from(id).map_err(|_| EngineError::out_of_range(format!("id {} exceeds the id space", id))))
            .collect()
    }

    fn reconstruct(&self, ids: &[TokenId]) -> Result<String, EngineError> {
        let mut raw = Vec::with_capacity(ids.len());
        for &id in ids {
            match u32::try_from(id) {
                Ok(raw_id) if self.pieces.contains_key(&raw_id) => raw.push(raw_id),
                _ => return Err(EngineError::out_of_range(format!("Invalid id: {}", id))),
            }
        }
        self.tokenizer
            .decode(&raw, false)
            .map_err(|e| EngineError::internal(format!("Decoding failed: {}", e)))
    }

    fn unk_id(&self) -> TokenId {
        self.unk
    }

    fn bos_id(&self) -> TokenId {
        self.bos
    }

    fn eos_id(&self) -> TokenId {
        self.eos
    }

    fn pad_id(&self) -> TokenId {
        self.pad
    }

    fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    fn id_to_piece(&self, id: TokenId) -> &[u8] {
        u32::try_from(id)
            .ok()
            .and_then(|id| self.pieces.get(&id))
            .map_or(&[][..], |piece| piece.as_bytes())
    }

    fn piece_to_id(&self, piece: &str) -> TokenId {
        self.lookup(piece).unwrap_or(self.unk)
    }
}
