use crate::config::ProcessorConfig;
use crate::error::EngineError;

/// Engine-native token identifier.
pub type TokenId = i32;

/// 16-bit transport form of a [`TokenId`].
pub type NarrowTokenId = u16;

/// Sentinel returned for reserved tokens the vocabulary does not define.
pub const NO_ID: TokenId = -1;

/// Capability interface of the tokenizer engine sitting behind a processor.
///
/// Everything except `load_model` is a read against a loaded model, and
/// implementations must tolerate those reads from several threads at once.
pub trait TokenizerEngine: Send + Sync + Sized {
    /// Parse a serialized model. `config` carries reserved-token overrides.
    fn load_model(bytes: &[u8], config: &ProcessorConfig) -> Result<Self, EngineError>;

    /// Segment `text` into token ids.
    fn segment(&self, text: &str) -> Result<Vec<TokenId>, EngineError>;

    /// Rebuild text from token ids.
    fn reconstruct(&self, ids: &[TokenId]) -> Result<String, EngineError>;

    fn unk_id(&self) -> TokenId;
    fn bos_id(&self) -> TokenId;
    fn eos_id(&self) -> TokenId;
    fn pad_id(&self) -> TokenId;

    fn is_unknown(&self, id: TokenId) -> bool {
        let unk = self.unk_id();
        unk >= 0 && id == unk
    }

    /// Vocabulary size.
    fn num_pieces(&self) -> usize;

    /// Bytes of the piece for `id`, borrowed from the engine. Unknown ids map
    /// to the empty piece.
    fn id_to_piece(&self, id: TokenId) -> &[u8];

    /// Id of `piece`, or [`TokenizerEngine::unk_id`] if it is not in the vocabulary.
    fn piece_to_id(&self, piece: &str) -> TokenId;
}
