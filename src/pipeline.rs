//! Shaping of engine output into caller-owned buffers.
//!
//! Narrowing keeps the low 16 bits of each id, so `id` becomes
//! `id mod 65536` for non-negative ids. Widening zero-extends.

use log::warn;

use crate::buffer::OwnedBuffer;
use crate::config::NarrowOverflow;
use crate::engine::{NarrowTokenId, TokenId};
use crate::error::EngineError;

/// Sentinel tokens placed around a narrow-encoded sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affixes {
    pub prefix: Option<NarrowTokenId>,
    pub suffix: Option<NarrowTokenId>,
}

impl Affixes {
    pub const NONE: Affixes = Affixes { prefix: None, suffix: None };

    pub fn prefix(prefix: NarrowTokenId) -> Self {
        Self { prefix: Some(prefix), suffix: None }
    }

    pub fn suffix(suffix: NarrowTokenId) -> Self {
        Self { prefix: None, suffix: Some(suffix) }
    }

    pub fn both(prefix: NarrowTokenId, suffix: NarrowTokenId) -> Self {
        Self { prefix: Some(prefix), suffix: Some(suffix) }
    }

    /// Number of slots the affixes add to the output.
    pub fn extra_len(&self) -> usize {
        usize::from(self.prefix.is_some()) + usize::from(self.suffix.is_some())
    }
}

pub fn truncate_id(id: TokenId) -> NarrowTokenId {
    id as NarrowTokenId
}

pub fn widen_id(id: NarrowTokenId) -> TokenId {
    TokenId::from(id)
}

/// Move a segmentation result into a 32-bit buffer.
pub fn wide(ids: Vec<TokenId>) -> OwnedBuffer<TokenId> {
    OwnedBuffer::from(ids)
}

/// Narrow `ids` to 16 bits and wrap them in `affixes`.
///
/// The output is allocated once at its final length; the prefix (if any) is
/// first, the suffix (if any) is last, and the ids keep their order.
pub fn narrow(
    ids: &[TokenId],
    affixes: Affixes,
    overflow: NarrowOverflow,
) -> Result<OwnedBuffer<NarrowTokenId>, EngineError> {
    if overflow == NarrowOverflow::Reject {
        if let Some(&id) = ids.iter().find(|&&id| NarrowTokenId::try_from(id).is_err()) {
            warn!("id {} does not fit in 16 bits; rejecting narrow encode", id);
            return Err(EngineError::out_of_range(format!("id {} does not fit in 16 bits", id)));
        }
    }

    let len = ids.len() + affixes.extra_len();
    let mut out = Vec::with_capacity(len);
    if let Some(prefix) = affixes.prefix {
        out.push(prefix);
    }
    out.extend(ids.iter().map(|&id| truncate_id(id)));
    if let Some(suffix) = affixes.suffix {
        out.push(suffix);
    }
    assert_eq!(out.len(), len);

    Ok(OwnedBuffer::from(out))
}

/// Zero-extend narrow ids back to engine ids.
pub fn widen(ids: &[NarrowTokenId]) -> Vec<TokenId> {
    ids.iter().map(|&id| widen_id(id)).collect()
}
