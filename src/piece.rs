use std::str::Utf8Error;

/// Borrowed view of a piece's text.
///
/// The bytes live inside the processor's engine. A `Piece` is never freed by
/// its holder and is invalidated when the processor is dropped or reloaded,
/// which the `'p` lifetime enforces on the Rust side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'p> {
    bytes: &'p [u8],
}

impl<'p> Piece<'p> {
    pub(crate) fn new(bytes: &'p [u8]) -> Self {
        Self { bytes }
    }

    pub fn empty() -> Piece<'static> {
        Piece { bytes: &[] }
    }

    pub fn as_bytes(&self) -> &'p [u8] {
        self.bytes
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_str(&self) -> Result<&'p str, Utf8Error> {
        std::str::from_utf8(self.bytes)
    }
}
