//! C ABI surface.
//!
//! # Memory contract
//! - `subword_processor_new` returns a handle owned by the caller; release it
//!   once with `subword_processor_free`.
//! - Every encode/decode call hands the caller exactly one buffer through its
//!   out-parameters, also on failure (then it is empty). Release it once with
//!   the matching `subword_free_*` function and the reported length.
//! - `subword_processor_id_to_piece` returns a view into the processor. It
//!   must not be freed and is invalid after `free` or a successful `load`.
//! - `load` and `configure` must not run concurrently with any other call on
//!   the same handle. Other calls may share a handle across threads.
//!
//! Status-returning functions return 0 on success and a `StatusCode` value
//! otherwise. Panics never cross the boundary; they are reported as
//! `INTERNAL`.

use log::{debug, error};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use crate::buffer::OwnedBuffer;
use crate::config::ProcessorConfig;
use crate::engine::{TokenId, NO_ID};
use crate::error::{EngineError, StatusCode};
use crate::pipeline::Affixes;
use crate::processor::Processor;
use crate::tokenizer::HfEngine;

const EMPTY_PIECE: &[u8] = &[];

/// The processor type behind a C handle.
pub type SubwordProcessor = Processor<HfEngine>;

fn guard<T>(fallback: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            error!("panic caught at the C boundary");
            fallback
        }
    }
}

fn status_of(result: Result<(), EngineError>) -> c_int {
    match result {
        Ok(()) => StatusCode::Ok.as_raw(),
        Err(e) => e.code().as_raw(),
    }
}

/// # Safety
/// `ptr` must be null or valid for `len` reads.
unsafe fn input_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(ptr, len) }
    }
}

/// Write `buffer` to the out-parameters, giving up ownership of it.
///
/// # Safety
/// Both pointers must be non-null and valid for writes.
unsafe fn hand_off<T>(buffer: OwnedBuffer<T>, out: *mut *mut T, out_len: *mut usize) {
    let (ptr, len) = buffer.into_raw_parts();
    debug!("handing off buffer of {} elements", len);
    unsafe {
        *out = ptr;
        *out_len = len;
    }
}

/// Shared body of every buffer-producing export.
///
/// # Safety
/// `p` must be null or a live handle; `out` and `out_len` must be null or
/// valid for writes.
unsafe fn produce<T>(
    p: *const SubwordProcessor,
    out: *mut *mut T,
    out_len: *mut usize,
    run: impl FnOnce(&SubwordProcessor) -> Result<OwnedBuffer<T>, EngineError>,
) -> c_int {
    if out.is_null() || out_len.is_null() {
        return StatusCode::InvalidArgument.as_raw();
    }
    unsafe {
        *out = ptr::null_mut();
        *out_len = 0;
    }
    let (buffer, status) = guard((OwnedBuffer::empty(), StatusCode::Internal), || {
        let result = match unsafe { p.as_ref() } {
            Some(processor) => run(processor),
            None => Err(EngineError::failed_precondition("null processor handle")),
        };
        match result {
            Ok(buffer) => (buffer, StatusCode::Ok),
            Err(e) => {
                debug!("call failed: {}", e);
                (OwnedBuffer::empty(), e.code())
            }
        }
    });
    unsafe { hand_off(buffer, out, out_len) };
    status.as_raw()
}

/// Encode body: validates the sentence bytes and runs `encode` on the text.
///
/// # Safety
/// As for [`produce`]; `sentence` must be null or valid for `sentence_len` reads.
unsafe fn encode_with<T>(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    out: *mut *mut T,
    out_len: *mut usize,
    encode: impl FnOnce(&SubwordProcessor, &str) -> Result<OwnedBuffer<T>, EngineError>,
) -> c_int {
    let bytes = unsafe { input_slice(sentence as *const u8, sentence_len) };
    unsafe {
        produce(p, out, out_len, |processor| {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| EngineError::invalid_argument(format!("sentence is not valid UTF-8: {}", e)))?;
            encode(processor, text)
        })
    }
}

#[no_mangle]
pub extern "C" fn subword_processor_new() -> *mut SubwordProcessor {
    Box::into_raw(Box::new(SubwordProcessor::new()))
}

/// # Safety
/// `p` must be null or a handle from `subword_processor_new` not yet freed.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_free(p: *mut SubwordProcessor) {
    if p.is_null() {
        return;
    }
    guard((), || drop(unsafe { Box::from_raw(p) }));
}

/// # Safety
/// `p` must be a live handle with no other call in flight; `data` must be
/// valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_load(
    p: *mut SubwordProcessor,
    data: *const c_char,
    len: usize,
) -> c_int {
    let bytes = unsafe { input_slice(data as *const u8, len) };
    guard(StatusCode::Internal.as_raw(), || match unsafe { p.as_mut() } {
        Some(processor) => status_of(processor.load(bytes)),
        None => StatusCode::FailedPrecondition.as_raw(),
    })
}

/// Install settings from a JSON document. Malformed JSON keeps the prior settings.
///
/// # Safety
/// As for [`subword_processor_load`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_configure(
    p: *mut SubwordProcessor,
    json: *const c_char,
    len: usize,
) -> c_int {
    let bytes = unsafe { input_slice(json as *const u8, len) };
    guard(StatusCode::Internal.as_raw(), || match unsafe { p.as_mut() } {
        Some(processor) => match ProcessorConfig::from_json_slice(bytes) {
            Ok(config) => {
                processor.set_config(config);
                StatusCode::Ok.as_raw()
            }
            Err(e) => {
                debug!("rejected processor config: {}", e);
                e.status().as_raw()
            }
        },
        None => StatusCode::FailedPrecondition.as_raw(),
    })
}

/// # Safety
/// `p` must be null or a live handle.
unsafe fn query(p: *const SubwordProcessor, ask: impl FnOnce(&SubwordProcessor) -> c_int) -> c_int {
    guard(NO_ID, || match unsafe { p.as_ref() } {
        Some(processor) => ask(processor),
        None => NO_ID,
    })
}

/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_unk_id(p: *const SubwordProcessor) -> c_int {
    unsafe { query(p, |processor| processor.unk_id()) }
}

/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_bos_id(p: *const SubwordProcessor) -> c_int {
    unsafe { query(p, |processor| processor.bos_id()) }
}

/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_eos_id(p: *const SubwordProcessor) -> c_int {
    unsafe { query(p, |processor| processor.eos_id()) }
}

/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_pad_id(p: *const SubwordProcessor) -> c_int {
    unsafe { query(p, |processor| processor.pad_id()) }
}

/// Returns 1 if `piece_id` is the unknown token, 0 otherwise.
///
/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_is_unknown(p: *const SubwordProcessor, piece_id: c_int) -> c_int {
    guard(0, || match unsafe { p.as_ref() } {
        Some(processor) => c_int::from(processor.is_unknown(piece_id)),
        None => 0,
    })
}

/// # Safety
/// `p` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_num_pieces(p: *const SubwordProcessor) -> c_int {
    guard(0, || match unsafe { p.as_ref() } {
        Some(processor) => c_int::try_from(processor.num_pieces()).unwrap_or(c_int::MAX),
        None => 0,
    })
}

/// Borrow the piece for `piece_id`. The bytes are not NUL-terminated.
///
/// # Safety
/// `p` must be null or a live handle; `piece` and `piece_len` must be valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_id_to_piece(
    p: *const SubwordProcessor,
    piece_id: c_int,
    piece: *mut *const c_char,
    piece_len: *mut usize,
) {
    if piece.is_null() || piece_len.is_null() {
        return;
    }
    let (ptr, len) = guard((EMPTY_PIECE.as_ptr(), 0), || match unsafe { p.as_ref() } {
        Some(processor) => {
            let view = processor.id_to_piece(piece_id);
            (view.as_ptr(), view.len())
        }
        None => (EMPTY_PIECE.as_ptr(), 0),
    });
    unsafe {
        *piece = ptr as *const c_char;
        *piece_len = len;
    }
}

/// Look up a NUL-terminated piece. Absent or non-UTF-8 pieces give the unknown id.
///
/// # Safety
/// `p` must be null or a live handle; `piece` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_piece_to_id(p: *const SubwordProcessor, piece: *const c_char) -> c_int {
    unsafe {
        query(p, |processor| {
            if piece.is_null() {
                return processor.unk_id();
            }
            match CStr::from_ptr(piece).to_str() {
                Ok(text) => processor.piece_to_id(text),
                Err(_) => processor.unk_id(),
            }
        })
    }
}

/// # Safety
/// `p` must be null or a live handle; `sentence` must be valid for
/// `sentence_len` reads; `encoded` and `encoded_len` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_encode(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    encoded: *mut *mut c_int,
    encoded_len: *mut usize,
) -> c_int {
    unsafe {
        encode_with(p, sentence, sentence_len, encoded, encoded_len, |processor, text| {
            processor.encode(text)
        })
    }
}

/// # Safety
/// As for [`subword_processor_encode`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_encode16(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    encoded: *mut *mut u16,
    encoded_len: *mut usize,
) -> c_int {
    unsafe {
        encode_with(p, sentence, sentence_len, encoded, encoded_len, |processor, text| {
            processor.encode16_with(text, Affixes::NONE)
        })
    }
}

/// # Safety
/// As for [`subword_processor_encode`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_encode16_with_suffix(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    suffix_tok: u16,
    encoded: *mut *mut u16,
    encoded_len: *mut usize,
) -> c_int {
    unsafe {
        encode_with(p, sentence, sentence_len, encoded, encoded_len, |processor, text| {
            processor.encode16_with(text, Affixes::suffix(suffix_tok))
        })
    }
}

/// # Safety
/// As for [`subword_processor_encode`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_encode16_with_prefix(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    prefix_tok: u16,
    encoded: *mut *mut u16,
    encoded_len: *mut usize,
) -> c_int {
    unsafe {
        encode_with(p, sentence, sentence_len, encoded, encoded_len, |processor, text| {
            processor.encode16_with(text, Affixes::prefix(prefix_tok))
        })
    }
}

/// # Safety
/// As for [`subword_processor_encode`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_encode16_with_prefix_suffix(
    p: *const SubwordProcessor,
    sentence: *const c_char,
    sentence_len: usize,
    prefix_tok: u16,
    suffix_tok: u16,
    encoded: *mut *mut u16,
    encoded_len: *mut usize,
) -> c_int {
    unsafe {
        encode_with(p, sentence, sentence_len, encoded, encoded_len, |processor, text| {
            processor.encode16_with(text, Affixes::both(prefix_tok, suffix_tok))
        })
    }
}

/// Decode ids into text. On failure `decoded` is still an empty, freeable buffer.
///
/// # Safety
/// `p` must be null or a live handle; `pieces` must be valid for `pieces_len`
/// reads; `decoded` and `decoded_len` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn subword_processor_decode(
    p: *const SubwordProcessor,
    pieces: *const c_int,
    pieces_len: usize,
    decoded: *mut *mut c_char,
    decoded_len: *mut usize,
) -> c_int {
    let ids = unsafe { input_slice(pieces, pieces_len) };
    unsafe { produce(p, decoded as *mut *mut u8, decoded_len, |processor| processor.decode(ids)) }
}

/// # Safety
/// As for [`subword_processor_decode`].
#[no_mangle]
pub unsafe extern "C" fn subword_processor_decode16(
    p: *const SubwordProcessor,
    pieces: *const u16,
    pieces_len: usize,
    decoded: *mut *mut c_char,
    decoded_len: *mut usize,
) -> c_int {
    let ids = unsafe { input_slice(pieces, pieces_len) };
    unsafe { produce(p, decoded as *mut *mut u8, decoded_len, |processor| processor.decode16(ids)) }
}

/// Release a buffer from `subword_processor_encode`.
///
/// # Safety
/// `ptr`/`len` must be exactly what an encode call reported, released once.
#[no_mangle]
pub unsafe extern "C" fn subword_free_ids(ptr: *mut c_int, len: usize) {
    if !ptr.is_null() {
        drop(unsafe { OwnedBuffer::<TokenId>::from_raw_parts(ptr, len) });
    }
}

/// Release a buffer from any `subword_processor_encode16*` call.
///
/// # Safety
/// As for [`subword_free_ids`].
#[no_mangle]
pub unsafe extern "C" fn subword_free_ids16(ptr: *mut u16, len: usize) {
    if !ptr.is_null() {
        drop(unsafe { OwnedBuffer::from_raw_parts(ptr, len) });
    }
}

/// Release a buffer from `subword_processor_decode` or `subword_processor_decode16`.
///
/// # Safety
/// As for [`subword_free_ids`].
#[no_mangle]
pub unsafe extern "C" fn subword_free_bytes(ptr: *mut c_char, len: usize) {
    if !ptr.is_null() {
        drop(unsafe { OwnedBuffer::from_raw_parts(ptr as *mut u8, len) });
    }
}
