#![allow(dead_code)]

use std::os::raw::{c_char, c_int};
use std::ptr;

use subword_ffi::ffi::*;

pub const TOY_MODEL: &str = include_str!("../fixtures/toy_tokenizer.json");
pub const SPECIALS_MODEL: &str = include_str!("../fixtures/specials_tokenizer.json");
/// Three pieces, ids 0, 1 and 100.
pub const GAPPED_MODEL: &str = include_str!("../fixtures/gapped_tokenizer.json");

/// Owns a C handle for the duration of a test.
pub struct Handle(pub *mut SubwordProcessor);

impl Handle {
    pub fn new() -> Self {
        Handle(subword_processor_new())
    }

    pub fn loaded(model: &str) -> Self {
        let handle = Handle::new();
        assert_eq!(handle.load(model.as_bytes()), 0, "fixture model failed to load");
        handle
    }

    pub fn load(&self, bytes: &[u8]) -> c_int {
        unsafe { subword_processor_load(self.0, bytes.as_ptr() as *const c_char, bytes.len()) }
    }

    pub fn num_pieces(&self) -> c_int {
        unsafe { subword_processor_num_pieces(self.0) }
    }

    /// Calls a 32-bit encode export and copies the result out, freeing the buffer.
    pub fn encode(&self, text: &str) -> (c_int, Vec<c_int>) {
        let mut out: *mut c_int = ptr::null_mut();
        let mut out_len = 0usize;
        let status = unsafe {
            subword_processor_encode(self.0, text.as_ptr() as *const c_char, text.len(), &mut out, &mut out_len)
        };
        (status, unsafe { take_ids(out, out_len) })
    }

    pub fn decode(&self, ids: &[c_int]) -> (c_int, Vec<u8>) {
        let mut out: *mut c_char = ptr::null_mut();
        let mut out_len = 0usize;
        let status = unsafe { subword_processor_decode(self.0, ids.as_ptr(), ids.len(), &mut out, &mut out_len) };
        (status, unsafe { take_bytes(out, out_len) })
    }

    pub fn decode16(&self, ids: &[u16]) -> (c_int, Vec<u8>) {
        let mut out: *mut c_char = ptr::null_mut();
        let mut out_len = 0usize;
        let status = unsafe { subword_processor_decode16(self.0, ids.as_ptr(), ids.len(), &mut out, &mut out_len) };
        (status, unsafe { take_bytes(out, out_len) })
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe { subword_processor_free(self.0) }
    }
}

pub unsafe fn take_ids(ptr: *mut c_int, len: usize) -> Vec<c_int> {
    assert!(!ptr.is_null(), "encode must always hand back a buffer");
    let copy = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();
    unsafe { subword_free_ids(ptr, len) };
    copy
}

pub unsafe fn take_ids16(ptr: *mut u16, len: usize) -> Vec<u16> {
    assert!(!ptr.is_null(), "encode must always hand back a buffer");
    let copy = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();
    unsafe { subword_free_ids16(ptr, len) };
    copy
}

pub unsafe fn take_bytes(ptr: *mut c_char, len: usize) -> Vec<u8> {
    assert!(!ptr.is_null(), "decode must always hand back a buffer");
    let copy = unsafe { std::slice::from_raw_parts(ptr as *const u8, len) }.to_vec();
    unsafe { subword_free_bytes(ptr, len) };
    copy
}
