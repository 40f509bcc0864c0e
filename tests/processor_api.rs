mod common;

use std::io::Write;

use common::{SPECIALS_MODEL, TOY_MODEL};
use subword_ffi::{NarrowOverflow, Processor, ProcessorConfig, ProcessorError, StatusCode};

#[test]
fn test_from_model_and_queries() {
    let processor: Processor = Processor::from_model(TOY_MODEL.as_bytes()).expect("toy model loads");
    assert_eq!(processor.num_pieces(), 4);
    assert_eq!(processor.unk(), Some(3));
    assert_eq!(processor.bos(), None);
    assert_eq!(processor.id_to_piece_string(2).unwrap(), "c");
    assert_eq!(processor.id_to_piece(1).as_bytes(), b"b");
}

#[test]
fn test_from_model_reports_engine_status() {
    let result: Result<Processor, _> = Processor::from_model(b"");
    match result {
        Err(e @ ProcessorError::Engine(_)) => assert_eq!(e.status(), StatusCode::InvalidArgument),
        other => panic!("Expected engine error, got {:?}", other),
    }
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(SPECIALS_MODEL.as_bytes()).expect("write model");

    let processor: Processor = Processor::from_file(file.path()).expect("model loads from file");
    assert_eq!(processor.eos(), Some(2));
    assert_eq!(processor.pad(), Some(3));
}

#[test]
fn test_roundtrip_through_safe_api() {
    let processor: Processor = Processor::from_model(SPECIALS_MODEL.as_bytes()).unwrap();
    let ids = processor.encode("hihi").unwrap();
    assert_eq!(ids.as_slice(), &[6, 6]);
    let text = processor.decode(&ids).unwrap();
    assert_eq!(text.to_str().unwrap(), "hihi");

    let narrow = processor.encode16_with_prefix_suffix("hi", 1, 2).unwrap();
    assert_eq!(narrow.as_slice(), &[1, 6, 2]);
    // The affixes here are real pieces (<s>, </s>), so the whole sequence decodes.
    assert_eq!(processor.decode16(&narrow).unwrap().to_str().unwrap(), "<s>hi</s>");
}

#[test]
fn test_config_travels_with_processor() {
    let config = ProcessorConfig { narrow_overflow: NarrowOverflow::Reject, ..ProcessorConfig::default() };
    let mut processor: Processor = Processor::with_config(config.clone());
    processor.load(TOY_MODEL.as_bytes()).unwrap();
    processor.load(SPECIALS_MODEL.as_bytes()).unwrap();
    assert_eq!(processor.config(), &config);
}
