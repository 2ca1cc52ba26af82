use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use tomasulo_core::config::Config;
use tomasulo_core::sim::{LoadError, ProgramImage, Simulator};

use crate::common::{image_text, programs};

#[test]
fn test_run_image_from_file() {
    let (words, code) = programs::store_load();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(image_text(0, &words).as_bytes()).unwrap();

    let image = ProgramImage::from_file(file.path()).unwrap();
    assert_eq!(image.len(), words.len() * 4);

    let mut sim = Simulator::new(&Config::default(), &image);
    assert_eq!(sim.run().unwrap(), code);
}

#[test]
fn test_image_from_reader_with_relocated_block() {
    let (words, code) = programs::sum_loop();
    let mut config = Config::default();
    config.general.start_pc = 0x400;
    let image = ProgramImage::from_reader(Cursor::new(image_text(0x400, &words))).unwrap();

    let mut sim = Simulator::new(&config, &image);
    assert_eq!(sim.run().unwrap(), code);
    assert_eq!(sim.read_byte(0x400), Some(words[0] as u8));
}

#[test]
fn test_comments_end_a_block() {
    let text = "// header\n@0\n13 05 F0 0F # halt with a0 = 0\n00 00 00 00\n";
    let image = ProgramImage::parse(text).unwrap();
    assert_eq!(image.segments[0].bytes, vec![0x13, 0x05, 0xF0, 0x0F]);

    let mut sim = Simulator::new(&Config::default(), &image);
    assert_eq!(sim.run().unwrap(), 0);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProgramImage::from_file(dir.path().join("absent.data")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_image_larger_than_configured_memory() {
    let mut config = Config::default();
    config.memory.size_bytes = 16;
    let image = ProgramImage::parse("@100 13 05 F0 0F").unwrap();
    let ram = image.to_ram(config.memory.size_bytes);
    assert_eq!(ram.len(), 0x104);
}
