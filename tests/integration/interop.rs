//! Archive layout as seen by other `.npz` readers and writers.

use npz_store::bridge::{read_array, write_array, write_scalar_attribute};
use npz_store::{Error, File, TypeTag};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Builds a version 1.0 `.npy` file the way NumPy lays it out.
fn npy_v1(dict: &str, data: &[u8]) -> Vec<u8> {
    let unpadded = 10 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header_len = dict.len() + padding + 1;
    let mut out = b"\x93NUMPY\x01\x00".to_vec();
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat(b' ').take(padding));
    out.push(b'\n');
    out.extend_from_slice(data);
    out
}

fn zip_members(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, bytes) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn saved(file: &File) -> Vec<u8> {
    file.write_to(Cursor::new(Vec::new())).unwrap().into_inner()
}

#[test]
fn member_names_follow_the_layout() {
    let file = File::in_memory();
    write_array(&[1.0, 2.0, 3.0], &file, "p", "/p").unwrap();
    let group = file.create_group("g").unwrap();
    write_scalar_attribute("a", &4i32, &group).unwrap();
    write_array(&[5u16], &group, "q", "q").unwrap();

    let bytes = saved(&file);
    let zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["g/", "g/@a.npy", "g/q.npy", "p.npy"]);
}

#[test]
fn datasets_are_plain_npy_members() {
    let file = File::in_memory();
    write_array(&[1.0, 2.0, 3.0], &file, "p", "/p").unwrap();

    let mut zip = ZipArchive::new(Cursor::new(saved(&file))).unwrap();
    let mut member = Vec::new();
    zip.by_name("p.npy").unwrap().read_to_end(&mut member).unwrap();

    assert_eq!(&member[..8], b"\x93NUMPY\x01\x00");
    let header_len = u16::from_le_bytes([member[8], member[9]]) as usize;
    assert_eq!((10 + header_len) % 64, 0);
    let header = std::str::from_utf8(&member[10..10 + header_len]).unwrap();
    assert!(header.contains("'descr': '<f8'"), "{}", header);
    assert!(header.contains("'fortran_order': False"), "{}", header);
    assert!(header.contains("'shape': (3, 1)"), "{}", header);
    assert!(header.ends_with('\n'));

    let data = &member[10 + header_len..];
    let expected: Vec<u8> = [1.0f64, 2.0, 3.0]
        .iter()
        .flat_map(|x| x.to_le_bytes())
        .collect();
    assert_eq!(data, &expected[..]);
}

#[test]
fn reads_numpy_style_archives() {
    let ints: Vec<u8> = [1i32, 2, 3].iter().flat_map(|x| x.to_le_bytes()).collect();
    let doubles: Vec<u8> = [0.5f64, -0.5].iter().flat_map(|x| x.to_be_bytes()).collect();
    let bytes = zip_members(&[
        (
            "arr_0.npy",
            npy_v1("{'descr': '<i4', 'fortran_order': False, 'shape': (3,), }", &ints),
        ),
        (
            "nested/x.npy",
            npy_v1("{'descr': '>f8', 'fortran_order': False, 'shape': (2,), }", &doubles),
        ),
    ]);

    let file = File::from_reader(Cursor::new(bytes)).unwrap();
    assert_eq!(file.member_names(), vec!["arr_0", "nested"]);
    assert_eq!(read_array::<i32>(&file, "arr_0").unwrap(), vec![1, 2, 3]);
    let x = file.dataset("nested/x").unwrap();
    assert_eq!(x.shape(), &[2]);
    assert_eq!(x.type_tag(), TypeTag::IEEE_F64BE);
    assert_eq!(read_array::<f64>(&file, "nested/x").unwrap(), vec![0.5, -0.5]);
}

#[test]
fn rejects_foreign_members() {
    let bytes = zip_members(&[("notes.txt", b"hello".to_vec())]);
    let err = File::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedEntry(ref name) if name == "notes.txt"));
}

#[test]
fn truncated_member_fails_to_read() {
    let bytes = zip_members(&[(
        "short.npy",
        npy_v1("{'descr': '<f8', 'fortran_order': False, 'shape': (4,), }", &[0; 16]),
    )]);
    let file = File::from_reader(Cursor::new(bytes)).unwrap();
    assert!(read_array::<f64>(&file, "short").is_err());
}

#[test]
fn extra_bytes_are_reported() {
    let bytes = zip_members(&[(
        "long.npy",
        npy_v1("{'descr': '|u1', 'fortran_order': False, 'shape': (2,), }", &[1, 2, 3]),
    )]);
    let file = File::from_reader(Cursor::new(bytes)).unwrap();
    let err = read_array::<u8>(&file, "long").unwrap_err();
    assert!(matches!(err, Error::ExtraBytes(1)));
}

#[test]
fn overflowing_shape_is_rejected() {
    let bytes = zip_members(&[(
        "big.npy",
        npy_v1(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (4294967296, 4294967296), }",
            &[],
        ),
    )]);
    let file = File::from_reader(Cursor::new(bytes)).unwrap();
    let err = read_array::<f64>(&file, "big").unwrap_err();
    assert!(matches!(err, Error::ParseHeader(_)), "{}", err);
    assert!(matches!(file.dataset("big"), Err(Error::ParseHeader(_))));
}

#[test]
fn inflated_size_in_zip_directory_is_rejected() {
    let mut bytes = zip_members(&[(
        "x.npy",
        npy_v1("{'descr': '|u1', 'fortran_order': False, 'shape': (2,), }", &[1, 2]),
    )]);
    // Uncompressed size field of the central directory entry.
    let entry = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .unwrap();
    bytes[entry + 24..entry + 28].copy_from_slice(&0xffff_fff0u32.to_le_bytes());

    let err = File::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, Error::Io(_) | Error::Zip(_)), "{}", err);
}

#[test]
fn member_that_is_also_a_group_is_rejected() {
    let bytes = zip_members(&[
        (
            "g.npy",
            npy_v1("{'descr': '|u1', 'fortran_order': False, 'shape': (1,), }", &[1]),
        ),
        (
            "g/x.npy",
            npy_v1("{'descr': '|u1', 'fortran_order': False, 'shape': (1,), }", &[2]),
        ),
    ]);
    let err = File::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedEntry(ref name) if name == "g.npy"));
}
