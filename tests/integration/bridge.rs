//! Sequence and attribute operations.

use npz_store::bridge::{
    read_array, read_array_as, read_scalar_attribute, read_scalar_attribute_as, write_array,
    write_array_as, write_scalar_attribute, write_scalar_attribute_as,
};
use npz_store::{Compression, Error, File, TypeTag};
use std::fs;
use tempfile::tempdir;

#[test]
fn array_round_trip() {
    let file = File::in_memory();
    let values = vec![2.7, -40.4, -23., 27.8, -49., -43.3, f64::MIN_POSITIVE, 1e300];
    write_array(&values, &file, "n", "/p").unwrap();
    let read: Vec<f64> = read_array(&file, "/p").unwrap();
    assert_eq!(read, values);
}

#[test]
fn array_is_stored_as_column() {
    let file = File::in_memory();
    write_array(&[1.0, 2.0, 3.0, 4.0, 5.0], &file, "col", "/col").unwrap();
    let dataset = file.dataset("/col").unwrap();
    assert_eq!(dataset.shape(), &[5, 1]);
    assert_eq!(dataset.ndim(), 2);
    assert_eq!(dataset.type_tag(), TypeTag::NATIVE_DOUBLE);
}

#[test]
fn single_element_array() {
    let file = File::in_memory();
    write_array(&[42u64], &file, "one", "one").unwrap();
    assert_eq!(file.dataset("one").unwrap().shape(), &[1, 1]);
    assert_eq!(read_array::<u64>(&file, "/one").unwrap(), vec![42]);
}

#[test]
fn second_write_fails_and_keeps_first() {
    let file = File::in_memory();
    write_array(&[1.0, 2.0], &file, "n", "/p").unwrap();
    let err = write_array(&[9.0, 9.0, 9.0], &file, "n", "/p").unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(ref path) if path == "/p"));
    assert_eq!(read_array::<f64>(&file, "/p").unwrap(), vec![1.0, 2.0]);
    assert_eq!(file.dataset("/p").unwrap().shape(), &[2, 1]);
}

#[test]
fn missing_path_is_not_found() {
    let file = File::in_memory();
    let err = read_array::<f64>(&file, "/does/not/exist").unwrap_err();
    assert!(matches!(err, Error::NotFound(ref path) if path == "/does/not/exist"));
}

#[test]
fn empty_sequence_is_rejected() {
    let file = File::in_memory();
    let err = write_array::<f64>(&[], &file, "empty", "/empty").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!file.link_exists("/empty"));
}

#[test]
fn paths_are_relative_to_the_group() {
    let file = File::in_memory();
    let group = file.create_group("detector/front").unwrap();
    write_array(&[1i32, 2, 3], &group, "hits", "hits").unwrap();
    assert_eq!(
        read_array::<i32>(&file, "/detector/front/hits").unwrap(),
        vec![1, 2, 3]
    );
    write_array(&[4i32], &group, "abs", "/abs").unwrap();
    assert_eq!(file.member_names(), vec!["abs", "detector"]);
}

#[test]
fn intermediate_groups_are_created() {
    let file = File::in_memory();
    write_array(&[0.25f32], &file, "deep", "/a/b/c").unwrap();
    assert_eq!(file.group("/a/b").unwrap().member_names(), vec!["c"]);
}

#[test]
fn explicit_big_endian_tag() {
    let file = File::in_memory();
    let values = [i64::MIN, -1, 0, 1, i64::MAX];
    write_array_as(&values, &file, "be", "/be", TypeTag::STD_I64BE).unwrap();
    assert_eq!(file.dataset("/be").unwrap().type_tag(), TypeTag::STD_I64BE);
    // The stored byte order is converted on read.
    assert_eq!(read_array::<i64>(&file, "/be").unwrap(), values);
    assert_eq!(
        read_array_as::<i64>(&file, "/be", TypeTag::STD_I64LE).unwrap(),
        values
    );
}

#[test]
fn mismatched_tag_is_rejected_before_writing() {
    let file = File::in_memory();
    let err = write_array_as(&[1i32, 2], &file, "n", "/p", TypeTag::NATIVE_DOUBLE).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: TypeTag::NATIVE_DOUBLE,
            found: TypeTag::NATIVE_INT32,
        }
    ));
    assert!(!file.link_exists("/p"));
}

#[test]
fn reading_with_the_wrong_width_fails() {
    let file = File::in_memory();
    write_array(&[1.5f32, 2.5], &file, "f", "/f").unwrap();
    let err = read_array::<f64>(&file, "/f").unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: TypeTag::NATIVE_DOUBLE,
            found: TypeTag::NATIVE_FLOAT,
        }
    ));
    assert_eq!(read_array::<f32>(&file, "/f").unwrap(), vec![1.5, 2.5]);
}

#[test]
fn writing_to_a_read_only_store_fails() {
    let mut buf = Vec::new();
    File::in_memory()
        .write_to(std::io::Cursor::new(&mut buf))
        .unwrap();
    let file = File::from_reader(std::io::Cursor::new(&buf)).unwrap();
    assert!(file.is_read_only());
    let err = write_array(&[1.0], &file, "n", "/p").unwrap_err();
    assert!(matches!(err, Error::ReadOnly));
    let err = write_scalar_attribute("a", &1.0, &file).unwrap_err();
    assert!(matches!(err, Error::ReadOnly));
}

#[test]
fn read_only_store_leaves_its_file_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ro.npz");
    let file = File::create(&path).unwrap();
    write_array(&vec![0.0; 1024], &file, "zeros", "zeros").unwrap();
    file.close().unwrap();
    let before = fs::read(&path).unwrap();

    {
        let file = File::open(&path).unwrap();
        let err = file.set_compression(Compression::Stored).unwrap_err();
        assert!(matches!(err, Error::ReadOnly));
        assert!(write_array(&[1.0], &file, "n", "/p").is_err());
        file.flush().unwrap();
    }

    assert_eq!(fs::read(&path).unwrap(), before);
    let file = File::open(&path).unwrap();
    assert_eq!(read_array::<f64>(&file, "zeros").unwrap(), vec![0.0; 1024]);
}

#[test]
fn attribute_round_trip() {
    let file = File::in_memory();
    let group = file.create_group("g").unwrap();
    write_scalar_attribute("rate", &0.1f64, &group).unwrap();
    write_scalar_attribute("bits", &-12i16, &group).unwrap();
    write_scalar_attribute("flags", &0xfeu8, &group).unwrap();
    write_scalar_attribute("tiny", &f32::EPSILON, &group).unwrap();

    let rate: f64 = read_scalar_attribute("rate", &group).unwrap();
    assert_eq!(rate.to_bits(), 0.1f64.to_bits());
    assert_eq!(read_scalar_attribute::<i16>("bits", &group).unwrap(), -12);
    assert_eq!(read_scalar_attribute::<u8>("flags", &group).unwrap(), 0xfe);
    assert_eq!(
        read_scalar_attribute::<f32>("tiny", &group).unwrap().to_bits(),
        f32::EPSILON.to_bits()
    );
    assert_eq!(group.attr_names(), vec!["bits", "flags", "rate", "tiny"]);
}

#[test]
fn attribute_with_explicit_tag() {
    let file = File::in_memory();
    write_scalar_attribute_as("scale", &-2.5f64, &file, TypeTag::IEEE_F64BE).unwrap();
    let attr = file.attr("scale").unwrap();
    assert_eq!(attr.type_tag(), TypeTag::IEEE_F64BE);
    assert_eq!(
        read_scalar_attribute_as::<f64>("scale", &file, TypeTag::IEEE_F64LE).unwrap(),
        -2.5
    );
}

#[test]
fn duplicate_attribute_fails() {
    let file = File::in_memory();
    write_scalar_attribute("a", &1u32, &file).unwrap();
    let err = write_scalar_attribute("a", &2u32, &file).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(read_scalar_attribute::<u32>("a", &file).unwrap(), 1);
}

#[test]
fn missing_attribute_is_not_found() {
    let file = File::in_memory();
    let err = read_scalar_attribute::<f64>("absent", &file).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn attributes_and_datasets_do_not_collide() {
    let file = File::in_memory();
    write_array(&[1.0], &file, "x", "/x").unwrap();
    write_scalar_attribute("x", &2.0, &file).unwrap();
    assert_eq!(read_array::<f64>(&file, "/x").unwrap(), vec![1.0]);
    assert_eq!(read_scalar_attribute::<f64>("x", &file).unwrap(), 2.0);
    assert_eq!(file.member_names(), vec!["x"]);
    assert_eq!(file.attr_names(), vec!["x"]);
}

#[test]
fn invalid_names_are_rejected() {
    let file = File::in_memory();
    for path in &["", "/a/../b", "@hidden"] {
        let err = write_array(&[1.0], &file, "n", path).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "accepted {:?}", path);
    }
    let err = write_scalar_attribute("a/b", &1.0, &file).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}
