use longpage_core::archive::{extract_images, is_image_filename, is_zip_filename};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

#[test]
fn extension_checks_are_case_insensitive() {
    assert!(is_image_filename("a.JPG"));
    assert!(is_image_filename("dir/b.webp"));
    assert!(is_image_filename("c.jpeg"));
    assert!(!is_image_filename("d.bmp"));
    assert!(!is_image_filename("noext"));
    assert!(is_zip_filename("Bundle.Zip"));
    assert!(!is_zip_filename("zip.png"));
}

#[test]
fn directories_and_non_images_are_skipped() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();
    zip.add_directory("nested/", opts).expect("dir");
    zip.start_file("nested/deep/a.png", opts).expect("start");
    zip.write_all(b"aaa").expect("write");
    zip.start_file("readme.md", opts).expect("start");
    zip.write_all(b"# hi").expect("write");
    zip.start_file("B.JPG", opts).expect("start");
    zip.write_all(b"bbb").expect("write");
    let bytes = zip.finish().expect("finish").into_inner();

    let entries = extract_images(&bytes).expect("extract");
    assert_eq!(
        entries,
        vec![
            ("a.png".to_string(), b"aaa".to_vec()),
            ("B.JPG".to_string(), b"bbb".to_vec()),
        ]
    );
}

#[test]
fn not_a_zip_is_an_error() {
    assert!(extract_images(b"plain text").is_err());
}
