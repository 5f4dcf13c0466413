use std::io::{self, Cursor, Read};

use image::{DynamicImage, Rgb, RgbImage};
use kiseki_thumb::image::compress_to_jpeg;
use kiseki_thumb::{
    extract_thumbnail, extract_thumbnail_with, ConfigError, Stage, ThumbnailConfig, ThumbnailError,
    ThumbnailProvider,
};

fn jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Vec::new();
    compress_to_jpeg(&img, &mut out, 95).unwrap();
    out
}

fn container(payload: &[u8]) -> Vec<u8> {
    let mut data = b"<roblox xmlns:xmime=\"http://www.w3.org/2005/05/xmlmime\" version=\"4\">\n<Meta name=\"ExplicitAutoJoints\">true</Meta>\n</roblox>".to_vec();
    data.push(0);
    data.extend_from_slice(payload);
    data
}

#[test]
fn two_by_two_preview() {
    let mut source = Cursor::new(container(&jpeg(2, 2, [40, 120, 200])));
    let thumb = extract_thumbnail(&mut source).unwrap();

    assert_eq!(thumb.width, 2);
    assert_eq!(thumb.height, 2);
    assert_eq!(thumb.stride, 8);
    assert_eq!(thumb.pixels.len(), 16);
    assert!(!thumb.has_alpha);
}

#[test]
fn odd_width_gets_padded_rows() {
    let mut source = Cursor::new(container(&jpeg(5, 3, [200, 200, 200])));
    let thumb = extract_thumbnail(&mut source).unwrap();

    assert_eq!(thumb.stride, 16);
    assert_eq!(thumb.pixels.len(), 48);
    for y in 0..3 {
        assert_eq!(thumb.row(y).unwrap()[15], 0);
    }
}

#[test]
fn output_is_bgr() {
    let mut source = Cursor::new(container(&jpeg(4, 4, [250, 10, 10])));
    let thumb = extract_thumbnail(&mut source).unwrap();

    let first = &thumb.pixels[..3];
    assert!(first[0] < 50 && first[2] > 200, "{first:?}");
}

#[test]
fn identical_input_identical_output() {
    let data = container(&jpeg(7, 5, [12, 34, 56]));

    let a = extract_thumbnail(&mut Cursor::new(data.clone())).unwrap();
    let b = extract_thumbnail(&mut Cursor::new(data)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn larger_preview() {
    let data = container(&jpeg(128, 96, [90, 90, 90]));

    let thumb = extract_thumbnail(&mut Cursor::new(data)).unwrap();
    assert_eq!((thumb.width, thumb.height), (128, 96));
    assert_eq!(thumb.pixels.len(), 96 * 384);
}

#[test]
fn only_first_image_is_decoded() {
    let mut payload = jpeg(2, 2, [0, 0, 0]);
    payload.extend_from_slice(&jpeg(16, 16, [255, 255, 255]));

    let thumb = extract_thumbnail(&mut Cursor::new(container(&payload))).unwrap();
    assert_eq!((thumb.width, thumb.height), (2, 2));
}

#[test]
fn missing_delimiter() {
    let mut data = b"<roblox>no end tag".to_vec();
    data.extend_from_slice(&jpeg(2, 2, [0, 0, 0]));

    let err = extract_thumbnail(&mut Cursor::new(data)).unwrap_err();
    assert!(matches!(err, ThumbnailError::DelimiterNotFound));
    assert_eq!(err.stage(), Stage::Scan);
}

#[test]
fn nothing_after_terminator() {
    let err = extract_thumbnail(&mut Cursor::new(container(&[]))).unwrap_err();
    assert!(matches!(err, ThumbnailError::NoPayload));
}

#[test]
fn payload_is_not_jpeg() {
    let err = extract_thumbnail(&mut Cursor::new(container(b"GIF89a....."))).unwrap_err();
    assert!(matches!(err, ThumbnailError::Decode(_)));
    assert_eq!(err.stage(), Stage::Decode);
}

#[test]
fn truncated_preview_is_rejected() {
    let full = jpeg(32, 32, [90, 180, 45]);

    for cut in [full.len() / 2, full.len() - 1] {
        let err = extract_thumbnail(&mut Cursor::new(container(&full[..cut]))).unwrap_err();
        assert!(matches!(err, ThumbnailError::Decode(_)), "cut at {cut}: {err:?}");
        assert_eq!(err.stage(), Stage::Decode);
    }
}

#[test]
fn invalid_config_is_rejected_at_setup() {
    let data = container(&jpeg(2, 2, [1, 2, 3]));

    let empty_delimiter = ThumbnailConfig {
        delimiter: String::new(),
        ..Default::default()
    };
    let err = extract_thumbnail_with(&mut Cursor::new(data.clone()), &empty_delimiter).unwrap_err();
    assert!(matches!(err, ThumbnailError::Config(ConfigError::EmptyDelimiter)));
    assert_eq!(err.stage(), Stage::Setup);

    let zero_chunk = ThumbnailConfig {
        chunk_size: 0,
        ..Default::default()
    };
    let err = extract_thumbnail_with(&mut Cursor::new(data), &zero_chunk).unwrap_err();
    assert!(matches!(err, ThumbnailError::Config(ConfigError::ZeroChunkSize)));
    assert_eq!(err.stage(), Stage::Setup);
}

#[test]
fn read_error_is_reported() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }
    }

    let err = extract_thumbnail(&mut Broken).unwrap_err();
    assert!(matches!(err, ThumbnailError::Io(_)));
    assert_eq!(err.stage(), Stage::Read);
}

#[test]
fn provider_runs_pipeline_on_stored_stream() {
    let mut provider = ThumbnailProvider::default();
    provider
        .initialize(Cursor::new(container(&jpeg(3, 1, [1, 2, 3]))))
        .unwrap();

    let thumb = provider.thumbnail_sized(256).unwrap();
    assert_eq!((thumb.width, thumb.height, thumb.stride), (3, 1, 12));
}

#[test]
fn independent_calls_on_threads() {
    let handles: Vec<_> = (1..=4u32)
        .map(|n| {
            let data = container(&jpeg(n, n, [100, 100, 100]));
            std::thread::spawn(move || extract_thumbnail(&mut Cursor::new(data)))
        })
        .collect();

    for (n, handle) in (1..=4u32).zip(handles) {
        let thumb = handle.join().unwrap().unwrap();
        assert_eq!(thumb.width, n);
    }
}
