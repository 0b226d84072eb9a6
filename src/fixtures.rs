//! In-memory test inputs: synthetic TIFF containers and small encoded images.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

enum Payload {
    Bytes(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
}

/// One directory entry to be written by [`ExifFixture`].
pub struct Field {
    tag: u16,
    field_type: u16,
    count: u32,
    payload: Payload,
}

impl Field {
    /// NUL-terminated ASCII string.
    pub fn ascii(tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self::bytes(tag, 2, bytes)
    }

    pub fn bytes(tag: u16, field_type: u16, bytes: Vec<u8>) -> Self {
        Self {
            tag,
            field_type,
            count: bytes.len() as u32,
            payload: Payload::Bytes(bytes),
        }
    }

    pub fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            field_type: 3,
            count: 1,
            payload: Payload::Short(vec![value]),
        }
    }

    pub fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            field_type: 4,
            count: 1,
            payload: Payload::Long(vec![value]),
        }
    }

    pub fn rationals(tag: u16, values: &[(u32, u32)]) -> Self {
        Self {
            tag,
            field_type: 5,
            count: values.len() as u32,
            payload: Payload::Rational(values.to_vec()),
        }
    }

    /// Entry with an arbitrary declared type and count.
    pub fn raw(tag: u16, field_type: u16, count: u32, bytes: Vec<u8>) -> Self {
        Self {
            tag,
            field_type,
            count,
            payload: Payload::Bytes(bytes),
        }
    }

    fn encode(&self, big_endian: bool) -> Vec<u8> {
        let mut out = Vec::new();
        match &self.payload {
            Payload::Bytes(bytes) => out.extend_from_slice(bytes),
            Payload::Short(values) => {
                for v in values {
                    out.extend_from_slice(&u16_bytes(*v, big_endian));
                }
            }
            Payload::Long(values) => {
                for v in values {
                    out.extend_from_slice(&u32_bytes(*v, big_endian));
                }
            }
            Payload::Rational(values) => {
                for (n, d) in values {
                    out.extend_from_slice(&u32_bytes(*n, big_endian));
                    out.extend_from_slice(&u32_bytes(*d, big_endian));
                }
            }
        }
        out
    }
}

fn u16_bytes(value: u16, big_endian: bool) -> [u8; 2] {
    if big_endian {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    }
}

fn u32_bytes(value: u32, big_endian: bool) -> [u8; 4] {
    if big_endian {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    }
}

fn padded_len(len: usize) -> usize {
    if len <= 4 { 0 } else { len + len % 2 }
}

/// Builder for a TIFF container with 0th, Exif, GPS and 1st directories.
#[derive(Default)]
pub struct ExifFixture {
    big_endian: bool,
    ifd0: Vec<Field>,
    exif: Vec<Field>,
    gps: Vec<Field>,
    ifd1: Vec<Field>,
    thumbnail: Option<Vec<u8>>,
    next_ifd: Option<u32>,
}

impl ExifFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    pub fn ifd0(mut self, field: Field) -> Self {
        self.ifd0.push(field);
        self
    }

    pub fn exif(mut self, field: Field) -> Self {
        self.exif.push(field);
        self
    }

    pub fn gps(mut self, field: Field) -> Self {
        self.gps.push(field);
        self
    }

    pub fn ifd1(mut self, field: Field) -> Self {
        self.ifd1.push(field);
        self
    }

    /// Embed `bytes` as the JPEG thumbnail referenced from the 1st directory.
    pub fn thumbnail(mut self, bytes: Vec<u8>) -> Self {
        self.thumbnail = Some(bytes);
        self
    }

    /// Override the 0th directory's next-IFD offset.
    pub fn next_ifd(mut self, offset: u32) -> Self {
        self.next_ifd = Some(offset);
        self
    }

    fn ifd_size(&self, fields: &[Field]) -> usize {
        2 + fields.len() * 12
            + 4
            + fields
                .iter()
                .map(|f| padded_len(f.encode(self.big_endian).len()))
                .sum::<usize>()
    }

    pub fn build(mut self) -> Vec<u8> {
        let has_exif = !self.exif.is_empty();
        let has_gps = !self.gps.is_empty();
        if has_exif {
            self.ifd0.push(Field::long(0x8769, 0));
        }
        if has_gps {
            self.ifd0.push(Field::long(0x8825, 0));
        }
        if let Some(thumb) = &self.thumbnail {
            let len = thumb.len() as u32;
            self.ifd1.push(Field::long(0x0201, 0));
            self.ifd1.push(Field::long(0x0202, len));
        }
        let has_ifd1 = !self.ifd1.is_empty();

        let off0 = 8;
        let off_exif = off0 + self.ifd_size(&self.ifd0);
        let off_gps = off_exif + if has_exif { self.ifd_size(&self.exif) } else { 0 };
        let off1 = off_gps + if has_gps { self.ifd_size(&self.gps) } else { 0 };
        let off_thumb = off1 + if has_ifd1 { self.ifd_size(&self.ifd1) } else { 0 };

        for field in &mut self.ifd0 {
            match field.tag {
                0x8769 => field.payload = Payload::Long(vec![off_exif as u32]),
                0x8825 => field.payload = Payload::Long(vec![off_gps as u32]),
                _ => {}
            }
        }
        for field in &mut self.ifd1 {
            if field.tag == 0x0201 && self.thumbnail.is_some() {
                field.payload = Payload::Long(vec![off_thumb as u32]);
            }
        }

        let big = self.big_endian;
        let mut out = if big {
            b"MM\x00\x2a".to_vec()
        } else {
            b"II\x2a\x00".to_vec()
        };
        out.extend_from_slice(&u32_bytes(off0 as u32, big));

        let next0 = self
            .next_ifd
            .unwrap_or(if has_ifd1 { off1 as u32 } else { 0 });
        write_ifd(&mut out, &mut self.ifd0, next0, big);
        if has_exif {
            write_ifd(&mut out, &mut self.exif, 0, big);
        }
        if has_gps {
            write_ifd(&mut out, &mut self.gps, 0, big);
        }
        if has_ifd1 {
            write_ifd(&mut out, &mut self.ifd1, 0, big);
        }
        if let Some(thumb) = &self.thumbnail {
            out.extend_from_slice(thumb);
        }
        out
    }
}

fn write_ifd(out: &mut Vec<u8>, fields: &mut [Field], next: u32, big: bool) {
    fields.sort_by_key(|f| f.tag);
    let base = out.len();
    let data_start = base + 2 + fields.len() * 12 + 4;
    let mut data_area = Vec::new();

    out.extend_from_slice(&u16_bytes(fields.len() as u16, big));
    for field in fields.iter() {
        out.extend_from_slice(&u16_bytes(field.tag, big));
        out.extend_from_slice(&u16_bytes(field.field_type, big));
        out.extend_from_slice(&u32_bytes(field.count, big));
        let mut bytes = field.encode(big);
        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            out.extend_from_slice(&bytes);
        } else {
            let offset = (data_start + data_area.len()) as u32;
            out.extend_from_slice(&u32_bytes(offset, big));
            data_area.extend_from_slice(&bytes);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    out.extend_from_slice(&u32_bytes(next, big));
    out.extend_from_slice(&data_area);
}

/// Wrap a TIFF container in an APP1 segment directly after the SOI marker of `jpeg`.
pub fn jpeg_with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).expect("encoding fixture image");
    buf.into_inner()
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

/// PNG with a half-transparent alpha channel.
pub fn sample_rgba_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x < width / 2 { 255 } else { 64 }])
    });
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

/// JPEG carrying Make, Model, a GPS position and an embedded thumbnail.
pub fn camera_jpeg() -> Vec<u8> {
    let tiff = ExifFixture::new()
        .ifd0(Field::ascii(0x010F, "Canon"))
        .ifd0(Field::ascii(0x0110, "Canon EOS R5"))
        .ifd0(Field::ascii(0x0131, "Firmware 1.8.1"))
        .ifd0(Field::ascii(0x0132, "2024:06:01 12:30:00"))
        .exif(Field::ascii(0x9003, "2024:06:01 12:29:58"))
        .exif(Field::ascii(0x9004, "2024:06:01 12:29:58"))
        .exif(Field::long(0xA002, 64))
        .exif(Field::short(0xA003, 48))
        .gps(Field::ascii(0x0001, "N"))
        .gps(Field::rationals(0x0002, &[(40, 1), (30, 1), (0, 1)]))
        .gps(Field::ascii(0x0003, "W"))
        .gps(Field::rationals(0x0004, &[(74, 1), (0, 1), (36, 1)]))
        .thumbnail(sample_jpeg(16, 12))
        .build();
    jpeg_with_exif(&sample_jpeg(64, 48), &tiff)
}
