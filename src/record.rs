use bytemuck::Pod;

use crate::{record_size, FieldType, PointField};

/// A record which has a fixed, packed on-disk representation.
///
/// The in-memory struct may contain padding (e.g. `SphericalRecord` is 20 bytes with `repr(C)`),
/// so encoding and decoding always go field by field along `FIELDS`.
pub trait WireRecord: Copy + Default {
    const FIELDS: &'static [PointField];
    const SIZE: usize;

    /// `bytes` has to be exactly `Self::SIZE` long
    fn decode(bytes: &[u8]) -> Self;
    fn encode(&self, out: &mut Vec<u8>);
}

/// Measurement in the sensor frame, as written by the scanner
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SphericalRecord {
    pub scan_number: u32,
    /// Azimuth in degrees
    pub x_angle_deg: f32,
    /// Polar angle in degrees, measured from the y-axis
    pub y_angle_deg: f32,
    pub distance_m: f32,
    pub intensity: u16,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CartesianPoint {
    pub scan_number: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: u16,
}

impl WireRecord for SphericalRecord {
    const FIELDS: &'static [PointField] = &[
        PointField::new("scan_number", 0, FieldType::U32),
        PointField::new("x_angle_deg", 4, FieldType::F32),
        PointField::new("y_angle_deg", 8, FieldType::F32),
        PointField::new("distance_m", 12, FieldType::F32),
        PointField::new("intensity", 16, FieldType::U16),
    ];
    const SIZE: usize = record_size(Self::FIELDS);

    fn decode(bytes: &[u8]) -> Self {
        let mut fields = FieldReader::new(Self::FIELDS, bytes);
        Self {
            scan_number: fields.next(),
            x_angle_deg: fields.next(),
            y_angle_deg: fields.next(),
            distance_m: fields.next(),
            intensity: fields.next(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut fields = FieldWriter::new(Self::FIELDS, out);
        fields.push(self.scan_number);
        fields.push(self.x_angle_deg);
        fields.push(self.y_angle_deg);
        fields.push(self.distance_m);
        fields.push(self.intensity);
    }
}

impl WireRecord for CartesianPoint {
    const FIELDS: &'static [PointField] = &[
        PointField::new("scan_number", 0, FieldType::U32),
        PointField::new("x", 4, FieldType::F32),
        PointField::new("y", 8, FieldType::F32),
        PointField::new("z", 12, FieldType::F32),
        PointField::new("intensity", 16, FieldType::U16),
    ];
    const SIZE: usize = record_size(Self::FIELDS);

    fn decode(bytes: &[u8]) -> Self {
        let mut fields = FieldReader::new(Self::FIELDS, bytes);
        Self {
            scan_number: fields.next(),
            x: fields.next(),
            y: fields.next(),
            z: fields.next(),
            intensity: fields.next(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut fields = FieldWriter::new(Self::FIELDS, out);
        fields.push(self.scan_number);
        fields.push(self.x);
        fields.push(self.y);
        fields.push(self.z);
        fields.push(self.intensity);
    }
}

struct FieldReader<'a> {
    fields: std::slice::Iter<'static, PointField>,
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new(fields: &'static [PointField], bytes: &'a [u8]) -> Self {
        debug_assert_eq!(record_size(fields), bytes.len());
        Self {
            fields: fields.iter(),
            bytes,
        }
    }

    fn next<T: Pod>(&mut self) -> T {
        let field = self
            .fields
            .next()
            .expect("Decoder reads more fields than declared");
        debug_assert_eq!(field.datatype.size(), std::mem::size_of::<T>());
        bytemuck::pod_read_unaligned(&self.bytes[field.offset..field.end()])
    }
}

struct FieldWriter<'a> {
    fields: std::slice::Iter<'static, PointField>,
    out: &'a mut Vec<u8>,
}

impl<'a> FieldWriter<'a> {
    fn new(fields: &'static [PointField], out: &'a mut Vec<u8>) -> Self {
        Self {
            fields: fields.iter(),
            out,
        }
    }

    fn push<T: Pod>(&mut self, value: T) {
        let field = self
            .fields
            .next()
            .expect("Encoder writes more fields than declared");
        debug_assert_eq!(field.datatype.size(), std::mem::size_of::<T>());
        self.out.extend_from_slice(bytemuck::bytes_of(&value));
    }
}
