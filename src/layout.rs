use serde::Serialize;

/// Numeric type of a single packed field, as stored on disk (native byte order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    U16,
    U32,
    F32,
}

impl FieldType {
    pub const fn size(&self) -> usize {
        match self {
            FieldType::U16 => 2,
            FieldType::U32 | FieldType::F32 => 4,
        }
    }
}

/// Describes one field of a packed record, similar to a PointCloud2 `PointField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PointField {
    pub name: &'static str,
    pub offset: usize,
    pub datatype: FieldType,
}

impl PointField {
    pub const fn new(name: &'static str, offset: usize, datatype: FieldType) -> Self {
        Self {
            name,
            offset,
            datatype,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.datatype.size()
    }
}

/// Packed size of a record: no padding between or after fields
pub const fn record_size(fields: &[PointField]) -> usize {
    let mut size = 0;
    let mut i = 0;
    while i < fields.len() {
        size += fields[i].datatype.size();
        i += 1;
    }
    size
}

/// Field containing `byte_offset` (relative to the start of a record).
/// Offsets past the last field map to the last field.
pub fn field_at(fields: &'static [PointField], byte_offset: usize) -> &'static PointField {
    fields
        .iter()
        .find(|f| byte_offset < f.end())
        .or_else(|| fields.last())
        .expect("Record layouts always contain at least one field")
}
