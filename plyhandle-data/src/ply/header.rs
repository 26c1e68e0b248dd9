//! PLY header reading and the index-addressable element model built from it.

use super::property::PropertyType;
use crate::error::PlyError;
use ply_rs::parser::Parser;
use ply_rs::ply::{self, DefaultElement, ElementDef, Encoding};
use std::io::{BufRead, Cursor};
use tracing::debug;

/// Sentinel returned by property lookups that found nothing.
pub const INVALID_INDEX: u32 = u32::MAX;

/// Payload encoding declared on the `format` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Ascii,
    Binary,
    BinaryBigEndian,
}

impl From<&Encoding> for FileType {
    fn from(encoding: &Encoding) -> Self {
        match encoding {
            Encoding::Ascii => FileType::Ascii,
            Encoding::BinaryLittleEndian => FileType::Binary,
            Encoding::BinaryBigEndian => FileType::BinaryBigEndian,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlyProperty {
    pub name: String,
    pub value_type: PropertyType,
    /// Type of the per-row count for list properties.
    pub count_type: Option<PropertyType>,
}

impl PlyProperty {
    fn from_def(def: &ply::PropertyDef) -> Self {
        let (value_type, count_type) = match &def.data_type {
            ply::PropertyType::Scalar(scalar) => (scalar.into(), None),
            ply::PropertyType::List(count, value) => (value.into(), Some(count.into())),
        };
        Self {
            name: def.name.clone(),
            value_type,
            count_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.count_type.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PlyElement {
    pub name: String,
    pub count: u32,
    pub properties: Vec<PlyProperty>,
}

impl PlyElement {
    fn from_def(def: &ElementDef) -> Self {
        Self {
            name: def.name.clone(),
            count: def.count as u32,
            properties: def.properties.values().map(PlyProperty::from_def).collect(),
        }
    }

    pub fn find_property(&self, name: &str) -> u32 {
        self.properties
            .iter()
            .position(|p| p.name == name)
            .map_or(INVALID_INDEX, |i| i as u32)
    }

    /// Bytes per row in a binary payload, or `None` when rows hold lists.
    pub(crate) fn binary_row_size(&self) -> Option<usize> {
        self.properties
            .iter()
            .map(|p| (!p.is_list()).then(|| p.value_type.size()))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub file_type: FileType,
    pub version: String,
    /// `comment` and `obj_info` lines, in that order.
    pub comments: Vec<String>,
    pub elements: Vec<PlyElement>,
}

impl PlyHeader {
    fn from_ply(header: &ply::Header) -> Self {
        Self {
            file_type: (&header.encoding).into(),
            version: format!("{}.{}", header.version.major, header.version.minor),
            comments: header
                .comments
                .iter()
                .chain(header.obj_infos.iter())
                .map(|c| c.trim().to_owned())
                .collect(),
            elements: header.elements.values().map(PlyElement::from_def).collect(),
        }
    }
}

/// Read header lines up to and including `end_header`, leaving `source` at the payload.
///
/// Lines are decoded lossily, so stray non-UTF-8 bytes in comments do not
/// reject an otherwise valid file. Returns the parser's header alongside the
/// indexed model; payload decoding needs the former.
pub(crate) fn read_header<R: BufRead>(
    source: &mut R,
    parser: &Parser<DefaultElement>,
) -> Result<(ply::Header, PlyHeader), PlyError> {
    let mut text = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if source.read_until(b'\n', &mut line)? == 0 {
            return Err(if text.is_empty() {
                PlyError::MissingMagic
            } else {
                PlyError::MissingEndHeader
            });
        }

        let decoded = String::from_utf8_lossy(&line);
        let trimmed = decoded.trim();
        if text.is_empty() && trimmed != "ply" {
            return Err(PlyError::MissingMagic);
        }
        if trimmed.is_empty() {
            continue;
        }

        text.push_str(trimmed);
        text.push('\n');
        if trimmed == "end_header" {
            break;
        }
    }

    let header = parser
        .read_header(&mut Cursor::new(text.as_bytes()))
        .map_err(PlyError::InvalidHeader)?;
    let model = PlyHeader::from_ply(&header);

    debug!(
        "PLY header parsed: {:?} {}, {} elements",
        model.file_type,
        model.version,
        model.elements.len()
    );

    Ok((header, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn parse(bytes: &[u8]) -> Result<PlyHeader, PlyError> {
        read_header(&mut Cursor::new(bytes), &Parser::new()).map(|(_, model)| model)
    }

    #[test]
    fn test_parse_header_layout() {
        let header = parse(
            b"ply\nformat binary_little_endian 1.0\ncomment made by hand\n\
              element vertex 8\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\n\
              element face 6\nproperty list uchar int vertex_indices\nend_header\n",
        )
        .unwrap();

        assert_eq!(header.file_type, FileType::Binary);
        assert_eq!(header.version, "1.0");
        assert_eq!(header.comments, vec!["made by hand".to_string()]);
        assert_eq!(header.elements.len(), 2);

        let vertex = &header.elements[0];
        assert_eq!(vertex.count, 8);
        assert_eq!(vertex.binary_row_size(), Some(13));
        assert_eq!(vertex.find_property("z"), 2);
        assert_eq!(vertex.find_property("w"), INVALID_INDEX);
        assert_eq!(vertex.properties[3].value_type, PropertyType::UChar);

        let face = &header.elements[1];
        assert_eq!(face.binary_row_size(), None);
        assert_eq!(face.properties[0].count_type, Some(PropertyType::UChar));
        assert_eq!(face.properties[0].value_type, PropertyType::Int);
    }

    #[test]
    fn test_header_leaves_reader_at_payload() {
        let mut cursor = Cursor::new(b"ply\r\nformat ascii 1.0\r\nelement v 1\r\nproperty int a\r\nend_header\r\n7\n".to_vec());
        let (_, header) = read_header(&mut cursor, &Parser::new()).unwrap();
        assert_eq!(header.file_type, FileType::Ascii);
        assert_eq!(header.elements[0].name, "v");

        let mut rest = String::new();
        cursor.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "7\n");
    }

    #[test]
    fn test_non_utf8_comment_is_accepted() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\ncomment author M".to_vec();
        bytes.push(0xfc);
        bytes.extend_from_slice(b"ller\nelement vertex 1\nproperty float x\nend_header\n");
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let header = parse(&bytes).unwrap();
        assert_eq!(header.elements[0].count, 1);
        assert!(header.comments[0].starts_with("author M"));
        assert!(header.comments[0].contains('\u{FFFD}'));
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(parse(b"plx\n"), Err(PlyError::MissingMagic)));
        assert!(matches!(parse(b""), Err(PlyError::MissingMagic)));
        assert!(matches!(
            parse(b"ply\nformat ascii 1.0\nelement vertex 1\n"),
            Err(PlyError::MissingEndHeader)
        ));
        assert!(matches!(
            parse(b"ply\nformat binary_middle_endian 1.0\nend_header\n"),
            Err(PlyError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse(b"ply\nformat ascii 1.0\nelement vertex many\nend_header\n"),
            Err(PlyError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse(b"ply\nformat ascii 1.0\nelement vertex 1\nproperty quad x\nend_header\n"),
            Err(PlyError::InvalidHeader(_))
        ));
    }
}
