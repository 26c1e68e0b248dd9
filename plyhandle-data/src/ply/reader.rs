//! Element-cursor PLY reader.
//!
//! A [`PlyReader`] walks the elements of a PLY file in header order. The
//! current element can be loaded into memory with [`PlyReader::load_element`],
//! after which its properties can be extracted into caller buffers converted
//! to any [`PropertyType`]. [`PlyReader::next_element`] moves on, skipping the
//! payload of elements that were never loaded.

use super::header::{FileType, INVALID_INDEX, PlyElement, PlyHeader, PlyProperty, read_header};
use super::property::{PlyScalar, PropertyType, Scalar, push_list_items};
use crate::error::PlyError;
use crate::triangulation::triangulate_polygon;
use glam::Vec3;
use ply_rs::parser::Parser;
use ply_rs::ply::{self, DefaultElement};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

const TEXCOORD_NAMES: [[&str; 2]; 4] = [
    ["u", "v"],
    ["s", "t"],
    ["texture_u", "texture_v"],
    ["texture_s", "texture_t"],
];

/// Values of one property across every row of the loaded element.
enum Column {
    Scalar(Vec<Scalar>),
    List { items: Vec<Scalar>, counts: Vec<u32> },
}

pub struct PlyReader<R> {
    source: R,
    parser: Parser<DefaultElement>,
    ply_header: ply::Header,
    header: PlyHeader,
    current: usize,
    loaded: bool,
    valid: bool,
    /// Columns of the loaded element, indexed like its properties.
    columns: Vec<Column>,
}

impl PlyReader<BufReader<File>> {
    /// Open a PLY file and parse its header.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PlyError> {
        debug!("Opening PLY file");
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> PlyReader<R> {
    /// Parse the header from `source`, leaving the cursor on the first element.
    pub fn from_reader(mut source: R) -> Result<Self, PlyError> {
        let parser = Parser::<DefaultElement>::new();
        let (ply_header, header) = read_header(&mut source, &parser)?;
        Ok(Self {
            source,
            parser,
            ply_header,
            header,
            current: 0,
            loaded: false,
            valid: true,
            columns: Vec::new(),
        })
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    pub fn file_type(&self) -> FileType {
        self.header.file_type
    }

    pub fn num_elements(&self) -> u32 {
        self.header.elements.len() as u32
    }

    /// False once a payload decode has failed.
    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn has_element(&self) -> bool {
        self.valid && self.current < self.header.elements.len()
    }

    /// The element under the cursor.
    pub fn element(&self) -> Option<&PlyElement> {
        if self.has_element() {
            self.header.elements.get(self.current)
        } else {
            None
        }
    }

    pub fn element_is(&self, name: &str) -> bool {
        self.element().is_some_and(|e| e.name == name)
    }

    pub fn num_rows(&self) -> u32 {
        self.element().map_or(0, |e| e.count)
    }

    /// Decode the current element into memory. Loading twice is a no-op.
    pub fn load_element(&mut self) -> bool {
        if !self.has_element() {
            return false;
        }
        if self.loaded {
            return true;
        }

        match self.decode_current() {
            Ok(()) => {
                self.loaded = true;
                true
            }
            Err(err) => {
                warn!("Failed to load PLY element: {}", err);
                self.valid = false;
                false
            }
        }
    }

    /// Move to the next element, skipping the current payload if it was not loaded.
    pub fn next_element(&mut self) {
        if !self.has_element() {
            return;
        }

        if !self.loaded {
            if let Err(err) = self.skip_current() {
                warn!("Failed to skip PLY element: {}", err);
                self.valid = false;
            }
        }

        self.columns = Vec::new();
        self.current += 1;
        self.loaded = false;
    }

    pub fn find_property(&self, name: &str) -> u32 {
        self.element().map_or(INVALID_INDEX, |e| e.find_property(name))
    }

    /// Look up every name in `names`; succeeds only if all of them exist.
    ///
    /// Indices are written to `prop_idxs` only on success.
    pub fn find_properties(&self, prop_idxs: &mut [u32], names: &[&str]) -> bool {
        let Some(element) = self.element() else {
            return false;
        };
        if prop_idxs.len() < names.len() {
            return false;
        }

        let mut found = Vec::with_capacity(names.len());
        for name in names {
            let idx = element.find_property(name);
            if idx == INVALID_INDEX {
                return false;
            }
            found.push(idx);
        }
        prop_idxs[..found.len()].copy_from_slice(&found);
        true
    }

    pub fn find_pos(&self, prop_idxs: &mut [u32]) -> bool {
        self.find_properties(prop_idxs, &["x", "y", "z"])
    }

    pub fn find_normal(&self, prop_idxs: &mut [u32]) -> bool {
        self.find_properties(prop_idxs, &["nx", "ny", "nz"])
    }

    pub fn find_texcoord(&self, prop_idxs: &mut [u32]) -> bool {
        TEXCOORD_NAMES
            .iter()
            .any(|names| self.find_properties(prop_idxs, names))
    }

    pub fn find_color(&self, prop_idxs: &mut [u32]) -> bool {
        self.find_properties(prop_idxs, &["red", "green", "blue"])
    }

    pub fn find_indices(&self, prop_idxs: &mut [u32]) -> bool {
        self.find_properties(prop_idxs, &["vertex_indices"])
            || self.find_properties(prop_idxs, &["vertex_index"])
    }

    fn loaded_element(&self) -> Option<&PlyElement> {
        if self.loaded { self.element() } else { None }
    }

    /// Number of bytes [`Self::extract_properties`] writes for `num_props` properties.
    pub fn properties_byte_len(&self, num_props: usize, dest_type: PropertyType) -> usize {
        self.num_rows() as usize * num_props * dest_type.size()
    }

    /// Copy scalar properties of every row into `dest`, row-major, converted to `dest_type`.
    pub fn extract_properties(
        &self,
        prop_idxs: &[u32],
        dest_type: PropertyType,
        dest: &mut [u8],
    ) -> bool {
        let Some(element) = self.loaded_element() else {
            return false;
        };
        if prop_idxs.is_empty() || dest_type == PropertyType::None {
            return false;
        }

        let mut columns = Vec::with_capacity(prop_idxs.len());
        for &idx in prop_idxs {
            match self.columns.get(idx as usize) {
                Some(Column::Scalar(values)) => columns.push(values.as_slice()),
                _ => return false,
            }
        }

        if dest.len() < self.properties_byte_len(columns.len(), dest_type) {
            warn!("Destination buffer too small for {} properties", columns.len());
            return false;
        }

        let mut out = dest.chunks_exact_mut(dest_type.size());
        for row in 0..element.count as usize {
            for values in columns.iter() {
                let (Some(&value), Some(slot)) = (values.get(row), out.next()) else {
                    return false;
                };
                dest_type.write(value, slot);
            }
        }
        true
    }

    /// Typed variant of [`Self::extract_properties`].
    pub fn extract_properties_into<T: PlyScalar>(&self, prop_idxs: &[u32], dest: &mut [T]) -> bool {
        self.extract_properties(prop_idxs, T::TYPE, bytemuck::cast_slice_mut(dest))
    }

    fn loaded_list(&self, prop_idx: u32) -> Option<(&PlyProperty, &[Scalar], &[u32])> {
        let property = self.loaded_element()?.properties.get(prop_idx as usize)?;
        match self.columns.get(prop_idx as usize)? {
            Column::List { items, counts } => Some((property, items.as_slice(), counts.as_slice())),
            Column::Scalar(_) => None,
        }
    }

    /// Per-row item counts of a loaded list property.
    pub fn list_counts(&self, prop_idx: u32) -> Option<&[u32]> {
        self.loaded_list(prop_idx).map(|(_, _, counts)| counts)
    }

    pub fn sum_of_list_counts(&self, prop_idx: u32) -> u32 {
        self.loaded_list(prop_idx).map_or(0, |(_, items, _)| items.len() as u32)
    }

    pub fn list_byte_len(&self, prop_idx: u32, dest_type: PropertyType) -> usize {
        self.sum_of_list_counts(prop_idx) as usize * dest_type.size()
    }

    /// Copy every item of a list property into `dest`, converted to `dest_type`.
    pub fn extract_list_property(&self, prop_idx: u32, dest_type: PropertyType, dest: &mut [u8]) -> bool {
        let Some((property, items, _)) = self.loaded_list(prop_idx) else {
            return false;
        };
        if dest_type == PropertyType::None {
            return false;
        }
        if dest.len() < self.list_byte_len(prop_idx, dest_type) {
            warn!("Destination buffer too small for list property '{}'", property.name);
            return false;
        }

        for (&value, slot) in items.iter().zip(dest.chunks_exact_mut(dest_type.size())) {
            dest_type.write(value, slot);
        }
        true
    }

    /// Typed variant of [`Self::extract_list_property`].
    pub fn extract_list_property_into<T: PlyScalar>(&self, prop_idx: u32, dest: &mut [T]) -> bool {
        self.extract_list_property(prop_idx, T::TYPE, bytemuck::cast_slice_mut(dest))
    }

    /// True when some row of the list property is not a triangle.
    pub fn requires_triangulation(&self, prop_idx: u32) -> bool {
        self.list_counts(prop_idx)
            .is_some_and(|counts| counts.iter().any(|&c| c != 3))
    }

    /// Triangles produced by splitting every row with at least three items.
    pub fn num_triangles(&self, prop_idx: u32) -> u32 {
        self.list_counts(prop_idx)
            .map_or(0, |counts| counts.iter().map(|&c| c.saturating_sub(2)).sum())
    }

    pub fn triangles_byte_len(&self, prop_idx: u32, dest_type: PropertyType) -> usize {
        self.num_triangles(prop_idx) as usize * 3 * dest_type.size()
    }

    /// Write triangle vertex indices for a face list property.
    ///
    /// `positions` holds `num_verts` xyz triples and is only read when some
    /// face needs triangulation. Indices outside `0..num_verts` fail the call.
    pub fn extract_triangles(
        &self,
        prop_idx: u32,
        positions: &[f32],
        num_verts: u32,
        dest_type: PropertyType,
        dest: &mut [u8],
    ) -> bool {
        if !self.requires_triangulation(prop_idx) {
            return self.extract_list_property(prop_idx, dest_type, dest);
        }
        let Some((_, items, counts)) = self.loaded_list(prop_idx) else {
            return false;
        };
        if !dest_type.is_integer() {
            warn!("Triangle indices need an integer destination, got {:?}", dest_type);
            return false;
        }
        if positions.len() < num_verts as usize * 3 {
            warn!("Position buffer shorter than {} vertices", num_verts);
            return false;
        }
        if dest.len() < self.triangles_byte_len(prop_idx, dest_type) {
            warn!("Destination buffer too small for {} triangles", self.num_triangles(prop_idx));
            return false;
        }

        let vertices: Vec<Vec3> = positions[..num_verts as usize * 3]
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();

        let mut items = items.iter();
        let mut polygon = Vec::new();
        let mut triangles = Vec::new();
        let mut out = dest.chunks_exact_mut(dest_type.size());

        for &count in counts {
            polygon.clear();
            for item in items.by_ref().take(count as usize) {
                let index = item.as_i64();
                if index < 0 || index >= num_verts as i64 {
                    warn!("Face index {} out of range for {} vertices", index, num_verts);
                    return false;
                }
                polygon.push(index as u32);
            }

            triangles.clear();
            triangulate_polygon(&polygon, &vertices, &mut triangles);
            for index in triangles.iter().flatten() {
                let Some(slot) = out.next() else {
                    return false;
                };
                dest_type.write(Scalar::Int(*index as i64), slot);
            }
        }
        true
    }

    /// Typed variant of [`Self::extract_triangles`].
    pub fn extract_triangles_into<T: PlyScalar>(
        &self,
        prop_idx: u32,
        positions: &[f32],
        num_verts: u32,
        dest: &mut [T],
    ) -> bool {
        self.extract_triangles(prop_idx, positions, num_verts, T::TYPE, bytemuck::cast_slice_mut(dest))
    }

    fn decode_current(&mut self) -> Result<(), PlyError> {
        let element = &self.header.elements[self.current];
        debug!("Loading element '{}' ({} rows)", element.name, element.count);

        let rows = read_rows(&mut self.source, &self.parser, &self.ply_header, element)?;
        self.columns = collect_columns(element, &rows)?;
        Ok(())
    }

    fn skip_current(&mut self) -> Result<(), PlyError> {
        let element = &self.header.elements[self.current];
        let row_size = match self.header.file_type {
            FileType::Ascii => None,
            _ => element.binary_row_size(),
        };

        if let Some(row_size) = row_size {
            let len = element.count as u64 * row_size as u64;
            let skipped = io::copy(&mut self.source.by_ref().take(len), &mut io::sink())?;
            if skipped != len {
                return Err(PlyError::Payload {
                    element: element.name.clone(),
                    source: io::ErrorKind::UnexpectedEof.into(),
                });
            }
            debug!("Skipped element '{}' ({} bytes)", element.name, len);
            return Ok(());
        }

        // Rows with lists or text have to be parsed to find where they end.
        read_rows(&mut self.source, &self.parser, &self.ply_header, element).map(drop)
    }
}

/// Decode every row of `element` from the payload under `source`.
fn read_rows<R: BufRead>(
    source: &mut R,
    parser: &Parser<DefaultElement>,
    ply_header: &ply::Header,
    element: &PlyElement,
) -> Result<Vec<DefaultElement>, PlyError> {
    let payload_error = |source: io::Error| PlyError::Payload {
        element: element.name.clone(),
        source,
    };
    let def = ply_header
        .elements
        .get(element.name.as_str())
        .ok_or_else(|| payload_error(io::ErrorKind::NotFound.into()))?;
    parser
        .read_payload_for_element(source, def, ply_header)
        .map_err(payload_error)
}

/// Transpose decoded rows into one column per property, in header order.
fn collect_columns(element: &PlyElement, rows: &[DefaultElement]) -> Result<Vec<Column>, PlyError> {
    let missing = |property: &PlyProperty| PlyError::MissingValue {
        element: element.name.clone(),
        property: property.name.clone(),
    };

    let mut columns = Vec::with_capacity(element.properties.len());
    for property in element.properties.iter() {
        let values = rows.iter().map(|row| row.get(property.name.as_str()));

        let Some(count_type) = property.count_type else {
            let column = values
                .map(|value| value.and_then(Scalar::from_property).ok_or_else(|| missing(property)))
                .collect::<Result<Vec<_>, _>>()?;
            columns.push(Column::Scalar(column));
            continue;
        };

        let mut items = Vec::new();
        let mut counts = Vec::with_capacity(rows.len());
        for value in values {
            let count = value
                .and_then(|value| push_list_items(value, &mut items))
                .ok_or_else(|| missing(property))?;
            if !count_type.holds(count as i64) {
                return Err(PlyError::ListCountOutOfRange {
                    element: element.name.clone(),
                    property: property.name.clone(),
                    count,
                });
            }
            counts.push(count as u32);
        }
        columns.push(Column::List { items, counts });
    }
    Ok(columns)
}
