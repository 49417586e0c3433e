//! Baked ground map files
//!
//! The binary layout (all little-endian):
//!
//! ```text
//! header   magic u32 ('GMAP'), version u32
//! config   front_z i32, back_z i32, precision f64
//! mask     width u32, height u32, then per pixel: walkable u8, grey u8
//! vertices count u32, then per vertex: x f64, y f64, depth u8
//! edges    count u32, then per edge: source u32, target u32, boundary u8
//! stats    raw_vertices, raw_edges, vertices, boundary_edges, shortcut_edges (u32 each)
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use groundmap_common::{Error, Point, Result, VertexId};

use crate::bitmap::DepthMask;
use crate::config::GroundMapConfig;
use crate::ground_map::{BuildStats, GroundEdge, GroundGraph, GroundMap, GroundVertex};

/// Magic number for ground map files ('GMAP' in little-endian)
pub const GROUND_MAP_MAGIC: u32 = 0x5041_4D47;

/// Current ground map file version
pub const GROUND_MAP_VERSION: u32 = 1;

/// Largest bitmap accepted when reading, in pixels
const MAX_PIXELS: u64 = 1 << 28;

impl GroundMap {
    /// Writes the baked map in binary form
    pub fn write_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(GROUND_MAP_MAGIC)?;
        writer.write_u32::<LittleEndian>(GROUND_MAP_VERSION)?;

        writer.write_i32::<LittleEndian>(self.config.front_z)?;
        writer.write_i32::<LittleEndian>(self.config.back_z)?;
        writer.write_f64::<LittleEndian>(self.config.precision)?;

        writer.write_u32::<LittleEndian>(self.mask.width())?;
        writer.write_u32::<LittleEndian>(self.mask.height())?;
        for cell in self.mask.cells() {
            writer.write_u8(cell.is_some() as u8)?;
            writer.write_u8(cell.unwrap_or(0))?;
        }

        writer.write_u32::<LittleEndian>(self.graph.vertex_count() as u32)?;
        for v in self.graph.vertices() {
            let vertex = self.graph.vertex(v);
            writer.write_f64::<LittleEndian>(vertex.point.x)?;
            writer.write_f64::<LittleEndian>(vertex.point.y)?;
            writer.write_u8(vertex.depth)?;
        }

        let edges: Vec<_> = self.graph.edges().collect();
        writer.write_u32::<LittleEndian>(edges.len() as u32)?;
        for e in edges {
            let (source, target) = self.graph.endpoints(e);
            writer.write_u32::<LittleEndian>(source.index() as u32)?;
            writer.write_u32::<LittleEndian>(target.index() as u32)?;
            writer.write_u8(self.graph.edge(e).boundary as u8)?;
        }

        for count in [
            self.stats.raw_vertices,
            self.stats.raw_edges,
            self.stats.vertices,
            self.stats.boundary_edges,
            self.stats.shortcut_edges,
        ] {
            writer.write_u32::<LittleEndian>(count as u32)?;
        }
        Ok(())
    }

    /// Reads a map written by [`GroundMap::write_binary`]
    pub fn read_binary<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != GROUND_MAP_MAGIC {
            return Err(Error::DataCorrupted(format!(
                "bad magic number {magic:#010x}"
            )));
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version != GROUND_MAP_VERSION {
            return Err(Error::DataCorrupted(format!(
                "unsupported ground map version {version}"
            )));
        }

        let config = GroundMapConfig {
            front_z: reader.read_i32::<LittleEndian>()?,
            back_z: reader.read_i32::<LittleEndian>()?,
            precision: reader.read_f64::<LittleEndian>()?,
        };
        config
            .validate()
            .map_err(|e| Error::DataCorrupted(e.to_string()))?;

        let width = reader.read_u32::<LittleEndian>()?;
        let height = reader.read_u32::<LittleEndian>()?;
        let pixels = width as u64 * height as u64;
        if pixels == 0 || pixels > MAX_PIXELS {
            return Err(Error::DataCorrupted(format!(
                "invalid bitmap size {width}x{height}"
            )));
        }
        let mut cells = Vec::with_capacity(pixels as usize);
        for _ in 0..pixels {
            let walkable = reader.read_u8()?;
            let grey = reader.read_u8()?;
            cells.push((walkable != 0).then_some(grey));
        }
        let mask = DepthMask::from_cells(width, height, cells);

        let mut graph = GroundGraph::new();
        let vertex_count = reader.read_u32::<LittleEndian>()? as usize;
        for _ in 0..vertex_count {
            let x = reader.read_f64::<LittleEndian>()?;
            let y = reader.read_f64::<LittleEndian>()?;
            let depth = reader.read_u8()?;
            graph.add_vertex(GroundVertex {
                point: Point::new(x, y),
                depth,
            });
        }

        let edge_count = reader.read_u32::<LittleEndian>()? as usize;
        for _ in 0..edge_count {
            let source = reader.read_u32::<LittleEndian>()? as usize;
            let target = reader.read_u32::<LittleEndian>()? as usize;
            let boundary = reader.read_u8()? != 0;
            if source >= vertex_count || target >= vertex_count || source == target {
                return Err(Error::DataCorrupted(format!(
                    "edge ({source}, {target}) out of range for {vertex_count} vertices"
                )));
            }
            graph.add_edge(
                VertexId::new(source),
                VertexId::new(target),
                GroundEdge { boundary },
            );
        }

        let mut counts = [0usize; 5];
        for count in &mut counts {
            *count = reader.read_u32::<LittleEndian>()? as usize;
        }
        let [raw_vertices, raw_edges, vertices, boundary_edges, shortcut_edges] = counts;

        log::debug!(
            "loaded {width}x{height} ground map with {vertex_count} vertices and {edge_count} edges"
        );
        Ok(Self {
            config,
            mask,
            graph,
            stats: BuildStats {
                raw_vertices,
                raw_edges,
                vertices,
                boundary_edges,
                shortcut_edges,
            },
        })
    }

    /// Saves the baked map to a binary file
    pub fn save_to_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_binary(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a baked map from a binary file
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_binary(&mut reader)
    }

    /// Saves the baked map to a JSON file
    #[cfg(feature = "serialization")]
    pub fn save_to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a baked map from a JSON file
    #[cfg(feature = "serialization")]
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let map: GroundMap =
            serde_json::from_str(&json).map_err(|e| Error::Serialization(e.to_string()))?;

        map.config
            .validate()
            .map_err(|e| Error::DataCorrupted(e.to_string()))?;

        let (width, height) = (map.mask.width() as usize, map.mask.height() as usize);
        if map.mask.cells().len() != width * height || width == 0 {
            return Err(Error::DataCorrupted(format!(
                "mask holds {} cells for {width}x{height}",
                map.mask.cells().len()
            )));
        }
        if !map.graph.validity() {
            return Err(Error::DataCorrupted(
                "dangling or inconsistent graph handles".to_string(),
            ));
        }
        Ok(map)
    }
}
