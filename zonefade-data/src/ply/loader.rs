//! PLY file loading functions

use crate::error::DataError;
use crate::ply::PlyVertex;
use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

/// Zeroth-order spherical harmonic basis constant.
const SH_C0: f32 = 0.282_094_8;

// Only the vertex element matters for splats; faces and other elements are ignored.
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
}

/// Load splat vertices from a PLY file.
///
/// Colors are read from `red/green/blue`, `r/g/b` or the spherical harmonic DC
/// terms `f_dc_0..2` written by Gaussian splat exporters. Opacity values outside
/// `[0, 1]` are treated as logits.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_vertices_from_ply(path: &Path) -> Result<Vec<PlyVertex>, DataError> {
    debug!("Loading PLY vertices from: {}", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        DataError::Parse(e.to_string())
    })?;

    info!("PLY file parsed: {} vertices", ply_data.vertex.len());

    let vertices = ply_data
        .vertex
        .iter()
        .enumerate()
        .map(|(i, properties)| vertex_from_properties(properties, i))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Loaded {} vertices from PLY file", vertices.len());
    Ok(vertices)
}

/// Convert one parsed PLY vertex record into a [`PlyVertex`].
pub fn vertex_from_properties(
    vertex: &HashMap<String, JsonValue>,
    index: usize,
) -> Result<PlyVertex, DataError> {
    let coordinate = |property: &'static str| {
        get_f32(vertex.get(property)).ok_or(DataError::MissingProperty { property, index })
    };
    let position = Vec3::new(coordinate("x")?, coordinate("y")?, coordinate("z")?);

    let color = if let (Some(r), Some(g), Some(b)) = (
        get_u8(vertex.get("red")),
        get_u8(vertex.get("green")),
        get_u8(vertex.get("blue")),
    ) {
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    } else if let (Some(r), Some(g), Some(b)) = (
        get_u8(vertex.get("r")),
        get_u8(vertex.get("g")),
        get_u8(vertex.get("b")),
    ) {
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    } else if let (Some(r), Some(g), Some(b)) = (
        get_f32(vertex.get("f_dc_0")),
        get_f32(vertex.get("f_dc_1")),
        get_f32(vertex.get("f_dc_2")),
    ) {
        (Vec3::splat(0.5) + Vec3::new(r, g, b) * SH_C0).clamp(Vec3::ZERO, Vec3::ONE)
    } else {
        Vec3::splat(0.8)
    };

    let raw_opacity = get_f32(vertex.get("opacity"))
        .or_else(|| get_f32(vertex.get("alpha")))
        .unwrap_or(1.0);

    Ok(PlyVertex {
        position,
        color,
        opacity: decode_opacity(raw_opacity),
    })
}

fn decode_opacity(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        (1.0 / (1.0 + (-raw).exp())).clamp(0.0, 1.0)
    }
}

fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    })
}

fn get_u8(prop: Option<&JsonValue>) -> Option<u8> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|u| u8::try_from(u).ok())
            .or_else(|| n.as_i64().and_then(|i| u8::try_from(i).ok())),
        _ => None,
    })
}
