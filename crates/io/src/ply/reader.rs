use super::header::{parse_header, Element, PropertyKind, ScalarType};
use super::PlyEncoding;
use cloudclean_core::{CloudError, Colors, PointCloud, Result};
use std::fs;
use std::path::Path;
use std::str::SplitAsciiWhitespace;
use tracing::debug;

/// What a vertex property is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Axis(usize),
    Channel(usize),
    Ignore,
}

/// Sequential reader over the PLY body, ASCII tokens or binary bytes.
enum Body<'a> {
    Ascii(SplitAsciiWhitespace<'a>),
    Binary {
        data: &'a [u8],
        pos: usize,
        big_endian: bool,
    },
}

macro_rules! decode {
    ($bytes:expr, $big:expr, $ty:ty) => {{
        let b = $bytes;
        if $big {
            <$ty>::from_be_bytes(b)
        } else {
            <$ty>::from_le_bytes(b)
        }
    }};
}

impl<'a> Body<'a> {
    fn new(encoding: PlyEncoding, body: &'a [u8]) -> Result<Self> {
        Ok(match encoding {
            PlyEncoding::Ascii => {
                let text = std::str::from_utf8(body)
                    .map_err(|_| CloudError::format("PLY body not valid UTF-8"))?;
                Body::Ascii(text.split_ascii_whitespace())
            }
            PlyEncoding::BinaryLittleEndian => Body::Binary {
                data: body,
                pos: 0,
                big_endian: false,
            },
            PlyEncoding::BinaryBigEndian => Body::Binary {
                data: body,
                pos: 0,
                big_endian: true,
            },
        })
    }

    fn token(iter: &mut SplitAsciiWhitespace<'a>) -> Result<&'a str> {
        iter.next()
            .ok_or_else(|| CloudError::format("PLY body ended before all elements were read"))
    }

    fn take<const N: usize>(data: &[u8], pos: &mut usize) -> Result<[u8; N]> {
        let end = *pos + N;
        let bytes = data.get(*pos..end).ok_or_else(|| {
            CloudError::format(format!(
                "PLY binary body too short: need {} bytes, got {}",
                end,
                data.len()
            ))
        })?;
        *pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_f64(&mut self, ty: ScalarType) -> Result<f64> {
        match self {
            Body::Ascii(tokens) => {
                let tok = Self::token(tokens)?;
                let parsed = if ty.is_integer() {
                    tok.parse::<i64>().map(|v| v as f64).map_err(|e| e.to_string())
                } else {
                    tok.parse::<f64>().map_err(|e| e.to_string())
                };
                parsed.map_err(|e| {
                    CloudError::format(format!("failed to parse {:?} value {:?}: {}", ty, tok, e))
                })
            }
            Body::Binary {
                data,
                pos,
                big_endian,
            } => {
                let big = *big_endian;
                Ok(match ty {
                    ScalarType::Char => decode!(Self::take::<1>(data, pos)?, big, i8) as f64,
                    ScalarType::Uchar => decode!(Self::take::<1>(data, pos)?, big, u8) as f64,
                    ScalarType::Short => decode!(Self::take::<2>(data, pos)?, big, i16) as f64,
                    ScalarType::Ushort => decode!(Self::take::<2>(data, pos)?, big, u16) as f64,
                    ScalarType::Int => decode!(Self::take::<4>(data, pos)?, big, i32) as f64,
                    ScalarType::Uint => decode!(Self::take::<4>(data, pos)?, big, u32) as f64,
                    ScalarType::Float => decode!(Self::take::<4>(data, pos)?, big, f32) as f64,
                    ScalarType::Double => decode!(Self::take::<8>(data, pos)?, big, f64),
                })
            }
        }
    }

    /// Read a coordinate. `float` values are parsed straight to `f32` so that
    /// ASCII text round-trips bit-exactly.
    fn read_f32(&mut self, ty: ScalarType) -> Result<f32> {
        if ty == ScalarType::Float {
            if let Body::Ascii(tokens) = self {
                let tok = Self::token(tokens)?;
                return tok.parse::<f32>().map_err(|e| {
                    CloudError::format(format!("failed to parse float {:?}: {}", tok, e))
                });
            }
        }
        Ok(self.read_f64(ty)? as f32)
    }

    fn read_u8(&mut self) -> Result<u8> {
        match self {
            Body::Ascii(tokens) => {
                let tok = Self::token(tokens)?;
                tok.parse::<u8>().map_err(|e| {
                    CloudError::format(format!("failed to parse color byte {:?}: {}", tok, e))
                })
            }
            Body::Binary { data, pos, .. } => Ok(Self::take::<1>(data, pos)?[0]),
        }
    }

    fn read_count(&mut self, ty: ScalarType) -> Result<usize> {
        let v = self.read_f64(ty)?;
        if v < 0.0 {
            return Err(CloudError::format(format!("negative list length {}", v)));
        }
        Ok(v as usize)
    }

    fn skip(&mut self, ty: ScalarType) -> Result<()> {
        match self {
            Body::Ascii(tokens) => Self::token(tokens).map(|_| ()),
            Body::Binary { data, pos, .. } => {
                let end = *pos + ty.byte_size();
                if end > data.len() {
                    return Err(CloudError::format(format!(
                        "PLY binary body too short: need {} bytes, got {}",
                        end,
                        data.len()
                    )));
                }
                *pos = end;
                Ok(())
            }
        }
    }

    fn skip_property(&mut self, kind: PropertyKind) -> Result<()> {
        match kind {
            PropertyKind::Scalar(ty) => self.skip(ty),
            PropertyKind::List { count, item } => {
                let n = self.read_count(count)?;
                for _ in 0..n {
                    self.skip(item)?;
                }
                Ok(())
            }
        }
    }

    fn skip_element(&mut self, element: &Element) -> Result<()> {
        if element.properties.is_empty() {
            return Ok(());
        }
        for _ in 0..element.count {
            for prop in &element.properties {
                self.skip_property(prop.kind)?;
            }
        }
        Ok(())
    }
}

fn vertex_roles(vertex: &Element) -> Result<(Vec<Role>, bool)> {
    let mut roles = vec![Role::Ignore; vertex.properties.len()];

    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        let (idx, prop) = vertex.property(name).ok_or_else(|| {
            CloudError::format("PLY file missing required x, y, z properties")
        })?;
        if !matches!(prop.kind, PropertyKind::Scalar(_)) {
            return Err(CloudError::format(format!(
                "vertex property {} must be a scalar",
                name
            )));
        }
        roles[idx] = Role::Axis(axis);
    }

    let channels: Vec<_> = ["red", "green", "blue"]
        .into_iter()
        .filter_map(|name| vertex.property(name))
        .collect();
    let has_colors = channels.len() == 3;
    if has_colors {
        for (channel, (idx, prop)) in channels.into_iter().enumerate() {
            if prop.kind != PropertyKind::Scalar(ScalarType::Uchar) {
                return Err(CloudError::format(format!(
                    "color property {} must be uchar, found {:?}",
                    prop.name, prop.kind
                )));
            }
            roles[idx] = Role::Channel(channel);
        }
    }

    Ok((roles, has_colors))
}

/// Reject a vertex count the body cannot possibly hold, before anything is
/// allocated for it.
fn check_vertex_count(vertex: &Element, encoding: PlyEncoding, body_len: usize) -> Result<()> {
    let needed = match encoding {
        // Every value is at least one character plus a separator.
        PlyEncoding::Ascii => vertex
            .count
            .checked_mul(vertex.properties.len())
            .and_then(|tokens| tokens.checked_mul(2))
            .map(|bytes| bytes.saturating_sub(1)),
        PlyEncoding::BinaryLittleEndian | PlyEncoding::BinaryBigEndian => {
            let record: usize = vertex
                .properties
                .iter()
                .map(|p| match p.kind {
                    PropertyKind::Scalar(ty) => ty.byte_size(),
                    PropertyKind::List { count, .. } => count.byte_size(),
                })
                .sum();
            vertex.count.checked_mul(record)
        }
    };

    match needed {
        Some(bytes) if bytes <= body_len => Ok(()),
        _ => Err(CloudError::format(format!(
            "PLY header declares {} vertices but the body holds only {} bytes",
            vertex.count, body_len
        ))),
    }
}

/// Parse an in-memory PLY document.
pub fn parse_ply(data: &[u8]) -> Result<PointCloud> {
    let header = parse_header(data)?;

    let vertex_pos = header
        .elements
        .iter()
        .position(|e| e.name == "vertex")
        .ok_or_else(|| CloudError::format("PLY file has no vertex element"))?;
    let vertex = &header.elements[vertex_pos];
    let (roles, has_colors) = vertex_roles(vertex)?;
    check_vertex_count(vertex, header.encoding, data.len() - header.body_offset)?;

    let mut body = Body::new(header.encoding, &data[header.body_offset..])?;
    for element in &header.elements[..vertex_pos] {
        body.skip_element(element)?;
    }

    let n = vertex.count;
    let mut xyz: [Vec<f32>; 3] = std::array::from_fn(|_| Vec::with_capacity(n));
    let cap = if has_colors { n } else { 0 };
    let mut rgb: [Vec<u8>; 3] = std::array::from_fn(|_| Vec::with_capacity(cap));

    for _ in 0..n {
        for (prop, role) in vertex.properties.iter().zip(&roles) {
            match (*role, prop.kind) {
                (Role::Axis(axis), PropertyKind::Scalar(ty)) => xyz[axis].push(body.read_f32(ty)?),
                (Role::Channel(ch), _) => rgb[ch].push(body.read_u8()?),
                (_, kind) => body.skip_property(kind)?,
            }
        }
    }

    let [x, y, z] = xyz;
    let cloud = PointCloud::from_xyz(x, y, z);
    if has_colors {
        let [r, g, b] = rgb;
        cloud.with_colors(Colors { r, g, b })
    } else {
        Ok(cloud)
    }
}

/// Read a PLY file (ASCII or binary, either byte order).
///
/// Only the `vertex` element is loaded; `x`, `y`, `z` are required and
/// `red`, `green`, `blue` are picked up when all three are present.
pub fn read_ply(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let cloud = parse_ply(&data)?;
    debug!(
        path = %path.display(),
        points = cloud.len(),
        colors = cloud.has_colors(),
        "read PLY"
    );
    Ok(cloud)
}
