use super::PlyEncoding;
use cloudclean_core::{CloudError, Result};

/// Scalar type as declared in a PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarType {
    Char,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Float,
    Double,
}

impl ScalarType {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "char" | "int8" => ScalarType::Char,
            "uchar" | "uint8" => ScalarType::Uchar,
            "short" | "int16" => ScalarType::Short,
            "ushort" | "uint16" => ScalarType::Ushort,
            "int" | "int32" => ScalarType::Int,
            "uint" | "uint32" => ScalarType::Uint,
            "float" | "float32" => ScalarType::Float,
            "double" | "float64" => ScalarType::Double,
            other => {
                return Err(CloudError::format(format!(
                    "unsupported property type: {}",
                    other
                )))
            }
        })
    }

    pub(crate) fn byte_size(self) -> usize {
        match self {
            ScalarType::Char | ScalarType::Uchar => 1,
            ScalarType::Short | ScalarType::Ushort => 2,
            ScalarType::Int | ScalarType::Uint | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    pub(crate) fn is_integer(self) -> bool {
        !matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
pub(crate) struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    pub(crate) fn property(&self, name: &str) -> Option<(usize, &Property)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }
}

/// Parsed header information.
#[derive(Debug)]
pub(crate) struct PlyHeader {
    pub encoding: PlyEncoding,
    pub elements: Vec<Element>,
    /// Byte offset just after the `end_header` line.
    pub body_offset: usize,
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Locate the end of the header, accepting `\n` and `\r\n` line endings.
fn header_end(data: &[u8]) -> Result<(usize, usize)> {
    let marker = b"\nend_header";
    let start = find_bytes(data, marker)
        .ok_or_else(|| CloudError::format("missing end_header in PLY file"))?
        + 1;
    let mut offset = start + b"end_header".len();
    if data.get(offset) == Some(&b'\r') {
        offset += 1;
    }
    match data.get(offset) {
        Some(b'\n') => Ok((start, offset + 1)),
        // A header that ends the file has an empty body.
        None => Ok((start, offset)),
        Some(_) => Err(CloudError::format("garbage after end_header")),
    }
}

pub(crate) fn parse_header(data: &[u8]) -> Result<PlyHeader> {
    if !data.starts_with(b"ply") {
        return Err(CloudError::format("file does not start with 'ply'"));
    }

    let (text_end, body_offset) = header_end(data)?;
    let header_text = std::str::from_utf8(&data[..text_end])
        .map_err(|_| CloudError::format("PLY header not valid UTF-8"))?;

    let mut lines = header_text.lines().map(str::trim);
    if lines.next() != Some("ply") {
        return Err(CloudError::format("file does not start with 'ply'"));
    }

    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();

    for line in lines {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        match keyword {
            "format" => {
                encoding = Some(match rest.first().copied() {
                    Some("ascii") => PlyEncoding::Ascii,
                    Some("binary_little_endian") => PlyEncoding::BinaryLittleEndian,
                    Some("binary_big_endian") => PlyEncoding::BinaryBigEndian,
                    _ => {
                        return Err(CloudError::format(format!(
                            "unsupported PLY format: {}",
                            line
                        )))
                    }
                });
            }
            "comment" | "obj_info" => {}
            "element" => {
                let [name, count] = rest[..] else {
                    return Err(CloudError::format(format!("invalid element line: {}", line)));
                };
                let count = count.parse::<usize>().map_err(|e| {
                    CloudError::format(format!("invalid {} count: {}", name, e))
                })?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            "property" => {
                let element = elements.last_mut().ok_or_else(|| {
                    CloudError::format("property declared before any element")
                })?;
                let property = match rest[..] {
                    ["list", count, item, name] => Property {
                        name: name.to_string(),
                        kind: PropertyKind::List {
                            count: ScalarType::parse(count)?,
                            item: ScalarType::parse(item)?,
                        },
                    },
                    [ty, name] => Property {
                        name: name.to_string(),
                        kind: PropertyKind::Scalar(ScalarType::parse(ty)?),
                    },
                    _ => {
                        return Err(CloudError::format(format!(
                            "invalid property line: {}",
                            line
                        )))
                    }
                };
                if let PropertyKind::List { count, .. } = property.kind {
                    if !count.is_integer() {
                        return Err(CloudError::format(format!(
                            "list count of {} must be an integer type",
                            property.name
                        )));
                    }
                }
                element.properties.push(property);
            }
            "end_header" => break,
            other => {
                return Err(CloudError::format(format!(
                    "unexpected header keyword: {}",
                    other
                )))
            }
        }
    }

    let encoding = encoding.ok_or_else(|| CloudError::format("PLY format line missing"))?;

    Ok(PlyHeader {
        encoding,
        elements,
        body_offset,
    })
}
