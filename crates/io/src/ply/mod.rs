mod header;
mod reader;
mod writer;

pub use reader::{parse_ply, read_ply};
pub use writer::{write_ply, write_ply_binary, write_ply_with};

use cloudclean_core::CloudError;
use std::str::FromStr;

/// Body encoding of a PLY file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyEncoding {
    Ascii,
    #[default]
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyEncoding {
    /// The keyword used on the header's `format` line.
    pub fn keyword(self) -> &'static str {
        match self {
            PlyEncoding::Ascii => "ascii",
            PlyEncoding::BinaryLittleEndian => "binary_little_endian",
            PlyEncoding::BinaryBigEndian => "binary_big_endian",
        }
    }
}

impl FromStr for PlyEncoding {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(PlyEncoding::Ascii),
            "binary" | "binary_little_endian" => Ok(PlyEncoding::BinaryLittleEndian),
            "binary_big_endian" => Ok(PlyEncoding::BinaryBigEndian),
            other => Err(CloudError::invalid_parameter(format!(
                "unknown PLY encoding: {}",
                other
            ))),
        }
    }
}
