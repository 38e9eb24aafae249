use super::PlyEncoding;
use cloudclean_core::{PointCloud, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

fn write_header<W: Write>(w: &mut W, cloud: &PointCloud, encoding: PlyEncoding) -> Result<()> {
    w.write_all(b"ply\n")?;
    writeln!(w, "format {} 1.0", encoding.keyword())?;
    writeln!(w, "element vertex {}", cloud.len())?;
    w.write_all(b"property float x\n")?;
    w.write_all(b"property float y\n")?;
    w.write_all(b"property float z\n")?;

    if cloud.has_colors() {
        w.write_all(b"property uchar red\n")?;
        w.write_all(b"property uchar green\n")?;
        w.write_all(b"property uchar blue\n")?;
    }

    w.write_all(b"end_header\n")?;
    Ok(())
}

fn write_body_ascii<W: Write>(w: &mut W, cloud: &PointCloud) -> Result<()> {
    // `{}` on f32 prints the shortest text that parses back to the same bits.
    for i in 0..cloud.len() {
        write!(w, "{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i])?;
        if let Some([r, g, b]) = cloud.color(i) {
            write!(w, " {} {} {}", r, g, b)?;
        }
        w.write_all(b"\n")?;
    }
    Ok(())
}

fn write_body_binary<W: Write>(w: &mut W, cloud: &PointCloud, big_endian: bool) -> Result<()> {
    let encode = |v: f32| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };

    for i in 0..cloud.len() {
        w.write_all(&encode(cloud.x[i]))?;
        w.write_all(&encode(cloud.y[i]))?;
        w.write_all(&encode(cloud.z[i]))?;

        if let Some(rgb) = cloud.color(i) {
            w.write_all(&rgb)?;
        }
    }
    Ok(())
}

/// Write a PLY file using the given encoding.
pub fn write_ply_with(
    path: impl AsRef<Path>,
    cloud: &PointCloud,
    encoding: PlyEncoding,
) -> Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    write_header(&mut w, cloud, encoding)?;
    match encoding {
        PlyEncoding::Ascii => write_body_ascii(&mut w, cloud)?,
        PlyEncoding::BinaryLittleEndian => write_body_binary(&mut w, cloud, false)?,
        PlyEncoding::BinaryBigEndian => write_body_binary(&mut w, cloud, true)?,
    }

    w.flush()?;
    debug!(
        path = %path.display(),
        points = cloud.len(),
        colors = cloud.has_colors(),
        encoding = encoding.keyword(),
        "wrote PLY"
    );
    Ok(())
}

/// Write a PLY file in ASCII format.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    write_ply_with(path, cloud, PlyEncoding::Ascii)
}

/// Write a PLY file in binary_little_endian format.
///
/// Binary PLY is ~3-4x smaller and faster to read/write than ASCII PLY.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    write_ply_with(path, cloud, PlyEncoding::BinaryLittleEndian)
}
