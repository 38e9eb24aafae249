#![forbid(unsafe_code)]

pub mod ply;

pub use ply::{parse_ply, read_ply, write_ply, write_ply_binary, write_ply_with, PlyEncoding};
