/// A single point: position plus optional RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: [f32; 3],
    pub color: Option<[u8; 3]>,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            color: None,
        }
    }

    pub fn with_color(x: f32, y: f32, z: f32, rgb: [u8; 3]) -> Self {
        Self {
            position: [x, y, z],
            color: Some(rgb),
        }
    }
}

/// True when all three coordinates are finite.
pub fn is_finite_position(p: &[f32; 3]) -> bool {
    p.iter().all(|v| v.is_finite())
}
