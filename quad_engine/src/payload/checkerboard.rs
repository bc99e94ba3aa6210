/// Procedural RGBA8 texture sampled by the quad

/// Checkerboard image description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkerboard {
    pub width: u32,
    pub height: u32,
    /// Edge length of one square in texels (at least 1)
    pub cell: u32,
    pub color_a: [u8; 4],
    pub color_b: [u8; 4],
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            cell: 32,
            color_a: [0xff, 0xff, 0xff, 0xff],
            color_b: [0x30, 0x30, 0x30, 0xff],
        }
    }
}

impl Checkerboard {
    /// Size in bytes of the generated pixel data
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Generate tightly packed RGBA8 rows, top row first
    pub fn pixels(&self) -> Vec<u8> {
        let cell = self.cell.max(1);
        let mut data = Vec::with_capacity(self.byte_size());
        for y in 0..self.height {
            for x in 0..self.width {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 {
                    self.color_a
                } else {
                    self.color_b
                };
                data.extend_from_slice(&color);
            }
        }
        data
    }
}

#[cfg(test)]
#[path = "checkerboard_tests.rs"]
mod tests;
