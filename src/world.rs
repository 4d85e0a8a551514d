/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from exactly four components. Each one is truncated to
    /// its low byte, so 256 becomes 0 and -1 becomes 255.
    pub fn from_components(c: &[i32]) -> Option<Self> {
        match *c {
            [r, g, b, a] => Some(Self::new(r as u8, g as u8, b as u8, a as u8)),
            _ => None,
        }
    }
}

/// One drawable group of points sharing a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    points: Vec<i32>, // interleaved x, y
    colors: Vec<i32>, // r, g, b, a when well-formed
}

impl Sector {
    pub fn new(points: Vec<i32>, colors: Vec<i32>) -> Self {
        Self { points, colors }
    }

    pub fn points(&self) -> &[i32] {
        &self.points
    }

    pub fn colors(&self) -> &[i32] {
        &self.colors
    }

    /// None unless the sector carries exactly four color components.
    pub fn color(&self) -> Option<Rgba> {
        Rgba::from_components(&self.colors)
    }

    /// Circle centers, one per consecutive (x, y) pair. A trailing unpaired
    /// value is ignored.
    pub fn centers(&self) -> impl Iterator<Item = [i32; 2]> + '_ {
        self.points.chunks_exact(2).map(|p| [p[0], p[1]])
    }

    /// Number of circles this sector produces per frame.
    pub fn draw_count(&self) -> usize {
        if self.color().is_some() {
            self.points.len() / 2
        } else {
            0
        }
    }
}

/// All sectors in source order. Never mutated after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    sectors: Vec<Sector>,
}

impl World {
    pub fn new(sectors: Vec<Sector>) -> Self {
        Self { sectors }
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.sectors.iter().map(Sector::draw_count).sum()
    }
}
