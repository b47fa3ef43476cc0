//! Hex grid addressing - cube, axial and odd-r offset coordinates

use serde::{Deserialize, Serialize};

/// Cube coordinate. `x + y + z == 0` always holds; `y` is the row axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    x: i32,
    y: i32,
    z: i32,
}

/// Axial coordinate, the cube coordinate with `z` dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

/// Odd-r offset coordinate (column, row), used for array storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 3) % 6]
    }

    fn cube_delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (0, -1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (0, 1),
        }
    }
}

// Offset deltas per direction, indexed by `Direction::index`. Rows grow
// southwards and odd rows are shoved half a hex to the east.
const EVEN_ROW_DELTAS: [(i32, i32); 6] = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];
const ODD_ROW_DELTAS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];

impl CubeCoord {
    /// Builds a cube coordinate from its first two axes; `z` follows from the invariant.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, z: -x - y }
    }

    /// Returns `None` unless `x + y + z == 0`.
    pub fn try_from_xyz(x: i32, y: i32, z: i32) -> Option<Self> {
        if x + y + z == 0 {
            Some(Self { x, y, z })
        } else {
            None
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn to_axial(self) -> AxialCoord {
        AxialCoord {
            q: self.x,
            r: self.y,
        }
    }

    pub fn to_offset(self) -> OffsetCoord {
        OffsetCoord {
            col: self.x + (self.y - (self.y & 1)) / 2,
            row: self.y,
        }
    }

    /// Unbounded neighbour in the given direction.
    pub fn neighbor(self, direction: Direction) -> CubeCoord {
        let (dx, dy) = direction.cube_delta();
        CubeCoord::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: CubeCoord) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dy).max(dz)
    }

    /// Distance on a map whose columns wrap around.
    ///
    /// Takes the smallest distance to `other` or to its copies one map width
    /// east or west. For two cells on the same row this is
    /// `min(direct, |direct - map_width|)`.
    pub fn wrapped_distance(self, other: CubeCoord, map_width: i32) -> i32 {
        // Shifting the offset column by the map width shifts cube x by the same amount.
        let east = CubeCoord::new(other.x + map_width, other.y);
        let west = CubeCoord::new(other.x - map_width, other.y);
        self.distance(other)
            .min(self.distance(east))
            .min(self.distance(west))
    }
}

impl AxialCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn to_cube(self) -> CubeCoord {
        CubeCoord::new(self.q, self.r)
    }
}

impl OffsetCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn to_cube(self) -> CubeCoord {
        CubeCoord::new(self.col - (self.row - (self.row & 1)) / 2, self.row)
    }

    pub fn to_axial(self) -> AxialCoord {
        self.to_cube().to_axial()
    }

    /// Unbounded neighbour using the row-parity delta tables.
    pub fn neighbor(self, direction: Direction) -> OffsetCoord {
        let table = if self.row & 1 == 0 {
            &EVEN_ROW_DELTAS
        } else {
            &ODD_ROW_DELTAS
        };
        let (dc, dr) = table[direction.index()];
        OffsetCoord::new(self.col + dc, self.row + dr)
    }
}

/// Bounds of a hex map, used for neighbour lookup and distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexLayout {
    pub width: u32,
    pub height: u32,
    pub wrap: bool,
}

impl HexLayout {
    pub fn new(width: u32, height: u32, wrap: bool) -> Self {
        Self {
            width,
            height,
            wrap,
        }
    }

    pub fn contains(&self, coord: OffsetCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && (coord.col as u32) < self.width
            && (coord.row as u32) < self.height
    }

    /// Brings a coordinate onto the map, wrapping the column if the map wraps.
    pub fn normalize(&self, coord: OffsetCoord) -> Option<OffsetCoord> {
        let mut coord = coord;
        if self.wrap && self.width > 0 {
            coord.col = coord.col.rem_euclid(self.width as i32);
        }
        if self.contains(coord) {
            Some(coord)
        } else {
            None
        }
    }

    /// The six neighbours in `Direction::ALL` order; `None` past the map edge.
    pub fn neighbors(&self, coord: OffsetCoord) -> [Option<OffsetCoord>; 6] {
        let mut out = [None; 6];
        for direction in Direction::ALL {
            out[direction.index()] = self.normalize(coord.neighbor(direction));
        }
        out
    }

    pub fn neighbor(&self, coord: OffsetCoord, direction: Direction) -> Option<OffsetCoord> {
        self.normalize(coord.neighbor(direction))
    }

    pub fn distance(&self, a: OffsetCoord, b: OffsetCoord) -> i32 {
        let (a, b) = (a.to_cube(), b.to_cube());
        if self.wrap {
            a.wrapped_distance(b, self.width as i32)
        } else {
            a.distance(b)
        }
    }

    pub fn index_of(&self, coord: OffsetCoord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row as usize * self.width as usize + coord.col as usize)
        } else {
            None
        }
    }
}
