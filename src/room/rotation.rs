#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Rotation {
    pub fn value(self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::Northeast => 1,
            Rotation::East => 2,
            Rotation::Southeast => 3,
            Rotation::South => 4,
            Rotation::Southwest => 5,
            Rotation::West => 6,
            Rotation::Northwest => 7,
        }
    }

    pub fn from_value(value: u8) -> Self {
        match value % 8 {
            0 => Rotation::North,
            1 => Rotation::Northeast,
            2 => Rotation::East,
            3 => Rotation::Southeast,
            4 => Rotation::South,
            5 => Rotation::Southwest,
            6 => Rotation::West,
            _ => Rotation::Northwest,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Rotation::North => (0, -1),
            Rotation::Northeast => (1, -1),
            Rotation::East => (1, 0),
            Rotation::Southeast => (1, 1),
            Rotation::South => (0, 1),
            Rotation::Southwest => (-1, 1),
            Rotation::West => (-1, 0),
            Rotation::Northwest => (-1, -1),
        }
    }

    /// Rotation an avatar faces when stepping by (dx, dy). Zero delta maps
    /// to East, matching the legacy lookup's fall-through.
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Rotation::North,
            (1, -1) => Rotation::Northeast,
            (1, 1) => Rotation::Southeast,
            (0, 1) => Rotation::South,
            (-1, 1) => Rotation::Southwest,
            (-1, 0) => Rotation::West,
            (-1, -1) => Rotation::Northwest,
            _ => Rotation::East,
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Rotation::Northeast
                | Rotation::Southeast
                | Rotation::Southwest
                | Rotation::Northwest
        )
    }

    /// Snap to the nearest of the 4 cardinal rotations. Diagonals round
    /// down to the preceding cardinal, as seated/laying avatars render
    /// only the 4 cardinal sprites.
    pub fn to_cardinal(self) -> Self {
        Rotation::from_value(self.value() & !1)
    }

    pub fn turned(self, steps: i8) -> Self {
        let value = i16::from(self.value()) + i16::from(steps);
        Rotation::from_value(value.rem_euclid(8) as u8)
    }

    /// Signed shortest turn from `self` to `target`, in [-3, 4]. The
    /// opposite rotation reports +4.
    pub fn signed_delta(self, target: Rotation) -> i8 {
        let raw = (i16::from(target.value()) - i16::from(self.value())).rem_euclid(8);
        if raw > 4 {
            (raw - 8) as i8
        } else {
            raw as i8
        }
    }
}
