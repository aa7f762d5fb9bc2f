use ringlife_common::GridLabel;
use serde::{Deserialize, Serialize};

/// Which grid currently holds the state the next convolution reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Grid A is the read source.
    ACurrent,
    /// Grid B is the read source.
    BCurrent,
}

impl Role {
    /// Label of the grid read from under this role.
    pub fn current(self) -> GridLabel {
        match self {
            Self::ACurrent => GridLabel::A,
            Self::BCurrent => GridLabel::B,
        }
    }

    /// Label of the grid written to under this role.
    pub fn next(self) -> GridLabel {
        self.current().other()
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::ACurrent => Self::BCurrent,
            Self::BCurrent => Self::ACurrent,
        }
    }
}

/// Role indirection for the grid pair.
///
/// Owned by the stepper and flipped only through [`BufferRoles::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRoles {
    role: Role,
    flips: u64,
}

impl BufferRoles {
    /// Start with grid A as the read source, which is where noise is seeded.
    pub fn new() -> Self {
        Self {
            role: Role::ACurrent,
            flips: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of flips since construction.
    pub fn flips(&self) -> u64 {
        self.flips
    }

    /// Flip the role and return the role that was in effect before the flip.
    ///
    /// Postcondition: `self.role() == previous.toggled()`.
    pub fn advance(&mut self) -> Role {
        let previous = self.role;
        self.role = previous.toggled();
        self.flips += 1;
        previous
    }
}

impl Default for BufferRoles {
    fn default() -> Self {
        Self::new()
    }
}

/// Two equally sized grids, A and B, owned together.
///
/// `G` is the engine's grid handle; dropping the pair releases both.
#[derive(Debug)]
pub struct GridPair<G> {
    a: G,
    b: G,
}

impl<G> GridPair<G> {
    pub fn new(a: G, b: G) -> Self {
        Self { a, b }
    }

    pub fn get(&self, label: GridLabel) -> &G {
        match label {
            GridLabel::A => &self.a,
            GridLabel::B => &self.b,
        }
    }

    /// `(read, write)` handles under the given role.
    pub fn split(&self, role: Role) -> (&G, &G) {
        (self.get(role.current()), self.get(role.next()))
    }
}
