//! # Element types
//!
//! EnSight Gold stores the elements of a part in blocks, each block tagged with one of a closed
//! set of element types. Most types have a fixed number of nodes per element; `nsided`
//! polygons carry their node count per element instead. Ghost elements (`g_` prefix) share the
//! layout of their base type.

use std::fmt;

/// How the nodes of one element block are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// every element in the block has exactly this many nodes
    Fixed(usize),
    /// node count is given per element (`nsided`)
    Variable,
}

/// An EnSight Gold unstructured element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Point,
    Bar2,
    Bar3,
    Tria3,
    Tria6,
    Quad4,
    Quad8,
    Tetra4,
    Tetra10,
    Pyramid5,
    Pyramid13,
    Penta6,
    Penta15,
    Hexa8,
    Hexa20,
    NSided,
    NFaced,
}

impl ElementType {
    /// Resolve a type tag as written in a geometry or variable file.
    ///
    /// Leading / trailing whitespace is ignored and the ghost prefix `g_` resolves to the base
    /// type. Returns `None` for tags outside the EnSight Gold element set.
    ///
    /// ```
    /// use ensight::ElementType;
    ///
    /// assert_eq!(ElementType::from_tag("tria3"), Some(ElementType::Tria3));
    /// assert_eq!(ElementType::from_tag("g_nsided"), Some(ElementType::NSided));
    /// assert_eq!(ElementType::from_tag("polyhedron"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let tag = tag.strip_prefix("g_").unwrap_or(tag);

        let element_type = match tag {
            "point" => Self::Point,
            "bar2" => Self::Bar2,
            "bar3" => Self::Bar3,
            "tria3" => Self::Tria3,
            "tria6" => Self::Tria6,
            "quad4" => Self::Quad4,
            "quad8" => Self::Quad8,
            "tetra4" => Self::Tetra4,
            "tetra10" => Self::Tetra10,
            "pyramid5" => Self::Pyramid5,
            "pyramid13" => Self::Pyramid13,
            "penta6" => Self::Penta6,
            "penta15" => Self::Penta15,
            "hexa8" => Self::Hexa8,
            "hexa20" => Self::Hexa20,
            "nsided" => Self::NSided,
            "nfaced" => Self::NFaced,
            _ => return None,
        };

        Some(element_type)
    }

    /// the canonical (non-ghost) tag of this element type
    pub fn tag(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Bar2 => "bar2",
            Self::Bar3 => "bar3",
            Self::Tria3 => "tria3",
            Self::Tria6 => "tria6",
            Self::Quad4 => "quad4",
            Self::Quad8 => "quad8",
            Self::Tetra4 => "tetra4",
            Self::Tetra10 => "tetra10",
            Self::Pyramid5 => "pyramid5",
            Self::Pyramid13 => "pyramid13",
            Self::Penta6 => "penta6",
            Self::Penta15 => "penta15",
            Self::Hexa8 => "hexa8",
            Self::Hexa20 => "hexa20",
            Self::NSided => "nsided",
            Self::NFaced => "nfaced",
        }
    }

    /// Topological dimension: 0 for points, 1 for bars, 2 for surface elements, 3 for volumes
    pub fn dimension(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Bar2 | Self::Bar3 => 1,
            Self::Tria3 | Self::Tria6 | Self::Quad4 | Self::Quad8 | Self::NSided => 2,
            Self::Tetra4
            | Self::Tetra10
            | Self::Pyramid5
            | Self::Pyramid13
            | Self::Penta6
            | Self::Penta15
            | Self::Hexa8
            | Self::Hexa20
            | Self::NFaced => 3,
        }
    }

    /// Number of nodes per element, `None` for `nsided` and `nfaced`
    pub fn nodes_per_element(self) -> Option<usize> {
        let nodes = match self {
            Self::Point => 1,
            Self::Bar2 => 2,
            Self::Bar3 => 3,
            Self::Tria3 => 3,
            Self::Tria6 => 6,
            Self::Quad4 => 4,
            Self::Quad8 => 8,
            Self::Tetra4 => 4,
            Self::Tetra10 => 10,
            Self::Pyramid5 => 5,
            Self::Pyramid13 => 13,
            Self::Penta6 => 6,
            Self::Penta15 => 15,
            Self::Hexa8 => 8,
            Self::Hexa20 => 20,
            Self::NSided | Self::NFaced => return None,
        };

        Some(nodes)
    }

    /// Connectivity layout of this element type. `nfaced` polyhedra have no single polygon
    /// loop per element and return `None`.
    pub fn topology(self) -> Option<Topology> {
        match self {
            Self::NSided => Some(Topology::Variable),
            Self::NFaced => None,
            fixed => fixed.nodes_per_element().map(Topology::Fixed),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
