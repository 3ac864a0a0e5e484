//! Patch descriptors: the (type, transition pattern, rotation) key every
//! emitted patch is bucketed under, and the fixed arena of all descriptors.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Patch shape. Determines the number of control vertices per patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchType {
    Regular,
    Boundary,
    Corner,
    Gregory,
    GregoryBoundary,
}

impl PatchType {
    pub const fn num_control_vertices(self) -> usize {
        match self {
            PatchType::Regular => 16,
            PatchType::Boundary => 12,
            PatchType::Corner => 9,
            PatchType::Gregory | PatchType::GregoryBoundary => 4,
        }
    }

    pub const fn is_gregory(self) -> bool {
        matches!(self, PatchType::Gregory | PatchType::GregoryBoundary)
    }

    /// Boundary and corner patches come in four rotations.
    pub const fn has_rotations(self) -> bool {
        matches!(self, PatchType::Boundary | PatchType::Corner)
    }
}

/// Which edges of a patch border a coarser neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionPattern {
    NonTransition,
    /// One transition edge.
    Pattern0,
    /// Two adjacent transition edges.
    Pattern1,
    /// Three transition edges.
    Pattern2,
    /// Four transition edges.
    Pattern3,
    /// Two opposite transition edges.
    Pattern4,
}

impl TransitionPattern {
    pub const ALL: [TransitionPattern; 6] = [
        TransitionPattern::NonTransition,
        TransitionPattern::Pattern0,
        TransitionPattern::Pattern1,
        TransitionPattern::Pattern2,
        TransitionPattern::Pattern3,
        TransitionPattern::Pattern4,
    ];

    pub const fn index(self) -> usize {
        match self {
            TransitionPattern::NonTransition => 0,
            TransitionPattern::Pattern0 => 1,
            TransitionPattern::Pattern1 => 2,
            TransitionPattern::Pattern2 => 3,
            TransitionPattern::Pattern3 => 4,
            TransitionPattern::Pattern4 => 5,
        }
    }

    pub const fn is_transition(self) -> bool {
        !matches!(self, TransitionPattern::NonTransition)
    }
}

/// Classification key of a patch.
///
/// Only a fixed set of combinations exists: Gregory types appear only
/// without transitions, and only boundary and corner patches carry a
/// non-zero rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    patch_type: PatchType,
    pattern: TransitionPattern,
    rotation: u8,
}

impl Descriptor {
    /// Number of distinct descriptors.
    pub const COUNT: usize = 56;

    const BUCKET_SIZE: usize = 9;
    const NON_TRANSITION_SIZE: usize = 11;

    /// `None` for combinations without a slot in the canonical order.
    pub fn new(patch_type: PatchType, pattern: TransitionPattern, rotation: u8) -> Option<Self> {
        Self::is_valid(patch_type, pattern, rotation)
            .then_some(Self::from_parts(patch_type, pattern, rotation))
    }

    const fn from_parts(patch_type: PatchType, pattern: TransitionPattern, rotation: u8) -> Self {
        Self {
            patch_type,
            pattern,
            rotation,
        }
    }

    pub fn is_valid(patch_type: PatchType, pattern: TransitionPattern, rotation: u8) -> bool {
        if patch_type.is_gregory() && pattern.is_transition() {
            return false;
        }
        if patch_type.has_rotations() {
            rotation < 4
        } else {
            rotation == 0
        }
    }

    pub fn patch_type(&self) -> PatchType {
        self.patch_type
    }

    pub fn pattern(&self) -> TransitionPattern {
        self.pattern
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn num_control_vertices(&self) -> usize {
        self.patch_type.num_control_vertices()
    }

    /// Position in the canonical order, `0..COUNT`.
    pub fn index(&self) -> usize {
        let r = self.rotation as usize;
        let base = match self.pattern {
            TransitionPattern::NonTransition => 0,
            p => Self::NON_TRANSITION_SIZE + (p.index() - 1) * Self::BUCKET_SIZE,
        };
        base + match self.patch_type {
            PatchType::Regular => 0,
            PatchType::Boundary => 1 + r,
            PatchType::Corner => 5 + r,
            PatchType::Gregory => 9,
            PatchType::GregoryBoundary => 10,
        }
    }

    /// All descriptors in canonical order: per pattern, Regular, Boundary
    /// rotations, Corner rotations, then the Gregory types for the
    /// non-transition pattern.
    pub fn iter() -> impl Iterator<Item = Descriptor> {
        TransitionPattern::ALL.into_iter().flat_map(|pattern| {
            let gregory: &'static [PatchType] = if pattern.is_transition() {
                &[]
            } else {
                &[PatchType::Gregory, PatchType::GregoryBoundary]
            };

            std::iter::once(Descriptor::from_parts(PatchType::Regular, pattern, 0))
                .chain((0..4).map(move |r| Descriptor::from_parts(PatchType::Boundary, pattern, r)))
                .chain((0..4).map(move |r| Descriptor::from_parts(PatchType::Corner, pattern, r)))
                .chain(gregory.iter().map(move |&t| Descriptor::from_parts(t, pattern, 0)))
        })
    }
}

/// One value per descriptor, indexed by arena position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMap<T> {
    slots: Vec<T>,
}

impl<T: Default> DescriptorMap<T> {
    pub fn new() -> Self {
        Self {
            slots: std::iter::repeat_with(T::default)
                .take(Descriptor::COUNT)
                .collect(),
        }
    }
}

impl<T: Default> Default for DescriptorMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DescriptorMap<T> {
    /// Entries in canonical descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (Descriptor, &T)> {
        Descriptor::iter().zip(self.slots.iter())
    }
}

impl DescriptorMap<usize> {
    pub fn total(&self) -> usize {
        self.slots.iter().sum()
    }
}

impl<T> Index<Descriptor> for DescriptorMap<T> {
    type Output = T;

    fn index(&self, descriptor: Descriptor) -> &T {
        &self.slots[descriptor.index()]
    }
}

impl<T> IndexMut<Descriptor> for DescriptorMap<T> {
    fn index_mut(&mut self, descriptor: Descriptor) -> &mut T {
        &mut self.slots[descriptor.index()]
    }
}

/// A contiguous run of same-descriptor patches in the output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchArray {
    pub descriptor: Descriptor,
    /// First control-vertex index slot.
    pub vertex_offset: usize,
    /// First patch (ptex / face-varying) slot.
    pub patch_offset: usize,
    pub patch_count: usize,
    /// First quad-offset word; only advanced by Gregory arrays.
    pub quad_offset_offset: usize,
}

impl PatchArray {
    pub fn num_control_vertices(&self) -> usize {
        self.patch_count * self.descriptor.num_control_vertices()
    }
}
