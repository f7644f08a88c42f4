use nalgebra as na;
use na::{Vector2, Vector3, Vector4};

/// Types that can be stored in an attribute slot: f32, Vector2, Vector3 and Vector4 of f32.
pub trait Attrib: Copy {
    /// Number of meaningful channels.
    const DIM: usize;

    /// Writes own channels into the leading components of `slot`, leaving the rest as they were.
    fn write_into(self, slot: &mut Vector4<f32>);

    /// Reads own channels from the leading components of `slot`.
    fn read_from(slot: &Vector4<f32>) -> Self;
}

impl Attrib for f32 {
    const DIM: usize = 1;

    fn write_into(self, slot: &mut Vector4<f32>) {
        slot.x = self;
    }

    fn read_from(slot: &Vector4<f32>) -> Self {
        return slot.x;
    }
}

impl Attrib for Vector2<f32> {
    const DIM: usize = 2;

    fn write_into(self, slot: &mut Vector4<f32>) {
        slot.fixed_rows_mut::<2>(0).copy_from(&self);
    }

    fn read_from(slot: &Vector4<f32>) -> Self {
        return slot.xy();
    }
}

impl Attrib for Vector3<f32> {
    const DIM: usize = 3;

    fn write_into(self, slot: &mut Vector4<f32>) {
        slot.fixed_rows_mut::<3>(0).copy_from(&self);
    }

    fn read_from(slot: &Vector4<f32>) -> Self {
        return slot.xyz();
    }
}

impl Attrib for Vector4<f32> {
    const DIM: usize = 4;

    fn write_into(self, slot: &mut Vector4<f32>) {
        *slot = self;
    }

    fn read_from(slot: &Vector4<f32>) -> Self {
        return *slot;
    }
}

/// Attributes of one vertex: slots indexed by small integers, each holding
/// up to 4 float channels and the dimension it was last written with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribs {
    values: Vec<Vector4<f32>>,
    dims: Vec<usize>, // 0 marks a slot that was never written.
}

impl Attribs {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Number of slots, including unwritten ones below the highest written index.
    pub fn len(&self) -> usize {
        return self.values.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.values.is_empty();
    }

    /// Dimension the slot was last written with, None if it never was.
    pub fn dim(&self, index: usize) -> Option<usize> {
        return match self.dims.get(index) {
            Some(0) | None => None,
            Some(dim) => Some(*dim),
        };
    }

    /// Stores a value, growing the slot list if needed. Overwrites silently.
    pub fn set<T: Attrib>(&mut self, index: usize, value: T) {
        if self.values.len() <= index {
            self.values.resize(index + 1, Vector4::zeros());
            self.dims.resize(index + 1, 0);
        }
        self.dims[index] = T::DIM;
        value.write_into(&mut self.values[index]);
    }

    /// Reads a slot as `T`.
    ///
    /// Never fails: reading at a dimension other than the stored one logs a warning and returns
    /// the leading components of the slot, whatever they hold. Unwritten slots read as zeros.
    pub fn get<T: Attrib>(&self, index: usize) -> T {
        return match self.values.get(index) {
            Some(slot) => {
                let dim = self.dims[index];
                if dim == 0 {
                    log::warn!("attribute {} was never set but accessed as dimension {}", index, T::DIM);
                } else if dim != T::DIM {
                    log::warn!(
                        "attribute {} has dimension {} but accessed as dimension {}",
                        index,
                        dim,
                        T::DIM
                    );
                }
                T::read_from(slot)
            }
            None => {
                log::warn!("attribute {} was never set but accessed as dimension {}", index, T::DIM);
                T::read_from(&Vector4::zeros())
            }
        };
    }
}
