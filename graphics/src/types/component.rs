//! Vertex component and index types.

use crate::error::GraphicsError;

/// Scalar type of a vertex component or an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit integer.
    UnsignedByte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UnsignedShort,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UnsignedInt,
    /// 32-bit float.
    Float,
}

impl ComponentType {
    /// All component types, in table order.
    pub const ALL: [ComponentType; 7] = [
        Self::Byte,
        Self::UnsignedByte,
        Self::Short,
        Self::UnsignedShort,
        Self::Int,
        Self::UnsignedInt,
        Self::Float,
    ];

    /// Size in bytes of one component of this type.
    pub const fn size(&self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
        }
    }

    /// Fetch the `position`-th index from a packed array of this type.
    ///
    /// Signed values must be non-negative and floats are truncated toward
    /// zero; anything that cannot address a vertex is rejected.
    pub fn read_index(&self, indices: &[u8], position: usize) -> Result<u32, GraphicsError> {
        let size = self.size();
        let offset = position * size;
        let Some(bytes) = indices.get(offset..offset + size) else {
            return Err(GraphicsError::OutOfBounds {
                offset,
                size,
                len: indices.len(),
            });
        };

        let value: i64 = match self {
            Self::Byte => i64::from(bytemuck::pod_read_unaligned::<i8>(bytes)),
            Self::UnsignedByte => i64::from(bytes[0]),
            Self::Short => i64::from(bytemuck::pod_read_unaligned::<i16>(bytes)),
            Self::UnsignedShort => i64::from(bytemuck::pod_read_unaligned::<u16>(bytes)),
            Self::Int => i64::from(bytemuck::pod_read_unaligned::<i32>(bytes)),
            Self::UnsignedInt => i64::from(bytemuck::pod_read_unaligned::<u32>(bytes)),
            Self::Float => {
                let value = bytemuck::pod_read_unaligned::<f32>(bytes);
                if !value.is_finite() || value < 0.0 || value > u32::MAX as f32 {
                    return Err(GraphicsError::InvalidParameter(format!(
                        "index {value} at position {position} cannot address a vertex"
                    )));
                }
                value.trunc() as i64
            }
        };

        u32::try_from(value).map_err(|_| {
            GraphicsError::InvalidParameter(format!(
                "index {value} at position {position} cannot address a vertex"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_sizes() {
        let sizes: Vec<usize> = ComponentType::ALL.iter().map(|t| t.size()).collect();
        assert_eq!(sizes, vec![1, 1, 2, 2, 4, 4, 4]);
    }

    #[test]
    fn test_read_unsigned_short() {
        let indices: Vec<u8> = [0u16, 1, 2, 2, 3, 0]
            .iter()
            .flat_map(|i| i.to_ne_bytes())
            .collect();
        assert_eq!(ComponentType::UnsignedShort.read_index(&indices, 3), Ok(2));
        assert_eq!(ComponentType::UnsignedShort.read_index(&indices, 4), Ok(3));
    }

    #[test]
    fn test_read_float_truncates() {
        let indices = 2.75f32.to_ne_bytes();
        assert_eq!(ComponentType::Float.read_index(&indices, 0), Ok(2));
    }

    #[test]
    fn test_read_negative_rejected() {
        let indices = (-1i8).to_ne_bytes();
        assert!(ComponentType::Byte.read_index(&indices, 0).is_err());

        let indices = (-3.0f32).to_ne_bytes();
        assert!(ComponentType::Float.read_index(&indices, 0).is_err());
    }

    #[test]
    fn test_read_past_end() {
        let indices = [1u8, 2, 3];
        assert_eq!(
            ComponentType::UnsignedShort.read_index(&indices, 1),
            Err(GraphicsError::OutOfBounds {
                offset: 2,
                size: 2,
                len: 3
            })
        );
    }
}
