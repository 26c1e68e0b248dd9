//! PLY scalar types and value conversion.

use ply_rs::ply::{Property, ScalarType};

/// Scalar type of a PLY property.
///
/// The discriminants are stable: they are the numeric tags hosts pass across
/// the C boundary to select a destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PropertyType {
    Char = 0,
    UChar = 1,
    Short = 2,
    UShort = 3,
    Int = 4,
    UInt = 5,
    Float = 6,
    Double = 7,
    None = 8,
}

impl From<&ScalarType> for PropertyType {
    fn from(scalar: &ScalarType) -> Self {
        match scalar {
            ScalarType::Char => PropertyType::Char,
            ScalarType::UChar => PropertyType::UChar,
            ScalarType::Short => PropertyType::Short,
            ScalarType::UShort => PropertyType::UShort,
            ScalarType::Int => PropertyType::Int,
            ScalarType::UInt => PropertyType::UInt,
            ScalarType::Float => PropertyType::Float,
            ScalarType::Double => PropertyType::Double,
        }
    }
}

impl PropertyType {
    /// Map a numeric tag to a type. Unknown tags become [`PropertyType::None`].
    pub fn from_raw(tag: i32) -> Self {
        match tag {
            0 => PropertyType::Char,
            1 => PropertyType::UChar,
            2 => PropertyType::Short,
            3 => PropertyType::UShort,
            4 => PropertyType::Int,
            5 => PropertyType::UInt,
            6 => PropertyType::Float,
            7 => PropertyType::Double,
            _ => PropertyType::None,
        }
    }

    /// Size of one value in bytes.
    pub fn size(self) -> usize {
        match self {
            PropertyType::Char | PropertyType::UChar => 1,
            PropertyType::Short | PropertyType::UShort => 2,
            PropertyType::Int | PropertyType::UInt | PropertyType::Float => 4,
            PropertyType::Double => 8,
            PropertyType::None => 0,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PropertyType::Char
                | PropertyType::UChar
                | PropertyType::Short
                | PropertyType::UShort
                | PropertyType::Int
                | PropertyType::UInt
        )
    }

    /// Whether `value` is representable in this type without wrapping.
    pub(crate) fn holds(self, value: i64) -> bool {
        match self {
            PropertyType::Char => i8::try_from(value).is_ok(),
            PropertyType::UChar => u8::try_from(value).is_ok(),
            PropertyType::Short => i16::try_from(value).is_ok(),
            PropertyType::UShort => u16::try_from(value).is_ok(),
            PropertyType::Int => i32::try_from(value).is_ok(),
            PropertyType::UInt => u32::try_from(value).is_ok(),
            PropertyType::Float | PropertyType::Double => true,
            PropertyType::None => false,
        }
    }

    /// Encode one value in native byte order. `out` must hold at least `self.size()` bytes.
    pub(crate) fn write(self, value: Scalar, out: &mut [u8]) {
        match self {
            PropertyType::Char => out[..1].copy_from_slice(bytemuck::bytes_of(&value.to_int::<i8>())),
            PropertyType::UChar => out[0] = value.to_int::<u8>(),
            PropertyType::Short => out[..2].copy_from_slice(bytemuck::bytes_of(&value.to_int::<i16>())),
            PropertyType::UShort => out[..2].copy_from_slice(bytemuck::bytes_of(&value.to_int::<u16>())),
            PropertyType::Int => out[..4].copy_from_slice(bytemuck::bytes_of(&value.to_int::<i32>())),
            PropertyType::UInt => out[..4].copy_from_slice(bytemuck::bytes_of(&value.to_int::<u32>())),
            PropertyType::Float => out[..4].copy_from_slice(bytemuck::bytes_of(&(value.to_f64() as f32))),
            PropertyType::Double => out[..8].copy_from_slice(bytemuck::bytes_of(&value.to_f64())),
            PropertyType::None => {}
        }
    }
}

/// A decoded value, wide enough to hold any PLY scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    /// Value of a non-list property, `None` for lists.
    pub(crate) fn from_property(property: &Property) -> Option<Self> {
        let value = match *property {
            Property::Char(v) => Scalar::Int(v as i64),
            Property::UChar(v) => Scalar::Int(v as i64),
            Property::Short(v) => Scalar::Int(v as i64),
            Property::UShort(v) => Scalar::Int(v as i64),
            Property::Int(v) => Scalar::Int(v as i64),
            Property::UInt(v) => Scalar::Int(v as i64),
            Property::Float(v) => Scalar::Float(v as f64),
            Property::Double(v) => Scalar::Float(v),
            _ => return None,
        };
        Some(value)
    }

    // Integers wrap into narrower integers; floats truncate and saturate.
    fn to_int<T: FromScalar>(self) -> T {
        match self {
            Scalar::Int(v) => T::from_i64(v),
            Scalar::Float(v) => T::from_f64(v),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    pub(crate) fn as_i64(self) -> i64 {
        match self {
            Scalar::Int(v) => v,
            Scalar::Float(v) => v as i64,
        }
    }
}

/// Append the items of a list property to `out` and return how many there were.
///
/// Returns `None` for non-list properties.
pub(crate) fn push_list_items(property: &Property, out: &mut Vec<Scalar>) -> Option<usize> {
    fn extend<T: Copy>(items: &[T], out: &mut Vec<Scalar>, convert: impl Fn(T) -> Scalar) -> usize {
        out.extend(items.iter().map(|&v| convert(v)));
        items.len()
    }

    let count = match property {
        Property::ListChar(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListUChar(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListShort(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListUShort(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListInt(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListUInt(v) => extend(v, out, |x| Scalar::Int(x as i64)),
        Property::ListFloat(v) => extend(v, out, |x| Scalar::Float(x as f64)),
        Property::ListDouble(v) => extend(v, out, Scalar::Float),
        _ => return None,
    };
    Some(count)
}

trait FromScalar {
    fn from_i64(v: i64) -> Self;
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_from_scalar {
    ($($t:ty),*) => {
        $(
            impl FromScalar for $t {
                fn from_i64(v: i64) -> Self {
                    v as $t
                }
                fn from_f64(v: f64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_from_scalar!(i8, u8, i16, u16, i32, u32);

/// Rust types that map one-to-one onto a [`PropertyType`].
pub trait PlyScalar: bytemuck::Pod {
    const TYPE: PropertyType;
}

macro_rules! impl_ply_scalar {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl PlyScalar for $t {
                const TYPE: PropertyType = PropertyType::$variant;
            }
        )*
    };
}

impl_ply_scalar!(
    i8 => Char,
    u8 => UChar,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    f64 => Double
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scalar_type() {
        assert_eq!(PropertyType::from(&ScalarType::UChar), PropertyType::UChar);
        assert_eq!(PropertyType::from(&ScalarType::Double), PropertyType::Double);
        assert_eq!(PropertyType::from(&ScalarType::UInt) as i32, 5);
    }

    #[test]
    fn test_from_raw_tags() {
        assert_eq!(PropertyType::from_raw(0), PropertyType::Char);
        assert_eq!(PropertyType::from_raw(6), PropertyType::Float);
        assert_eq!(PropertyType::from_raw(8), PropertyType::None);
        assert_eq!(PropertyType::from_raw(-1), PropertyType::None);
        assert_eq!(PropertyType::from_raw(42), PropertyType::None);
        assert_eq!(PropertyType::Int as i32, 4);
    }

    #[test]
    fn test_write_conversion() {
        let mut bytes = [0u8; 8];
        PropertyType::Float.write(Scalar::Int(-3), &mut bytes);
        assert_eq!(bytemuck::pod_read_unaligned::<f32>(&bytes[..4]), -3.0);

        PropertyType::UChar.write(Scalar::Int(300), &mut bytes);
        assert_eq!(bytes[0], 44);

        PropertyType::Int.write(Scalar::Float(7.9), &mut bytes);
        assert_eq!(bytemuck::pod_read_unaligned::<i32>(&bytes[..4]), 7);

        PropertyType::UShort.write(Scalar::Float(-1.0), &mut bytes);
        assert_eq!(bytemuck::pod_read_unaligned::<u16>(&bytes[..2]), 0);
    }

    #[test]
    fn test_holds_count_range() {
        assert!(PropertyType::UChar.holds(255));
        assert!(!PropertyType::UChar.holds(256));
        assert!(!PropertyType::UChar.holds(-1));
        assert!(PropertyType::Char.holds(-128));
        assert!(!PropertyType::Short.holds(40_000));
        assert!(PropertyType::UInt.holds(u32::MAX as i64));
        assert!(!PropertyType::None.holds(0));
    }

    #[test]
    fn test_property_values() {
        assert_eq!(Scalar::from_property(&Property::UShort(9)), Some(Scalar::Int(9)));
        assert_eq!(Scalar::from_property(&Property::Float(0.5)), Some(Scalar::Float(0.5)));
        assert_eq!(Scalar::from_property(&Property::ListInt(vec![1])), None);

        let mut items = Vec::new();
        assert_eq!(push_list_items(&Property::ListUChar(vec![4, 5]), &mut items), Some(2));
        assert_eq!(push_list_items(&Property::ListFloat(vec![1.5]), &mut items), Some(1));
        assert_eq!(push_list_items(&Property::Int(3), &mut items), None);
        assert_eq!(items, vec![Scalar::Int(4), Scalar::Int(5), Scalar::Float(1.5)]);
    }
}
