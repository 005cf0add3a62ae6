//! Resource type enumeration.

/// Kind of asset a resource describes.
///
/// The values are the raw numbers stored in the image and written to XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResourceType {
    /// Sentinel for a missing or unknown type.
    Invalid = -1,
    /// Pedestrian character.
    Character = 0,
    /// Vehicle.
    Vehicle = 1,
    /// Static prop.
    Prop = 2,
}

impl ResourceType {
    /// Parse from the raw stored value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Invalid),
            0 => Some(Self::Character),
            1 => Some(Self::Vehicle),
            2 => Some(Self::Prop),
            _ => None,
        }
    }

    /// Raw stored value.
    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Folder segment used when deriving path and property-set ids.
    pub fn type_path(self) -> &'static str {
        match self {
            Self::Character => "Characters_New",
            Self::Vehicle => "Vehicles_New",
            Self::Prop => "Props_New",
            Self::Invalid => "(null)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values() {
        for ty in [
            ResourceType::Invalid,
            ResourceType::Character,
            ResourceType::Vehicle,
            ResourceType::Prop,
        ] {
            assert_eq!(ResourceType::from_i32(ty.as_i32()), Some(ty));
        }
        assert_eq!(ResourceType::from_i32(3), None);
        assert_eq!(ResourceType::Vehicle.type_path(), "Vehicles_New");
    }
}
