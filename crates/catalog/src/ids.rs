use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                text.trim().trim_start_matches('#').parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// 課程包識別碼。 / Identifier of a bundle.
    BundleId
);
entity_id!(
    /// 課程識別碼。 / Identifier of a course.
    CourseId
);
entity_id!(
    /// 單元識別碼，在所屬課程內唯一。 / Identifier of a module, unique within its course.
    ModuleId
);
entity_id!(
    /// 章節識別碼，在所屬單元內唯一。 / Identifier of a chapter, unique within its module.
    ChapterId
);

/// Hands out increasing identifiers for one id space.
/// 為單一識別碼空間配發遞增的編號。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused identifier.
    pub fn next<I: From<u64>>(&mut self) -> I {
        self.last = self.last.wrapping_add(1);
        I::from(self.last)
    }

    /// Records an identifier issued elsewhere so it is never handed out again.
    pub fn observe(&mut self, value: u64) {
        self.last = self.last.max(value);
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_skips_observed_ids() {
        let mut ids = IdAllocator::new();
        let first: CourseId = ids.next();
        assert_eq!(first, CourseId::new(1));
        ids.observe(10);
        ids.observe(4);
        let next: CourseId = ids.next();
        assert_eq!(next, CourseId::new(11));
    }

    #[test]
    fn ids_parse_with_optional_hash_prefix() {
        assert_eq!("#7".parse::<ChapterId>().unwrap(), ChapterId::new(7));
        assert_eq!(" 3 ".parse::<BundleId>().unwrap(), BundleId::new(3));
        assert!("abc".parse::<ModuleId>().is_err());
    }
}
