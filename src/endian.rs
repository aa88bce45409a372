use core::fmt::Debug;

#[derive(Copy, Clone, Default, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Little<T: Copy + Clone + Default + Debug + PartialEq + PartialOrd + Sized>(T);

macro_rules! define {
    ($type:ty) => {
        impl Little<$type> {
            pub fn to_ne(self) -> $type {
                <$type>::from_le(self.0)
            }
        }

        impl From<Little<$type>> for $type {
            #[inline]
            fn from(value: Little<$type>) -> $type {
                <$type>::from_le(value.0)
            }
        }

        impl From<$type> for Little<$type> {
            #[inline]
            fn from(t: $type) -> Self {
                Self(<$type>::to_le(t))
            }
        }
    };
}

define!(u16);
define!(u32);
