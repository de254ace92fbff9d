use num_traits::FromPrimitive;
use crate::errors::{GsmResult, GsmError};

/// Conversion of a raw bit-field value into one of the `FromPrimitive` enums in this crate,
/// failing with a decode error if the value has no variant.
pub trait GsmFromPrimitive where Self: Sized {
    fn from_integer(i: u32) -> GsmResult<Self>;
}
impl<T> GsmFromPrimitive for T where T: FromPrimitive {
    fn from_integer(i: u32) -> GsmResult<T> {
        if let Some(s) = T::from_u32(i) {
            Ok(s)
        }
        else {
            Err(GsmError::ValueOutOfRange(i))
        }
    }
}
