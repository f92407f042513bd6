pub(crate) use ruint::aliases::{U256, U512};

#[must_use]
pub(crate) fn to_u128(value: U256) -> Option<u128> {
    u128::try_from(value).ok()
}

#[must_use]
pub(crate) fn to_u64(value: U256) -> Option<u64> {
    u64::try_from(value).ok()
}
