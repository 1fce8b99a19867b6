// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Canonical serialization of big integers
//!
//! All large integers cross the wire as canonical big-endian bytes of
//! minimum length: no leading zero bytes, and zero encodes as the empty
//! string. The serde adapter modules below let message types carry
//! [`BoxedUint`] fields, vectors and maps through any serde format while
//! keeping this canonical byte form.

use crypto_bigint::BoxedUint;

use crate::utils::error::Error;

/// Encode a big integer as canonical minimum-length big-endian bytes.
///
/// Zero encodes as the empty byte string.
pub fn to_be_bytes_minimal(value: &BoxedUint) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => bytes[first..].to_vec(),
        None => Vec::new(),
    }
}

/// Decode a big integer from canonical minimum-length big-endian bytes.
///
/// # Errors
///
/// - `NonCanonicalEncoding` if the input carries a leading zero byte or
///   cannot be parsed.
pub fn from_be_bytes_minimal(bytes: &[u8]) -> Result<BoxedUint, Error> {
    if bytes.first() == Some(&0) {
        return Err(Error::NonCanonicalEncoding(
            "leading zero byte in big integer".to_string(),
        ));
    }
    if bytes.is_empty() {
        return Ok(BoxedUint::zero_with_precision(64));
    }
    let bits = precision_for(bytes.len());
    BoxedUint::from_be_slice(bytes, bits)
        .map_err(|e| Error::NonCanonicalEncoding(format!("{e:?}")))
}

/// Smallest limb-aligned precision that holds `len` big-endian bytes.
fn precision_for(len: usize) -> u32 {
    let bits = u32::try_from(len).unwrap_or(u32::MAX / 8) * 8;
    bits.max(64).div_ceil(64) * 64
}

/// Serde adapter for a single [`BoxedUint`] field.
pub mod big_uint {
    use super::{from_be_bytes_minimal, to_be_bytes_minimal};
    use crypto_bigint::BoxedUint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &BoxedUint,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        to_be_bytes_minimal(value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BoxedUint, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        from_be_bytes_minimal(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<BoxedUint>` fields.
pub mod big_uint_vec {
    use super::{from_be_bytes_minimal, to_be_bytes_minimal};
    use crypto_bigint::BoxedUint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        values: &[BoxedUint],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(to_be_bytes_minimal)
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BoxedUint>, D::Error> {
        let encoded = Vec::<Vec<u8>>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|bytes| from_be_bytes_minimal(bytes).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Serde adapter for `BTreeMap<K, BoxedUint>` fields.
pub mod big_uint_map {
    use super::{from_be_bytes_minimal, to_be_bytes_minimal};
    use crypto_bigint::BoxedUint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, S>(
        map: &BTreeMap<K, BoxedUint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        S: Serializer,
    {
        map.iter()
            .map(|(k, v)| (k, to_be_bytes_minimal(v)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, BoxedUint>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let encoded = BTreeMap::<K, Vec<u8>>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(k, bytes)| {
                from_be_bytes_minimal(&bytes)
                    .map(|value| (k, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
