//! Binary/JSON encodings shared across the query modules: vectors as
//! little-endian f32 blobs, sector sets and tag sets as JSON arrays.

use std::collections::BTreeSet;

use openmemory_core::sector::Sector;
use openmemory_core::tenant::TenantId;
use openmemory_core::OpenMemoryResult;

use crate::to_storage_err;

/// System scope (`TenantId::SYSTEM`) has no string representation; store it
/// under this sentinel so `user_id` columns can stay `NOT NULL`.
pub const SYSTEM_TENANT_SENTINEL: &str = "__system__";

pub fn tenant_column(user_id: &TenantId) -> &str {
    user_id.as_str().unwrap_or(SYSTEM_TENANT_SENTINEL)
}

pub fn tenant_from_column(raw: &str) -> TenantId {
    if raw == SYSTEM_TENANT_SENTINEL {
        TenantId::SYSTEM
    } else {
        TenantId::user(raw)
    }
}

pub fn encode_vec_f32(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

pub fn decode_vec_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn encode_vec_i8(v: &[i8]) -> Vec<u8> {
    v.iter().map(|x| *x as u8).collect()
}

pub fn decode_vec_i8(bytes: &[u8]) -> Vec<i8> {
    bytes.iter().map(|b| *b as i8).collect()
}

pub fn encode_sector_set(sectors: &BTreeSet<Sector>) -> OpenMemoryResult<String> {
    let names: Vec<&str> = sectors.iter().map(|s| s.as_str()).collect();
    serde_json::to_string(&names).map_err(|e| to_storage_err(e.to_string()))
}

pub fn decode_sector_set(json: &str) -> OpenMemoryResult<BTreeSet<Sector>> {
    let names: Vec<String> =
        serde_json::from_str(json).map_err(|e| to_storage_err(e.to_string()))?;
    names
        .into_iter()
        .map(|n| {
            Sector::from_str_name(&n)
                .ok_or_else(|| to_storage_err(format!("unknown sector '{n}'")))
        })
        .collect()
}

pub fn encode_string_set(values: &BTreeSet<String>) -> OpenMemoryResult<String> {
    serde_json::to_string(values).map_err(|e| to_storage_err(e.to_string()))
}

pub fn decode_string_set(json: &str) -> OpenMemoryResult<BTreeSet<String>> {
    serde_json::from_str(json).map_err(|e| to_storage_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_vec_round_trips() {
        let v = vec![1.0_f32, -2.5, 0.0, 3.375];
        assert_eq!(decode_vec_f32(&encode_vec_f32(&v)), v);
    }

    #[test]
    fn sector_set_round_trips() {
        let mut set = BTreeSet::new();
        set.insert(Sector::Semantic);
        set.insert(Sector::Emotional);
        let json = encode_sector_set(&set).unwrap();
        assert_eq!(decode_sector_set(&json).unwrap(), set);
    }
}
