//! Read capability over the host's address space.
//!
//! Decoders never touch a global: they take a `&dyn Memory`. The live host
//! implements it during capture; [`MemoryImage`] implements it for tests and
//! recorded sessions.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Size of the addressable space
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// Read-only view of the host's memory
pub trait Memory {
    /// Byte at an address
    fn read(&self, addr: u16) -> u8;
}

/// `N` consecutive bytes from `base`, wrapping at the top of memory
pub fn read_array<const N: usize>(mem: &(impl Memory + ?Sized), base: u16) -> [u8; N] {
    let mut out = [0u8; N];
    for (i, cell) in out.iter_mut().enumerate() {
        // Offsets stay below 0x10000: the largest table is 121 bytes.
        *cell = mem.read(base.wrapping_add(i as u16));
    }
    out
}

/// Owned copy of the full 64 KiB address space
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryImage {
    bytes: Box<[u8]>,
}

impl MemoryImage {
    /// All-zero image
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; ADDRESS_SPACE].into_boxed_slice(),
        }
    }

    /// Write one byte
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[usize::from(addr)] = value;
    }

    /// Write a run of bytes starting at `base`, wrapping at the top of memory
    pub fn write_slice(&mut self, base: u16, values: &[u8]) {
        for (i, &v) in values.iter().enumerate() {
            self.write(base.wrapping_add(i as u16), v);
        }
    }

    /// Builder form of [`write`](Self::write)
    #[must_use]
    pub fn with(mut self, addr: u16, value: u8) -> Self {
        self.write(addr, value);
        self
    }

    /// Builder form of [`write_slice`](Self::write_slice)
    #[must_use]
    pub fn with_slice(mut self, base: u16, values: &[u8]) -> Self {
        self.write_slice(base, values);
        self
    }

    /// Non-zero runs as `(start, bytes)`, in address order
    #[must_use]
    pub fn patches(&self) -> Vec<(u16, Vec<u8>)> {
        let mut out: Vec<(u16, Vec<u8>)> = Vec::new();
        let mut open = false;
        for (addr, &b) in self.bytes.iter().enumerate() {
            if b == 0 {
                open = false;
                continue;
            }
            match out.last_mut() {
                Some((_, bytes)) if open => bytes.push(b),
                _ => out.push((addr as u16, vec![b])),
            }
            open = true;
        }
        out
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for MemoryImage {
    fn read(&self, addr: u16) -> u8 {
        self.bytes[usize::from(addr)]
    }
}

impl fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryImage")
            .field("patches", &self.patches().len())
            .finish()
    }
}

/// Parse a `0xABCD` address key
pub fn parse_address(key: &str) -> Option<u16> {
    let digits = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X"))?;
    u16::from_str_radix(digits, 16).ok()
}

impl Serialize for MemoryImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let patches: BTreeMap<String, String> = self
            .patches()
            .into_iter()
            .map(|(addr, bytes)| (format!("0x{:04X}", addr), hex::encode(bytes)))
            .collect();
        patches.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MemoryImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let patches = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut image = Self::new();
        for (key, data) in patches {
            let addr = parse_address(&key)
                .ok_or_else(|| D::Error::custom(format!("invalid address: {}", key)))?;
            let bytes = hex::decode(&data).map_err(D::Error::custom)?;
            if usize::from(addr) + bytes.len() > ADDRESS_SPACE {
                return Err(D::Error::custom(format!("patch at {} runs past 0xFFFF", key)));
            }
            image.write_slice(addr, &bytes);
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_array() {
        let mem = MemoryImage::new().with_slice(0x594, &[1, 2, 3, 4, 5, 6, 7]);
        let dynamic: &dyn Memory = &mem;
        let hand: [u8; 7] = read_array(dynamic, 0x594);
        assert_eq!(hand, [1, 2, 3, 4, 5, 6, 7]);
        let again: [u8; 3] = read_array(dynamic, 0x595);
        assert_eq!(again, [2, 3, 4]);
    }

    #[test]
    fn test_read_array_wraps() {
        let mem = MemoryImage::new().with(0xFFFF, 7).with(0x0000, 8);
        let cells: [u8; 2] = read_array(&mem, 0xFFFF);
        assert_eq!(cells, [7, 8]);
    }

    #[test]
    fn test_patches_split_on_zero() {
        let mem = MemoryImage::new()
            .with_slice(0x10, &[1, 2])
            .with(0x20, 9)
            .with(0xFFFF, 4);
        assert_eq!(
            mem.patches(),
            vec![(0x10, vec![1, 2]), (0x20, vec![9]), (0xFFFF, vec![4])]
        );
    }

    #[test]
    fn test_json_patches() {
        let mem = MemoryImage::new().with_slice(0x5BB, &[0x32, 0xC9]);
        let json = serde_json::to_string(&mem).unwrap();
        assert_eq!(json, r#"{"0x05BB":"32c9"}"#);

        let back: MemoryImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mem);
    }

    #[test]
    fn test_json_rejects_bad_address() {
        let result: Result<MemoryImage, _> = serde_json::from_str(r#"{"5BB":"01"}"#);
        assert!(result.is_err());
        let result: Result<MemoryImage, _> = serde_json::from_str(r#"{"0xFFFF":"0102"}"#);
        assert!(result.is_err());
    }
}
