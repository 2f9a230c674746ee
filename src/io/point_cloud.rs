//! Raw singular-point output of an extraction pass.
//!
//! Layout, little-endian:
//!
//! ```text
//! i32            point count N
//! f32 × 3 × N    x, y, z of each point
//! ```

use std::fs;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::vortex_error::VortexError;

const HEADER_LEN: usize = std::mem::size_of::<i32>();

/// One point as laid out in the file body.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct WirePoint {
    pub xyz: [f32; 3],
}

/// Flat list of zero-crossing positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<[f32; 3]>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    #[inline]
    pub fn push(&mut self, p: [f64; 3]) {
        self.points.push([p[0] as f32, p[1] as f32, p[2] as f32]);
    }

    /// Serialize to the count + xyz layout.
    pub fn encode(&self) -> Result<Bytes, VortexError> {
        let n = i32::try_from(self.points.len()).map_err(|_| {
            VortexError::PointCloudFormat(format!("{} points exceed the i32 count", self.len()))
        })?;
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.len() * size_of::<WirePoint>());
        buf.put_i32_le(n);
        if cfg!(target_endian = "little") {
            let wire: &[WirePoint] = bytemuck::cast_slice(self.points.as_slice());
            buf.put_slice(bytemuck::cast_slice(wire));
        } else {
            for p in &self.points {
                p.iter().for_each(|&c| buf.put_f32_le(c));
            }
        }
        Ok(buf.freeze())
    }

    /// Parse the count + xyz layout; trailing or missing bytes are errors.
    pub fn decode(mut bytes: &[u8]) -> Result<Self, VortexError> {
        if bytes.len() < HEADER_LEN {
            return Err(VortexError::PointCloudFormat(format!(
                "expected at least {HEADER_LEN} header bytes, got {}",
                bytes.len()
            )));
        }
        let n = bytes.get_i32_le();
        let n = usize::try_from(n)
            .map_err(|_| VortexError::PointCloudFormat(format!("negative point count {n}")))?;
        let expected = n * size_of::<WirePoint>();
        if bytes.remaining() != expected {
            return Err(VortexError::PointCloudFormat(format!(
                "expected {expected} body bytes for {n} points, got {}",
                bytes.remaining()
            )));
        }
        let mut points = Vec::with_capacity(n);
        for _ in 0..n {
            points.push([bytes.get_f32_le(), bytes.get_f32_le(), bytes.get_f32_le()]);
        }
        Ok(Self { points })
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), VortexError> {
        let path = path.as_ref();
        fs::write(path, self.encode()?)?;
        log::debug!("wrote {} singular points to {}", self.len(), path.display());
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, VortexError> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }
}

impl FromIterator<[f64; 3]> for PointCloud {
    fn from_iter<I: IntoIterator<Item = [f64; 3]>>(iter: I) -> Self {
        let mut cloud = PointCloud::new();
        for p in iter {
            cloud.push(p);
        }
        cloud
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn sample() -> PointCloud {
        [[0.5, -1.0, 2.25], [3.0, 4.0, 5.0]].into_iter().collect()
    }

    #[test]
    fn encoded_layout_is_count_then_xyz() {
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 12);
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2.25f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &5.0f32.to_le_bytes());
        assert_eq!(PointCloud::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn empty_cloud_is_just_a_zero_count() {
        let bytes = PointCloud::new().encode().unwrap();
        assert_eq!(&bytes[..], &0i32.to_le_bytes());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(PointCloud::decode(&[1, 0]).is_err());
        assert!(PointCloud::decode(&(-1i32).to_le_bytes()).is_err());
        let mut bytes = sample().encode().unwrap().to_vec();
        bytes.pop();
        assert!(matches!(
            PointCloud::decode(&bytes),
            Err(VortexError::PointCloudFormat(_))
        ));
    }

    #[test]
    #[serial]
    fn file_roundtrip() {
        let path = std::env::temp_dir().join("vortex_sieve_point_cloud_roundtrip.bin");
        sample().write_to_path(&path).unwrap();
        assert_eq!(PointCloud::read_from_path(&path).unwrap(), sample());
        std::fs::remove_file(&path).unwrap();
    }
}
