// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The internet checksum and a trait for headers which carry one.

/// Compute the [RFC 1071] internet checksum of `bytes`.
///
/// Sums the data as big-endian 16-bit words, folds the carries back in, and
/// complements the result. An odd trailing octet is treated as the high byte
/// of a final word whose low byte is zero.
///
/// A region whose checksum field already holds the correct value sums to
/// zero under this function.
///
/// [RFC 1071]: https://www.rfc-editor.org/rfc/rfc1071
#[must_use]
pub fn internet_checksum(bytes: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = bytes.chunks_exact(2);
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = words.remainder() {
        sum += u32::from(u16::from_be_bytes([*last, 0]));
    }
    while sum > 0xffff {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    #[allow(clippy::cast_possible_truncation)] // folded below 2^16 above
    let folded = sum as u16;
    !folded
}

/// Operations on a header which carries an internet checksum over its own octets.
pub trait Checksum {
    /// Read the checksum field as currently stored.
    fn checksum(&self) -> u16;

    /// Compute the checksum the header should carry.
    ///
    /// The stored checksum field is treated as zero for the computation, per
    /// RFC 791.
    fn compute_checksum(&self) -> u16;

    /// Write `checksum` into the checksum field. Validity is not checked.
    fn set_checksum(&mut self, checksum: u16) -> &mut Self;

    /// Recompute the checksum and store it.
    ///
    /// Afterwards [`Checksum::validate_checksum`] succeeds for the same
    /// header bytes.
    fn update_checksum(&mut self) -> &mut Self {
        let checksum = self.compute_checksum();
        self.set_checksum(checksum)
    }

    /// Check the stored checksum against the computed one.
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumMismatch`] carrying both values when they differ.
    fn validate_checksum(&self) -> Result<u16, ChecksumMismatch> {
        let expected = self.compute_checksum();
        let actual = self.checksum();
        if expected == actual {
            Ok(expected)
        } else {
            Err(ChecksumMismatch { expected, actual })
        }
    }
}

/// An error resulting from a checksum mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("checksum mismatch: expected {expected:#06x}, actual {actual:#06x}")]
pub struct ChecksumMismatch {
    /// The checksum the header octets require.
    pub expected: u16,
    /// The checksum the header stores.
    pub actual: u16,
}

#[cfg(test)]
mod test {
    use super::internet_checksum;

    #[test]
    fn empty_input() {
        assert_eq!(internet_checksum(&[]), 0xffff);
    }

    #[test]
    fn rfc1071_example() {
        // worked example from RFC 1071 section 3
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(internet_checksum(&data), !0xddf2);
    }

    #[test]
    fn odd_length_pads_low_byte() {
        // [0x12] sums as the word 0x1200
        assert_eq!(internet_checksum(&[0x12]), !0x1200);
    }

    #[test]
    fn valid_region_sums_to_zero() {
        let mut header = [
            0x45, 0x00, 0x00, 0x28, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        let checksum = internet_checksum(&header);
        header[10..12].copy_from_slice(&checksum.to_be_bytes());
        assert_eq!(internet_checksum(&header), 0);
    }

    #[test]
    fn checksum_round_trip_arbitrary_bytes() {
        bolero::check!().with_type().for_each(|data: &Vec<u8>| {
            // keep the checksum field word-aligned, as it is in real headers
            let mut region = data.clone();
            if region.len() % 2 == 1 {
                region.push(0);
            }
            region.extend_from_slice(&[0, 0]);
            let end = region.len();
            let checksum = internet_checksum(&region);
            region[end - 2..end].copy_from_slice(&checksum.to_be_bytes());
            assert_eq!(internet_checksum(&region), 0);
        });
    }
}
