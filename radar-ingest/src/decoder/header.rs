use super::constants::{HEADER_LEN, MAGIC_WORD};

/// Parsed frame header. Transient: it exists only for the duration of one
/// [`super::decode_buffer`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u32,
    pub total_packet_len: u32,
    pub platform: u32,
    pub frame_number: u32,
    pub time_cpu_cycles: u32,
    pub num_detected_obj: u32,
    pub num_tlvs: u32,
    pub subframe_number: u32,
}

impl FrameHeader {
    /// Parse a header from a slice that is known to start with the magic
    /// sentinel. Returns `None` if fewer than [`HEADER_LEN`] bytes are
    /// available.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN || buf[..MAGIC_WORD.len()] != MAGIC_WORD {
            return None;
        }
        let u32_at = |offset: usize| -> u32 {
            u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
        };
        Some(FrameHeader {
            version: u32_at(8),
            total_packet_len: u32_at(12),
            platform: u32_at(16),
            frame_number: u32_at(20),
            time_cpu_cycles: u32_at(24),
            num_detected_obj: u32_at(28),
            num_tlvs: u32_at(32),
            subframe_number: u32_at(36),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_short_buffer() {
        let mut buf = MAGIC_WORD.to_vec();
        buf.extend_from_slice(&[0u8; 10]);
        assert!(FrameHeader::parse(&buf).is_none());
    }

    #[test]
    fn parse_rejects_missing_magic() {
        let buf = [0xFFu8; HEADER_LEN];
        assert!(FrameHeader::parse(&buf).is_none());
    }

    #[test]
    fn parse_reads_fields_little_endian() {
        let mut buf = MAGIC_WORD.to_vec();
        buf.extend_from_slice(&1u32.to_le_bytes()); // version
        buf.extend_from_slice(&100u32.to_le_bytes()); // total_packet_len
        buf.extend_from_slice(&18u32.to_le_bytes()); // platform
        buf.extend_from_slice(&42u32.to_le_bytes()); // frame_number
        buf.extend_from_slice(&7u32.to_le_bytes()); // time_cpu_cycles
        buf.extend_from_slice(&1u32.to_le_bytes()); // num_detected_obj
        buf.extend_from_slice(&1u32.to_le_bytes()); // num_tlvs
        buf.extend_from_slice(&0u32.to_le_bytes()); // subframe_number
        let header = FrameHeader::parse(&buf).unwrap();
        assert_eq!(header.frame_number, 42);
        assert_eq!(header.num_detected_obj, 1);
        assert_eq!(header.num_tlvs, 1);
    }
}
