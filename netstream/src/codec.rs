//! Value codec between typed values and stream buffers.
//!
//! ## Wire Format
//!
//! There is no envelope: the bytes on the wire are exactly the concatenation
//! of the pushed values, in push order.
//!
//! | Type | Encoding |
//! |------|----------|
//! | `u8`, `i8` | one byte |
//! | `u16`, `i16`, `u32`, `i32` | big-endian |
//! | `u64`, `i64` | two big-endian 32-bit halves, most significant first |
//! | `f32`, `f64` | big-endian IEEE-754 bit pattern |
//! | `str`, `String` | raw bytes, no terminator, no length prefix |
//! | `CStr`, `CString` | raw bytes followed by one zero byte |
//! | `[u8]`, `[u8; N]` | raw bytes |
//!
//! Strings decode by scanning to the next zero byte or the end of the
//! buffer, so a sender must terminate every string that is followed by more
//! data. `String` requires UTF-8; `CString` takes any bytes. An empty string at the end of the buffer and a missing terminator
//! are indistinguishable.

use std::ffi::{CStr, CString};

use crate::buffer::Buffer;
use crate::error::Result;

const _: () = assert!(size_of::<f32>() == size_of::<u32>());
const _: () = assert!(size_of::<f64>() == size_of::<u64>());

/// A value that can be pushed onto a send buffer.
pub trait Encode {
    /// Appends the wire representation of `self` to `buf`.
    fn encode(&self, buf: &mut Buffer);
}

/// A value that can be popped from a receive buffer.
pub trait Decode: Sized {
    /// Reads one value at the cursor and advances past it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`] when fewer bytes are buffered than the
    /// value needs.
    ///
    /// [`Error::Underrun`]: crate::Error::Underrun
    fn decode(buf: &mut Buffer) -> Result<Self>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, buf: &mut Buffer) {
        (**self).encode(buf);
    }
}

fn take<const N: usize>(buf: &mut Buffer) -> Result<[u8; N]> {
    let mut arr = [0u8; N];
    arr.copy_from_slice(buf.consume(N)?);
    Ok(arr)
}

macro_rules! impl_network_order {
    ($($ty:ty),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode(&self, buf: &mut Buffer) {
                buf.append(&self.to_be_bytes());
            }
        }

        impl Decode for $ty {
            fn decode(buf: &mut Buffer) -> Result<Self> {
                Ok(<$ty>::from_be_bytes(take(buf)?))
            }
        }
    )*};
}

impl_network_order!(u8, i8, u16, i16, u32, i32);

impl Encode for u64 {
    fn encode(&self, buf: &mut Buffer) {
        ((self >> 32) as u32).encode(buf);
        (*self as u32).encode(buf);
    }
}

impl Decode for u64 {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        // Take the full width up front so a short buffer consumes nothing.
        let [a, b, c, d, e, f, g, h] = take::<8>(buf)?;
        let hi = u32::from_be_bytes([a, b, c, d]);
        let lo = u32::from_be_bytes([e, f, g, h]);
        Ok((u64::from(hi) << 32) | u64::from(lo))
    }
}

impl Encode for i64 {
    fn encode(&self, buf: &mut Buffer) {
        (*self as u64).encode(buf);
    }
}

impl Decode for i64 {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        u64::decode(buf).map(|v| v as i64)
    }
}

impl Encode for f32 {
    fn encode(&self, buf: &mut Buffer) {
        self.to_bits().encode(buf);
    }
}

impl Decode for f32 {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        u32::decode(buf).map(f32::from_bits)
    }
}

impl Encode for f64 {
    fn encode(&self, buf: &mut Buffer) {
        self.to_bits().encode(buf);
    }
}

impl Decode for f64 {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        u64::decode(buf).map(f64::from_bits)
    }
}

impl Encode for str {
    fn encode(&self, buf: &mut Buffer) {
        buf.append(self.as_bytes());
    }
}

impl Encode for String {
    fn encode(&self, buf: &mut Buffer) {
        self.as_str().encode(buf);
    }
}

/// Invalid UTF-8 leaves the cursor where it was; pop a [`CString`] to read
/// the bytes anyway.
impl Decode for String {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        let unread = buf.unread();
        let end = unread.iter().position(|&b| b == 0).unwrap_or(unread.len());
        let text = String::from_utf8(unread[..end].to_vec())?;
        buf.consume_until_nul();
        Ok(text)
    }
}

impl Encode for CStr {
    fn encode(&self, buf: &mut Buffer) {
        buf.append(self.to_bytes_with_nul());
    }
}

impl Encode for CString {
    fn encode(&self, buf: &mut Buffer) {
        self.as_c_str().encode(buf);
    }
}

impl Decode for CString {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        let bytes = buf.consume_until_nul().to_vec();
        // SAFETY: `consume_until_nul` stops before the first zero byte.
        Ok(unsafe { CString::from_vec_unchecked(bytes) })
    }
}

impl Encode for [u8] {
    fn encode(&self, buf: &mut Buffer) {
        buf.append(self);
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, buf: &mut Buffer) {
        buf.append(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(buf: &mut Buffer) -> Result<Self> {
        take(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Moves everything pushed so far over to the receive side.
    fn loop_back(buf: &mut Buffer) {
        let sent = buf.pending().to_vec();
        buf.clear_pending();
        buf.extend_received(&sent);
    }

    fn encoded<T: Encode>(value: T) -> Vec<u8> {
        let mut buf = Buffer::new();
        value.encode(&mut buf);
        buf.pending().to_vec()
    }

    #[test]
    fn integers_are_big_endian() {
        assert_eq!(encoded(0x0102u16), [0x01, 0x02]);
        assert_eq!(encoded(0x0102_0304u32), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(
            encoded(0x0102_0304_0506_0708u64),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
        assert_eq!(encoded(-2i32), [0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(encoded(0x42u8), [0x42]);
    }

    #[test]
    fn floats_use_bit_patterns() {
        assert_eq!(encoded(1.0f32), [0x3f, 0x80, 0x00, 0x00]);
        assert_eq!(encoded(-2.0f64), [0xc0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn mixed_values_round_trip_in_order() {
        let mut buf = Buffer::new();
        0x1234i16.encode(&mut buf);
        0x1234_5678i32.encode(&mut buf);
        0x12_3456_7890i64.encode(&mut buf);
        std::f64::consts::PI.encode(&mut buf);
        (42.0f32 / 13.37).encode(&mut buf);
        u64::MAX.encode(&mut buf);
        loop_back(&mut buf);

        assert_eq!(i16::decode(&mut buf).unwrap(), 0x1234);
        assert_eq!(i32::decode(&mut buf).unwrap(), 0x1234_5678);
        assert_eq!(i64::decode(&mut buf).unwrap(), 0x12_3456_7890);
        assert_eq!(f64::decode(&mut buf).unwrap(), std::f64::consts::PI);
        assert_eq!(f32::decode(&mut buf).unwrap(), 42.0f32 / 13.37);
        assert_eq!(u64::decode(&mut buf).unwrap(), u64::MAX);
        assert!(buf.is_empty());
    }

    #[test]
    fn short_buffer_underruns_without_consuming() {
        let mut buf = Buffer::new();
        7u32.encode(&mut buf);
        loop_back(&mut buf);

        match u64::decode(&mut buf) {
            Err(Error::Underrun {
                requested,
                available,
            }) => {
                assert_eq!(requested, 8);
                assert_eq!(available, 4);
            }
            other => panic!("expected underrun, got {other:?}"),
        }
        assert_eq!(u32::decode(&mut buf).unwrap(), 7);
    }

    #[test]
    fn str_has_no_terminator() {
        assert_eq!(encoded("Hello"), b"Hello");
        assert_eq!(encoded(String::from("Hi")), b"Hi");
    }

    #[test]
    fn c_str_carries_terminator() {
        assert_eq!(encoded(c"Hello"), b"Hello\0");
        assert_eq!(encoded(CString::new("Hi").unwrap()), b"Hi\0");
    }

    #[test]
    fn string_decode_stops_at_nul() {
        let mut buf = Buffer::new();
        c"Hello, World!".encode(&mut buf);
        1u8.encode(&mut buf);
        loop_back(&mut buf);

        assert_eq!(String::decode(&mut buf).unwrap(), "Hello, World!");
        assert_eq!(u8::decode(&mut buf).unwrap(), 1);
    }

    #[test]
    fn invalid_utf8_string_consumes_nothing() {
        let mut buf = Buffer::new();
        [0xffu8, 0xfe, 0x00, 0x41].encode(&mut buf);
        loop_back(&mut buf);

        assert!(matches!(String::decode(&mut buf), Err(Error::Utf8(_))));
        assert_eq!(buf.size(), 4);

        let raw = CString::decode(&mut buf).unwrap();
        assert_eq!(raw.as_bytes(), [0xffu8, 0xfe]);
        assert_eq!(u8::decode(&mut buf).unwrap(), 0x41);
    }

    #[test]
    fn c_string_decode_runs_to_end_without_nul() {
        let mut buf = Buffer::new();
        "raw".encode(&mut buf);
        loop_back(&mut buf);

        assert_eq!(CString::decode(&mut buf).unwrap().as_bytes(), b"raw");
        assert!(buf.is_empty());
    }

    #[test]
    fn string_decode_runs_to_end_without_nul() {
        let mut buf = Buffer::new();
        "Hello".encode(&mut buf);
        loop_back(&mut buf);

        assert_eq!(String::decode(&mut buf).unwrap(), "Hello");
        assert_eq!(String::decode(&mut buf).unwrap(), "");
    }

    #[test]
    fn string_decode_rejects_invalid_utf8() {
        let mut buf = Buffer::new();
        [0xffu8, 0xfe, 0x00].encode(&mut buf);
        loop_back(&mut buf);

        assert!(matches!(String::decode(&mut buf), Err(Error::Utf8(_))));
    }

    #[test]
    fn byte_arrays_pass_through() {
        let mut buf = Buffer::new();
        [1u8, 2, 3].encode(&mut buf);
        (&[4u8, 5][..]).encode(&mut buf);
        loop_back(&mut buf);

        assert_eq!(<[u8; 5]>::decode(&mut buf).unwrap(), [1, 2, 3, 4, 5]);
    }
}
