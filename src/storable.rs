//! Fixed-size byte codec for record value types
//!
//! Every type stored in a [`RecordStore`](crate::RecordStore) encodes to
//! exactly [`Storable::SIZE`] bytes, little-endian. The persisted layout
//! is therefore stable across builds as long as the value type does not
//! change.

/// A value with a fixed-size little-endian byte encoding.
///
/// `put` and `take` operate on the leading `SIZE` bytes of the given
/// slice; callers size the buffers.
pub trait Storable: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Encode into `buf[..SIZE]`.
    fn put(&self, buf: &mut [u8]);

    /// Decode from `buf[..SIZE]`.
    fn take(buf: &[u8]) -> Self;
}

macro_rules! storable_le {
    ($($ty:ty),* $(,)?) => {$(
        impl Storable for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn put(&self, buf: &mut [u8]) {
                buf[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
            }

            fn take(buf: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&buf[..Self::SIZE]);
                <$ty>::from_le_bytes(raw)
            }
        }
    )*};
}

storable_le!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Storable for bool {
    const SIZE: usize = 1;

    fn put(&self, buf: &mut [u8]) {
        buf[0] = *self as u8;
    }

    fn take(buf: &[u8]) -> Self {
        buf[0] != 0
    }
}

impl<const N: usize> Storable for [u8; N] {
    const SIZE: usize = N;

    fn put(&self, buf: &mut [u8]) {
        buf[..N].copy_from_slice(self);
    }

    fn take(buf: &[u8]) -> Self {
        let mut raw = [0u8; N];
        raw.copy_from_slice(&buf[..N]);
        raw
    }
}
