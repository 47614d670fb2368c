use tracing::{trace, warn};
use crate::error::{EncoderError, EncoderResult};

/// Binary range coder producing VP8 bool-coded data.
///
/// The encoder owns its output buffer. Pending carries are resolved in place on already written
/// bytes so the output matches what the reference encoder produces bit for bit.
pub struct BoolEncoder {
    dst:    Vec<u8>,
    limit:  Option<usize>,
    low:    u32,
    range:  u32,
    count:  i32,
    shifts: u64,
}

impl BoolEncoder {
    pub fn new() -> Self {
        Self {
            dst:    Vec::new(),
            limit:  None,
            low:    0,
            range:  255,
            count:  -24,
            shifts: 0,
        }
    }
    /// Creates an encoder that fails with [`StreamOverrun`] instead of writing more than `limit` bytes.
    ///
    /// [`StreamOverrun`]: ../../error/enum.EncoderError.html#variant.StreamOverrun
    pub fn with_limit(limit: usize) -> Self {
        let mut enc = Self::new();
        enc.limit = Some(limit);
        enc
    }
    pub fn put_bool(&mut self, bit: bool, prob: u8) -> EncoderResult<()> {
        if prob == 0 {
            return Err(EncoderError::ContractViolation("zero probability"));
        }
        let split = 1 + (((self.range - 1) * u32::from(prob)) >> 8);
        if bit {
            self.low   += split;
            self.range -= split;
        } else {
            self.range  = split;
        }

        let mut shift = self.range.leading_zeros() as i32 - 24;
        self.range <<= shift;
        self.count  += shift;
        self.shifts += shift as u64;
        if self.count >= 0 {
            let offset = shift - self.count;
            if ((self.low << (offset - 1)) & 0x8000_0000) != 0 {
                self.propagate_carry()?;
            }
            self.write_byte((self.low >> (24 - offset)) as u8)?;
            self.low <<= offset;
            shift = self.count;
            self.low &= 0xFF_FFFF;
            self.count -= 8;
        }
        self.low <<= shift;
        Ok(())
    }
    fn propagate_carry(&mut self) -> EncoderResult<()> {
        let mut pos = self.dst.len();
        while pos > 0 && self.dst[pos - 1] == 0xFF {
            self.dst[pos - 1] = 0;
            pos -= 1;
        }
        if pos == 0 {
            return Err(EncoderError::Bug);
        }
        self.dst[pos - 1] += 1;
        trace!("carry propagated over {} bytes", self.dst.len() - pos + 1);
        Ok(())
    }
    fn write_byte(&mut self, b: u8) -> EncoderResult<()> {
        if let Some(limit) = self.limit {
            if self.dst.len() >= limit {
                warn!("bool coder output exceeds {} bytes", limit);
                return Err(EncoderError::StreamOverrun { limit });
            }
        }
        self.dst.push(b);
        Ok(())
    }
    /// Writes `len` bits of `val` starting from the most significant one, each with probability 128.
    pub fn put_bits(&mut self, val: u32, len: u8) -> EncoderResult<()> {
        if len > 32 {
            return Err(EncoderError::ContractViolation("literal is longer than 32 bits"));
        }
        for i in (0..len).rev() {
            self.put_bool(((val >> i) & 1) != 0, 128)?;
        }
        Ok(())
    }
    pub fn put_byte(&mut self, val: u8) -> EncoderResult<()> {
        self.put_bits(u32::from(val), 8)
    }
    /// Writes a probability in the 7-bit form used by MV probability updates.
    pub fn put_probability(&mut self, prob: u8) -> EncoderResult<()> {
        self.put_bits(u32::from(prob >> 1), 7)
    }
    /// Returns the number of bits the coder has consumed so far.
    ///
    /// The difference between two calls is the actual size of everything coded in between.
    pub fn bit_pos(&self) -> u64 { self.shifts }
    /// Returns the number of bytes written to the output so far.
    pub fn tell(&self) -> usize { self.dst.len() }
    /// Pads the stream so the decoder can read the last symbol and returns the coded data.
    pub fn flush(mut self) -> EncoderResult<Vec<u8>> {
        for _ in 0..32 {
            self.put_bool(false, 128)?;
        }
        Ok(self.dst)
    }
}

impl Default for BoolEncoder {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vpenc::testdec::BoolDecoder;
    use nanorand::RNG;

    #[test]
    fn test_bool_roundtrip() {
        let mut rng = nanorand::WyRand::new_seed(42);
        let mut syms = Vec::with_capacity(20000);
        for _ in 0..20000 {
            let prob = ((rng.generate::<u32>() % 255) + 1) as u8;
            let bit = (rng.generate::<u32>() & 0xFF) >= u32::from(prob);
            syms.push((bit, prob));
        }
        let mut bc = BoolEncoder::new();
        for &(bit, prob) in syms.iter() {
            bc.put_bool(bit, prob).unwrap();
        }
        bc.put_bits(0x2A5, 10).unwrap();
        bc.put_probability(200).unwrap();
        let data = bc.flush().unwrap();

        let mut br = BoolDecoder::new(&data);
        for (i, &(bit, prob)) in syms.iter().enumerate() {
            assert_eq!(br.read_prob(prob), bit, "symbol {}", i);
        }
        assert_eq!(br.read_bits(10), 0x2A5);
        assert_eq!(br.read_probability(), 200);
    }
    #[test]
    fn test_extreme_probs() {
        let mut bc = BoolEncoder::new();
        for i in 0..3000 {
            bc.put_bool((i % 3) == 0, 1).unwrap();
            bc.put_bool((i % 5) != 0, 255).unwrap();
        }
        let data = bc.flush().unwrap();
        let mut br = BoolDecoder::new(&data);
        for i in 0..3000 {
            assert_eq!(br.read_prob(1), (i % 3) == 0);
            assert_eq!(br.read_prob(255), (i % 5) != 0);
        }
    }
    #[test]
    fn test_carry_propagation() {
        let mut bc = BoolEncoder::new();
        bc.dst   = vec![0x10, 0xFE, 0xFF, 0xFF];
        bc.low   = 0x7FFF_FF80;
        bc.range = 255;
        bc.count = -1;
        bc.put_bool(true, 128).unwrap();
        assert_eq!(bc.dst, [0x10, 0xFF, 0x00, 0x00, 0x00]);
        assert_eq!(bc.range, 254);
        assert_eq!(bc.count, -8);
        assert_eq!(bc.low, 0);
    }
    #[test]
    fn test_carry_from_coded_symbols() {
        // keeps the interval just below 0x1100_0000 until 10 FE FF FF has been written
        let mut syms = Vec::new();
        syms.extend_from_slice(&[(false, 128); 3]);
        syms.push((true, 128));
        syms.extend_from_slice(&[(false, 128); 4]);
        syms.extend_from_slice(&[(true, 128); 7]);
        syms.push((true, 96));
        for _ in 0..8 {
            syms.extend_from_slice(&[(false, 128), (false, 128), (true, 128), (true, 128)]);
        }
        syms.push((false, 128));

        let mut bc = BoolEncoder::new();
        for &(bit, prob) in syms.iter() {
            bc.put_bool(bit, prob).unwrap();
        }
        assert_eq!(bc.dst, [0x10, 0xFE, 0xFF, 0xFF]);
        syms.push((true, 255));
        bc.put_bool(true, 255).unwrap();
        assert_eq!(bc.dst, [0x10, 0xFE, 0xFF, 0xFF]);
        syms.push((false, 128));
        bc.put_bool(false, 128).unwrap();
        assert_eq!(bc.dst, [0x10, 0xFF, 0x00, 0x00, 0x00]);

        let data = bc.flush().unwrap();
        let mut br = BoolDecoder::new(&data);
        for (i, &(bit, prob)) in syms.iter().enumerate() {
            assert_eq!(br.read_prob(prob), bit, "symbol {}", i);
        }
    }
    #[test]
    fn test_carry_without_base() {
        let mut bc = BoolEncoder::new();
        bc.dst   = vec![0xFF, 0xFF];
        bc.low   = 0x7FFF_FF80;
        bc.count = -1;
        assert_eq!(bc.put_bool(true, 128), Err(EncoderError::Bug));
    }
    #[test]
    fn test_overrun() {
        let mut bc = BoolEncoder::with_limit(4);
        let mut ret = Ok(());
        for _ in 0..100 {
            ret = bc.put_bits(0x5A, 8);
            if ret.is_err() {
                break;
            }
        }
        assert_eq!(ret, Err(EncoderError::StreamOverrun { limit: 4 }));
        assert_eq!(bc.tell(), 4);
    }
    #[test]
    fn test_zero_prob() {
        let mut bc = BoolEncoder::new();
        assert!(matches!(bc.put_bool(false, 0), Err(EncoderError::ContractViolation(_))));
    }
    #[test]
    fn test_bit_pos() {
        let mut bc = BoolEncoder::new();
        bc.put_bits(0x9234, 16).unwrap();
        assert_eq!(bc.bit_pos(), 16);
        assert_eq!(bc.tell(), 0);
        bc.put_bits(0xFF, 8).unwrap();
        assert_eq!(bc.tell(), 1);
        let data = bc.flush().unwrap();
        assert_eq!(data.len(), 5);
    }
}
