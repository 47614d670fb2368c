use tracing::debug;
use crate::error::{EncoderError, EncoderResult};
use crate::vpenc::coder::BoolEncoder;

pub const MAX_PARTITIONS: usize = 8;

/// Independent token partitions of a frame.
///
/// Macroblock row `N` is coded into partition `N % num_partitions`.
pub struct TokenPartitions {
    coders: Vec<BoolEncoder>,
}

impl TokenPartitions {
    /// Creates `num` partitions (1, 2, 4 or 8), each bounded by `limit` bytes unless it is zero.
    pub fn new(num: usize, limit: usize) -> EncoderResult<Self> {
        if num == 0 || num > MAX_PARTITIONS || !num.is_power_of_two() {
            return Err(EncoderError::ContractViolation("invalid number of partitions"));
        }
        let coders = (0..num).map(|_| if limit > 0 { BoolEncoder::with_limit(limit) } else { BoolEncoder::new() }).collect();
        Ok(Self { coders })
    }
    pub fn num_partitions(&self) -> usize { self.coders.len() }
    pub fn coder_for_row(&mut self, mb_y: usize) -> &mut BoolEncoder {
        let idx = mb_y % self.coders.len();
        &mut self.coders[idx]
    }
    /// Flushes all partitions and returns their data in partition order.
    pub fn finish(self) -> EncoderResult<Vec<Vec<u8>>> {
        let mut parts = Vec::with_capacity(self.coders.len());
        for (i, bc) in self.coders.into_iter().enumerate() {
            let data = bc.flush()?;
            debug!("partition {} size {}", i, data.len());
            parts.push(data);
        }
        Ok(parts)
    }
}
