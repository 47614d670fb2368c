use tracing::debug;
use crate::error::EncoderResult;
use crate::vpenc::coder::BoolEncoder;
use crate::vpenc::models::{ProbCounter, bit_cost};
use crate::vpenc::tree::TreeModel;
use super::data::*;
use super::tokens::{DCTToken, NUM_TOKENS};

pub type CoefCounts = [[[[u32; NUM_TOKENS]; 3]; 8]; 4];

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct VP8Models {
    pub coef_probs:         CoefProbs,
    pub mv_probs:           [MVProbs; 2],
}

impl VP8Models {
    pub fn new() -> Self {
        Self {
            coef_probs:     DEFAULT_COEF_PROBS,
            mv_probs:       DEFAULT_MV_PROBS,
        }
    }
    pub fn reset(&mut self) {
        self.coef_probs.copy_from_slice(&DEFAULT_COEF_PROBS);
        self.mv_probs.copy_from_slice(&DEFAULT_MV_PROBS);
    }
}

impl Default for VP8Models {
    fn default() -> Self { Self::new() }
}

/// Token statistics gathered during one frame.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct VP8ModelsStat {
    pub coef_counts:        CoefCounts,
}

impl VP8ModelsStat {
    pub fn new() -> Self {
        Self { coef_counts: [[[[0; NUM_TOKENS]; 3]; 8]; 4] }
    }
    pub fn reset(&mut self) {
        *self = Self::new();
    }
    pub fn is_empty(&self) -> bool {
        self.coef_counts.iter().flatten().flatten().flatten().all(|&c| c == 0)
    }
    /// Returns per-node decision counts for one coefficient context.
    pub fn branch_counts(&self, tree: &TreeModel<DCTToken>, plane: usize, band: usize, ctx: usize) -> EncoderResult<Vec<ProbCounter>> {
        let counts = &self.coef_counts[plane][band][ctx];
        let sym_counts: Vec<(DCTToken, u32)> = tree.symbols().map(|tok| (tok, counts[tok as usize])).collect();
        tree.branch_counts(&sym_counts)
    }
    /// Derives the probabilities best fitting the gathered statistics.
    ///
    /// Contexts without any decisions keep their current probabilities.
    pub fn refit_coef_probs(&self, tree: &TreeModel<DCTToken>, models: &VP8Models) -> EncoderResult<CoefProbs> {
        let mut probs = models.coef_probs;
        for (plane, plane_probs) in probs.iter_mut().enumerate() {
            for (band, band_probs) in plane_probs.iter_mut().enumerate() {
                for (ctx, ctx_probs) in band_probs.iter_mut().enumerate() {
                    let ctrs = self.branch_counts(tree, plane, band, ctx)?;
                    tree.update_probs(&ctrs, ctx_probs);
                }
            }
        }
        Ok(probs)
    }
}

impl Default for VP8ModelsStat {
    fn default() -> Self { Self::new() }
}

fn coef_update_savings(pc: &ProbCounter, old_prob: u8, new_prob: u8, upd_prob: u8) -> i64 {
    let old_b = i64::from(pc.branch_cost(old_prob));
    let new_b = i64::from(pc.branch_cost(new_prob));
    let update_b = 8 + ((i64::from(bit_cost(true, upd_prob)) - i64::from(bit_cost(false, upd_prob))) >> 8);
    old_b - new_b - update_b
}

/// Writes coefficient probability update flags and commits the updates that pay off.
///
/// Returns the number of updated probabilities.
pub fn write_coef_prob_updates(bc: &mut BoolEncoder, tree: &TreeModel<DCTToken>, models: &mut VP8Models, stat: &VP8ModelsStat, upd_probs: &CoefProbs) -> EncoderResult<usize> {
    let mut nupdates = 0;
    for plane in 0..4 {
        for band in 0..8 {
            for ctx in 0..3 {
                let ctrs = stat.branch_counts(tree, plane, band, ctx)?;
                for (node, pc) in ctrs.iter().enumerate() {
                    let upd_prob = upd_probs[plane][band][ctx][node];
                    let old_prob = models.coef_probs[plane][band][ctx][node];
                    let new_prob = pc.to_prob_or(old_prob);
                    if coef_update_savings(pc, old_prob, new_prob, upd_prob) > 0 {
                        bc.put_bool(true, upd_prob)?;
                        bc.put_byte(new_prob)?;
                        models.coef_probs[plane][band][ctx][node] = new_prob;
                        nupdates += 1;
                    } else {
                        bc.put_bool(false, upd_prob)?;
                    }
                }
            }
        }
    }
    debug!("coefficient probabilities updated: {}", nupdates);
    Ok(nupdates)
}

/// Writes coefficient probability update section without any updates.
pub fn write_no_coef_updates(bc: &mut BoolEncoder, upd_probs: &CoefProbs) -> EncoderResult<()> {
    for &upd_prob in upd_probs.iter().flatten().flatten().flatten() {
        bc.put_bool(false, upd_prob)?;
    }
    Ok(())
}
