use tracing::debug;
use crate::error::{EncoderError, EncoderResult};
use crate::vpenc::coder::BoolEncoder;
use crate::vpenc::models::{ProbCounter, bit_cost};
use crate::vpenc::tree::{TreeModel, VPTreeWriter};
use super::data::*;

const MV_VALUES: usize = (MV_MAX as usize) * 2 + 1;

fn check_component(val: i16) -> EncoderResult<()> {
    if val < -MV_MAX || val > MV_MAX {
        Err(EncoderError::ContractViolation("motion vector component is out of range"))
    } else {
        Ok(())
    }
}

/// Motion vector component costs in 1/256 bits for all representable values.
#[derive(Clone,Debug,PartialEq)]
pub struct MVCostTable {
    costs:  [Vec<u32>; 2],
}

impl MVCostTable {
    fn new() -> Self {
        Self { costs: [vec![0; MV_VALUES], vec![0; MV_VALUES]] }
    }
    /// Returns the cost of a component value, `comp` is 0 for rows and 1 for columns.
    pub fn cost(&self, comp: usize, val: i16) -> EncoderResult<u32> {
        check_component(val)?;
        let costs = self.costs.get(comp).ok_or(EncoderError::ContractViolation("invalid MV component"))?;
        Ok(costs[(val + MV_MAX) as usize])
    }
    pub fn mv_cost(&self, row: i16, col: i16) -> EncoderResult<u32> {
        Ok(self.cost(0, row)? + self.cost(1, col)?)
    }
}

/// Motion vector component coder with per-frame statistics.
pub struct MVEntropyCoder {
    tree:   TreeModel<i16>,
    counts: [Vec<u32>; 2],
    costs:  MVCostTable,
}

impl MVEntropyCoder {
    pub fn new(probs: &[MVProbs; 2]) -> EncoderResult<Self> {
        let mut obj = Self {
            tree:   TreeModel::new(SMALL_MV_TREE),
            counts: [vec![0; MV_VALUES], vec![0; MV_VALUES]],
            costs:  MVCostTable::new(),
        };
        obj.rebuild_costs(probs)?;
        Ok(obj)
    }
    /// Writes a single motion vector component in coder units.
    pub fn encode_component(&self, bc: &mut BoolEncoder, val: i16, probs: &MVProbs) -> EncoderResult<()> {
        check_component(val)?;
        let aval = val.abs();
        if aval < MV_SHORT_COUNT {
            bc.put_bool(false, probs[MVP_IS_SHORT])?;
            bc.write_symbol(&self.tree, &probs[MVP_SHORT..MVP_BITS], aval)?;
            if aval == 0 {
                return Ok(());
            }
        } else {
            bc.put_bool(true, probs[MVP_IS_SHORT])?;
            for &ord in MV_LONG_BIT_ORDER.iter() {
                bc.put_bool(((aval >> ord) & 1) != 0, probs[MVP_BITS + ord])?;
            }
            if (aval & !0xF) != 0 {
                bc.put_bool((aval & (1 << 3)) != 0, probs[MVP_BITS + 3])?;
            }
        }
        bc.put_bool(val < 0, probs[MVP_SIGN])
    }
    /// Returns the cost of a component without the sign, in 1/256 bits.
    fn magnitude_cost(&self, aval: i16, probs: &MVProbs) -> EncoderResult<u32> {
        if aval < MV_SHORT_COUNT {
            Ok(bit_cost(false, probs[MVP_IS_SHORT]) + self.tree.cost(aval, &probs[MVP_SHORT..MVP_BITS])?)
        } else {
            let mut cost = bit_cost(true, probs[MVP_IS_SHORT]);
            for &ord in MV_LONG_BIT_ORDER.iter() {
                cost += bit_cost(((aval >> ord) & 1) != 0, probs[MVP_BITS + ord]);
            }
            if (aval & !0xF) != 0 {
                cost += bit_cost((aval & (1 << 3)) != 0, probs[MVP_BITS + 3]);
            }
            Ok(cost)
        }
    }
    /// Calculates the cost of coding a component, in 1/256 bits.
    pub fn cost_component(&self, val: i16, probs: &MVProbs) -> EncoderResult<u32> {
        check_component(val)?;
        let cost = self.magnitude_cost(val.abs(), probs)?;
        Ok(if val != 0 { cost + bit_cost(val < 0, probs[MVP_SIGN]) } else { cost })
    }
    pub fn add_count(&mut self, comp: usize, val: i16) -> EncoderResult<()> {
        check_component(val)?;
        self.counts[comp][(val + MV_MAX) as usize] += 1;
        Ok(())
    }
    /// Writes both motion vector components and records them for the probability refit.
    pub fn encode_mv(&mut self, bc: &mut BoolEncoder, row: i16, col: i16, probs: &[MVProbs; 2]) -> EncoderResult<()> {
        self.encode_component(bc, row, &probs[0])?;
        self.encode_component(bc, col, &probs[1])?;
        self.add_count(0, row)?;
        self.add_count(1, col)
    }
    pub fn reset_counts(&mut self) {
        for comp in self.counts.iter_mut() {
            for el in comp.iter_mut() { *el = 0; }
        }
    }
    pub fn counts(&self) -> &[Vec<u32>; 2] { &self.counts }
    /// Replaces gathered statistics with previously saved ones.
    pub fn restore_counts(&mut self, counts: &[Vec<u32>; 2]) -> EncoderResult<()> {
        for (dst, src) in self.counts.iter_mut().zip(counts.iter()) {
            if src.len() != MV_VALUES {
                return Err(EncoderError::ContractViolation("wrong MV histogram size"));
            }
            dst.copy_from_slice(src);
        }
        Ok(())
    }
    pub fn costs(&self) -> &MVCostTable { &self.costs }
    pub fn rebuild_costs(&mut self, probs: &[MVProbs; 2]) -> EncoderResult<()> {
        let mv_max = MV_MAX as usize;
        for (comp, cprobs) in probs.iter().enumerate() {
            for aval in 0..=MV_MAX {
                let cost = self.magnitude_cost(aval, cprobs)?;
                let apos = aval as usize;
                if aval == 0 {
                    self.costs.costs[comp][mv_max] = cost;
                } else {
                    self.costs.costs[comp][mv_max + apos] = cost + bit_cost(false, cprobs[MVP_SIGN]);
                    self.costs.costs[comp][mv_max - apos] = cost + bit_cost(true,  cprobs[MVP_SIGN]);
                }
            }
        }
        Ok(())
    }
    /// Refits MV probabilities to the gathered statistics, writes the update section and
    /// rebuilds the cost tables if anything changed.
    ///
    /// Statistics are cleared afterwards.
    pub fn refit_and_write_probabilities(&mut self, bc: &mut BoolEncoder, probs: &mut [MVProbs; 2]) -> EncoderResult<bool> {
        let mut changed = false;
        for comp in 0..2 {
            let nupd = write_component_updates(bc, &self.tree, &self.counts[comp], &mut probs[comp], &MV_UPDATE_PROBS[comp])?;
            debug!("MV component {} probabilities updated: {}", comp, nupd);
            changed |= nupd > 0;
        }
        if changed {
            self.rebuild_costs(probs)?;
        }
        self.reset_counts();
        Ok(changed)
    }
    /// Writes MV probability update section without any updates.
    pub fn write_no_updates(&self, bc: &mut BoolEncoder) -> EncoderResult<()> {
        for &upd_prob in MV_UPDATE_PROBS.iter().flatten() {
            bc.put_bool(false, upd_prob)?;
        }
        Ok(())
    }
}

/// Per-node decision counts of one component histogram, in MV probability order.
fn component_branch_counts(tree: &TreeModel<i16>, counts: &[u32]) -> EncoderResult<[ProbCounter; 19]> {
    if counts.len() != MV_VALUES {
        return Err(EncoderError::ContractViolation("wrong MV histogram size"));
    }
    let mut ctrs = [ProbCounter::default(); 19];
    let mut short_counts = [0u32; MV_SHORT_COUNT as usize];
    let mv_max = MV_MAX as usize;
    short_counts[0] = counts[mv_max];
    ctrs[MVP_IS_SHORT].add_n(false, counts[mv_max]);
    for aval in 1..=mv_max {
        let pos = counts[mv_max + aval];
        let neg = counts[mv_max - aval];
        let cnt = pos + neg;
        ctrs[MVP_SIGN].add_n(false, pos);
        ctrs[MVP_SIGN].add_n(true, neg);
        if aval < (MV_SHORT_COUNT as usize) {
            ctrs[MVP_IS_SHORT].add_n(false, cnt);
            short_counts[aval] += cnt;
        } else {
            ctrs[MVP_IS_SHORT].add_n(true, cnt);
            for bit in 0..MV_LONG_BITS {
                ctrs[MVP_BITS + bit].add_n(((aval >> bit) & 1) != 0, cnt);
            }
        }
    }
    let sym_counts: Vec<(i16, u32)> = short_counts.iter().enumerate().map(|(val, &cnt)| (val as i16, cnt)).collect();
    let short_ctrs = tree.branch_counts(&sym_counts)?;
    ctrs[MVP_SHORT..MVP_BITS].copy_from_slice(&short_ctrs);
    Ok(ctrs)
}

/// Writes update flags for one motion vector component and commits the updates that pay off.
///
/// Returns the number of updated probabilities.
pub fn write_component_updates(bc: &mut BoolEncoder, tree: &TreeModel<i16>, counts: &[u32], probs: &mut MVProbs, upd_probs: &MVProbs) -> EncoderResult<usize> {
    let ctrs = component_branch_counts(tree, counts)?;
    let mut nupdates = 0;
    for ((pc, prob), &upd_prob) in ctrs.iter().zip(probs.iter_mut()).zip(upd_probs.iter()) {
        let new_prob = pc.to_prob7_or(*prob);
        let cur_b = i64::from(pc.branch_cost(*prob));
        let new_b = i64::from(pc.branch_cost(new_prob));
        let overhead = 6 + ((i64::from(bit_cost(true, upd_prob)) - i64::from(bit_cost(false, upd_prob)) + 128) >> 8);
        if cur_b - new_b > overhead {
            bc.put_bool(true, upd_prob)?;
            bc.put_probability(new_prob)?;
            *prob = new_prob;
            nupdates += 1;
        } else {
            bc.put_bool(false, upd_prob)?;
        }
    }
    Ok(nupdates)
}
