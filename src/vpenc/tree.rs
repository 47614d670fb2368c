use crate::error::{EncoderError, EncoderResult};
use super::coder::BoolEncoder;
use super::models::{ProbCounter, bit_cost};

/// Binary tree definition entry.
///
/// Trees are stored as pairs of entries, the pair starting at index `2 * n` describes both
/// branches of node `n` and node `n` uses probability `n`.
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum VPTreeDef<T: Copy> {
    Index(u8),
    Value(T),
}

/// Path to a tree leaf, most significant bit first.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct TreeCode {
    pub bits:   u32,
    pub len:    u8,
}

impl TreeCode {
    fn push(self, bit: bool) -> Self {
        Self { bits: (self.bits << 1) | (bit as u32), len: self.len + 1 }
    }
    pub fn bit(self, i: u8) -> bool {
        ((self.bits >> (self.len - 1 - i)) & 1) != 0
    }
    /// Returns the code with the first `n` decisions removed.
    pub fn tail(self, n: u8) -> Self {
        let len = self.len.saturating_sub(n);
        Self { bits: self.bits & ((1u32 << len) - 1), len }
    }
}

fn walk_tree<T: Copy, F: FnMut(usize, bool) -> EncoderResult<()>>(tree: &[VPTreeDef<T>], code: TreeCode, start: usize, mut f: F) -> EncoderResult<()> {
    if code.len == 0 {
        return Err(EncoderError::ContractViolation("empty tree code"));
    }
    let mut idx = start;
    for i in 0..code.len {
        let bit = code.bit(i);
        f(idx >> 1, bit)?;
        let last = i + 1 == code.len;
        match tree.get(idx + (bit as usize)) {
            Some(VPTreeDef::Index(ix)) if !last => { idx = *ix as usize; },
            Some(VPTreeDef::Value(_)) if last => {},
            _ => return Err(EncoderError::ContractViolation("code does not match the tree")),
        };
    }
    Ok(())
}

fn node_prob(probs: &[u8], node: usize) -> EncoderResult<u8> {
    match probs.get(node) {
        Some(&prob) if prob != 0 => Ok(prob),
        Some(_) => Err(EncoderError::ContractViolation("zero probability")),
        None => Err(EncoderError::ContractViolation("too few probabilities for the tree")),
    }
}

/// Calculates the cost of coding `code` starting from tree position `start`, in 1/256 bits.
pub fn tree_cost<T: Copy>(tree: &[VPTreeDef<T>], probs: &[u8], code: TreeCode, start: usize) -> EncoderResult<u32> {
    let mut cost = 0;
    walk_tree(tree, code, start, |node, bit| {
            cost += bit_cost(bit, node_prob(probs, node)?);
            Ok(())
        })?;
    Ok(cost)
}

/// Fixed tree topology with precomputed leaf codes.
pub struct TreeModel<T: Copy + PartialEq + 'static> {
    tree:   &'static [VPTreeDef<T>],
    codes:  Vec<(T, TreeCode)>,
}

impl<T: Copy + PartialEq + 'static> TreeModel<T> {
    pub fn new(tree: &'static [VPTreeDef<T>]) -> Self {
        let mut codes = Vec::new();
        let mut stack = vec![(0usize, TreeCode::default())];
        while let Some((idx, code)) = stack.pop() {
            for bit in (0..2).rev() {
                let ncode = code.push(bit != 0);
                match tree.get(idx + bit) {
                    Some(VPTreeDef::Value(val)) => codes.push((*val, ncode)),
                    Some(VPTreeDef::Index(ix)) if ncode.len < 31 => stack.push((*ix as usize, ncode)),
                    _ => {},
                };
            }
        }
        codes.sort_by_key(|&(_, code)| (code.bits << (32 - code.len)) as u64);
        Self { tree, codes }
    }
    pub fn tree(&self) -> &'static [VPTreeDef<T>] { self.tree }
    pub fn num_nodes(&self) -> usize { self.tree.len() / 2 }
    /// Returns tree leaves in left-to-right order.
    pub fn symbols(&self) -> impl Iterator<Item = T> + '_ {
        self.codes.iter().map(|&(val, _)| val)
    }
    pub fn code(&self, val: T) -> EncoderResult<TreeCode> {
        self.codes.iter().find(|(v, _)| *v == val).map(|&(_, code)| code)
            .ok_or(EncoderError::ContractViolation("symbol is not in the tree"))
    }
    /// Replays `n` occurrences of the symbol through the tree nodes.
    pub fn count_symbol(&self, val: T, n: u32, counters: &mut [ProbCounter]) -> EncoderResult<()> {
        let code = self.code(val)?;
        walk_tree(self.tree, code, 0, |node, bit| {
                counters.get_mut(node)
                    .ok_or(EncoderError::ContractViolation("too few counters for the tree"))?
                    .add_n(bit, n);
                Ok(())
            })
    }
    /// Converts symbol occurrence counts into per-node branch counts.
    pub fn branch_counts(&self, counts: &[(T, u32)]) -> EncoderResult<Vec<ProbCounter>> {
        let mut counters = vec![ProbCounter::default(); self.num_nodes()];
        for &(val, n) in counts.iter() {
            if n > 0 {
                self.count_symbol(val, n, &mut counters)?;
            }
        }
        Ok(counters)
    }
    /// Refits node probabilities to the branch counts, nodes without decisions keep their probability.
    pub fn update_probs(&self, counters: &[ProbCounter], probs: &mut [u8]) {
        for (prob, pc) in probs.iter_mut().zip(counters.iter()) {
            *prob = pc.to_prob_or(*prob);
        }
    }
    pub fn cost(&self, val: T, probs: &[u8]) -> EncoderResult<u32> {
        tree_cost(self.tree, probs, self.code(val)?, 0)
    }
    /// Calculates the costs of all leaves reachable from tree position `start`.
    pub fn symbol_costs(&self, probs: &[u8], start: usize) -> EncoderResult<Vec<(T, u32)>> {
        let mut costs = Vec::with_capacity(self.codes.len());
        let mut stack = vec![(start, 0u32, 0u8)];
        while let Some((idx, cost, depth)) = stack.pop() {
            let prob = node_prob(probs, idx >> 1)?;
            for bit in 0..2 {
                let ncost = cost + bit_cost(bit != 0, prob);
                match self.tree.get(idx + bit) {
                    Some(VPTreeDef::Value(val)) => costs.push((*val, ncost)),
                    Some(VPTreeDef::Index(ix)) if depth < 31 => stack.push((*ix as usize, ncost, depth + 1)),
                    _ => return Err(EncoderError::ContractViolation("malformed tree")),
                };
            }
        }
        Ok(costs)
    }
}

/// Tree and literal coding on top of [`BoolEncoder`].
///
/// [`BoolEncoder`]: ../coder/struct.BoolEncoder.html
pub trait VPTreeWriter {
    fn write_tree<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8], code: TreeCode) -> EncoderResult<()>;
    /// Writes `code` starting from tree position `start` instead of the root.
    fn write_tree_from<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8], code: TreeCode, start: usize) -> EncoderResult<()>;
    fn write_symbol<T: Copy + PartialEq>(&mut self, model: &TreeModel<T>, probs: &[u8], val: T) -> EncoderResult<()>;
    fn write_literal(&mut self, val: u32, bits: u8) -> EncoderResult<()>;
}

impl VPTreeWriter for BoolEncoder {
    fn write_tree<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8], code: TreeCode) -> EncoderResult<()> {
        self.write_tree_from(tree, probs, code, 0)
    }
    fn write_tree_from<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8], code: TreeCode, start: usize) -> EncoderResult<()> {
        walk_tree(tree, code, start, |node, bit| self.put_bool(bit, node_prob(probs, node)?))
    }
    fn write_symbol<T: Copy + PartialEq>(&mut self, model: &TreeModel<T>, probs: &[u8], val: T) -> EncoderResult<()> {
        let code = model.code(val)?;
        self.write_tree(model.tree(), probs, code)
    }
    fn write_literal(&mut self, val: u32, bits: u8) -> EncoderResult<()> {
        self.put_bits(val, bits)
    }
}
