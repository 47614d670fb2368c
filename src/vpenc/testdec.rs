//! Mirrored bool decoder used to check produced streams.
use super::tree::VPTreeDef;
use crate::vp8enc::data::*;
use crate::vp8enc::tokens::DCTToken;

pub struct BoolDecoder<'a> {
    src:    &'a [u8],
    pos:    usize,
    value:  u32,
    range:  u32,
    bits:   i32,
}

impl<'a> BoolDecoder<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        let mut value = 0;
        for i in 0..4 {
            value = (value << 8) | u32::from(src.get(i).copied().unwrap_or(0));
        }
        Self { src, pos: 4, value, range: 255, bits: 8 }
    }
    pub fn read_prob(&mut self, prob: u8) -> bool {
        self.renorm();
        let split = 1 + (((self.range - 1) * u32::from(prob)) >> 8);
        if self.value < (split << 24) {
            self.range = split;
            false
        } else {
            self.range -= split;
            self.value -= split << 24;
            true
        }
    }
    pub fn read_bits(&mut self, bits: u8) -> u32 {
        let mut val = 0u32;
        for _ in 0..bits {
            val = (val << 1) | (self.read_prob(128) as u32);
        }
        val
    }
    pub fn read_probability(&mut self) -> u8 {
        let val = self.read_bits(7) as u8;
        if val == 0 { 1 } else { val << 1 }
    }
    pub fn read_tree<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8]) -> T {
        self.read_tree_from(tree, probs, 0)
    }
    pub fn read_tree_from<T: Copy>(&mut self, tree: &[VPTreeDef<T>], probs: &[u8], start: usize) -> T {
        let mut idx = start;
        loop {
            let bit = self.read_prob(probs[idx >> 1]);
            match tree[idx + (bit as usize)] {
                VPTreeDef::Value(v) => return v,
                VPTreeDef::Index(ix) => { idx = ix as usize; },
            };
        }
    }
    fn renorm(&mut self) {
        let shift = self.range.leading_zeros() & 7;
        self.range <<= shift;
        self.value <<= shift;
        self.bits   -= shift as i32;
        if self.bits <= 0 {
            let byte = self.src.get(self.pos).copied().unwrap_or(0);
            self.value |= u32::from(byte) << (-self.bits as u32);
            self.pos  += 1;
            self.bits += 8;
        }
    }
}

fn expand_token(br: &mut BoolDecoder, token: DCTToken) -> i16 {
    let cat = match token {
            DCTToken::Zero  => return 0,
            DCTToken::One   => return if br.read_prob(128) { -1 } else { 1 },
            DCTToken::Two   => return if br.read_prob(128) { -2 } else { 2 },
            DCTToken::Three => return if br.read_prob(128) { -3 } else { 3 },
            DCTToken::Four  => return if br.read_prob(128) { -4 } else { 4 },
            DCTToken::Cat1  => 0,
            DCTToken::Cat2  => 1,
            DCTToken::Cat3  => 2,
            DCTToken::Cat4  => 3,
            DCTToken::Cat5  => 4,
            DCTToken::Cat6  => 5,
            DCTToken::EOB   => unreachable!(),
        };
    let mut add = 0i16;
    for &prob in COEF_CAT_PROBS[cat].iter() {
        add = (add << 1) | (br.read_prob(prob) as i16);
    }
    let val = COEF_CAT_BASE[cat] + add;
    if br.read_prob(128) { -val } else { val }
}

/// Reads one coefficient block in natural order and reports whether it had any tokens besides the final EOB.
pub fn decode_block(br: &mut BoolDecoder, probs: &[[[u8; 11]; 3]; 8], ctx: usize, first: usize) -> ([i16; 16], bool) {
    let mut coeffs = [0i16; 16];
    let mut cval = ctx;
    let mut skip_eob = false;
    let mut has_nz = false;
    for idx in first..16 {
        let cprobs = &probs[COEF_BANDS[idx]][cval];
        let tok = if !skip_eob {
                br.read_tree(COEF_TREE, cprobs)
            } else {
                br.read_tree_from(COEF_TREE, cprobs, 2)
            };
        if tok == DCTToken::EOB {
            break;
        }
        let level = expand_token(br, tok);
        coeffs[ZIGZAG[idx]] = level;
        cval = level.abs().min(2) as usize;
        skip_eob = level == 0;
        has_nz = true;
    }
    (coeffs, has_nz)
}

pub fn decode_mv_component(br: &mut BoolDecoder, probs: &[u8; 19]) -> i16 {
    let val = if !br.read_prob(probs[MVP_IS_SHORT]) {
            br.read_tree(SMALL_MV_TREE, &probs[MVP_SHORT..MVP_BITS])
        } else {
            let raw_probs = &probs[MVP_BITS..];
            let mut raw = 0;
            for &ord in MV_LONG_BIT_ORDER.iter() {
                raw |= (br.read_prob(raw_probs[ord]) as i16) << ord;
            }
            if (raw & 0x3F0) != 0 {
                raw |= (br.read_prob(raw_probs[3]) as i16) << 3;
            } else {
                raw |= 1 << 3;
            }
            raw
        };
    if (val == 0) || !br.read_prob(probs[MVP_SIGN]) { val } else { -val }
}
