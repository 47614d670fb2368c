use crate::error::{EncoderError, EncoderResult};
use crate::vpenc::coder::BoolEncoder;
use crate::vpenc::models::bit_cost;
use crate::vpenc::tree::{TreeModel, VPTreeWriter, tree_cost};
use super::data::*;
use super::models::{VP8Models, VP8ModelsStat};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum DCTToken {
    Zero,
    One,
    Two,
    Three,
    Four,
    Cat1,
    Cat2,
    Cat3,
    Cat4,
    Cat5,
    Cat6,
    EOB,
}

pub const NUM_TOKENS: usize = 12;

impl DCTToken {
    pub fn from_level(level: i16) -> Self {
        match level.abs() {
            0       => DCTToken::Zero,
            1       => DCTToken::One,
            2       => DCTToken::Two,
            3       => DCTToken::Three,
            4       => DCTToken::Four,
            5..=6   => DCTToken::Cat1,
            7..=10  => DCTToken::Cat2,
            11..=18 => DCTToken::Cat3,
            19..=34 => DCTToken::Cat4,
            35..=66 => DCTToken::Cat5,
            _       => DCTToken::Cat6,
        }
    }
    /// Returns the context this token provides for the next token in the block.
    pub fn next_ctx(self) -> usize {
        match self {
            DCTToken::Zero => 0,
            DCTToken::One  => 1,
            _              => 2,
        }
    }
    fn category(self) -> Option<usize> {
        match self {
            DCTToken::Cat1 => Some(0),
            DCTToken::Cat2 => Some(1),
            DCTToken::Cat3 => Some(2),
            DCTToken::Cat4 => Some(3),
            DCTToken::Cat5 => Some(4),
            DCTToken::Cat6 => Some(5),
            _ => None,
        }
    }
}

/// Block type selecting the coefficient probability set.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum PlaneType {
    /// Luma block whose DC is coded in the Y2 block.
    YAfterY2    = 0,
    Y2          = 1,
    Chroma      = 2,
    /// Luma block coded with its DC.
    YWithDC     = 3,
}

impl PlaneType {
    /// Returns the first coded scan position.
    pub fn first_coef(self) -> usize {
        if self == PlaneType::YAfterY2 { 1 } else { 0 }
    }
}

/// Coded token together with its context.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Token {
    pub token:      DCTToken,
    pub level:      i16,
    pub plane:      PlaneType,
    pub band:       u8,
    pub ctx:        u8,
    /// Token is coded without the EOB decision.
    pub skip_eob:   bool,
}

pub const Y2_BLOCK: usize = 24;
pub const U_START: usize = 16;
pub const V_START: usize = 20;

/// Quantised coefficients of one macroblock in natural order.
///
/// Blocks 0-15 are luma, 16-19 are U, 20-23 are V and 24 is the Y2 block.
#[derive(Clone,Copy,Debug)]
pub struct MBCoeffs {
    pub blocks: [[i16; 16]; 25],
    pub has_y2: bool,
}

impl MBCoeffs {
    pub fn new(has_y2: bool) -> Self {
        Self { blocks: [[0; 16]; 25], has_y2 }
    }
    fn block_type(&self, blk: usize) -> PlaneType {
        match blk {
            Y2_BLOCK => PlaneType::Y2,
            0..=15 if self.has_y2 => PlaneType::YAfterY2,
            0..=15 => PlaneType::YWithDC,
            _ => PlaneType::Chroma,
        }
    }
    /// Returns blocks in coding order.
    fn coding_order(&self) -> impl Iterator<Item = usize> {
        let has_y2 = self.has_y2;
        std::iter::once(Y2_BLOCK).filter(move |_| has_y2).chain(0..Y2_BLOCK)
    }
}

/// Returns the position after the last non-zero coefficient in scan order or `first` for an empty block.
pub fn block_eob(coeffs: &[i16; 16], first: usize) -> usize {
    (first..16).rev().find(|&i| coeffs[ZIGZAG[i]] != 0).map_or(first, |i| i + 1)
}

/// Above and left non-zero flags of the coefficient blocks.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct NZContext {
    pub nz_y2_top:  Vec<bool>,
    pub nz_y2_left: bool,
    pub nz_y_top:   Vec<bool>,
    pub nz_y_left:  [bool; 4],
    pub nz_c_top:   [Vec<bool>; 2],
    pub nz_c_left:  [[bool; 2]; 2],
}

impl NZContext {
    pub fn new(mb_w: usize) -> Self {
        Self {
            nz_y2_top:  vec![false; mb_w],
            nz_y_top:   vec![false; mb_w * 4],
            nz_c_top:   [vec![false; mb_w * 2], vec![false; mb_w * 2]],
            ..Default::default()
        }
    }
    pub fn mb_w(&self) -> usize { self.nz_y2_top.len() }
    pub fn reset(&mut self) {
        for el in self.nz_y_top.iter_mut() { *el = false; }
        for el in self.nz_y2_top.iter_mut() { *el = false; }
        for el in self.nz_c_top[0].iter_mut() { *el = false; }
        for el in self.nz_c_top[1].iter_mut() { *el = false; }
        self.update_mb_row();
    }
    pub fn update_mb_row(&mut self) {
        self.nz_y_left  = [false; 4];
        self.nz_y2_left = false;
        self.nz_c_left  = [[false; 2]; 2];
    }
    fn flags(&mut self, mb_x: usize, blk: usize) -> EncoderResult<(&mut bool, &mut bool)> {
        if mb_x >= self.mb_w() {
            return Err(EncoderError::ContractViolation("macroblock position is outside the frame"));
        }
        Ok(match blk {
            0..=15 => (&mut self.nz_y_top[mb_x * 4 + (blk & 3)], &mut self.nz_y_left[blk >> 2]),
            16..=23 => {
                let plane = (blk - U_START) >> 2;
                let idx = blk & 3;
                (&mut self.nz_c_top[plane][mb_x * 2 + (idx & 1)], &mut self.nz_c_left[plane][idx >> 1])
            },
            Y2_BLOCK => (&mut self.nz_y2_top[mb_x], &mut self.nz_y2_left),
            _ => return Err(EncoderError::ContractViolation("block index is out of range")),
        })
    }
    /// Returns the probability context (0-2) for the block.
    pub fn get(&mut self, mb_x: usize, blk: usize) -> EncoderResult<usize> {
        let (top, left) = self.flags(mb_x, blk)?;
        Ok((*top as usize) + (*left as usize))
    }
    pub fn set(&mut self, mb_x: usize, blk: usize, nz: bool) -> EncoderResult<()> {
        let (top, left) = self.flags(mb_x, blk)?;
        *top  = nz;
        *left = nz;
        Ok(())
    }
}

/// Coefficient token coder.
///
/// It converts macroblock coefficients into tokens, tracks neighbour contexts and gathers
/// token statistics for the frame.
pub struct TokenModel {
    pub nz:     NZContext,
    pub stat:   VP8ModelsStat,
    tree:       TreeModel<DCTToken>,
}

impl TokenModel {
    pub fn new(mb_w: usize) -> Self {
        Self {
            nz:     NZContext::new(mb_w),
            stat:   VP8ModelsStat::new(),
            tree:   TreeModel::new(COEF_TREE),
        }
    }
    pub fn tree(&self) -> &TreeModel<DCTToken> { &self.tree }
    fn add_token(&mut self, tokens: &mut Vec<Token>, tok: Token) {
        self.stat.coef_counts[tok.plane as usize][tok.band as usize][tok.ctx as usize][tok.token as usize] += 1;
        tokens.push(tok);
    }
    /// Tokenizes one block, updating its neighbour context and the statistics.
    pub fn tokenize_block(&mut self, mb_x: usize, blk: usize, coeffs: &[i16; 16], plane: PlaneType, tokens: &mut Vec<Token>) -> EncoderResult<bool> {
        let first = plane.first_coef();
        let ctx = self.nz.get(mb_x, blk)?;
        let eob = block_eob(coeffs, first);

        let mut cval = ctx;
        let mut prev = DCTToken::EOB;
        for i in first..eob {
            let level = coeffs[ZIGZAG[i]];
            if level < -MAX_COEF_LEVEL || level > MAX_COEF_LEVEL {
                return Err(EncoderError::ContractViolation("coefficient is too large"));
            }
            let token = DCTToken::from_level(level);
            self.add_token(tokens, Token {
                    token, level, plane,
                    band:       COEF_BANDS[i] as u8,
                    ctx:        cval as u8,
                    skip_eob:   prev == DCTToken::Zero,
                });
            cval = token.next_ctx();
            prev = token;
        }
        if eob < 16 {
            self.add_token(tokens, Token {
                    token:      DCTToken::EOB,
                    level:      0,
                    plane,
                    band:       COEF_BANDS[eob] as u8,
                    ctx:        cval as u8,
                    skip_eob:   false,
                });
        }
        let nz = eob > first;
        self.nz.set(mb_x, blk, nz)?;
        Ok(nz)
    }
    /// Tokenizes all blocks of a macroblock in coding order.
    pub fn tokenize_mb(&mut self, mb_x: usize, mb: &MBCoeffs) -> EncoderResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(64);
        for blk in mb.coding_order() {
            self.tokenize_block(mb_x, blk, &mb.blocks[blk], mb.block_type(blk), &mut tokens)?;
        }
        Ok(tokens)
    }
    /// Produces an EOB token for every block of an empty macroblock.
    pub fn stuff_mb(&mut self, mb_x: usize, has_y2: bool) -> EncoderResult<Vec<Token>> {
        let empty = MBCoeffs::new(has_y2);
        let mut tokens = Vec::with_capacity(25);
        for blk in empty.coding_order() {
            let plane = empty.block_type(blk);
            let ctx = self.nz.get(mb_x, blk)?;
            self.add_token(&mut tokens, Token {
                    token:      DCTToken::EOB,
                    level:      0,
                    plane,
                    band:       COEF_BANDS[plane.first_coef()] as u8,
                    ctx:        ctx as u8,
                    skip_eob:   false,
                });
            self.nz.set(mb_x, blk, false)?;
        }
        Ok(tokens)
    }
    /// Reports whether the macroblock has no coefficients to code.
    pub fn mb_is_skippable(mb: &MBCoeffs) -> bool {
        mb.coding_order().all(|blk| {
                let first = mb.block_type(blk).first_coef();
                block_eob(&mb.blocks[blk], first) == first
            })
    }
    /// Resets contexts for a macroblock coded without coefficients.
    pub fn skip_mb(&mut self, mb_x: usize, has_y2: bool) -> EncoderResult<()> {
        for blk in 0..Y2_BLOCK {
            self.nz.set(mb_x, blk, false)?;
        }
        if has_y2 {
            self.nz.set(mb_x, Y2_BLOCK, false)?;
        }
        Ok(())
    }
    /// Writes tokens with the current coefficient probabilities.
    pub fn write_tokens(&self, bc: &mut BoolEncoder, models: &VP8Models, tokens: &[Token]) -> EncoderResult<()> {
        for tok in tokens.iter() {
            let probs = &models.coef_probs[tok.plane as usize][tok.band as usize][tok.ctx as usize];
            let code = self.tree.code(tok.token)?;
            if !tok.skip_eob {
                bc.write_tree(COEF_TREE, probs, code)?;
            } else {
                bc.write_tree_from(COEF_TREE, probs, code.tail(1), COEF_TREE_NO_EOB)?;
            }
            write_token_extra(bc, tok.token, tok.level)?;
        }
        Ok(())
    }
    /// Codes macroblock coefficients, empty macroblocks are coded with EOB tokens directly.
    pub fn encode_mb(&mut self, bc: &mut BoolEncoder, models: &VP8Models, mb_x: usize, mb: &MBCoeffs) -> EncoderResult<()> {
        let tokens = if Self::mb_is_skippable(mb) {
                self.stuff_mb(mb_x, mb.has_y2)?
            } else {
                self.tokenize_mb(mb_x, mb)?
            };
        self.write_tokens(bc, models, &tokens)
    }
    /// Estimates the cost of coding a block in the given context, in 1/256 bits.
    pub fn block_cost(&self, models: &VP8Models, coeffs: &[i16; 16], plane: PlaneType, ctx: usize) -> EncoderResult<u32> {
        if ctx > 2 {
            return Err(EncoderError::ContractViolation("invalid block context"));
        }
        let probs = &models.coef_probs[plane as usize];
        let first = plane.first_coef();
        let eob = block_eob(coeffs, first);
        let mut cval = ctx;
        let mut prev = DCTToken::EOB;
        let mut cost = 0;
        for i in first..eob {
            let level = coeffs[ZIGZAG[i]];
            if level < -MAX_COEF_LEVEL || level > MAX_COEF_LEVEL {
                return Err(EncoderError::ContractViolation("coefficient is too large"));
            }
            let token = DCTToken::from_level(level);
            let code = self.tree.code(token)?;
            let tprobs = &probs[COEF_BANDS[i]][cval];
            cost += if prev != DCTToken::Zero {
                    tree_cost(COEF_TREE, tprobs, code, 0)?
                } else {
                    tree_cost(COEF_TREE, tprobs, code.tail(1), COEF_TREE_NO_EOB)?
                };
            cost += token_extra_cost(token, level);
            cval = token.next_ctx();
            prev = token;
        }
        if eob < 16 {
            cost += bit_cost(false, probs[COEF_BANDS[eob]][cval][0]);
        }
        Ok(cost)
    }
}

fn write_token_extra(bc: &mut BoolEncoder, token: DCTToken, level: i16) -> EncoderResult<()> {
    match token {
        DCTToken::EOB | DCTToken::Zero => return Ok(()),
        _ => {},
    };
    if let Some(cat) = token.category() {
        let add = level.abs() - COEF_CAT_BASE[cat];
        let probs = COEF_CAT_PROBS[cat];
        for (i, &prob) in probs.iter().enumerate() {
            let bit = (add >> (probs.len() - 1 - i)) & 1;
            bc.put_bool(bit != 0, prob)?;
        }
    }
    bc.put_bool(level < 0, 128)
}

fn token_extra_cost(token: DCTToken, level: i16) -> u32 {
    let mut cost = 0;
    if let Some(cat) = token.category() {
        let add = level.abs() - COEF_CAT_BASE[cat];
        let probs = COEF_CAT_PROBS[cat];
        for (i, &prob) in probs.iter().enumerate() {
            let bit = (add >> (probs.len() - 1 - i)) & 1;
            cost += bit_cost(bit != 0, prob);
        }
    }
    if token != DCTToken::Zero && token != DCTToken::EOB {
        cost += bit_cost(level < 0, 128);
    }
    cost
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vpenc::testdec::{BoolDecoder, decode_block};
    use nanorand::RNG;

    fn random_mb(rng: &mut nanorand::WyRand, has_y2: bool, density: u32) -> MBCoeffs {
        let mut mb = MBCoeffs::new(has_y2);
        for blk in mb.blocks.iter_mut() {
            for coef in blk.iter_mut() {
                if rng.generate::<u32>() % 100 < density {
                    let mag = match rng.generate::<u32>() % 8 {
                            0..=3 => 1,
                            4..=5 => 2 + (rng.generate::<u32>() % 3) as i16,
                            6     => 5 + (rng.generate::<u32>() % 60) as i16,
                            _     => 67 + (rng.generate::<u32>() % 2048) as i16,
                        };
                    *coef = if (rng.generate::<u32>() & 1) != 0 { -mag } else { mag };
                }
            }
        }
        if !has_y2 {
            mb.blocks[Y2_BLOCK] = [0; 16];
        }
        mb
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(DCTToken::from_level(0), DCTToken::Zero);
        assert_eq!(DCTToken::from_level(-4), DCTToken::Four);
        assert_eq!(DCTToken::from_level(6), DCTToken::Cat1);
        assert_eq!(DCTToken::from_level(-7), DCTToken::Cat2);
        assert_eq!(DCTToken::from_level(18), DCTToken::Cat3);
        assert_eq!(DCTToken::from_level(34), DCTToken::Cat4);
        assert_eq!(DCTToken::from_level(66), DCTToken::Cat5);
        assert_eq!(DCTToken::from_level(-2114), DCTToken::Cat6);
        let model = TokenModel::new(1);
        assert_eq!(model.tree().symbols().count(), NUM_TOKENS);
    }
    #[test]
    fn test_block_tokens() {
        let mut model = TokenModel::new(2);
        let mut blk = [0i16; 16];
        blk[0] = 3;
        blk[4] = -1; // scan position 2
        let mut tokens = Vec::new();
        let nz = model.tokenize_block(1, 5, &blk, PlaneType::YWithDC, &mut tokens).unwrap();
        assert!(nz);
        let toks: Vec<(DCTToken, u8, u8, bool)> = tokens.iter().map(|t| (t.token, t.band, t.ctx, t.skip_eob)).collect();
        assert_eq!(toks, vec![
                (DCTToken::Three, 0, 0, false),
                (DCTToken::Zero,  1, 2, false),
                (DCTToken::One,   2, 0, true),
                (DCTToken::EOB,   3, 1, false),
            ]);
        assert_eq!(model.nz.get(1, 5).unwrap(), 2);
        assert_eq!(model.nz.get(1, 9).unwrap(), 1);
        assert_eq!(model.nz.get(0, 5).unwrap(), 1);
        assert_eq!(model.stat.coef_counts[3][1][2][DCTToken::Zero as usize], 1);

        // DC is not coded for luma with Y2
        let mut tokens = Vec::new();
        let mut blk = [0i16; 16];
        blk[0] = 12;
        assert!(!model.tokenize_block(0, 0, &blk, PlaneType::YAfterY2, &mut tokens).unwrap());
        assert_eq!(tokens.len(), 1);
        assert_eq!((tokens[0].token, tokens[0].band), (DCTToken::EOB, 1));

        // no EOB after the last position
        let mut tokens = Vec::new();
        let mut blk = [0i16; 16];
        blk[15] = 1;
        model.tokenize_block(0, 16, &blk, PlaneType::Chroma, &mut tokens).unwrap();
        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens[15].token, DCTToken::One);
        assert!(tokens[15].skip_eob);
        assert!(!tokens[0].skip_eob);
    }
    #[test]
    fn test_bad_input() {
        let mut model = TokenModel::new(2);
        let mut tokens = Vec::new();
        let blk = [0i16; 16];
        assert!(model.tokenize_block(2, 0, &blk, PlaneType::YWithDC, &mut tokens).is_err());
        assert!(model.tokenize_block(0, 25, &blk, PlaneType::YWithDC, &mut tokens).is_err());
        let mut blk = [0i16; 16];
        blk[3] = 3000;
        assert!(model.tokenize_block(0, 0, &blk, PlaneType::YWithDC, &mut tokens).is_err());
        assert!(model.block_cost(&VP8Models::new(), &[0; 16], PlaneType::Y2, 3).is_err());
    }
    #[test]
    fn test_mb_roundtrip() {
        let mut rng = nanorand::WyRand::new_seed(321);
        let models = VP8Models::new();
        let mb_w = 3;
        let mut model = TokenModel::new(mb_w);
        let mut mbs = Vec::new();
        let mut bc = BoolEncoder::new();
        for mb_y in 0..2 {
            model.nz.update_mb_row();
            for mb_x in 0..mb_w {
                let mb = random_mb(&mut rng, (mb_x + mb_y) % 2 == 0, 15 * (mb_x as u32));
                model.encode_mb(&mut bc, &models, mb_x, &mb).unwrap();
                mbs.push(mb);
            }
        }
        let data = bc.flush().unwrap();

        let mut br = BoolDecoder::new(&data);
        let mut nz = NZContext::new(mb_w);
        let mut mb_iter = mbs.iter();
        for _mb_y in 0..2 {
            nz.update_mb_row();
            for mb_x in 0..mb_w {
                let mb = mb_iter.next().unwrap();
                for blk in mb.coding_order() {
                    let plane = mb.block_type(blk);
                    let ctx = nz.get(mb_x, blk).unwrap();
                    let (coeffs, has_nz) = decode_block(&mut br, &models.coef_probs[plane as usize], ctx, plane.first_coef());
                    nz.set(mb_x, blk, has_nz).unwrap();
                    let mut expected = mb.blocks[blk];
                    if plane == PlaneType::YAfterY2 {
                        expected[0] = 0;
                    }
                    assert_eq!(coeffs, expected);
                }
            }
        }
        assert_eq!(nz, model.nz);
    }
    #[test]
    fn test_stuffing() {
        for &has_y2 in [false, true].iter() {
            let models = VP8Models::new();
            let mut rng = nanorand::WyRand::new_seed(5);
            let prev_mb = random_mb(&mut rng, has_y2, 30);
            let mut empty = MBCoeffs::new(has_y2);
            if has_y2 {
                for blk in 0..16 {
                    empty.blocks[blk][0] = blk as i16 - 8;
                }
            }
            assert!(TokenModel::mb_is_skippable(&empty));
            assert!(!TokenModel::mb_is_skippable(&prev_mb));

            let mut full = TokenModel::new(2);
            let mut stuff = TokenModel::new(2);
            let mut bc_full = BoolEncoder::new();
            let mut bc_stuff = BoolEncoder::new();
            full.encode_mb(&mut bc_full, &models, 0, &prev_mb).unwrap();
            stuff.encode_mb(&mut bc_stuff, &models, 0, &prev_mb).unwrap();

            let tokens = full.tokenize_mb(1, &empty).unwrap();
            full.write_tokens(&mut bc_full, &models, &tokens).unwrap();
            let tokens = stuff.stuff_mb(1, has_y2).unwrap();
            stuff.write_tokens(&mut bc_stuff, &models, &tokens).unwrap();

            assert_eq!(full.nz, stuff.nz);
            assert_eq!(full.stat, stuff.stat);
            assert_eq!(bc_full.flush().unwrap(), bc_stuff.flush().unwrap());
        }
    }
    #[test]
    fn test_context_symmetry() {
        let mut rng = nanorand::WyRand::new_seed(77);
        let mb = random_mb(&mut rng, true, 20);
        let mut model = TokenModel::new(1);
        let tokens1 = model.tokenize_mb(0, &mb).unwrap();
        let stat1 = model.stat.clone();
        let nz1 = model.nz.clone();

        model.nz.reset();
        model.stat.reset();
        let tokens2 = model.tokenize_mb(0, &mb).unwrap();
        assert_eq!(tokens1, tokens2);
        assert_eq!(stat1, model.stat);
        assert_eq!(nz1, model.nz);
        for tok in tokens1.iter() {
            assert!(tok.ctx <= 2);
        }
    }
    #[test]
    fn test_skip_mb() {
        let mut rng = nanorand::WyRand::new_seed(8);
        let mb = random_mb(&mut rng, true, 50);
        let mut model = TokenModel::new(1);
        model.tokenize_mb(0, &mb).unwrap();
        model.nz.update_mb_row();
        model.skip_mb(0, false).unwrap();
        assert!(model.nz.nz_y_top.iter().all(|&nz| !nz));
        assert!(model.nz.nz_c_top.iter().all(|top| top.iter().all(|&nz| !nz)));
        assert!(model.nz.nz_y2_top[0]);
        model.skip_mb(0, true).unwrap();
        assert!(!model.nz.nz_y2_top[0]);
    }
    #[test]
    fn test_block_cost() {
        let mut rng = nanorand::WyRand::new_seed(11);
        let models = VP8Models::new();
        for _ in 0..50 {
            let mb = random_mb(&mut rng, false, 40);
            let blk = &mb.blocks[3];
            let mut model = TokenModel::new(1);
            model.nz.set(0, 3, true).unwrap();
            let est = model.block_cost(&models, blk, PlaneType::YWithDC, 2).unwrap();

            let mut tokens = Vec::new();
            model.tokenize_block(0, 3, blk, PlaneType::YWithDC, &mut tokens).unwrap();
            let mut est_tokens = 0;
            for tok in tokens.iter() {
                let probs = &models.coef_probs[3][tok.band as usize][tok.ctx as usize];
                let code = model.tree().code(tok.token).unwrap();
                est_tokens += if tok.skip_eob {
                        tree_cost(COEF_TREE, probs, code.tail(1), COEF_TREE_NO_EOB).unwrap()
                    } else {
                        tree_cost(COEF_TREE, probs, code, 0).unwrap()
                    };
                est_tokens += token_extra_cost(tok.token, tok.level);
            }
            assert_eq!(est, est_tokens);
        }
    }
}
