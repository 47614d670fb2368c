/// Occurrence counter for a single binary decision.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct ProbCounter {
    pub zeroes: u32,
    pub total:  u32,
}

// cost of coding zero with the given probability, in 1/256 bits
pub const PROB_COST: [u16; 256] = [
    2047, 2047, 1792, 1642, 1536, 1454, 1386, 1329, 1280, 1236, 1198, 1162, 1130, 1101, 1073, 1048,
    1024, 1002,  980,  961,  942,  924,  906,  890,  874,  859,  845,  831,  817,  804,  792,  780,
     768,  757,  746,  735,  724,  714,  705,  695,  686,  676,  668,  659,  650,  642,  634,  626,
     618,  611,  603,  596,  589,  582,  575,  568,  561,  555,  548,  542,  536,  530,  524,  518,
     512,  506,  501,  495,  490,  484,  479,  474,  468,  463,  458,  453,  449,  444,  439,  434,
     430,  425,  420,  416,  412,  407,  403,  399,  394,  390,  386,  382,  378,  374,  370,  366,
     362,  358,  355,  351,  347,  343,  340,  336,  333,  329,  326,  322,  319,  315,  312,  309,
     305,  302,  299,  296,  292,  289,  286,  283,  280,  277,  274,  271,  268,  265,  262,  259,
     256,  253,  250,  247,  245,  242,  239,  236,  234,  231,  228,  226,  223,  220,  218,  215,
     212,  210,  207,  205,  202,  200,  197,  195,  193,  190,  188,  185,  183,  181,  178,  176,
     174,  171,  169,  167,  164,  162,  160,  158,  156,  153,  151,  149,  147,  145,  143,  140,
     138,  136,  134,  132,  130,  128,  126,  124,  122,  120,  118,  116,  114,  112,  110,  108,
     106,  104,  102,  101,   99,   97,   95,   93,   91,   89,   87,   86,   84,   82,   80,   78,
      77,   75,   73,   71,   70,   68,   66,   64,   63,   61,   59,   58,   56,   54,   53,   51,
      49,   48,   46,   44,   43,   41,   40,   38,   36,   35,   33,   32,   30,   28,   27,   25,
      24,   22,   21,   19,   18,   16,   15,   13,   12,   10,    9,    7,    6,    4,    3,    1,
];

/// Returns the cost of coding `bit` with probability of zero `prob`, in 1/256 bits.
pub fn bit_cost(bit: bool, prob: u8) -> u32 {
    if !bit {
        u32::from(PROB_COST[prob as usize])
    } else {
        u32::from(PROB_COST[(256 - (prob as usize)) & 0xFF])
    }
}

impl ProbCounter {
    pub fn add(&mut self, b: bool) {
        self.add_n(b, 1);
    }
    pub fn add_n(&mut self, b: bool, n: u32) {
        if !b {
            self.zeroes += n;
        }
        self.total += n;
    }
    pub fn ones(&self) -> u32 { self.total - self.zeroes }
    /// Returns the best 8-bit probability for the observed decisions or `old_prob` if there were none.
    pub fn to_prob_or(self, old_prob: u8) -> u8 {
        if self.total > 0 {
            let total = u64::from(self.total);
            let prob = (u64::from(self.zeroes) * 256 + total / 2) / total;
            prob.max(1).min(255) as u8
        } else {
            old_prob
        }
    }
    /// Returns the best probability representable in the 7-bit update form or `old_prob` if there were no decisions.
    pub fn to_prob7_or(self, old_prob: u8) -> u8 {
        if self.total > 0 {
            let prob = ((u64::from(self.zeroes) * 255 / u64::from(self.total)) as u8) & !1;
            prob.max(1)
        } else {
            old_prob
        }
    }
    /// Returns the cost of all counted decisions coded with `prob`, in whole bits.
    pub fn branch_cost(&self, prob: u8) -> u32 {
        Self::est_bits(prob, self.zeroes, self.total)
    }
    pub fn est_bits(prob: u8, zeroes: u32, total: u32) -> u32 {
        let cost = u64::from(bit_cost(false, prob)) * u64::from(zeroes)
                 + u64::from(bit_cost(true, prob)) * u64::from(total - zeroes);
        ((cost + 128) >> 8) as u32
    }
}
