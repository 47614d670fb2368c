use crate::vpenc::tree::VPTreeDef;
use super::tokens::DCTToken;

pub type CoefProbs = [[[[u8; 11]; 3]; 8]; 4];
pub type MVProbs = [u8; 19];

pub const ZIGZAG: [usize; 16] = [ 0, 1, 4, 8, 5, 2, 3, 6, 9, 12, 13, 10, 7, 11, 14, 15 ];
pub const COEF_BANDS: [usize; 16] = [ 0, 1, 2, 3, 6, 4, 5, 6, 6, 6, 6, 6, 6, 6, 6, 7 ];

pub const COEF_TREE: &[VPTreeDef<DCTToken>] = &[
    VPTreeDef::Value(DCTToken::EOB),    VPTreeDef::Index(2),
    VPTreeDef::Value(DCTToken::Zero),   VPTreeDef::Index(4),
    VPTreeDef::Value(DCTToken::One),    VPTreeDef::Index(6),
    VPTreeDef::Index(8),                VPTreeDef::Index(12),
    VPTreeDef::Value(DCTToken::Two),    VPTreeDef::Index(10),
    VPTreeDef::Value(DCTToken::Three),  VPTreeDef::Value(DCTToken::Four),
    VPTreeDef::Index(14),               VPTreeDef::Index(16),
    VPTreeDef::Value(DCTToken::Cat1),   VPTreeDef::Value(DCTToken::Cat2),
    VPTreeDef::Index(18),               VPTreeDef::Index(20),
    VPTreeDef::Value(DCTToken::Cat3),   VPTreeDef::Value(DCTToken::Cat4),
    VPTreeDef::Value(DCTToken::Cat5),   VPTreeDef::Value(DCTToken::Cat6)
];
// tree position right after the EOB decision
pub const COEF_TREE_NO_EOB: usize = 2;

pub const COEF_CAT_BASE: [i16; 6] = [ 5, 7, 11, 19, 35, 67 ];
pub const COEF_CAT_PROBS: [&[u8]; 6] = [
    &[ 159 ],
    &[ 165, 145 ],
    &[ 173, 148, 140 ],
    &[ 176, 155, 140, 135 ],
    &[ 180, 157, 141, 134, 130 ],
    &[ 254, 254, 243, 230, 196, 177, 153, 140, 133, 130, 129 ],
];
pub const MAX_COEF_LEVEL: i16 = 67 + 2047;

pub const SMALL_MV_TREE: &[VPTreeDef<i16>] = &[
    VPTreeDef::Index(2),    VPTreeDef::Index(8),
    VPTreeDef::Index(4),    VPTreeDef::Index(6),
    VPTreeDef::Value(0),    VPTreeDef::Value(1),
    VPTreeDef::Value(2),    VPTreeDef::Value(3),
    VPTreeDef::Index(10),   VPTreeDef::Index(12),
    VPTreeDef::Value(4),    VPTreeDef::Value(5),
    VPTreeDef::Value(6),    VPTreeDef::Value(7)
];

pub const MVP_IS_SHORT: usize = 0;
pub const MVP_SIGN: usize = 1;
pub const MVP_SHORT: usize = 2;
pub const MVP_BITS: usize = 9;
pub const MV_LONG_BITS: usize = 10;
pub const MV_SHORT_COUNT: i16 = 8;
pub const MV_MAX: i16 = 1023;
pub const MV_LONG_BIT_ORDER: [usize; 9] = [ 0, 1, 2, 9, 8, 7, 6, 5, 4 ];

pub const DEFAULT_MV_PROBS: [MVProbs; 2] = [
    [ 162, 128, 225, 146, 172, 147, 214,  39, 156, 128, 129, 132,  75, 145, 178, 206, 239, 254, 254 ],
    [ 164, 128, 204, 170, 119, 235, 140, 230, 228, 128, 130, 130,  74, 148, 180, 203, 236, 254, 254 ]
];
pub const MV_UPDATE_PROBS: [MVProbs; 2] = [
    [ 237, 246, 253, 253, 254, 254, 254, 254, 254, 254, 254, 254, 254, 254, 250, 250, 252, 254, 254 ],
    [ 231, 243, 245, 253, 254, 254, 254, 254, 254, 254, 254, 254, 254, 254, 251, 251, 254, 254, 254 ]
];

pub const DEFAULT_COEF_PROBS: CoefProbs = [
  [
    [ [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ] ],
    [ [ 253, 136, 254, 255, 228, 219, 128, 128, 128, 128, 128 ],
      [ 189, 129, 242, 255, 227, 213, 255, 219, 128, 128, 128 ],
      [ 106, 126, 227, 252, 214, 209, 255, 255, 128, 128, 128 ] ],
    [ [   1,  98, 248, 255, 236, 226, 255, 255, 128, 128, 128 ],
      [ 181, 133, 238, 254, 221, 234, 255, 154, 128, 128, 128 ],
      [  78, 134, 202, 247, 198, 180, 255, 219, 128, 128, 128 ] ],
    [ [   1, 185, 249, 255, 243, 255, 128, 128, 128, 128, 128 ],
      [ 184, 150, 247, 255, 236, 224, 128, 128, 128, 128, 128 ],
      [  77, 110, 216, 255, 236, 230, 128, 128, 128, 128, 128 ] ],
    [ [   1, 101, 251, 255, 241, 255, 128, 128, 128, 128, 128 ],
      [ 170, 139, 241, 252, 236, 209, 255, 255, 128, 128, 128 ],
      [  37, 116, 196, 243, 228, 255, 255, 255, 128, 128, 128 ] ],
    [ [   1, 204, 254, 255, 245, 255, 128, 128, 128, 128, 128 ],
      [ 207, 160, 250, 255, 238, 128, 128, 128, 128, 128, 128 ],
      [ 102, 103, 231, 255, 211, 171, 128, 128, 128, 128, 128 ] ],
    [ [   1, 152, 252, 255, 240, 255, 128, 128, 128, 128, 128 ],
      [ 177, 135, 243, 255, 234, 225, 128, 128, 128, 128, 128 ],
      [  80, 129, 211, 255, 194, 224, 128, 128, 128, 128, 128 ] ],
    [ [   1,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 246,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 255, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ] ]
  ], [
    [ [ 198,  35, 237, 223, 193, 187, 162, 160, 145, 155,  62 ],
      [ 131,  45, 198, 221, 172, 176, 220, 157, 252, 221,   1 ],
      [  68,  47, 146, 208, 149, 167, 221, 162, 255, 223, 128 ] ],
    [ [   1, 149, 241, 255, 221, 224, 255, 255, 128, 128, 128 ],
      [ 184, 141, 234, 253, 222, 220, 255, 199, 128, 128, 128 ],
      [  81,  99, 181, 242, 176, 190, 249, 202, 255, 255, 128 ] ],
    [ [   1, 129, 232, 253, 214, 197, 242, 196, 255, 255, 128 ],
      [  99, 121, 210, 250, 201, 198, 255, 202, 128, 128, 128 ],
      [  23,  91, 163, 242, 170, 187, 247, 210, 255, 255, 128 ] ],
    [ [   1, 200, 246, 255, 234, 255, 128, 128, 128, 128, 128 ],
      [ 109, 178, 241, 255, 231, 245, 255, 255, 128, 128, 128 ],
      [  44, 130, 201, 253, 205, 192, 255, 255, 128, 128, 128 ] ],
    [ [   1, 132, 239, 251, 219, 209, 255, 165, 128, 128, 128 ],
      [  94, 136, 225, 251, 218, 190, 255, 255, 128, 128, 128 ],
      [  22, 100, 174, 245, 186, 161, 255, 199, 128, 128, 128 ] ],
    [ [   1, 182, 249, 255, 232, 235, 128, 128, 128, 128, 128 ],
      [ 124, 143, 241, 255, 227, 234, 128, 128, 128, 128, 128 ],
      [  35,  77, 181, 251, 193, 211, 255, 205, 128, 128, 128 ] ],
    [ [   1, 157, 247, 255, 236, 231, 255, 255, 128, 128, 128 ],
      [ 121, 141, 235, 255, 225, 227, 255, 255, 128, 128, 128 ],
      [  45,  99, 188, 251, 195, 217, 255, 224, 128, 128, 128 ] ],
    [ [   1,   1, 251, 255, 213, 255, 128, 128, 128, 128, 128 ],
      [ 203,   1, 248, 255, 255, 128, 128, 128, 128, 128, 128 ],
      [ 137,   1, 177, 255, 224, 255, 128, 128, 128, 128, 128 ] ]
  ], [
    [ [ 253,   9, 248, 251, 207, 208, 255, 192, 128, 128, 128 ],
      [ 175,  13, 224, 243, 193, 185, 249, 198, 255, 255, 128 ],
      [  73,  17, 171, 221, 161, 179, 236, 167, 255, 234, 128 ] ],
    [ [   1,  95, 247, 253, 212, 183, 255, 255, 128, 128, 128 ],
      [ 239,  90, 244, 250, 211, 209, 255, 255, 128, 128, 128 ],
      [ 155,  77, 195, 248, 188, 195, 255, 255, 128, 128, 128 ] ],
    [ [   1,  24, 239, 251, 218, 219, 255, 205, 128, 128, 128 ],
      [ 201,  51, 219, 255, 196, 186, 128, 128, 128, 128, 128 ],
      [  69,  46, 190, 239, 201, 218, 255, 228, 128, 128, 128 ] ],
    [ [   1, 191, 251, 255, 255, 128, 128, 128, 128, 128, 128 ],
      [ 223, 165, 249, 255, 213, 255, 128, 128, 128, 128, 128 ],
      [ 141, 124, 248, 255, 255, 128, 128, 128, 128, 128, 128 ] ],
    [ [   1,  16, 248, 255, 255, 128, 128, 128, 128, 128, 128 ],
      [ 190,  36, 230, 255, 236, 255, 128, 128, 128, 128, 128 ],
      [ 149,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ] ],
    [ [   1, 226, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 247, 192, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 240, 128, 255, 128, 128, 128, 128, 128, 128, 128, 128 ] ],
    [ [   1, 134, 252, 255, 255, 128, 128, 128, 128, 128, 128 ],
      [ 213,  62, 250, 255, 255, 128, 128, 128, 128, 128, 128 ],
      [  55,  93, 255, 128, 128, 128, 128, 128, 128, 128, 128 ] ],
    [ [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128 ] ]
  ], [
    [ [ 202,  24, 213, 235, 186, 191, 220, 160, 240, 175, 255 ],
      [ 126,  38, 182, 232, 169, 184, 228, 174, 255, 187, 128 ],
      [  61,  46, 138, 219, 151, 178, 240, 170, 255, 216, 128 ] ],
    [ [   1, 112, 230, 250, 199, 191, 247, 159, 255, 255, 128 ],
      [ 166, 109, 228, 252, 211, 215, 255, 174, 128, 128, 128 ],
      [  39,  77, 162, 232, 172, 180, 245, 178, 255, 255, 128 ] ],
    [ [   1,  52, 220, 246, 198, 199, 249, 220, 255, 255, 128 ],
      [ 124,  74, 191, 243, 183, 193, 250, 221, 255, 255, 128 ],
      [  24,  71, 130, 219, 154, 170, 243, 182, 255, 255, 128 ] ],
    [ [   1, 182, 225, 249, 219, 240, 255, 224, 128, 128, 128 ],
      [ 149, 150, 226, 252, 216, 205, 255, 171, 128, 128, 128 ],
      [  28, 108, 170, 242, 183, 194, 254, 223, 255, 255, 128 ] ],
    [ [   1,  81, 230, 252, 204, 203, 255, 192, 128, 128, 128 ],
      [ 123, 102, 209, 247, 188, 196, 255, 233, 128, 128, 128 ],
      [  20,  95, 153, 243, 164, 173, 255, 203, 128, 128, 128 ] ],
    [ [   1, 222, 248, 255, 216, 213, 128, 128, 128, 128, 128 ],
      [ 168, 175, 246, 252, 235, 205, 255, 255, 128, 128, 128 ],
      [  47, 116, 215, 255, 211, 212, 255, 255, 128, 128, 128 ] ],
    [ [   1, 121, 236, 253, 212, 214, 255, 255, 128, 128, 128 ],
      [ 141,  84, 213, 252, 201, 202, 255, 219, 128, 128, 128 ],
      [  42,  80, 160, 240, 162, 185, 255, 205, 128, 128, 128 ] ],
    [ [   1,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 244,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ],
      [ 238,   1, 255, 128, 128, 128, 128, 128, 128, 128, 128 ] ]
  ]
];
