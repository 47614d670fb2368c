//! VP8 residue and motion vector entropy coding.
use tracing::debug;
use crate::error::{EncoderError, EncoderResult};
use crate::options::*;
use crate::vpenc::coder::BoolEncoder;

pub mod data;
use data::*;
pub mod models;
use models::*;
pub mod tokens;
use tokens::*;
pub mod mv;
use mv::*;
pub mod partition;
use partition::*;

const PARTITIONS_OPTION: &str = "partitions";
const MB_NO_COEFF_SKIP_OPTION: &str = "mb_no_coeff_skip";
const MV_PROB_UPDATE_OPTION: &str = "mv_prob_update";
const COEF_PROB_UPDATE_OPTION: &str = "coef_prob_update";
const PARTITION_LIMIT_OPTION: &str = "partition_limit";

const ENCODER_OPTS: &[NAOptionDefinition] = &[
    NAOptionDefinition {
        name: PARTITIONS_OPTION, description: "Number of token partitions (1, 2, 4 or 8)",
        opt_type: NAOptionDefinitionType::Int(Some(1), Some(MAX_PARTITIONS as i64)) },
    NAOptionDefinition {
        name: MB_NO_COEFF_SKIP_OPTION, description: "Do not code tokens for macroblocks without coefficients",
        opt_type: NAOptionDefinitionType::Bool },
    NAOptionDefinition {
        name: MV_PROB_UPDATE_OPTION, description: "Adapt motion vector probabilities",
        opt_type: NAOptionDefinitionType::Bool },
    NAOptionDefinition {
        name: COEF_PROB_UPDATE_OPTION, description: "Adapt coefficient probabilities",
        opt_type: NAOptionDefinitionType::Bool },
    NAOptionDefinition {
        name: PARTITION_LIMIT_OPTION, description: "Maximum partition size in bytes (0 - unlimited)",
        opt_type: NAOptionDefinitionType::Int(Some(0), None) },
];

/// Probability changes signalled in the frame header.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct FrameUpdates {
    /// Number of coefficient probabilities transmitted.
    pub coef_updates:   usize,
    /// Motion vector probabilities (and thus their costs) have changed.
    pub mv_changed:     bool,
}

/// Coder state as it was before the current frame header was written.
struct FrameSnapshot {
    models:     VP8Models,
    stat:       VP8ModelsStat,
    mv_counts:  [Vec<u32>; 2],
}

/// Frame-level entropy coder.
///
/// Statistics gathered while coding a frame are used to adapt the probabilities of the next
/// inter frame. Key frames start from the default probabilities.
///
/// A frame that failed (e.g. with [`StreamOverrun`]) may be coded again by calling
/// `begin_frame` once more: probabilities and statistics are restored to what they were
/// before the failed attempt so the new header carries the same updates.
///
/// [`StreamOverrun`]: ../error/enum.EncoderError.html#variant.StreamOverrun
pub struct VP8EntropyCoder {
    models:         VP8Models,
    tmodel:         TokenModel,
    mvc:            MVEntropyCoder,
    coef_upd_probs: CoefProbs,
    parts:          Option<TokenPartitions>,
    pending:        Option<FrameSnapshot>,
    mb_h:           usize,
    mb_y:           usize,

    num_parts:      usize,
    part_limit:     usize,
    no_coeff_skip:  bool,
    mv_prob_upd:    bool,
    coef_prob_upd:  bool,
}

impl VP8EntropyCoder {
    /// Creates a coder for a frame of `mb_w`x`mb_h` macroblocks.
    ///
    /// `coef_upd_probs` are the probabilities for coefficient update flags.
    pub fn new(mb_w: usize, mb_h: usize, coef_upd_probs: &CoefProbs) -> EncoderResult<Self> {
        if mb_w == 0 || mb_h == 0 {
            return Err(EncoderError::ContractViolation("empty frame"));
        }
        if coef_upd_probs.iter().flatten().flatten().flatten().any(|&p| p == 0) {
            return Err(EncoderError::ContractViolation("zero update probability"));
        }
        let models = VP8Models::new();
        let mvc = MVEntropyCoder::new(&models.mv_probs)?;
        Ok(Self {
            models,
            tmodel:         TokenModel::new(mb_w),
            mvc,
            coef_upd_probs: *coef_upd_probs,
            parts:          None,
            pending:        None,
            mb_h,
            mb_y:           0,

            num_parts:      1,
            part_limit:     0,
            no_coeff_skip:  true,
            mv_prob_upd:    true,
            coef_prob_upd:  true,
        })
    }
    pub fn models(&self) -> &VP8Models { &self.models }
    pub fn token_model(&self) -> &TokenModel { &self.tmodel }
    pub fn mv_costs(&self) -> &MVCostTable { self.mvc.costs() }
    /// Writes probability updates for the new frame into the header coder and prepares token partitions.
    ///
    /// Coefficient updates are written first, motion vector updates (inter frames only) follow.
    pub fn begin_frame(&mut self, hdr: &mut BoolEncoder, is_intra: bool) -> EncoderResult<FrameUpdates> {
        if let Some(snap) = self.pending.take() {
            debug!("previous frame was not finished, restoring its starting state");
            self.models = snap.models;
            self.tmodel.stat = snap.stat;
            self.mvc.restore_counts(&snap.mv_counts)?;
            self.mvc.rebuild_costs(&self.models.mv_probs)?;
        }
        self.pending = Some(FrameSnapshot {
                models:     self.models,
                stat:       self.tmodel.stat,
                mv_counts:  self.mvc.counts().clone(),
            });

        let mut upd = FrameUpdates::default();
        if is_intra {
            debug!("key frame, resetting probabilities");
            self.models.reset();
            self.mvc.reset_counts();
            self.mvc.rebuild_costs(&self.models.mv_probs)?;
            write_no_coef_updates(hdr, &self.coef_upd_probs)?;
        } else {
            if self.coef_prob_upd {
                upd.coef_updates = write_coef_prob_updates(hdr, self.tmodel.tree(), &mut self.models, &self.tmodel.stat, &self.coef_upd_probs)?;
            } else {
                write_no_coef_updates(hdr, &self.coef_upd_probs)?;
            }
            if self.mv_prob_upd {
                upd.mv_changed = self.mvc.refit_and_write_probabilities(hdr, &mut self.models.mv_probs)?;
            } else {
                self.mvc.write_no_updates(hdr)?;
                self.mvc.reset_counts();
            }
            debug!("frame probability updates: {} coefficients, MV changed {}", upd.coef_updates, upd.mv_changed);
        }
        self.tmodel.stat.reset();
        self.tmodel.nz.reset();
        self.mb_y = 0;
        self.parts = Some(TokenPartitions::new(self.num_parts, self.part_limit)?);
        Ok(upd)
    }
    pub fn start_mb_row(&mut self, mb_y: usize) -> EncoderResult<()> {
        if mb_y >= self.mb_h {
            return Err(EncoderError::ContractViolation("macroblock row is outside the frame"));
        }
        self.tmodel.nz.update_mb_row();
        self.mb_y = mb_y;
        Ok(())
    }
    /// Codes macroblock residues into the partition of the current row.
    ///
    /// Returns `true` if the macroblock was skipped and its skip flag should be set.
    pub fn encode_mb_residues(&mut self, mb_x: usize, mb: &MBCoeffs) -> EncoderResult<bool> {
        let parts = self.parts.as_mut().ok_or(EncoderError::ContractViolation("frame has not been started"))?;
        if self.no_coeff_skip && TokenModel::mb_is_skippable(mb) {
            self.tmodel.skip_mb(mb_x, mb.has_y2)?;
            return Ok(true);
        }
        let bc = parts.coder_for_row(self.mb_y);
        self.tmodel.encode_mb(bc, &self.models, mb_x, mb)?;
        Ok(false)
    }
    /// Writes a motion vector (in coder units) into the mode coder.
    pub fn encode_mv(&mut self, bc: &mut BoolEncoder, row: i16, col: i16) -> EncoderResult<()> {
        self.mvc.encode_mv(bc, row, col, &self.models.mv_probs)
    }
    /// Flushes token partitions and returns their data.
    ///
    /// The frame is considered complete only after this succeeds.
    pub fn finish_partitions(&mut self) -> EncoderResult<Vec<Vec<u8>>> {
        let parts = self.parts.take().ok_or(EncoderError::ContractViolation("frame has not been started"))?;
        let data = parts.finish()?;
        self.pending = None;
        debug!("token partitions total size {}", data.iter().map(|p| p.len()).sum::<usize>());
        Ok(data)
    }
}

impl NAOptionHandler for VP8EntropyCoder {
    fn get_supported_options(&self) -> &[NAOptionDefinition] { ENCODER_OPTS }
    fn set_options(&mut self, options: &[NAOption]) {
        for option in options.iter() {
            for opt_def in ENCODER_OPTS.iter() {
                if opt_def.check(option).is_ok() {
                    match option.name {
                        PARTITIONS_OPTION => {
                            if let NAValue::Int(val) = option.value {
                                if (val as usize).is_power_of_two() {
                                    self.num_parts = val as usize;
                                }
                            }
                        },
                        MB_NO_COEFF_SKIP_OPTION => {
                            if let NAValue::Bool(val) = option.value {
                                self.no_coeff_skip = val;
                            }
                        },
                        MV_PROB_UPDATE_OPTION => {
                            if let NAValue::Bool(val) = option.value {
                                self.mv_prob_upd = val;
                            }
                        },
                        COEF_PROB_UPDATE_OPTION => {
                            if let NAValue::Bool(val) = option.value {
                                self.coef_prob_upd = val;
                            }
                        },
                        PARTITION_LIMIT_OPTION => {
                            if let NAValue::Int(val) = option.value {
                                self.part_limit = val as usize;
                            }
                        },
                        _ => {},
                    };
                }
            }
        }
    }
    fn query_option_value(&self, name: &str) -> Option<NAValue> {
        match name {
            PARTITIONS_OPTION       => Some(NAValue::Int(self.num_parts as i64)),
            MB_NO_COEFF_SKIP_OPTION => Some(NAValue::Bool(self.no_coeff_skip)),
            MV_PROB_UPDATE_OPTION   => Some(NAValue::Bool(self.mv_prob_upd)),
            COEF_PROB_UPDATE_OPTION => Some(NAValue::Bool(self.coef_prob_upd)),
            PARTITION_LIMIT_OPTION  => Some(NAValue::Int(self.part_limit as i64)),
            _ => None,
        }
    }
}
