//! Inclusion and consistency proofs.
//!
//! Every internal node hashes its own entry along with its children, so a
//! path step carries the parent's entry as well as the sibling digest.
//! Verifiers derive all positions and sides from Index Math; a proof only
//! supplies digests and entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weave_core::{Digest, Error, Result};

use crate::math::{children, consistency_nodes, height, parent, peak_of, peaks};
use crate::summary::{bag_peaks, node_digest, Summary};

/// One step from a node to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Digest of the sibling at this level.
    pub sibling: Digest,
    /// Raw entry stored at the parent.
    pub parent_entry: Vec<u8>,
}

/// Proof that an entry sits at a position of a log with a given summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Position of the entry.
    pub pos: u64,
    /// Log length when the proof was generated.
    pub log_len: u64,
    /// Child digests (left, right) if the position is internal.
    pub children: Option<(Digest, Digest)>,
    /// Steps up to the containing peak.
    pub path: Vec<PathStep>,
    /// All peak digests, in peak order.
    pub peaks: Vec<Digest>,
}

impl InclusionProof {
    /// Verify that `entry` is at `self.pos` in the log `summary` describes.
    ///
    /// Returns `Ok(false)` when digests disagree and an error when the proof
    /// does not have the shape its sizes require.
    pub fn verify(&self, entry: &[u8], summary: &Summary) -> Result<bool> {
        if summary.len != self.log_len {
            return Ok(false);
        }
        if self.pos >= self.log_len {
            return Err(Error::invalid_proof(format!(
                "position {} outside log of length {}",
                self.pos, self.log_len
            )));
        }

        let peak_positions = peaks(self.log_len);
        if peak_positions.len() != self.peaks.len() {
            return Err(Error::invalid_proof(format!(
                "expected {} peaks, got {}",
                peak_positions.len(),
                self.peaks.len()
            )));
        }

        let is_internal = height(self.pos) > 0;
        let mut current = match (&self.children, is_internal) {
            (Some((left, right)), true) => node_digest(Some((left, right)), entry)?,
            (None, false) => node_digest(None, entry)?,
            _ => {
                return Err(Error::invalid_proof(format!(
                    "children do not match height of position {}",
                    self.pos
                )))
            }
        };

        let peak = peak_of(self.log_len, self.pos)
            .ok_or_else(|| Error::invalid_proof("position has no peak"))?;

        let mut pos = self.pos;
        for step in &self.path {
            if pos == peak {
                return Err(Error::invalid_proof("path continues past peak"));
            }
            let up = parent(pos);
            let (left, _) = children(up, height(up))
                .ok_or_else(|| Error::invalid_proof(format!("parent {} has no children", up)))?;
            current = if pos == left {
                node_digest(Some((&current, &step.sibling)), &step.parent_entry)?
            } else {
                node_digest(Some((&step.sibling, &current)), &step.parent_entry)?
            };
            pos = up;
        }
        if pos != peak {
            return Err(Error::invalid_proof("path stops below peak"));
        }

        let peak_idx = peak_positions
            .iter()
            .position(|&p| p == peak)
            .ok_or_else(|| Error::invalid_proof("peak position not found"))?;
        if self.peaks[peak_idx] != current {
            return Ok(false);
        }

        Ok(bag_peaks(&self.peaks)? == summary.digest)
    }
}

/// Proof that a log of `from_len` entries is a prefix of one of `to_len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Length of the older log.
    pub from_len: u64,
    /// Length of the newer log.
    pub to_len: u64,
    /// Peak digests of the older log.
    pub from_peaks: Vec<Digest>,
    /// Digests of nodes wholly after `from_len`, by position.
    pub siblings: Vec<(u64, Digest)>,
    /// Entries of nodes straddling `from_len`, by position.
    pub ancestors: Vec<(u64, Vec<u8>)>,
}

impl ConsistencyProof {
    /// Verify that `old` describes a prefix of the log `new` describes.
    pub fn verify(&self, old: &Summary, new: &Summary) -> Result<bool> {
        if old.len != self.from_len || new.len != self.to_len {
            return Ok(false);
        }

        let nodes = consistency_nodes(self.from_len, self.to_len)?;
        let from_positions = peaks(self.from_len);

        if from_positions.len() != self.from_peaks.len() {
            return Err(Error::invalid_proof(format!(
                "expected {} old peaks, got {}",
                from_positions.len(),
                self.from_peaks.len()
            )));
        }
        if !self
            .siblings
            .iter()
            .map(|(pos, _)| *pos)
            .eq(nodes.siblings.iter().copied())
        {
            return Err(Error::invalid_proof("sibling positions do not match sizes"));
        }
        if !self
            .ancestors
            .iter()
            .map(|(pos, _)| *pos)
            .eq(nodes.ancestors.iter().copied())
        {
            return Err(Error::invalid_proof("ancestor positions do not match sizes"));
        }

        if bag_peaks(&self.from_peaks)? != old.digest {
            return Ok(false);
        }

        let mut known: BTreeMap<u64, Digest> = from_positions
            .into_iter()
            .zip(self.from_peaks.iter().copied())
            .collect();
        known.extend(self.siblings.iter().copied());

        // Ancestors ascend, so both children of each are already known.
        for (pos, entry) in &self.ancestors {
            let (left, right) = children(*pos, height(*pos)).ok_or_else(|| {
                Error::invalid_proof(format!("ancestor {} has no children", pos))
            })?;
            let digest = match (known.get(&left), known.get(&right)) {
                (Some(l), Some(r)) => node_digest(Some((l, r)), entry)?,
                _ => {
                    return Err(Error::invalid_proof(format!(
                        "children of {} not covered",
                        pos
                    )))
                }
            };
            known.insert(*pos, digest);
        }

        let to_peaks = peaks(self.to_len)
            .into_iter()
            .map(|pos| {
                known
                    .get(&pos)
                    .copied()
                    .ok_or_else(|| Error::invalid_proof(format!("peak {} not covered", pos)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(bag_peaks(&to_peaks)? == new.digest)
    }
}
