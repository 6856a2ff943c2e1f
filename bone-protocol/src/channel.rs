//! Parsers for the binary bodies of the streaming commands.
//!
//! Sizing always truncates: bytes that do not fill a whole group, record,
//! span or word are dropped without error. Callers that need exact counts
//! should compare successive [`Position`] values.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::decode::{
    HEX_TRIPLET_LEN, WORD_LEN, amplitude_from_word, decode_float32, decode_hex_triplet,
    runtime_from_word,
};
use crate::error::Result;
use crate::position::Position;

/// Filter name of the compound runtime/amplitude channel.
pub const SAW: &str = "saw";

/// Key under which the saw channel's runtime samples are reported.
pub const RUNTIME_KEY: &str = "rt";

/// Key under which the saw channel's amplitude samples are reported.
pub const AMPLITUDE_KEY: &str = "amp";

/// One `ks_sync` record: a tag byte followed by a big-endian `f32`.
pub const KS_SYNC_RECORD_LEN: usize = 1 + WORD_LEN;

/// Decode a `dv_data` body: one voltage per 3-digit ASCII hex group.
pub fn parse_dv_data(body: &[u8]) -> Result<Vec<f64>> {
    body.chunks_exact(HEX_TRIPLET_LEN)
        .map(decode_hex_triplet)
        .collect()
}

/// Decode a `ks` body: cursor, then big-endian `f32` samples.
pub fn parse_ks(body: &[u8]) -> Result<(Position, Vec<f64>)> {
    let (position, data) = Position::split_body(body)?;
    Ok((position, decode_float32(data)))
}

/// Decode a `ks_sync` body: cursor, then tagged records interleaved
/// round-robin across `channel_count` channels.
pub fn parse_ks_sync(body: &[u8], channel_count: usize) -> Result<(Position, KsSyncData)> {
    let (position, data) = Position::split_body(body)?;
    if channel_count == 0 {
        return Ok((position, KsSyncData::default()));
    }

    let samples = data.len() / (KS_SYNC_RECORD_LEN * channel_count);
    let mut channels = vec![Vec::with_capacity(samples); channel_count];
    for (i, record) in data
        .chunks_exact(KS_SYNC_RECORD_LEN)
        .take(samples * channel_count)
        .enumerate()
    {
        let value = f32::from_be_bytes([record[1], record[2], record[3], record[4]]);
        channels[i % channel_count].push(f64::from(value));
    }

    Ok((position, KsSyncData { channels }))
}

/// Decode a `sync` body: cursor, then one equal-length span per filter entry.
///
/// The [`SAW`] span splits every word into runtime and amplitude; every other
/// span is a run of big-endian `f32`.
pub fn parse_sync<S: AsRef<str>>(body: &[u8], filter: &[S]) -> Result<(Position, SyncData)> {
    let (position, data) = Position::split_body(body)?;
    if filter.is_empty() {
        return Ok((position, SyncData::default()));
    }

    let span_len = data.len() / filter.len();
    let blocks = filter
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let span = &data[i * span_len..(i + 1) * span_len];
            let name = name.as_ref();
            let block = if name == SAW {
                decode_saw(span)
            } else {
                ChannelBlock::Samples(decode_float32(span))
            };
            (name.to_owned(), block)
        })
        .collect();

    Ok((position, SyncData { blocks }))
}

fn decode_saw(span: &[u8]) -> ChannelBlock {
    let (runtime, amplitude) = span
        .chunks_exact(WORD_LEN)
        .map(|w| {
            let word = u32::from_be_bytes([w[0], w[1], w[2], w[3]]);
            (runtime_from_word(word), amplitude_from_word(word))
        })
        .unzip();
    ChannelBlock::Saw { runtime, amplitude }
}

/// `ks_sync` samples indexed `[channel][sample]`, channels in filter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KsSyncData {
    channels: Vec<Vec<f64>>,
}

impl KsSyncData {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel; every channel has the same count.
    pub fn sample_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.channels
    }
}

impl Index<usize> for KsSyncData {
    type Output = [f64];

    fn index(&self, channel: usize) -> &[f64] {
        &self.channels[channel]
    }
}

/// Decoded samples for one `sync` filter entry.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelBlock {
    /// Plain `f32` channel.
    Samples(Vec<f64>),
    /// The saw channel, one runtime and one amplitude per word.
    Saw {
        runtime: Vec<f64>,
        amplitude: Vec<f64>,
    },
}

impl ChannelBlock {
    pub fn len(&self) -> usize {
        match self {
            Self::Samples(samples) => samples.len(),
            Self::Saw { runtime, .. } => runtime.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decoded `sync` response, blocks kept in filter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncData {
    blocks: Vec<(String, ChannelBlock)>,
}

impl SyncData {
    pub fn blocks(&self) -> &[(String, ChannelBlock)] {
        &self.blocks
    }

    pub fn block(&self, name: &str) -> Option<&ChannelBlock> {
        self.blocks
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, block)| block)
    }

    /// Look up a flat key: [`RUNTIME_KEY`], [`AMPLITUDE_KEY`], or a filter name.
    ///
    /// When a key occurs more than once the later block wins.
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.blocks.iter().rev().find_map(|(name, block)| match block {
            ChannelBlock::Saw { runtime, .. } if key == RUNTIME_KEY => Some(runtime.as_slice()),
            ChannelBlock::Saw { amplitude, .. } if key == AMPLITUDE_KEY => {
                Some(amplitude.as_slice())
            }
            ChannelBlock::Samples(samples) if name == key => Some(samples.as_slice()),
            _ => None,
        })
    }

    pub fn runtime(&self) -> Option<&[f64]> {
        self.get(RUNTIME_KEY)
    }

    pub fn amplitude(&self) -> Option<&[f64]> {
        self.get(AMPLITUDE_KEY)
    }

    /// Flat keys in filter order; the saw block contributes `rt` and `amp`.
    pub fn keys(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|(name, block)| match block {
                ChannelBlock::Saw { .. } => vec![RUNTIME_KEY, AMPLITUDE_KEY],
                ChannelBlock::Samples(_) => vec![name.as_str()],
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Flatten into `key -> samples`.
    pub fn into_map(self) -> BTreeMap<String, Vec<f64>> {
        let mut map = BTreeMap::new();
        for (name, block) in self.blocks {
            match block {
                ChannelBlock::Saw { runtime, amplitude } => {
                    map.insert(RUNTIME_KEY.to_owned(), runtime);
                    map.insert(AMPLITUDE_KEY.to_owned(), amplitude);
                }
                ChannelBlock::Samples(samples) => {
                    map.insert(name, samples);
                }
            }
        }
        map
    }
}
