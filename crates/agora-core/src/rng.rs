//! Per-agent random streams.
//!
//! Every random draw in a tick comes from a generator seeded by
//! `(world seed, tick, agent id, stream)`. Because no generator is shared
//! between agents, the values an agent sees do not depend on how the
//! population is split across threads or in which order it is visited.

use agora_types::AgentId;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Which phase a generator feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Velocity jitter in the movement phase.
    Movement,
    /// Connection rolls in the social aggregation phase.
    Connection,
}

impl Stream {
    const fn salt(self) -> u64 {
        match self {
            Self::Movement => 0x4d4f_5645,
            Self::Connection => 0x434f_4e4e,
        }
    }
}

/// Factory for the generators used during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomStreams {
    seed: u64,
    tick: u64,
}

impl RandomStreams {
    /// Create the stream factory for `tick` of a run seeded with `seed`.
    pub const fn new(seed: u64, tick: u64) -> Self {
        Self { seed, tick }
    }

    /// Generator for one agent and one stream.
    pub fn for_agent(&self, agent: AgentId, stream: Stream) -> SmallRng {
        let mut state = splitmix64(self.seed);
        state = splitmix64(state ^ self.tick);
        state = splitmix64(state ^ agent.into_inner());
        state = splitmix64(state ^ stream.salt());
        SmallRng::seed_from_u64(state)
    }
}

/// One round of the SplitMix64 finalizer.
const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
