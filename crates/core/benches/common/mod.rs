use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Throughput};

use folio_core::{MemoryDocument, MemoryPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("FOLIO_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }

    /// Line counts of the synthetic pages measured at this tier.
    pub fn page_sizes(self) -> &'static [usize] {
        match self {
            Self::Quick => &[10, 50],
            Self::Full => &[10, 50, 200],
        }
    }

    /// Page generator seed. Each tier gets its own stream so quick and full
    /// runs never share layouts.
    pub fn page_seed(self) -> u64 {
        let base = env::var("FOLIO_BENCH_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0xC0FFEE);
        match self {
            Self::Quick => base,
            Self::Full => base.rotate_left(32) ^ 0x5EED,
        }
    }

    pub fn apply<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        let (samples, secs) = match self {
            Self::Quick => (20, 3),
            Self::Full => (30, 5),
        };
        group
            .sample_size(samples)
            .measurement_time(Duration::from_secs(secs));
    }
}

pub fn chars_throughput(chars: usize) -> Throughput {
    Throughput::Elements(chars as u64)
}

/// SplitMix64 stream used to jitter word placement.
struct Jitter(u64);

impl Jitter {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn offset(&mut self, spread: f64) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64 * spread
    }

    fn word(&mut self) -> &'static str {
        WORDS[(self.next() % WORDS.len() as u64) as usize]
    }
}

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
];

/// A page of `lines` text lines, two columns each, with jittered word positions.
pub fn synthetic_page(seed: u64, lines: usize) -> MemoryDocument {
    let mut jitter = Jitter(seed);
    let mut page = MemoryPage::default();
    for line in 0..lines {
        let bottom = 780.0 - 14.0 * line as f64;
        for column_left in [36.0, 320.0] {
            let mut x = column_left + jitter.offset(4.0);
            while x < column_left + 240.0 {
                let word = jitter.word();
                page.push_line(word, x, bottom + jitter.offset(1.0) - 0.5, 5.5, 11.0);
                x += 5.5 * (word.len() + 1) as f64;
            }
        }
        page.push_line_break();
    }
    MemoryDocument::new(vec![page])
}
