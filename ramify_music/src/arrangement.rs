// The demonstration arrangement: eight drum parts and seven pitched parts.
//
// Every bar i gets its own harmony and metrum, both steered by the
// valuations of i + 1:
// - harmony: the configured scale rooted at a random degree plus 3 * v2,
//   so bars 2, 4, 8, ... shift the tonal center by thirds of the cycle;
// - metrum: [1 + 2 * 3^v3, 1, 2, 2, 6], so every third bar is longer and
//   every ninth longer still.
//
// Each part then decides, per bar, how many attacks it wants and which
// generators drive them, again mostly as functions of v2 and v3. Parts with
// an explicit seed in their table entry reuse that seed whenever the
// valuation repeats, which is what makes patterns recur across bars; the
// rest draw a fresh fork of the master stream.
//
// Consumed by main.rs; feeds motive.rs one bar at a time.

use crate::config::GeneratorConfig;
use crate::error::{MusicError, Result};
use crate::generator::{IntGenerator, Lin, RangePolicy, Rnd, Walk};
use crate::harmony::Harmony;
use crate::metrum::Metrum;
use crate::motive::generate_motive;
use crate::rational::Rational;
use crate::scale::build_scale;
use crate::track::{Chord, Composition, Track};
use crate::valuation::{dyadic_valuation, p_valuation};
use log::{debug, info};
use ramify_prng::SeededRng;

/// General MIDI program 26 on the drum channel.
pub const DRUM_KIT: i8 = -26;

/// Harmony and meter of one bar, plus the valuations that shaped them.
#[derive(Debug, Clone)]
pub struct Bar {
    pub index: usize,
    pub v2: u32,
    pub v3: u32,
    pub harmony: Harmony,
    pub metrum: Metrum,
}

impl Bar {
    pub fn new(index: usize, scale: &[i32], rng: &mut SeededRng) -> Result<Self> {
        let n = index as i64 + 1;
        let v2 = dyadic_valuation(n).unwrap_or(0);
        let v3 = p_valuation(3, n).unwrap_or(0);

        let base = rng.range_i64_inclusive(0, 7) + 3 * v2 as i64;
        let harmony = Harmony::new(scale, base)?;

        let top = 3u32
            .checked_pow(v3)
            .and_then(|p| p.checked_mul(2))
            .and_then(|p| p.checked_add(1))
            .ok_or_else(|| MusicError::invalid(format!("bar {index} is too long to lay out")))?;
        let metrum = Metrum::new(&[top, 1, 2, 2, 6])?;

        Ok(Bar {
            index,
            v2,
            v3,
            harmony,
            metrum,
        })
    }

    fn v2(&self) -> i64 {
        self.v2 as i64
    }

    fn v3(&self) -> i64 {
        self.v3 as i64
    }

    /// Pitches of harmony weight `min_weight` or more within `[low, high)`.
    fn register(&self, min_weight: u32, low: i32, high: i32) -> Vec<i32> {
        self.harmony
            .lookup_weights(Some(min_weight), None)
            .lookup_range(low, high)
    }
}

/// Builds generators, forking the master stream for unseeded ones.
struct Generators<'a> {
    master: &'a mut SeededRng,
    policy: RangePolicy,
}

type Gen = Box<dyn IntGenerator>;

impl Generators<'_> {
    fn lin(&self, value: i64, step: i64) -> Gen {
        Box::new(Lin::new(value, step))
    }

    fn rnd(&mut self, low: i64, high: i64, step: i64) -> Result<Gen> {
        let rng = self.master.fork();
        Ok(Box::new(Rnd::new(low, Some(high), step, self.policy, rng)?))
    }

    fn rnd_seeded(&self, low: i64, high: i64, step: i64, seed: i64) -> Result<Gen> {
        let rng = SeededRng::new(seed as u64);
        Ok(Box::new(Rnd::new(low, Some(high), step, self.policy, rng)?))
    }

    fn walk(&mut self, value: i64, low: i64, high: i64, step: i64) -> Gen {
        let rng = self.master.fork();
        Box::new(Walk::new(value, low, Some(high), step, self.policy, rng))
    }

    fn walk_seeded(&self, value: i64, low: i64, high: i64, step: i64, seed: i64) -> Gen {
        let rng = SeededRng::new(seed as u64);
        Box::new(Walk::new(value, low, Some(high), step, self.policy, rng))
    }

    fn randint(&mut self, low: i64, high: i64) -> i64 {
        self.master.range_i64_inclusive(low, high)
    }
}

/// Everything one part needs to render one bar.
struct BarMotive {
    hits: usize,
    /// Lowest metrum weight the part may attack on.
    min_beat_weight: usize,
    beat: Gen,
    duration: Gen,
    velocity: Gen,
    pitches: Vec<i32>,
    voices: Vec<Gen>,
}

impl BarMotive {
    fn render(mut self, bar: &Bar) -> Result<Vec<Chord>> {
        let slice = bar.metrum.lookup_weights(Some(self.min_beat_weight), None);
        generate_motive(
            self.hits,
            &slice,
            self.beat.as_mut(),
            self.duration.as_mut(),
            self.velocity.as_mut(),
            &self.pitches,
            &mut self.voices,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    BassDrum1,
    BassDrum2,
    Snare,
    Clap,
    Toms,
    Crash,
    ClosedHihat,
    OpenHihat,
    Bass,
    SynthArpeggio,
    Marimba,
    Guitar,
    Sax,
    Flute,
    Pad,
}

impl Part {
    pub const ALL: [Part; 15] = [
        Part::BassDrum1,
        Part::BassDrum2,
        Part::Snare,
        Part::Clap,
        Part::Toms,
        Part::Crash,
        Part::ClosedHihat,
        Part::OpenHihat,
        Part::Bass,
        Part::SynthArpeggio,
        Part::Marimba,
        Part::Guitar,
        Part::Sax,
        Part::Flute,
        Part::Pad,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Part::BassDrum1 => "Bassdrum1",
            Part::BassDrum2 => "Bassdrum2",
            Part::Snare => "Snare",
            Part::Clap => "Clap",
            Part::Toms => "Tomtoms",
            Part::Crash => "Crash",
            Part::ClosedHihat => "Hihat (closed)",
            Part::OpenHihat => "Hihat (open)",
            Part::Bass => "Bass",
            Part::SynthArpeggio => "Synth Arpeggio",
            Part::Marimba => "Marimba",
            Part::Guitar => "Guitar",
            Part::Sax => "Sax",
            Part::Flute => "Flute",
            Part::Pad => "Pad",
        }
    }

    /// General MIDI program, or `DRUM_KIT` for percussion.
    pub fn instrument(self) -> i8 {
        match self {
            Part::BassDrum1
            | Part::BassDrum2
            | Part::Snare
            | Part::Clap
            | Part::Toms
            | Part::Crash
            | Part::ClosedHihat
            | Part::OpenHihat => DRUM_KIT,
            Part::Bass => 35,          // fretless bass
            Part::SynthArpeggio => 38, // synth bass 1
            Part::Marimba => 12,
            Part::Guitar => 26, // jazz guitar
            Part::Sax => 65,    // alto sax
            Part::Flute => 73,
            Part::Pad => 89, // warm pad
        }
    }

    fn motive(self, bar: &Bar, g: &mut Generators<'_>) -> Result<BarMotive> {
        let (v2, v3) = (bar.v2(), bar.v3());
        let alternating = 1 + (bar.index % 2) as i64;

        let motive = match self {
            Part::BassDrum1 => BarMotive {
                hits: 1 + 2usize.pow(1 + bar.v3),
                min_beat_weight: 1,
                beat: g.lin(40, 5 + 3 * v2),
                duration: g.lin(0, 0),
                velocity: g.rnd(80, 110, 1)?,
                pitches: vec![35],
                voices: vec![g.lin(0, 0)],
            },
            Part::BassDrum2 => BarMotive {
                hits: 1 + 2 * v3 as usize,
                min_beat_weight: 3,
                beat: g.lin(0, 5 + 3 * v2),
                duration: g.lin(0, 0),
                velocity: g.rnd(80, 120, 1)?,
                pitches: vec![36],
                voices: vec![g.lin(0, 0)],
            },
            Part::Snare => BarMotive {
                hits: 4 + 2usize.pow(2 + bar.v3),
                min_beat_weight: 1,
                beat: g.lin(210, 4 - v3),
                duration: g.lin(0, 0),
                velocity: g.rnd(70, 90, 1)?,
                pitches: vec![38],
                voices: vec![g.lin(0, 0)],
            },
            Part::Clap => BarMotive {
                hits: 2usize.pow(1 + bar.v3),
                min_beat_weight: 1,
                beat: g.lin(40, 6 + v2),
                duration: g.lin(0, 0),
                velocity: g.rnd(60, 80, 1)?,
                pitches: vec![39],
                voices: vec![g.lin(0, 0)],
            },
            Part::Toms => BarMotive {
                hits: 2 + 2 * v2 as usize,
                min_beat_weight: 1,
                beat: g.rnd_seeded(30, 100, (4 - v2 / 2).max(1), 1 + v2)?,
                duration: g.lin(0, 0),
                velocity: g.rnd(20, 60, 1)?,
                pitches: vec![41, 43, 45, 47, 48, 50],
                voices: vec![g.lin(v2, 1 + v2)],
            },
            Part::Crash => BarMotive {
                hits: 1 + (v3 / 2) as usize,
                min_beat_weight: 4,
                beat: g.lin(27, 13),
                duration: g.lin(0, 0),
                velocity: g.lin(50, 0),
                pitches: vec![49],
                voices: vec![g.lin(0, 0)],
            },
            Part::ClosedHihat => BarMotive {
                hits: 2usize.pow(2 + bar.v3),
                min_beat_weight: 0,
                beat: g.lin(200, 6 - v3),
                duration: g.lin(0, 0),
                velocity: g.lin(50, 0),
                pitches: vec![42],
                voices: vec![g.rnd(0, 2, 1)?],
            },
            Part::OpenHihat => BarMotive {
                hits: 2 * (2 + v3 as usize),
                min_beat_weight: 2,
                beat: g.rnd(50, 300, (8 - v2).max(1))?,
                duration: g.lin(0, 0),
                velocity: g.lin(50, 0),
                pitches: vec![46],
                voices: vec![g.rnd(0, 2, 1)?],
            },
            Part::Bass => BarMotive {
                hits: 4 + 2 * v3 as usize,
                min_beat_weight: 2,
                beat: g.rnd_seeded(0, 300, 1, 1 + v2)?,
                duration: g.rnd(0, 50, 1)?,
                velocity: g.lin(100, 0),
                pitches: bar.register(4, 24, 36),
                voices: vec![g.lin(0, 0)],
            },
            Part::SynthArpeggio => BarMotive {
                hits: 8 + 4 * v2 as usize,
                min_beat_weight: 1,
                beat: g.lin(220, 7),
                duration: g.lin(0, 0),
                velocity: g.lin(50, 0),
                pitches: bar.register(3, 44, 60),
                voices: vec![g.lin(0, 3)],
            },
            Part::Marimba => BarMotive {
                hits: 16 + 2 * v2 as usize,
                min_beat_weight: 2,
                beat: g.rnd(100, 300, 1)?,
                duration: g.rnd(40, 60, 1)?,
                velocity: g.rnd(20, 60, 1)?,
                pitches: bar.register(2, 50, 64),
                voices: vec![g.walk(7, 0, 14, 2 + v2), g.walk(5, 0, 14, 2 + v2)],
            },
            Part::Guitar => {
                let start = g.randint(1, 3);
                BarMotive {
                    hits: 4 + 4 * v2 as usize,
                    min_beat_weight: 1,
                    beat: g.lin(34, 13),
                    duration: g.rnd(50, 100, 1)?,
                    velocity: g.lin(40, 0),
                    pitches: bar.register(3, 56, 72),
                    voices: vec![g.walk_seeded(start, 0, 4, alternating, 2 + v2)],
                }
            }
            Part::Sax => {
                let start = g.randint(4, 17);
                BarMotive {
                    hits: 12,
                    min_beat_weight: 1,
                    beat: g.rnd(80, 120, 1)?,
                    duration: g.rnd(40, 60, 1)?,
                    velocity: g.rnd(70, 80, 1)?,
                    pitches: bar.register(2, 48, 84),
                    voices: vec![g.walk_seeded(start, 0, 21, 1, 3 + v2)],
                }
            }
            Part::Flute => {
                let start = g.randint(4, 10);
                BarMotive {
                    hits: 12,
                    min_beat_weight: 1,
                    beat: g.rnd(160, 200, 1)?,
                    duration: g.rnd(60, 80, 1)?,
                    velocity: g.rnd(40, 50, 1)?,
                    pitches: bar.register(2, 76, 100),
                    voices: vec![g.walk_seeded(start, 0, 13, alternating, 2 + v2)],
                }
            }
            Part::Pad => BarMotive {
                hits: 1,
                min_beat_weight: 3,
                beat: g.lin(0, 300),
                duration: g.rnd(80, 100, 1)?,
                velocity: g.lin(20, 0),
                pitches: bar.register(4, 56, 104),
                voices: (0..4).map(|v| g.lin(v, 0)).collect(),
            },
        };
        Ok(motive)
    }
}

/// Lay out every bar, then render every part over all of them.
pub fn compose(config: &GeneratorConfig, master: &mut SeededRng) -> Result<Composition> {
    let shift = master.range_i64_inclusive(0, 8) as usize;
    let scale = build_scale(&config.scale_steps, shift)?;

    let bars = (0..config.bars)
        .map(|i| Bar::new(i, &scale, master))
        .collect::<Result<Vec<_>>>()?;
    let length: Rational = bars.iter().map(|b| b.metrum.span()).sum();
    info!(
        "{} bars, {} beats, scale {:?} (shift {})",
        bars.len(),
        length,
        scale,
        shift
    );

    let mut generators = Generators {
        master,
        policy: config.range_policy,
    };
    let mut tracks = Vec::with_capacity(Part::ALL.len());
    for part in Part::ALL {
        let mut track = Track::new(part.name(), part.instrument());
        for bar in &bars {
            let chords = part.motive(bar, &mut generators)?.render(bar)?;
            track.append_many(chords);
        }
        debug!("{}: {} chords", track.name, track.chords().len());
        tracks.push(track);
    }

    Ok(Composition::new(tracks, config.tempo_bpm))
}
