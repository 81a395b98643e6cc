use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vehicle_api::{VehicleRecord, COORD_MAX, SPEED_MAX};

use super::error::EmitterError;

/// Supplies one record per emission cycle. `None` means the source is exhausted.
pub trait DataSource {
    fn next_record(&mut self) -> Option<VehicleRecord>;
}

// ═══════════════════════════════════════════════════════════════
//  Random source
// ═══════════════════════════════════════════════════════════════

/// Uniform random samples: x, y in `0..=100`, speed in `0..120`, fair brake coin.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// `seed == 0` draws the seed from the OS, so runs are not reproducible.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(seed)
        };
        Self { rng }
    }
}

impl DataSource for RandomSource {
    fn next_record(&mut self) -> Option<VehicleRecord> {
        Some(VehicleRecord::new(
            self.rng.random_range(0..=COORD_MAX),
            self.rng.random_range(0..=COORD_MAX),
            self.rng.random_range(0.0..SPEED_MAX),
            self.rng.random_bool(0.5),
        ))
    }
}

// ═══════════════════════════════════════════════════════════════
//  File source
// ═══════════════════════════════════════════════════════════════

/// Replays records from a text file, one `x y speed brake` per line.
///
/// Fields may be separated by whitespace, `,` or `;`. Blank lines and lines
/// starting with `#` are skipped. Ranges are not checked here: an out-of-range
/// line reaches the encoder and is skipped at emit time.
pub struct FileSource {
    records: Vec<VehicleRecord>,
    pos: usize,
    pub path: String,
}

impl FileSource {
    pub fn open(path: &str) -> Result<Self, EmitterError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EmitterError::Config(format!("cannot open {path}: {e}")))?;
        let records = parse_records(&content)
            .map_err(|e| EmitterError::Config(format!("{path}: {e}")))?;
        if records.is_empty() {
            return Err(EmitterError::Config(format!("file is empty: {path}")));
        }
        Ok(Self {
            records,
            pos: 0,
            path: path.to_string(),
        })
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }
}

impl DataSource for FileSource {
    fn next_record(&mut self) -> Option<VehicleRecord> {
        let record = self.records.get(self.pos).copied()?;
        self.pos += 1;
        Some(record)
    }
}

fn parse_records(content: &str) -> Result<Vec<VehicleRecord>, String> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .map(|(n, l)| parse_line(l).map_err(|e| format!("line {n}: {e}")))
        .collect()
}

fn parse_line(line: &str) -> Result<VehicleRecord, String> {
    let line = line.replace([',', ';'], " ");
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [x, y, speed, brake] = fields.as_slice() else {
        return Err(format!("expected 4 fields (x y speed brake), got {}", fields.len()));
    };

    let x: u32 = x.parse().map_err(|_| format!("bad x: {x}"))?;
    let y: u32 = y.parse().map_err(|_| format!("bad y: {y}"))?;
    let speed: f64 = speed.parse().map_err(|_| format!("bad speed: {speed}"))?;
    let brake = match brake.to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        other => return Err(format!("bad brake: {other}")),
    };
    Ok(VehicleRecord::new(x, y, speed, brake))
}
