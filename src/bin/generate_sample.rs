//! Writes `sample_players.csv`, a deterministic player sheet for running the
//! dashboard offline (`SB_SOURCE_URL=sample_players.csv`).

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ROLES: [&str; 14] = [
    "Dominant Defender Percentile",
    "Ball Playing Defender Percentile",
    "Defensive Fullback Percentile",
    "Attacking Fullback Percentile",
    "Holding Midfielder Percentile",
    "Ball Progressor Percentile",
    "Number 10 Percentile",
    "Box Crasher Percentile",
    "Half Space Creator Percentile",
    "Inverted Winger Percentile",
    "Creative Winger Percentile",
    "Advanced Striker Percentile",
    "Physical Striker Percentile",
    "Creative Striker Percentile",
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let competitions: [(&str, [&str; 4]); 2] = [
        ("Premiership", ["Celtic", "Rangers", "Hearts", "Hibernian"]),
        ("Eredivisie", ["Ajax", "PSV", "Feyenoord", "Twente"]),
    ];
    let positions = ["Defender", "Fullback", "Midfielder", "Winger", "Striker", "Goalkeeper"];
    let first = ["Ada", "Ben", "Cai", "Dev", "Eli", "Finn", "Gus", "Hal", "Ivo", "Jon"];
    let last = ["Silva", "Okafor", "Lund", "Patel", "Moreau", "Baker", "Novak", "Reyes"];

    let output_path = "sample_players.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec!["Name", "Team", "Age", "Usage", "Height", "Position", "Competition"];
    header.extend(ROLES);
    writer.write_record(&header)?;

    let mut rows = 0;
    for (competition, teams) in &competitions {
        for team in teams {
            for _ in 0..12 {
                let name = format!("{} {}", rng.pick(&first), rng.pick(&last));
                let age = rng.range(17.0, 36.0).floor();
                let usage = (rng.range(5.0, 100.0) * 10.0).round() / 10.0;
                // About one in five players has no recorded height.
                let height = if rng.next_f64() < 0.2 {
                    String::new()
                } else {
                    format!("{:.2}", rng.range(1.65, 1.98))
                };

                let mut record = vec![
                    name,
                    team.to_string(),
                    format!("{age}"),
                    format!("{usage}"),
                    height,
                    rng.pick(&positions).to_string(),
                    competition.to_string(),
                ];
                for _ in ROLES {
                    // Sparse scores exercise the zero-fill in the loader.
                    let score = if rng.next_f64() < 0.1 {
                        String::new()
                    } else {
                        format!("{:.0}", rng.range(0.0, 100.0))
                    };
                    record.push(score);
                }
                writer.write_record(&record)?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!("Wrote {rows} players to {output_path}");
    Ok(())
}
