//! Generate a synthetic quasi-static test record for trying the analyzer:
//! a standard cyclic loading protocol (three repetitions per displacement
//! amplitude level) with degrading stiffness and sensor noise, written as
//! CSV with `t`, `d`, `f` columns.

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Force response of the synthetic specimen: secant stiffness degrades with
/// the repetition count at each amplitude level, plus a hysteretic offset
/// opposing the motion so the loops enclose area.
fn specimen_force(d: f64, velocity_sign: f64, k: f64, rng: &mut SimpleRng) -> f64 {
    let hysteretic_offset = -velocity_sign * 0.08 * k;
    k * d + hysteretic_offset + rng.gauss(0.0, 0.15)
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Loading protocol: displacement amplitude levels in mm, three
    // repetitions each, 40 samples per half-excursion at 10 Hz.
    let amplitudes = [2.0, 4.0, 8.0, 12.0];
    let reps = 3;
    let samples_per_ramp = 40;
    let dt = 0.1;

    let k0 = 18.0; // initial secant stiffness, kN/mm
    let degradation_per_rep = 0.04;

    let mut rows: Vec<(f64, f64, f64)> = Vec::new();
    let mut t = 0.0;
    let mut d_prev = 0.0;

    for (level, &amp) in amplitudes.iter().enumerate() {
        for rep in 0..reps {
            let k = k0 * (1.0 - degradation_per_rep * (level * reps + rep) as f64);
            // one full cycle: 0 → +amp → 0 → −amp → 0
            let targets = [amp, 0.0, -amp, 0.0];
            for &target in &targets {
                let d_start = d_prev;
                for i in 1..=samples_per_ramp {
                    let d = d_start + (target - d_start) * i as f64 / samples_per_ramp as f64;
                    let velocity_sign = (d - d_prev).signum();
                    let noisy_d = d + rng.gauss(0.0, 0.01);
                    let f = specimen_force(d, velocity_sign, k, &mut rng);
                    rows.push((t, noisy_d, f));
                    t += dt;
                    d_prev = d;
                }
            }
        }
    }

    let output_path = "sample_test.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["t", "d", "f"])
        .expect("Failed to write header");
    for (t, d, f) in &rows {
        writer
            .write_record([format!("{t:.1}"), format!("{d:.5}"), format!("{f:.5}")])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush output");

    println!(
        "Wrote {} samples ({} amplitude levels x {reps} cycles) to {output_path}",
        rows.len(),
        amplitudes.len()
    );
}
