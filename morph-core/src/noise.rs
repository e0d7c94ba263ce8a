//! 1-D simplex noise over an explicitly owned permutation table.
//!
//! The table is built once — either from the fixed reference bytes or by
//! shuffling 0..=255 with a caller-supplied RNG — and is immutable from
//! then on. Which constructor to use is the caller's configuration, not
//! hidden module state.

use rand::Rng;

const TABLE_SIZE: usize = 256;
const TABLE_MASK: i64 = 0xFF;

/// 1-D gradients: only two directions exist.
const GRAD1: [f32; 2] = [1.0, -1.0];

/// Fixed reference permutation of 0..=255.
const REFERENCE_PERM: [u8; TABLE_SIZE] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209,
    76, 132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198,
    173, 186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
    207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44,
    154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79,
    113, 224, 232, 178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12,
    191, 179, 162, 241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
    184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29,
    24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

/// An immutable permutation table, pre-doubled to 512 entries so lookups
/// never wrap mid-pair.
pub struct PermutationTable {
    perm: [u8; TABLE_SIZE * 2],
}

impl PermutationTable {
    /// The fixed reference table. Deterministic across runs.
    pub fn reference() -> Self {
        Self::from_base(REFERENCE_PERM)
    }

    /// A Fisher–Yates shuffle of 0..=255 using `rng`.
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        let mut base: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        for i in (1..TABLE_SIZE).rev() {
            let j = rng.random_range(0..=i);
            base.swap(i, j);
        }
        Self::from_base(base)
    }

    fn from_base(base: [u8; TABLE_SIZE]) -> Self {
        Self {
            perm: std::array::from_fn(|i| base[i & (TABLE_MASK as usize)]),
        }
    }

    fn hash(&self, i: i64) -> u8 {
        self.perm[(i & TABLE_MASK) as usize]
    }
}

/// 1-D simplex noise generator.
pub struct Simplex1d {
    table: PermutationTable,
}

impl Simplex1d {
    pub fn new(table: PermutationTable) -> Self {
        Self { table }
    }

    /// Noise value at `x`, scaled into roughly [-1, 1].
    pub fn noise(&self, x: f32) -> f32 {
        let i0 = x.floor() as i64;
        let i1 = i0 + 1;
        let x0 = x - i0 as f32;
        let x1 = x0 - 1.0;

        let g0 = GRAD1[(self.table.hash(i0) & 1) as usize] * x0;
        let g1 = GRAD1[(self.table.hash(i1) & 1) as usize] * x1;

        // (1 - x²)⁴ falloff per corner.
        let mut t0 = 1.0 - x0 * x0;
        t0 *= t0;
        t0 *= t0;
        let mut t1 = 1.0 - x1 * x1;
        t1 *= t1;
        t1 *= t1;

        3.5 * (g0 * t0 + g1 * t1)
    }

    /// Octave sum with per-octave frequency doubling, normalized by the
    /// total amplitude so the range stays comparable to [`Self::noise`].
    pub fn fractal(&self, x: f32, octaves: u32, persistence: f32) -> f32 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.noise(x * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 { 0.0 } else { total / max_value }
    }
}

/// Periodic ±1 triangle signal with a 4-second period. Used as the
/// phase source for signal-gated point generation.
pub fn triangle_wave(time: f32) -> f32 {
    let phase = time.rem_euclid(4.0) / 4.0;
    if phase < 0.25 {
        -1.0 + 4.0 * phase
    } else if phase < 0.75 {
        1.0 - 4.0 * (phase - 0.25)
    } else {
        -1.0 + 4.0 * (phase - 0.75)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn reference_table_is_a_permutation() {
        let table = PermutationTable::reference();
        let mut seen = [false; TABLE_SIZE];
        for i in 0..TABLE_SIZE {
            seen[table.perm[i] as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        // The doubled half mirrors the first half.
        for i in 0..TABLE_SIZE {
            assert_eq!(table.perm[i], table.perm[i + TABLE_SIZE]);
        }
    }

    #[test]
    fn shuffled_table_is_a_permutation_and_seed_deterministic() {
        let make = || PermutationTable::shuffled(&mut StdRng::seed_from_u64(99));
        let a = make();
        let b = make();
        assert_eq!(a.perm, b.perm);

        let mut seen = [false; TABLE_SIZE];
        for i in 0..TABLE_SIZE {
            seen[a.perm[i] as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn noise_stays_within_scaled_bounds() {
        let noise = Simplex1d::new(PermutationTable::reference());
        for i in -1000..1000 {
            let v = noise.noise(i as f32 * 0.137);
            assert!(v.abs() <= 3.5, "noise({}) = {} out of range", i, v);
        }
    }

    #[test]
    fn noise_is_zero_on_integer_lattice() {
        // Both corner falloffs vanish exactly on lattice points.
        let noise = Simplex1d::new(PermutationTable::reference());
        for i in -10..10 {
            assert_eq!(noise.noise(i as f32), 0.0);
        }
    }

    #[test]
    fn fractal_normalization_keeps_range() {
        let noise = Simplex1d::new(PermutationTable::reference());
        for i in 0..500 {
            let v = noise.fractal(i as f32 * 0.31, 4, 0.5);
            assert!(v.abs() <= 3.5);
        }
        assert_eq!(noise.fractal(1.23, 0, 0.5), 0.0);
    }

    #[test]
    fn triangle_wave_hits_extremes_and_period() {
        assert_eq!(triangle_wave(0.0), -1.0);
        assert_eq!(triangle_wave(1.0), 1.0);
        assert_eq!(triangle_wave(3.0), -1.0);
        assert_eq!(triangle_wave(0.0), triangle_wave(4.0));
        assert_eq!(triangle_wave(1.5), triangle_wave(5.5));
        for i in 0..100 {
            assert!(triangle_wave(i as f32 * 0.173).abs() <= 1.0);
        }
    }
}
