//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Author : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// Password strength scoring

use std::fmt;
use zxcvbn::zxcvbn;
use zxcvbn::Score;

const LOWER_POOL: u32 = 26;
const UPPER_POOL: u32 = 26;
const DIGIT_POOL: u32 = 10;
const SYMBOL_POOL: u32 = 32;

/// Size of the character pool a password actually draws from,
/// judged by the classes present in it.
pub fn pool_size(password: &str) -> u32 {
    let mut pool = 0;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        pool += LOWER_POOL;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        pool += UPPER_POOL;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        pool += DIGIT_POOL;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        pool += SYMBOL_POOL;
    }
    pool
}

/// `length * log2(pool)`; an empty password scores zero.
pub fn entropy_bits(password: &str) -> f64 {
    let pool = pool_size(password);
    if pool == 0 {
        return 0.0;
    }
    password.chars().count() as f64 * f64::from(pool).log2()
}

// 强度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthTier {
    Weak,
    Fair,
    Good,
    Strong,
    VeryStrong,
}

impl StrengthTier {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::Weak => "Weak",
            StrengthTier::Fair => "Fair",
            StrengthTier::Good => "Good",
            StrengthTier::Strong => "Strong",
            StrengthTier::VeryStrong => "Very Strong",
        }
    }

    /// Number of filled segments on a five segment strength meter.
    pub fn segments(&self) -> u8 {
        match self {
            StrengthTier::Weak => 1,
            StrengthTier::Fair => 2,
            StrengthTier::Good => 3,
            StrengthTier::Strong => 4,
            StrengthTier::VeryStrong => 5,
        }
    }
}

impl fmt::Display for StrengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open buckets: `[40, 60)` is Fair, so exactly 40.0 is not Weak.
pub fn classify(entropy_bits: f64) -> StrengthTier {
    if entropy_bits < 40.0 {
        StrengthTier::Weak
    } else if entropy_bits < 60.0 {
        StrengthTier::Fair
    } else if entropy_bits < 80.0 {
        StrengthTier::Good
    } else if entropy_bits < 100.0 {
        StrengthTier::Strong
    } else {
        StrengthTier::VeryStrong
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthReport {
    pub entropy_bits: f64,
    pub tier: StrengthTier,
}

impl StrengthReport {
    pub fn assess(password: &str) -> Self {
        let entropy_bits = entropy_bits(password);
        Self {
            entropy_bits,
            tier: classify(entropy_bits),
        }
    }
}

/// zxcvbn rating, score (0-4) and its suggestions joined into one line.
pub fn assess_password_strength(password: &str) -> (String, u8, String) {
    let strength_result = zxcvbn(password, &[]);
    let score = strength_result.score();
    let feedback = strength_result.feedback().map_or_else(
        String::new,
        |f| f.suggestions().iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
    );

    let rating = match score {
        Score::Zero => "Very weak",
        Score::One => "Weak",
        Score::Two => "Fair",
        Score::Three => "Strong",
        Score::Four => "Very strong",
        _ => "Unknown",
    }.to_string();

    (rating, score as u8, feedback)
}
