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
// Password generator

use std::collections::HashSet;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use log::debug;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

// 易混淆字符（符号集不参与过滤）
const SIMILAR_UPPER: [char; 2] = ['I', 'O'];
const SIMILAR_LOWER: [char; 1] = ['l'];
const SIMILAR_DIGITS: [char; 2] = ['1', '0'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Password length must be at least 1")]
    EmptyLength,
    #[error("Minimum requirements exceed password length: need {required} characters but length is {length} ({} short)", .required - .length)]
    PolicyViolation { required: usize, length: usize },
    #[error("Insufficient distinct characters for requested {class}: need {required}, only {available} available")]
    InsufficientDistinctCharacters {
        class: &'static str,
        required: usize,
        available: usize,
    },
}

/// The four disjoint character classes a password is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterPools {
    pub upper: Vec<char>,
    pub lower: Vec<char>,
    pub digits: Vec<char>,
    pub symbols: Vec<char>,
}

impl CharacterPools {
    pub fn new(avoid_similar: bool) -> Self {
        let mut upper: Vec<char> = UPPERCASE.chars().collect();
        let mut lower: Vec<char> = LOWERCASE.chars().collect();
        let mut digits: Vec<char> = DIGITS.chars().collect();

        if avoid_similar {
            upper.retain(|c| !SIMILAR_UPPER.contains(c));
            lower.retain(|c| !SIMILAR_LOWER.contains(c));
            digits.retain(|c| !SIMILAR_DIGITS.contains(c));
        }

        Self {
            upper,
            lower,
            digits,
            symbols: SYMBOLS.chars().collect(),
        }
    }

    /// All four pools concatenated in class order.
    pub fn union(&self) -> Vec<char> {
        let mut all = Vec::with_capacity(
            self.upper.len() + self.lower.len() + self.digits.len() + self.symbols.len(),
        );
        all.extend_from_slice(&self.upper);
        all.extend_from_slice(&self.lower);
        all.extend_from_slice(&self.digits);
        all.extend_from_slice(&self.symbols);
        all
    }
}

// 密码生成策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConstraints {
    pub length: usize,
    pub min_upper: usize,
    pub min_lower: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
    #[serde(default)]
    pub avoid_similar: bool,
    #[serde(default)]
    pub forbid_repeated: bool,
}

impl Default for PolicyConstraints {
    fn default() -> Self {
        Self {
            length: 16,
            min_upper: 1,
            min_lower: 1,
            min_digits: 1,
            min_symbols: 1,
            avoid_similar: false,
            forbid_repeated: false,
        }
    }
}

impl PolicyConstraints {
    /// A 20 character policy with three of every class.
    pub fn example() -> Self {
        Self {
            length: 20,
            min_upper: 3,
            min_lower: 3,
            min_digits: 3,
            min_symbols: 3,
            ..Default::default()
        }
    }

    /// Sum of the class minimums, saturating at `usize::MAX`.
    pub fn required_total(&self) -> usize {
        [self.min_lower, self.min_digits, self.min_symbols]
            .into_iter()
            .fold(self.min_upper, usize::saturating_add)
    }

    /// Checks the policy against the pools it would draw from.
    /// Consumes no randomness.
    pub fn validate(&self, pools: &CharacterPools) -> Result<(), GenerateError> {
        if self.length == 0 {
            return Err(GenerateError::EmptyLength);
        }
        let required = self.required_total();
        if required > self.length {
            return Err(GenerateError::PolicyViolation { required, length: self.length });
        }

        if self.forbid_repeated {
            let classes = [
                ("uppercase letters", self.min_upper, pools.upper.len()),
                ("lowercase letters", self.min_lower, pools.lower.len()),
                ("digits", self.min_digits, pools.digits.len()),
                ("symbols", self.min_symbols, pools.symbols.len()),
            ];
            for (class, required, available) in classes {
                if required > available {
                    return Err(GenerateError::InsufficientDistinctCharacters { class, required, available });
                }
            }
            let available = pools.union().iter().collect::<HashSet<_>>().len();
            if self.length > available {
                return Err(GenerateError::InsufficientDistinctCharacters {
                    class: "password length",
                    required: self.length,
                    available,
                });
            }
        }

        Ok(())
    }
}

/// Generates a password with the operating system RNG.
pub fn generate_password(policy: &PolicyConstraints) -> Result<String, GenerateError> {
    let mut rng = OsRng::default();
    generate_password_with(policy, &mut rng)
}

pub fn generate_password_with<R: Rng + ?Sized>(
    policy: &PolicyConstraints,
    rng: &mut R,
) -> Result<String, GenerateError> {
    let pools = CharacterPools::new(policy.avoid_similar);
    policy.validate(&pools)?;

    let mut password_chars = Vec::with_capacity(policy.length);
    let mut used = HashSet::new();

    // Seed the class minimums in fixed order
    let seeds = [
        (&pools.upper, policy.min_upper),
        (&pools.lower, policy.min_lower),
        (&pools.digits, policy.min_digits),
        (&pools.symbols, policy.min_symbols),
    ];
    for (pool, count) in seeds {
        for _ in 0..count {
            let c = draw(pool, &used, policy.forbid_repeated, rng)?;
            used.insert(c);
            password_chars.push(c);
        }
    }

    // Fill the rest from every pool combined
    let all_chars = pools.union();
    for _ in 0..(policy.length - policy.required_total()) {
        let c = draw(&all_chars, &used, policy.forbid_repeated, rng)?;
        used.insert(c);
        password_chars.push(c);
    }

    // Shuffle the characters to avoid predictable pattern
    password_chars.shuffle(rng);

    debug!(
        "Generated {} character password (avoid_similar={}, forbid_repeated={})",
        password_chars.len(),
        policy.avoid_similar,
        policy.forbid_repeated
    );
    Ok(password_chars.into_iter().collect())
}

// 不允许重复时，只在尚未使用的字符中均匀抽取
fn draw<R: Rng + ?Sized>(
    pool: &[char],
    used: &HashSet<char>,
    forbid_repeated: bool,
    rng: &mut R,
) -> Result<char, GenerateError> {
    let picked = if forbid_repeated {
        let candidates: Vec<char> = pool.iter().copied().filter(|c| !used.contains(c)).collect();
        candidates.choose(rng).copied()
    } else {
        pool.choose(rng).copied()
    };
    picked.ok_or(GenerateError::InsufficientDistinctCharacters {
            class: "remaining pool",
            required: 1,
            available: 0,
        })
}

pub fn check_url_safe(password: &str) -> bool {
    password.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

pub fn check_confusing_chars(password: &str) -> Vec<char> {
    password
        .chars()
        .filter(|c| SIMILAR_UPPER.contains(c) || SIMILAR_LOWER.contains(c) || SIMILAR_DIGITS.contains(c))
        .collect()
}
