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
// Generate, score and record in one step

use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;

use crate::history::{HistoryBackend, HistoryError, HistoryRecord, HistoryStore};
use crate::passgen::{generate_password_with, GenerateError, PolicyConstraints};
use crate::strength::{StrengthReport, StrengthTier};
use crate::textgen::{ExternalGenerationFailure, TextGenerator};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    External(#[from] ExternalGenerationFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub record: HistoryRecord,
    pub tier: StrengthTier,
}

impl GenerationResult {
    pub fn password(&self) -> &str {
        &self.record.password
    }

    pub fn entropy_bits(&self) -> f64 {
        self.record.entropy_bits
    }
}

pub struct GenerationService<B: HistoryBackend> {
    store: HistoryStore<B>,
}

impl<B: HistoryBackend> GenerationService<B> {
    pub fn new(store: HistoryStore<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &HistoryStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HistoryStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> HistoryStore<B> {
        self.store
    }

    pub fn generate_and_record(&mut self, policy: &PolicyConstraints) -> Result<GenerationResult, ServiceError> {
        let mut rng = OsRng::default();
        self.generate_and_record_with(policy, &mut rng)
    }

    pub fn generate_and_record_with<R: Rng + ?Sized>(
        &mut self,
        policy: &PolicyConstraints,
        rng: &mut R,
    ) -> Result<GenerationResult, ServiceError> {
        // 生成失败时不写入历史
        let password = generate_password_with(policy, rng)?;
        self.record(password)
    }

    /// Scores and records whatever the external generator hands back.
    pub fn record_external(
        &mut self,
        generator: &dyn TextGenerator,
        prompt: &str,
    ) -> Result<GenerationResult, ServiceError> {
        let password = generator.generate(prompt)?;
        if password.is_empty() {
            return Err(ExternalGenerationFailure("Generator returned an empty password".to_string()).into());
        }
        self.record(password)
    }

    fn record(&mut self, password: String) -> Result<GenerationResult, ServiceError> {
        let report = StrengthReport::assess(&password);
        let record = self.store.insert(password, report.entropy_bits)?;
        Ok(GenerationResult {
            record,
            tier: report.tier,
        })
    }
}
