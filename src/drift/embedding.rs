//! Semantic similarity for fuzzy matching between code and docs
//!
//! Optional enrichment stage: the comparator never calls into this
//! module. Callers may consult a `SemanticMatcher` to propose candidate
//! matches for items the exact/case-insensitive policy left unmatched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Capability interface for embedding providers
pub trait EmbeddingProvider {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Name of the underlying model
    fn model_name(&self) -> &str;
}

/// Dependency-free hashing-trick embedding; no model, no network.
pub struct HashEmbedding {
    dimension: usize,
}

impl HashEmbedding {
    /// Create a hashing embedding with the given dimension
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl EmbeddingProvider for HashEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.to_lowercase().split_whitespace() {
            let digest = Sha256::digest(word.as_bytes());
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            let hash = u64::from_be_bytes(bytes);

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash / self.dimension as u64) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}

/// OpenAI-style remote embedding endpoint
pub struct RemoteEmbedding {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteEmbedding {
    /// Create a remote embedding provider
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl EmbeddingProvider for RemoteEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()])?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.endpoint);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().context("Failed to send embedding request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Embedding request failed: {} - {}", status, body);
        }

        let result: EmbeddingResponse = response
            .json()
            .context("Failed to parse embedding response")?;

        let mut embeddings: Vec<_> = result
            .data
            .into_iter()
            .map(|d| (d.index, d.embedding))
            .collect();
        embeddings.sort_by_key(|(index, _)| *index);

        Ok(embeddings.into_iter().map(|(_, e)| e).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Local model served through an Ollama-compatible endpoint
pub struct LocalEmbedding {
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl LocalEmbedding {
    /// Create a local embedding provider
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Create with Ollama defaults
    pub fn ollama(model: &str) -> Self {
        Self::new("http://localhost:11434", model)
    }

    /// Check if the embedding service is reachable
    pub fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        self.client.get(&url).send().is_ok()
    }
}

impl EmbeddingProvider for LocalEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.endpoint);

        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .context("Failed to send embedding request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Embedding request failed: {} - {}", status, body);
        }

        let result: OllamaEmbeddingResponse = response
            .json()
            .context("Failed to parse embedding response")?;

        Ok(result.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

const CACHE_FILE: &str = "embeddings_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEmbedding {
    text: String,
    embedding: Vec<f32>,
    model: String,
}

/// On-disk embedding cache with an explicit load/save boundary.
///
/// Owned by the matcher and passed in at construction; there is no
/// call-site memoization.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    path: Option<PathBuf>,
    entries: HashMap<String, CachedEmbedding>,
}

impl EmbeddingCache {
    /// A cache that never touches disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache from a directory. A missing or corrupt cache file
    /// degrades to an empty cache.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CACHE_FILE);
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Persist the cache to its backing file, if any
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {:?}", parent))?;
        }
        let content = serde_json::to_string(&self.entries)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write cache file: {:?}", path))
    }

    /// Number of cached embeddings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(text: &str) -> String {
        let digest = hex::encode(Sha256::digest(text.as_bytes()));
        digest[..16].to_string()
    }
}

/// Severity classification of a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticDrift {
    None,
    Info,
    Warning,
    Critical,
}

impl SemanticDrift {
    /// Classify a similarity score in [0, 1]
    pub fn classify(similarity: f64) -> Self {
        if similarity >= 0.9 {
            SemanticDrift::None
        } else if similarity >= 0.7 {
            SemanticDrift::Info
        } else if similarity >= 0.5 {
            SemanticDrift::Warning
        } else {
            SemanticDrift::Critical
        }
    }
}

impl std::fmt::Display for SemanticDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticDrift::None => write!(f, "none"),
            SemanticDrift::Info => write!(f, "info"),
            SemanticDrift::Warning => write!(f, "warning"),
            SemanticDrift::Critical => write!(f, "critical"),
        }
    }
}

/// Result of scoring two texts
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SemanticScore {
    /// Cosine similarity in [0, 1] for non-degenerate inputs
    pub similarity: f64,
    /// Whether the similarity falls below the matcher threshold
    pub has_drift: bool,
    /// Coarse severity classification
    pub severity: SemanticDrift,
}

/// Matches code items to documentation by semantic similarity
pub struct SemanticMatcher {
    provider: Box<dyn EmbeddingProvider>,
    threshold: f64,
    cache: EmbeddingCache,
}

impl SemanticMatcher {
    /// Create a matcher over a provider and cache
    pub fn new(provider: Box<dyn EmbeddingProvider>, cache: EmbeddingCache) -> Self {
        Self {
            provider,
            threshold: 0.7,
            cache,
        }
    }

    /// Set the similarity threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Embedding for a text, via the cache when possible
    pub fn embedding(&mut self, text: &str) -> Result<Vec<f32>> {
        let key = EmbeddingCache::key(text);
        if let Some(cached) = self.cache.entries.get(&key) {
            return Ok(cached.embedding.clone());
        }

        let embedding = self.provider.embed(text)?;
        self.cache.entries.insert(
            key,
            CachedEmbedding {
                text: text.to_string(),
                embedding: embedding.clone(),
                model: self.provider.model_name().to_string(),
            },
        );
        Ok(embedding)
    }

    /// Best candidate for a query, if it clears the threshold
    pub fn find_best_match(
        &mut self,
        query: &str,
        candidates: &[String],
    ) -> Result<Option<(String, f64)>> {
        if candidates.is_empty() {
            return Ok(None);
        }

        let query_embedding = self.embedding(query)?;

        let mut best: Option<(String, f64)> = None;
        for candidate in candidates {
            let candidate_embedding = self.embedding(candidate)?;
            let score = cosine_similarity(&query_embedding, &candidate_embedding);
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((candidate.clone(), score));
            }
        }

        Ok(best.filter(|(_, score)| *score >= self.threshold))
    }

    /// Score a code text against a doc text
    pub fn score(&mut self, code_text: &str, doc_text: &str) -> Result<SemanticScore> {
        let code_embedding = self.embedding(code_text)?;
        let doc_embedding = self.embedding(doc_text)?;
        let similarity = cosine_similarity(&code_embedding, &doc_embedding);

        Ok(SemanticScore {
            similarity,
            has_drift: similarity < self.threshold,
            severity: SemanticDrift::classify(similarity),
        })
    }

    /// Persist the cache; the explicit save boundary
    pub fn save_cache(&self) -> Result<()> {
        self.cache.save()
    }
}

/// Compute cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c) - 0.0).abs() < 0.001);

        let d = vec![0.5, 0.0];
        assert_eq!(cosine_similarity(&a, &d), 0.0);
    }

    #[test]
    fn test_hash_embedding_is_deterministic() {
        let provider = HashEmbedding::new(256);

        let first = provider.embed("parse python files").unwrap();
        let second = provider.embed("parse python files").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 256);

        let other = provider.embed("render markdown reports").unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(SemanticDrift::classify(0.95), SemanticDrift::None);
        assert_eq!(SemanticDrift::classify(0.75), SemanticDrift::Info);
        assert_eq!(SemanticDrift::classify(0.6), SemanticDrift::Warning);
        assert_eq!(SemanticDrift::classify(0.2), SemanticDrift::Critical);
    }

    #[test]
    fn test_matcher_finds_identical_text() {
        let mut matcher = SemanticMatcher::new(
            Box::new(HashEmbedding::new(256)),
            EmbeddingCache::in_memory(),
        )
        .with_threshold(0.9);

        let candidates = vec![
            "compare code with documentation".to_string(),
            "generate drift report".to_string(),
        ];
        let best = matcher
            .find_best_match("compare code with documentation", &candidates)
            .unwrap();

        let (name, score) = best.unwrap();
        assert_eq!(name, "compare code with documentation");
        assert!(score > 0.99);
    }

    #[test]
    fn test_matcher_respects_threshold() {
        let mut matcher = SemanticMatcher::new(
            Box::new(HashEmbedding::new(256)),
            EmbeddingCache::in_memory(),
        )
        .with_threshold(0.99);

        let candidates = vec!["totally unrelated words here".to_string()];
        let best = matcher
            .find_best_match("parse python source", &candidates)
            .unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        {
            let cache = EmbeddingCache::load(dir.path());
            let mut matcher =
                SemanticMatcher::new(Box::new(HashEmbedding::new(64)), cache);
            matcher.embedding("cached text").unwrap();
            matcher.save_cache().unwrap();
        }

        let reloaded = EmbeddingCache::load(dir.path());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_score_reports_drift() {
        let mut matcher = SemanticMatcher::new(
            Box::new(HashEmbedding::new(256)),
            EmbeddingCache::in_memory(),
        );

        let same = matcher.score("open a connection", "open a connection").unwrap();
        assert!(!same.has_drift);
        assert_eq!(same.severity, SemanticDrift::None);

        let different = matcher
            .score("open a connection", "unrelated text entirely")
            .unwrap();
        assert!(different.has_drift);
    }
}
