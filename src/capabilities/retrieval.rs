//! 知识库检索能力
//!
//! DocumentRetriever 返回按相关度降序的片段。KeywordRetriever 是不依赖向量的内存实现：
//! 分词后按 Jaccard 相似度打分，只返回分数大于 0 的片段。

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::Document;
use crate::memory::tokenizer::{jaccard_similarity, tokenize_to_set};

/// 文档检索：返回至多 top_k 条，按相关度降序
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, String>;
}

/// 语料文件中的一条
#[derive(Debug, Clone, Deserialize)]
pub struct Passage {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

struct IndexedPassage {
    passage: Passage,
    tokens: HashSet<String>,
}

/// 关键词检索（内存）
#[derive(Default)]
pub struct KeywordRetriever {
    passages: RwLock<Vec<IndexedPassage>>,
}

impl KeywordRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_passages(passages: impl IntoIterator<Item = Passage>) -> Self {
        let retriever = Self::new();
        for p in passages {
            retriever.add_passage(p);
        }
        retriever
    }

    /// 从 JSON 数组加载语料
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("read {}: {}", path.display(), e))?;
        let passages: Vec<Passage> = serde_json::from_str(&raw)
            .map_err(|e| format!("parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded {} passages from {}", passages.len(), path.display());
        Ok(Self::from_passages(passages))
    }

    pub fn add(&self, text: &str) {
        self.add_passage(Passage {
            text: text.to_string(),
            metadata: HashMap::new(),
        });
    }

    pub fn add_passage(&self, passage: Passage) {
        let text = passage.text.trim();
        if text.is_empty() {
            return;
        }
        let tokens = tokenize_to_set(text);
        let mut store = self.passages.write().unwrap_or_else(|e| e.into_inner());
        store.push(IndexedPassage { passage, tokens });
    }

    pub fn len(&self) -> usize {
        self.passages.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn search(&self, query: &str, top_k: usize) -> Vec<Document> {
        let query_tokens = tokenize_to_set(query);
        let store = self.passages.read().unwrap_or_else(|e| e.into_inner());

        let mut scored: Vec<(f32, &Passage)> = store
            .iter()
            .map(|p| (jaccard_similarity(&query_tokens, &p.tokens), &p.passage))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, p)| Document {
                text: p.text.clone(),
                relevance_score: score,
                metadata: p.metadata.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl DocumentRetriever for KeywordRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, String> {
        Ok(self.search(query, top_k))
    }
}
