//! LLM 기반 뉴스 감성 스코어링.
//!
//! Gemini `generateContent` REST API로 기사별 감성 점수를 매기고
//! 티커 단위로 집계합니다.
//!
//! # 점수 체계
//!
//! - `sentiment_score`: -1000 (재앙적 악재) ~ +1000 (획기적 호재)
//! - `impact_rating`: 1 ~ 5 (시장 영향력)
//! - `novelty_score`: 1 ~ 5 (정보의 새로움)
//!
//! 뉴스 API가 제공하는 -1 ~ 1 스케일의 업스트림 감성 점수는 집계 전에
//! 1000배로 스케일을 맞춥니다. LLM 호출이 실패해도 업스트림 점수만으로
//! 집계가 가능하도록 집계 함수는 두 입력을 독립적으로 받습니다.

use findata_core::{FindataError, FindataResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 스코어링 대상 기사 (제목 + 요약 발췌).
#[derive(Debug, Clone)]
pub struct ArticleSnippet {
    /// 기사 제목
    pub title: String,
    /// 요약 또는 본문 발췌
    pub snippet: String,
}

/// LLM이 매긴 기사별 점수.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleScore {
    /// 감성 점수 (-1000 ~ 1000)
    pub sentiment_score: i32,
    /// 시장 영향력 (1 ~ 5)
    pub impact_rating: i32,
    /// 새로움 (1 ~ 5)
    pub novelty_score: i32,
}

impl ArticleScore {
    /// 점수를 문서화된 범위로 클램핑합니다.
    fn clamped(self) -> Self {
        Self {
            sentiment_score: self.sentiment_score.clamp(-1000, 1000),
            impact_rating: self.impact_rating.clamp(1, 5),
            novelty_score: self.novelty_score.clamp(1, 5),
        }
    }
}

/// 티커별 감성 집계 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    /// 총 언급 수 (업스트림 + LLM 분석)
    pub total_mentions: usize,
    /// 평균 감성 점수 (-1000 ~ 1000 스케일)
    pub average_sentiment_score: Option<f64>,
    /// 감성 점수 표본 표준편차 (2건 이상일 때만)
    pub sentiment_std_dev: Option<f64>,
    /// 평균 시장 영향력
    pub average_impact_rating: Option<f64>,
    /// 평균 새로움
    pub average_novelty_score: Option<f64>,
    /// LLM이 분석한 기사 수
    pub analyzed_count: usize,
}

// =============================================================================
// Gemini 클라이언트
// =============================================================================

/// Gemini generateContent 요청 본문.
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini generateContent 응답 본문 (필요한 필드만).
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Gemini API 클라이언트.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// 새로운 Gemini 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API 키
    /// * `model` - 모델 이름 (예: "gemini-1.5-pro-latest")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// 환경변수 `GEMINI_API_KEY`에서 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-pro-latest".to_string());
        Some(Self::new(api_key, model))
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 프롬프트를 전송하고 생성된 텍스트를 반환합니다.
    ///
    /// 결정적 출력을 위해 temperature 0으로 호출합니다.
    pub async fn generate(&self, prompt: &str) -> FindataResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 8192,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| FindataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FindataError::Provider(format!(
                "Gemini API [{}]: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| FindataError::Serialization(e.to_string()))?;

        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                FindataError::Provider("Gemini 응답에 생성 텍스트가 없습니다".to_string())
            })?;

        Ok(text)
    }

    /// 기사 목록을 스코어링합니다.
    ///
    /// 반환된 점수는 입력 기사와 순서대로 대응합니다. LLM 응답의 기사
    /// 수가 입력과 다르면 에러입니다.
    pub async fn score_articles(
        &self,
        ticker: &str,
        articles: &[ArticleSnippet],
    ) -> FindataResult<Vec<ArticleScore>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_scoring_prompt(ticker, articles);
        let response_text = self.generate(&prompt).await?;
        let scores = parse_scores(&response_text)?;

        if scores.len() != articles.len() {
            return Err(FindataError::Provider(format!(
                "LLM 응답 기사 수 불일치: 기대 {}, 수신 {}",
                articles.len(),
                scores.len()
            )));
        }

        tracing::info!(ticker = ticker, count = scores.len(), "LLM 스코어링 완료");
        Ok(scores)
    }
}

// =============================================================================
// 프롬프트 / 파싱 / 집계
// =============================================================================

/// 스코어링 프롬프트 생성.
pub fn build_scoring_prompt(ticker: &str, articles: &[ArticleSnippet]) -> String {
    let articles_text = articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            format!(
                "Article {}:\nTitle: {}\nSnippet: {}",
                i + 1,
                article.title,
                article.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a hyper-sensitive quantitative analysis engine. Your task is to analyze financial news for the ticker "{ticker}" with extreme precision.

**Instructions:**
1. **Score Range:** Assign a `sentiment_score` for each article on a scale from **-1000 (catastrophic news)** to **+1000 (breakthrough news)**.
2. **High Sensitivity:** DO NOT default to neutral scores like 0. A slightly positive earnings report might be a +150, while a major new product launch could be a +750. A minor legal issue might be a -120, while a failed clinical trial could be a -950. Capture every nuance.
3. **Quant-Ready Output:** Provide two other quantitative metrics: `impact_rating` (1-5 scale of market-moving potential) and `novelty_score` (1-5 scale of how new or surprising the information is).
4. **Strict JSON Output:** Return ONLY a JSON array of objects. The array must have exactly {count} objects. Each object MUST contain these keys: `sentiment_score` (integer), `impact_rating` (integer), `novelty_score` (integer).

Analyze these articles now:
{articles_text}"#,
        ticker = ticker,
        count = articles.len(),
        articles_text = articles_text,
    )
}

/// LLM 응답 텍스트에서 점수 배열을 파싱합니다.
///
/// 마크다운 코드 펜스(```json ... ```)를 제거한 뒤 JSON 배열로
/// 파싱하고, 각 점수를 문서화된 범위로 클램핑합니다.
pub fn parse_scores(text: &str) -> FindataResult<Vec<ArticleScore>> {
    let cleaned = strip_code_fences(text);

    let scores: Vec<ArticleScore> = serde_json::from_str(cleaned)
        .map_err(|e| FindataError::Serialization(format!("LLM 점수 파싱 실패: {}", e)))?;

    Ok(scores.into_iter().map(ArticleScore::clamped).collect())
}

/// 마크다운 코드 펜스 제거.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// 업스트림 감성 점수(-1 ~ 1)를 LLM 스케일(-1000 ~ 1000)로 변환.
pub fn scale_upstream_score(score: Decimal) -> f64 {
    score.to_f64().unwrap_or(0.0) * 1000.0
}

/// 업스트림 점수와 LLM 점수를 결합해 티커별 요약을 계산합니다.
///
/// # Arguments
/// * `upstream_scores` - 이미 1000배 스케일로 변환된 업스트림 점수
/// * `llm_scores` - LLM이 매긴 기사별 점수
pub fn aggregate_sentiment(
    upstream_scores: &[f64],
    llm_scores: &[ArticleScore],
) -> SentimentSummary {
    let all_scores: Vec<f64> = upstream_scores
        .iter()
        .copied()
        .chain(llm_scores.iter().map(|s| s.sentiment_score as f64))
        .collect();

    let average_sentiment_score = mean(&all_scores);
    let sentiment_std_dev = sample_std_dev(&all_scores);

    let impacts: Vec<f64> = llm_scores.iter().map(|s| s.impact_rating as f64).collect();
    let novelties: Vec<f64> = llm_scores.iter().map(|s| s.novelty_score as f64).collect();

    SentimentSummary {
        total_mentions: all_scores.len(),
        average_sentiment_score,
        sentiment_std_dev,
        average_impact_rating: mean(&impacts),
        average_novelty_score: mean(&novelties),
        analyzed_count: llm_scores.len(),
    }
}

/// 평균. 빈 입력은 None.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 표본 표준편차. 2건 미만이면 None.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snippet(title: &str) -> ArticleSnippet {
        ArticleSnippet {
            title: title.to_string(),
            snippet: "...".to_string(),
        }
    }

    #[test]
    fn test_prompt_contains_ticker_and_count() {
        let articles = vec![snippet("First"), snippet("Second"), snippet("Third")];
        let prompt = build_scoring_prompt("AAPL", &articles);

        assert!(prompt.contains("\"AAPL\""));
        assert!(prompt.contains("exactly 3 objects"));
        assert!(prompt.contains("Article 3:"));
        assert!(prompt.contains("-1000"));
    }

    #[test]
    fn test_parse_scores_with_code_fences() {
        let text = r#"```json
[
    {"sentiment_score": 150, "impact_rating": 3, "novelty_score": 2},
    {"sentiment_score": -950, "impact_rating": 5, "novelty_score": 5}
]
```"#;

        let scores = parse_scores(text).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].sentiment_score, 150);
        assert_eq!(scores[1].impact_rating, 5);
    }

    #[test]
    fn test_parse_scores_clamps_out_of_range() {
        let text = r#"[{"sentiment_score": 5000, "impact_rating": 0, "novelty_score": 9}]"#;

        let scores = parse_scores(text).unwrap();

        assert_eq!(scores[0].sentiment_score, 1000);
        assert_eq!(scores[0].impact_rating, 1);
        assert_eq!(scores[0].novelty_score, 5);
    }

    #[test]
    fn test_parse_scores_rejects_non_json() {
        assert!(parse_scores("I cannot analyze these articles.").is_err());
    }

    #[test]
    fn test_scale_upstream_score() {
        assert_eq!(scale_upstream_score(dec!(0.35)), 350.0);
        assert_eq!(scale_upstream_score(dec!(-1)), -1000.0);
    }

    #[test]
    fn test_aggregate_sentiment() {
        let upstream = vec![100.0, 200.0];
        let llm = vec![
            ArticleScore {
                sentiment_score: 300,
                impact_rating: 4,
                novelty_score: 2,
            },
            ArticleScore {
                sentiment_score: 400,
                impact_rating: 2,
                novelty_score: 4,
            },
        ];

        let summary = aggregate_sentiment(&upstream, &llm);

        assert_eq!(summary.total_mentions, 4);
        assert_eq!(summary.analyzed_count, 2);
        assert_eq!(summary.average_sentiment_score, Some(250.0));
        // 표본 표준편차: sqrt(50000/3) ≈ 129.099
        let std_dev = summary.sentiment_std_dev.unwrap();
        assert!((std_dev - 129.099).abs() < 1e-2);
        assert_eq!(summary.average_impact_rating, Some(3.0));
        assert_eq!(summary.average_novelty_score, Some(3.0));
    }

    #[test]
    fn test_aggregate_sentiment_upstream_only() {
        let summary = aggregate_sentiment(&[500.0], &[]);

        assert_eq!(summary.total_mentions, 1);
        assert_eq!(summary.analyzed_count, 0);
        assert_eq!(summary.average_sentiment_score, Some(500.0));
        assert_eq!(summary.sentiment_std_dev, None);
        assert_eq!(summary.average_impact_rating, None);
    }

    #[test]
    fn test_aggregate_sentiment_empty() {
        let summary = aggregate_sentiment(&[], &[]);

        assert_eq!(summary.total_mentions, 0);
        assert_eq!(summary.average_sentiment_score, None);
    }
}
