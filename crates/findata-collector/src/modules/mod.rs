//! 데이터 수집 모듈.

pub mod checkpoint;
pub mod crypto_collect;
pub mod financials_sync;
pub mod fmp_sync;
pub mod fred_sync;
pub mod news_collect;
pub mod ohlcv_collect;
pub mod sentiment_analyze;
pub mod worldbank_sync;

pub use checkpoint::{
    clear_checkpoint, list_checkpoints, mark_interrupted, CheckpointInfo, CheckpointStatus,
};
pub use crypto_collect::collect_crypto;
pub use financials_sync::sync_financials;
pub use fmp_sync::sync_fmp;
pub use fred_sync::sync_fred;
pub use news_collect::collect_news;
pub use ohlcv_collect::collect_ohlcv;
pub use sentiment_analyze::analyze_sentiment;
pub use worldbank_sync::sync_worldbank;

use crate::config::parse_list;
use crate::Result;
use findata_data::{CompanyRepository, Database};
use sqlx::PgPool;

/// 수집 대상 심볼 결정.
///
/// 우선순위: CLI 인자 → 환경변수 목록 → DB에 저장된 기업 목록
pub(crate) async fn resolve_target_symbols(
    pool: &PgPool,
    cli_symbols: Option<String>,
    config_symbols: &[String],
) -> Result<Vec<String>> {
    if let Some(ref s) = cli_symbols {
        let symbols = parse_list(s);
        tracing::info!(count = symbols.len(), "특정 심볼 수집");
        return Ok(symbols);
    }

    if !config_symbols.is_empty() {
        tracing::info!(count = config_symbols.len(), "설정된 심볼 목록 사용");
        return Ok(config_symbols.to_vec());
    }

    // DB에 저장된 기업 목록으로 폴백
    let repo = CompanyRepository::new(Database::from_pool(pool.clone()));
    let symbols = repo.list_symbols().await?;
    tracing::info!(count = symbols.len(), "DB 기업 목록 사용");
    Ok(symbols)
}
